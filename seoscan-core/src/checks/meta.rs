use super::truncate;
use crate::model::Issue;
use scraper::{Html, Selector};

const TITLE_SELECTOR: &str = "head > title";
const DESCRIPTION_SELECTOR: &str = r#"meta[name="description"]"#;
const OG_TAGS: [&str; 3] = ["og:title", "og:description", "og:image"];

/// Title, meta description, Open Graph and canonical checks.
pub fn check_meta_tags(html: &str, page_url: &str) -> Vec<Issue> {
    let document = Html::parse_document(html);
    let mut issues = Vec::new();

    let title_selector = Selector::parse("title").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    match title {
        None => issues.push(
            Issue::error("Missing page title", page_url)
                .with_selector(TITLE_SELECTOR)
                .with_value("Add <title>Your Page Title</title> in <head>"),
        ),
        Some(title) => {
            let len = title.chars().count();
            if len < 30 {
                issues.push(
                    Issue::warning(
                        format!("Title too short ({} chars, recommended 50-60)", len),
                        page_url,
                    )
                    .with_selector(TITLE_SELECTOR)
                    .with_value(truncate(&title, 100)),
                );
            } else if len > 60 {
                issues.push(
                    Issue::warning(
                        format!("Title too long ({} chars, recommended 50-60)", len),
                        page_url,
                    )
                    .with_selector(TITLE_SELECTOR)
                    .with_value(truncate(&title, 70)),
                );
            }
        }
    }

    let description_selector = Selector::parse(DESCRIPTION_SELECTOR).unwrap();
    let description = document
        .select(&description_selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(|content| content.trim().to_string());

    match description {
        None => issues.push(
            Issue::error("Missing meta description", page_url)
                .with_selector(DESCRIPTION_SELECTOR)
                .with_value(r#"Add <meta name="description" content="..."> in <head>"#),
        ),
        Some(description) => {
            let len = description.chars().count();
            if len < 120 {
                issues.push(
                    Issue::warning(
                        format!(
                            "Meta description too short ({} chars, recommended 150-160)",
                            len
                        ),
                        page_url,
                    )
                    .with_selector(DESCRIPTION_SELECTOR)
                    .with_value(truncate(&description, 100)),
                );
            } else if len > 160 {
                issues.push(
                    Issue::warning(
                        format!(
                            "Meta description too long ({} chars, recommended 150-160)",
                            len
                        ),
                        page_url,
                    )
                    .with_selector(DESCRIPTION_SELECTOR)
                    .with_value(truncate(&description, 100)),
                );
            }
        }
    }

    let missing_og: Vec<&str> = OG_TAGS
        .iter()
        .copied()
        .filter(|tag| {
            let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, tag)).unwrap();
            document.select(&selector).next().is_none()
        })
        .collect();

    if !missing_og.is_empty() {
        issues.push(
            Issue::warning(
                format!("Missing Open Graph tags: {}", missing_og.join(", ")),
                page_url,
            )
            .with_selector("head")
            .with_value(
                missing_og
                    .iter()
                    .map(|tag| format!(r#"<meta property="{}" content="...">"#, tag))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        );
    }

    let canonical_selector = Selector::parse(r#"link[rel~="canonical"]"#).unwrap();
    if document.select(&canonical_selector).next().is_none() {
        issues.push(
            Issue::info("No canonical URL specified", page_url)
                .with_selector(r#"link[rel="canonical"]"#)
                .with_value(format!(r#"Add <link rel="canonical" href="{}">"#, page_url)),
        );
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    const URL: &str = "https://example.com/";

    fn complete_head(title: &str, description: &str) -> String {
        format!(
            r#"<html><head>
                <title>{title}</title>
                <meta name="description" content="{description}">
                <meta property="og:title" content="t">
                <meta property="og:description" content="d">
                <meta property="og:image" content="i.png">
                <link rel="canonical" href="https://example.com/">
            </head><body></body></html>"#
        )
    }

    #[test]
    fn test_bare_page_yields_four_issues() {
        let issues = check_meta_tags("<html><head></head><body><p>hi</p></body></html>", URL);

        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].message, "Missing page title");
        assert_eq!(issues[1].severity, Severity::Error);
        assert_eq!(issues[1].message, "Missing meta description");
        assert_eq!(issues[2].severity, Severity::Warning);
        assert_eq!(
            issues[2].message,
            "Missing Open Graph tags: og:title, og:description, og:image"
        );
        assert_eq!(issues[3].severity, Severity::Info);
        assert_eq!(issues[3].message, "No canonical URL specified");
        assert!(issues.iter().all(|i| i.url == URL));
    }

    #[test]
    fn test_well_formed_head_is_clean() {
        let html = complete_head(&"T".repeat(55), &"D".repeat(155));
        assert!(check_meta_tags(&html, URL).is_empty());
    }

    #[test]
    fn test_short_title_and_description() {
        let html = complete_head("Home", "Short description");
        let issues = check_meta_tags(&html, URL);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "Title too short (4 chars, recommended 50-60)");
        assert_eq!(issues[0].value.as_deref(), Some("Home"));
        assert_eq!(
            issues[1].message,
            "Meta description too short (17 chars, recommended 150-160)"
        );
    }

    #[test]
    fn test_long_title_value_is_truncated() {
        let title = "L".repeat(72);
        let html = complete_head(&title, &"D".repeat(150));
        let issues = check_meta_tags(&html, URL);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Title too long (72 chars, recommended 50-60)");
        let value = issues[0].value.as_deref().unwrap();
        assert_eq!(value.chars().count(), 70);
        assert!(value.ends_with("..."));
    }

    #[test]
    fn test_long_description() {
        let html = complete_head(&"T".repeat(50), &"D".repeat(170));
        let issues = check_meta_tags(&html, URL);

        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Meta description too long (170 chars, recommended 150-160)"
        );
    }

    #[test]
    fn test_empty_title_and_description_count_as_missing() {
        let html = r#"<html><head><title>   </title><meta name="description" content=""></head></html>"#;
        let issues = check_meta_tags(html, URL);

        assert_eq!(issues[0].message, "Missing page title");
        assert_eq!(issues[1].message, "Missing meta description");
    }

    #[test]
    fn test_partial_open_graph_lists_only_missing() {
        let html = r#"<html><head><meta property="og:title" content="x"></head></html>"#;
        let issues = check_meta_tags(html, URL);

        let og = issues
            .iter()
            .find(|i| i.message.starts_with("Missing Open Graph"))
            .unwrap();
        assert_eq!(og.message, "Missing Open Graph tags: og:description, og:image");
    }

    #[test]
    fn test_canonical_matches_rel_token() {
        let html = r#"<html><head><link rel="canonical alternate" href="/"></head></html>"#;
        let issues = check_meta_tags(html, URL);
        assert!(issues.iter().all(|i| i.message != "No canonical URL specified"));
    }

    #[test]
    fn test_is_deterministic() {
        let html = "<html><head><title>x</title></head></html>";
        assert_eq!(check_meta_tags(html, URL), check_meta_tags(html, URL));
    }
}
