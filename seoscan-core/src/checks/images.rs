use super::{summarize_examples, truncate};
use crate::model::Issue;
use scraper::{Html, Selector};

/// Alt text and explicit dimensions on every `<img>`.
pub fn check_images(html: &str, page_url: &str) -> Vec<Issue> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("img").unwrap();

    let mut missing_alt = Vec::new();
    let mut empty_alt = Vec::new();
    let mut missing_dimensions = Vec::new();

    for img in document.select(&selector) {
        let attrs = img.value();
        let src = truncate(attrs.attr("src").unwrap_or("unknown"), 60);

        match attrs.attr("alt") {
            None => missing_alt.push(src.clone()),
            Some(alt) if alt.trim().is_empty() => empty_alt.push(src.clone()),
            Some(_) => {}
        }

        let has_size_attr = [attrs.attr("width"), attrs.attr("height")]
            .into_iter()
            .flatten()
            .any(|v| !v.is_empty());
        if !has_size_attr {
            let style = attrs.attr("style").unwrap_or("");
            if !style.contains("width") && !style.contains("height") {
                missing_dimensions.push(src);
            }
        }
    }

    let mut issues = Vec::new();

    if !missing_alt.is_empty() {
        issues.push(
            Issue::error(
                format!("{} image(s) missing alt attribute", missing_alt.len()),
                page_url,
            )
            .with_selector("img:not([alt])")
            .with_value(summarize_examples(&missing_alt, 3)),
        );
    }

    if !empty_alt.is_empty() {
        issues.push(
            Issue::info(
                format!(
                    "{} image(s) with empty alt (verify if decorative)",
                    empty_alt.len()
                ),
                page_url,
            )
            .with_selector(r#"img[alt=""]"#)
            .with_value(summarize_examples(&empty_alt, 3)),
        );
    }

    if !missing_dimensions.is_empty() {
        issues.push(
            Issue::warning(
                format!(
                    "{} image(s) missing width/height (may cause layout shift)",
                    missing_dimensions.len()
                ),
                page_url,
            )
            .with_selector("img:not([width]):not([height])")
            .with_value(summarize_examples(&missing_dimensions, 3)),
        );
    }

    issues
}
