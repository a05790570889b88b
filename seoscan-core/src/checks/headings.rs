use super::truncate;
use crate::model::Issue;
use scraper::{Html, Selector};

struct Heading {
    level: u8,
    text: String,
}

fn collect_headings(html: &str) -> Vec<Heading> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();

    document
        .select(&selector)
        .filter_map(|element| {
            let level = element.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            let text = element.text().map(str::trim).collect::<String>();
            Some(Heading { level, text })
        })
        .collect()
}

/// H1 presence and heading hierarchy.
pub fn check_headings(html: &str, page_url: &str) -> Vec<Issue> {
    let headings = collect_headings(html);
    let mut issues = Vec::new();

    let h1s: Vec<&Heading> = headings.iter().filter(|h| h.level == 1).collect();
    if h1s.is_empty() {
        issues.push(
            Issue::error("Missing H1 heading", page_url)
                .with_selector("h1")
                .with_value("Add an <h1> tag with your main page title"),
        );
    } else if h1s.len() > 1 {
        let shown = h1s
            .iter()
            .take(3)
            .map(|h| format!("<h1>{}</h1>", truncate(&h.text, 40)))
            .collect::<Vec<_>>()
            .join(" | ");
        issues.push(
            Issue::warning(
                format!("Multiple H1 headings ({} found, should be 1)", h1s.len()),
                page_url,
            )
            .with_selector("h1")
            .with_value(shown),
        );
    }

    let mut levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
    levels.sort_unstable();
    levels.dedup();

    let Some(&lowest) = levels.first() else {
        return issues;
    };

    if lowest != 1
        && let Some(first) = headings.iter().find(|h| h.level == lowest)
    {
        issues.push(
            Issue::warning(
                format!("First heading is H{}, should start with H1", lowest),
                page_url,
            )
            .with_selector(format!("h{}", lowest))
            .with_value(format!(
                "<h{lvl}>{}</h{lvl}>",
                truncate(&first.text, 50),
                lvl = lowest
            )),
        );
    }

    for pair in levels.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if to - from <= 1 {
            continue;
        }

        let example = headings
            .iter()
            .skip_while(|h| h.level != from)
            .find(|h| h.level == to)
            .map(|h| format!("<h{to}>{}</h{to}>", truncate(&h.text, 40)))
            .unwrap_or_else(|| format!("Missing <h{}> between H{} and H{}", from + 1, from, to));

        issues.push(
            Issue::warning(format!("Skipped heading level: H{} to H{}", from, to), page_url)
                .with_selector(format!("h{}", to))
                .with_value(example),
        );
    }

    issues
}
