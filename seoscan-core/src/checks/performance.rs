use super::{summarize_examples, truncate};
use crate::model::Issue;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

const MAX_PAGE_KB: f64 = 500.0;
const SLOW_LOAD_MS: u64 = 3000;
const MODERATE_LOAD_MS: u64 = 1500;
const MAX_SCRIPTS: usize = 15;
const MAX_STYLESHEETS: usize = 5;
const COMPRESSION_MIN_KB: f64 = 10.0;

/// Page weight, latency, resource count and compression.
pub fn check_performance(
    html: &str,
    page_url: &str,
    load_time_ms: u64,
    content_length: u64,
    headers: &BTreeMap<String, String>,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    let size_kb = content_length as f64 / 1024.0;

    if size_kb > MAX_PAGE_KB {
        issues.push(
            Issue::warning(
                format!("Large page size ({:.1} KB, recommended < 500 KB)", size_kb),
                page_url,
            )
            .with_value(format!(
                "HTML response body: {:.1} KB (consider code splitting or lazy loading)",
                size_kb
            )),
        );
    }

    if load_time_ms > SLOW_LOAD_MS {
        issues.push(
            Issue::error(
                format!("Slow load time ({}ms, recommended < 3000ms)", load_time_ms),
                page_url,
            )
            .with_value(format!("Time to first byte + download: {}ms", load_time_ms)),
        );
    } else if load_time_ms > MODERATE_LOAD_MS {
        issues.push(
            Issue::warning(
                format!("Moderate load time ({}ms, recommended < 1500ms)", load_time_ms),
                page_url,
            )
            .with_value(format!("Time to first byte + download: {}ms", load_time_ms)),
        );
    }

    let (scripts, stylesheets) = external_resources(html);

    if scripts.len() > MAX_SCRIPTS {
        issues.push(
            Issue::warning(
                format!("Many external scripts ({}, consider bundling)", scripts.len()),
                page_url,
            )
            .with_selector("script[src]")
            .with_value(summarize_examples(&scripts, 5)),
        );
    }

    if stylesheets.len() > MAX_STYLESHEETS {
        issues.push(
            Issue::warning(
                format!(
                    "Many external stylesheets ({}, consider bundling)",
                    stylesheets.len()
                ),
                page_url,
            )
            .with_selector(r#"link[rel="stylesheet"]"#)
            .with_value(summarize_examples(&stylesheets, 3)),
        );
    }

    let encoding = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-encoding"))
        .map(|(_, value)| value.to_ascii_lowercase())
        .unwrap_or_default();

    if !encoding.contains("gzip") && !encoding.contains("br") && size_kb > COMPRESSION_MIN_KB {
        issues.push(
            Issue::info("No compression detected (gzip/brotli recommended)", page_url).with_value(
                format!(
                    "Content-Encoding header is missing. Enable compression on your server to reduce {:.1} KB payload.",
                    size_kb
                ),
            ),
        );
    }

    issues
}

fn external_resources(html: &str) -> (Vec<String>, Vec<String>) {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script[src]").unwrap();
    let stylesheet_selector = Selector::parse(r#"link[rel~="stylesheet"]"#).unwrap();

    let scripts = document
        .select(&script_selector)
        .map(|s| truncate(s.value().attr("src").unwrap_or(""), 50))
        .collect();
    let stylesheets = document
        .select(&stylesheet_selector)
        .map(|s| truncate(s.value().attr("href").unwrap_or(""), 50))
        .collect();

    (scripts, stylesheets)
}
