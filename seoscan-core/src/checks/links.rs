use super::truncate;
use crate::model::Issue;
use futures::future::join_all;
use scraper::{Html, Selector};
use seoscan_scanner::Fetcher;
use std::collections::HashSet;
use url::Url;

const ANCHORS_SCANNED: usize = 30;
const MAX_LINKS_CHECKED: usize = 20;
const BROKEN_STATUSES: [u16; 5] = [404, 410, 500, 502, 504];
const SKIPPED_PREFIXES: [&str; 4] = ["#", "javascript:", "mailto:", "tel:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub href: String,
    pub text: String,
}

impl LinkTarget {
    fn element(&self) -> String {
        format!(
            r#"<a href="{}">{}</a>"#,
            truncate(&self.href, 60),
            truncate(&self.text, 40)
        )
    }

    fn selector(&self) -> String {
        if self.href.chars().count() <= 50 {
            format!(r#"a[href="{}"]"#, self.href)
        } else {
            format!(r#"a[href^="{}"]"#, self.href.chars().take(30).collect::<String>())
        }
    }
}

/// Unique absolute link targets worth probing, in document order.
pub fn collect_link_targets(html: &str, page_url: &str) -> Vec<LinkTarget> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for anchor in document.select(&selector).take(ANCHORS_SCANNED) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if SKIPPED_PREFIXES.iter().any(|p| href.starts_with(p)) {
            continue;
        }
        let Ok(absolute) = base.join(href) else {
            continue;
        };

        let url = absolute.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let text = anchor.text().map(str::trim).collect::<String>();
        targets.push(LinkTarget {
            url,
            href: href.to_string(),
            text: if text.is_empty() {
                "[no text]".to_string()
            } else {
                text
            },
        });

        if targets.len() >= MAX_LINKS_CHECKED {
            break;
        }
    }

    targets
}

/// Probes the page's links concurrently and reports high-confidence breakage.
pub async fn check_links(fetcher: &Fetcher, html: &str, page_url: &str) -> Vec<Issue> {
    // The parsed document is dropped before the first await
    let targets = collect_link_targets(html, page_url);
    let probes = join_all(targets.iter().map(|target| fetcher.probe(&target.url))).await;

    targets
        .iter()
        .zip(probes)
        .filter_map(|(target, probe)| match probe {
            Ok(status) if BROKEN_STATUSES.contains(&status) => Some(
                Issue::error(format!("Broken link (HTTP {})", status), page_url)
                    .with_link(&target.url)
                    .with_value(format!("{} → {}", target.element(), target.url))
                    .with_selector(target.selector()),
            ),
            Ok(_) => None,
            Err(e) => Some(
                Issue::error(format!("Link unreachable: {}", e.kind()), page_url)
                    .with_link(&target.url)
                    .with_value(target.element())
                    .with_selector(target.selector()),
            ),
        })
        .collect()
}
