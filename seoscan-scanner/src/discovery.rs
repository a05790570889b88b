use crate::config::DiscoveryConfig;
use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use quick_xml::Reader;
use quick_xml::events::Event as XmlEvent;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// `<sitemapindex>`: locations of child sitemaps, in document order.
    Index(Vec<String>),
    /// `<urlset>`: page locations, in document order.
    UrlSet(Vec<String>),
}

/// Resolves the set of pages to audit for a root URL.
///
/// Tries `/sitemap.xml` first and falls back to a breadth-first, same-host
/// link crawl. Never returns more than `max_pages` URLs or any duplicate.
#[derive(Debug, Clone)]
pub struct Discovery {
    fetcher: Fetcher,
    config: DiscoveryConfig,
}

impl Discovery {
    pub fn new(fetcher: Fetcher, config: DiscoveryConfig) -> Self {
        Self { fetcher, config }
    }

    pub async fn discover(&self, root_url: &str, max_pages: usize) -> Vec<String> {
        info!("Discovering pages from {} (max: {})", root_url, max_pages);

        if max_pages == 0 {
            return Vec::new();
        }

        let root = match Url::parse(root_url) {
            Ok(root) => root,
            Err(e) => {
                warn!("Cannot discover pages for {}: {}", root_url, e);
                return Vec::new();
            }
        };

        let from_sitemap = self.from_sitemap(&root, max_pages).await;
        if !from_sitemap.is_empty() {
            info!("Found {} pages in sitemap", from_sitemap.len());
            return from_sitemap;
        }

        debug!("No usable sitemap for {}, falling back to link crawl", root);
        let crawled = self.crawl_links(&root, max_pages).await;
        info!("Found {} pages by crawling", crawled.len());
        crawled
    }

    /// Sitemap strategy. Any fetch or parse failure yields an empty list.
    pub async fn from_sitemap(&self, root: &Url, max_pages: usize) -> Vec<String> {
        let mut location = format!("{}/sitemap.xml", root.origin().ascii_serialization());
        let mut depth = 0;

        loop {
            let Some(sitemap) = self.fetch_sitemap(&location).await else {
                return Vec::new();
            };

            match sitemap {
                Sitemap::UrlSet(urls) => return dedupe_limit(urls, max_pages),
                Sitemap::Index(children) => {
                    if depth >= self.config.sitemap_depth {
                        debug!("Sitemap index nesting too deep at {}", location);
                        return Vec::new();
                    }

                    // Only the first child sitemap is followed
                    let Some(first) = children.into_iter().next() else {
                        return Vec::new();
                    };
                    location = match Url::parse(&location).and_then(|base| base.join(&first)) {
                        Ok(child) => child.to_string(),
                        Err(_) => return Vec::new(),
                    };
                    depth += 1;
                }
            }
        }
    }

    async fn fetch_sitemap(&self, location: &str) -> Option<Sitemap> {
        let page = match self.fetcher.fetch(location).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Sitemap fetch failed for {}: {}", location, e);
                return None;
            }
        };

        if page.status_code != 200 {
            debug!("Sitemap {} answered {}", location, page.status_code);
            return None;
        }

        match parse_sitemap(&page.html) {
            Ok(sitemap) => Some(sitemap),
            Err(e) => {
                debug!("Sitemap {} is malformed: {}", location, e);
                None
            }
        }
    }

    /// Link-crawl strategy: breadth-first over same-host HTML pages, one
    /// request at a time with `crawl_delay` between requests.
    pub async fn crawl_links(&self, root: &Url, max_pages: usize) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut found: Vec<String> = Vec::new();

        let start = canonical_url(root);
        seen.insert(start.clone());
        queue.push_back(start);

        let mut first_request = true;

        while let Some(url) = queue.pop_front() {
            if found.len() >= max_pages {
                break;
            }

            if !first_request {
                tokio::time::sleep(self.config.crawl_delay).await;
            }
            first_request = false;

            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    debug!("Crawl fetch failed for {}: {}", url, e);
                    continue;
                }
            };

            if page.status_code != 200 || !page.is_html() {
                debug!(
                    "Skipping {} (status {}, content-type {:?})",
                    url,
                    page.status_code,
                    page.content_type()
                );
                continue;
            }

            found.push(url.clone());

            let Ok(base) = Url::parse(&url) else {
                continue;
            };

            for link in extract_links(&page.html, &base) {
                if !same_origin_host(&link, root) {
                    continue;
                }
                let canonical = canonical_url(&link);
                if seen.insert(canonical.clone()) {
                    queue.push_back(canonical);
                }
            }
        }

        found
    }
}

/// Parses a sitemap or sitemap index. Element names are matched on their
/// local part so namespace prefixes are tolerated.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut loc_text = String::new();
    let mut index_entries = Vec::new();
    let mut url_entries = Vec::new();
    let mut saw_sitemap_element = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"sitemap" {
                    saw_sitemap_element = true;
                } else if name == b"loc" {
                    loc_text.clear();
                }
                stack.push(name);
            }
            Ok(XmlEvent::Text(t)) => {
                if stack.last().map(|n| n == b"loc").unwrap_or(false) {
                    let text = t
                        .unescape()
                        .map_err(|e| ScanError::ParseError(e.to_string()))?;
                    loc_text.push_str(&text);
                }
            }
            Ok(XmlEvent::CData(c)) => {
                if stack.last().map(|n| n == b"loc").unwrap_or(false) {
                    loc_text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(XmlEvent::End(_)) => {
                let closed = stack.pop();
                if closed.as_deref() == Some(b"loc".as_slice()) {
                    let loc = loc_text.trim().to_string();
                    if !loc.is_empty() {
                        match stack.last().map(Vec::as_slice) {
                            Some(b"sitemap") => index_entries.push(loc),
                            Some(b"url") => url_entries.push(loc),
                            _ => {}
                        }
                    }
                }
            }
            Ok(XmlEvent::Empty(e)) => {
                if e.local_name().as_ref() == b"sitemap" {
                    saw_sitemap_element = true;
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(ScanError::ParseError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if saw_sitemap_element {
        Ok(Sitemap::Index(index_entries))
    } else {
        Ok(Sitemap::UrlSet(url_entries))
    }
}

/// Resolves every `<a href>` against `base`, skipping fragments and
/// non-navigational schemes. Only http(s) targets are returned.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            !(href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:"))
        })
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect()
}

/// scheme + authority + path; query and fragment are dropped.
pub fn canonical_url(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    canonical.to_string()
}

pub fn same_origin_host(candidate: &Url, root: &Url) -> bool {
    candidate.host_str().is_some()
        && candidate.host_str() == root.host_str()
        && candidate.port_or_known_default() == root.port_or_known_default()
}

fn dedupe_limit(urls: Vec<String>, max_pages: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .take(max_pages)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset_in_document_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>https://example.com/</loc><priority>1.0</priority></url>
                <url><loc> https://example.com/about </loc></url>
                <url><loc>https://example.com/blog?page=1&amp;tag=x</loc></url>
            </urlset>"#;

        assert_eq!(
            parse_sitemap(xml).unwrap(),
            Sitemap::UrlSet(vec![
                "https://example.com/".to_string(),
                "https://example.com/about".to_string(),
                "https://example.com/blog?page=1&tag=x".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<sitemapindex>
                <sitemap><loc>https://example.com/sitemap-posts.xml</loc></sitemap>
                <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
            </sitemapindex>"#;

        assert_eq!(
            parse_sitemap(xml).unwrap(),
            Sitemap::Index(vec![
                "https://example.com/sitemap-posts.xml".to_string(),
                "https://example.com/sitemap-pages.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_prefixed_elements_and_cdata() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
                <sm:url><sm:loc><![CDATA[https://example.com/a]]></sm:loc></sm:url>
            </sm:urlset>"#;

        assert_eq!(
            parse_sitemap(xml).unwrap(),
            Sitemap::UrlSet(vec!["https://example.com/a".to_string()])
        );
    }

    #[test]
    fn test_parse_ignores_loc_outside_url_entries() {
        let xml = r#"<urlset>
                <url><loc>https://example.com/a</loc>
                    <image:image><image:loc>https://example.com/a.png</image:loc></image:image>
                </url>
            </urlset>"#;

        assert_eq!(
            parse_sitemap(xml).unwrap(),
            Sitemap::UrlSet(vec!["https://example.com/a".to_string()])
        );
    }

    #[test]
    fn test_parse_malformed_xml_is_error() {
        let xml = "<urlset><url><loc>https://example.com/</url></urlset>";
        assert!(parse_sitemap(xml).is_err());
    }

    #[test]
    fn test_extract_links_resolves_and_filters() {
        let base = Url::parse("https://example.com/docs/intro").unwrap();
        let html = r##"<html><body>
            <a href="setup">Setup</a>
            <a href="/about#team">About</a>
            <a href="#top">Top</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="tel:+100">Call</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="https://other.org/">Other</a>
            <a>No href</a>
        </body></html>"##;

        let links: Vec<String> = extract_links(html, &base)
            .into_iter()
            .map(|u| u.to_string())
            .collect();

        assert_eq!(
            links,
            vec![
                "https://example.com/docs/setup",
                "https://example.com/about#team",
                "https://other.org/",
            ]
        );
    }

    #[test]
    fn test_canonical_url_strips_query_and_fragment() {
        let url = Url::parse("https://example.com/path/page?x=1&y=2#frag").unwrap();
        assert_eq!(canonical_url(&url), "https://example.com/path/page");

        let root = Url::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(canonical_url(&root), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_same_origin_host_compares_host_and_port() {
        let root = Url::parse("https://example.com/").unwrap();

        assert!(same_origin_host(&Url::parse("https://example.com/a").unwrap(), &root));
        assert!(same_origin_host(&Url::parse("https://example.com:443/a").unwrap(), &root));
        assert!(!same_origin_host(&Url::parse("https://example.com:8443/a").unwrap(), &root));
        assert!(!same_origin_host(&Url::parse("https://blog.example.com/").unwrap(), &root));
    }

    #[test]
    fn test_dedupe_limit_keeps_first_occurrence() {
        let urls = vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/c".to_string(),
        ];

        assert_eq!(
            dedupe_limit(urls.clone(), 10),
            vec!["https://example.com/a", "https://example.com/b", "https://example.com/c"]
        );
        assert_eq!(dedupe_limit(urls, 2).len(), 2);
    }
}
