use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fetched page, alive only while its checks run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub final_url: String,
    pub html: String,
    /// Header names are lower-case; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub load_time_ms: u64,
    pub content_length: u64,
    pub status_code: u16,
}

impl PageContent {
    pub fn new(url: String) -> Self {
        Self {
            final_url: url.clone(),
            url,
            html: String::new(),
            headers: BTreeMap::new(),
            load_time_ms: 0,
            content_length: 0,
            status_code: 0,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut page = PageContent::new("https://example.com/".to_string());
        page.headers
            .insert("content-type".to_string(), "text/html; charset=utf-8".to_string());

        assert_eq!(page.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert!(page.is_html());
        assert_eq!(page.header("content-encoding"), None);
    }

    #[test]
    fn test_success_range() {
        let mut page = PageContent::new("https://example.com/".to_string());
        page.status_code = 204;
        assert!(page.is_success());
        page.status_code = 301;
        assert!(!page.is_success());
    }
}
