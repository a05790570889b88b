// Audit request validation

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_PAGES_LIMIT: usize = 100;
pub const MAX_CONCURRENCY_LIMIT: usize = 50;
pub const DEFAULT_MAX_PAGES: usize = 25;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is required")]
    Empty,

    #[error("URL is too long (max 2048 characters)")]
    TooLong,

    #[error("URLs with credentials are not allowed")]
    Credentials,

    #[error("Invalid URL scheme. Only HTTP and HTTPS are allowed.")]
    Scheme,

    #[error("Invalid URL format")]
    Format,

    #[error("{field} must be between 1 and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        max: usize,
        value: usize,
    },
}

/// Trims and normalizes a user supplied URL, defaulting to https.
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if trimmed.chars().count() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong);
    }

    let has_protocol = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    if trimmed.contains("://") && !has_protocol {
        return Err(ValidationError::Scheme);
    }

    let normalized = if has_protocol {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&normalized).map_err(|_| ValidationError::Format)?;

    if !url.username().is_empty() || url.password().is_some() {
        return Err(ValidationError::Credentials);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ValidationError::Format),
    }
}

/// One audit submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub url: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl AuditRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: DEFAULT_MAX_PAGES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Checks every field and returns the request with its URL normalized.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let url = validate_url(&self.url)?;
        check_range("max_pages", self.max_pages, MAX_PAGES_LIMIT)?;
        check_range("max_concurrency", self.max_concurrency, MAX_CONCURRENCY_LIMIT)?;

        Ok(Self {
            url: url.to_string(),
            ..self
        })
    }
}

fn check_range(field: &'static str, value: usize, max: usize) -> Result<(), ValidationError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, max, value })
    }
}
