use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Timeout fetching {0}")]
    Timeout(String),

    #[error("URL blocked: {0}")]
    Blocked(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("DNS resolution failed for {0}")]
    Dns(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// Short label used when a failure is reported inside an issue message.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::HttpError(e) if e.is_connect() => "ConnectError",
            ScanError::HttpError(e) if e.is_redirect() => "TooManyRedirects",
            ScanError::HttpError(_) => "RequestError",
            ScanError::Timeout(_) => "Timeout",
            ScanError::Blocked(_) => "Blocked",
            ScanError::InvalidUrl(_) => "InvalidUrl",
            ScanError::Dns(_) => "DnsError",
            ScanError::ParseError(_) => "ParseError",
            ScanError::IoError(_) => "IoError",
            ScanError::Other(_) => "Error",
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScanError::HttpError(_) | ScanError::Timeout(_) | ScanError::Dns(_) | ScanError::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
