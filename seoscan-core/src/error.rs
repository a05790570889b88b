use seoscan_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Root request invalid: {0}")]
    InvalidRoot(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Task {task} failed: {message}")]
    Task { task: &'static str, message: String },
}

impl AuditError {
    /// Transient failures worth another attempt under a retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            AuditError::Scan(e) => e.is_retryable(),
            AuditError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            AuditError::InvalidRoot(_) | AuditError::Task { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
