pub mod audit;
pub mod batch;
pub mod checks;
pub mod error;
pub mod model;
pub mod report;
pub mod runner;
pub mod validate;

pub use audit::Auditor;
pub use batch::{BatchOrchestrator, BatchOutcome};
pub use error::AuditError;
pub use model::{AuditResult, Category, Issue, PageFailure, PageIssues, PageOutcome, PageResult, Severity};
pub use runner::{LocalRunner, RetryPolicy, RunHandle, TaskRunner};
pub use validate::{AuditRequest, ValidationError, validate_url};
