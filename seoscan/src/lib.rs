pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{AuditOptions, deliver_report, expand_path, init_logging, run_audit};
