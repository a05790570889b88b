pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod guard;
pub mod result;

pub use config::{DiscoveryConfig, FetchConfig};
pub use discovery::Discovery;
pub use error::ScanError;
pub use fetcher::Fetcher;
pub use result::PageContent;
