pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod loader;
pub mod metrics;
pub mod partition;
pub mod pattern;
pub mod results;
pub mod scanner;

pub use config::{CliOverrides, DistributionMode, SearchConfig};
pub use coordinator::search;
pub use errors::{SearchError, SearchResult};
pub use results::SearchReport;
