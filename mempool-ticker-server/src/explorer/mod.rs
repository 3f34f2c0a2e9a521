//! Mempool explorer client module: endpoint fallback and typed fetchers

mod client;
mod mock_client;
pub mod models;
mod resolver;
mod traits;

pub use client::ExplorerClient;
pub use mock_client::MockExplorerClient;
pub use resolver::{AttemptError, EndpointFailure, EndpointResolver, FetchError};
pub use traits::{ExplorerApi, ExplorerBackend};
