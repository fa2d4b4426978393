//! Harvester engine: autocomplete queries, prefix traversal and result persistence.
mod client;
mod coordinator;
mod executor;
mod explorer;
mod pacing;
mod store;
mod types;

pub use client::{AutocompleteClient, ClientSettings, ReqwestClient};
pub use coordinator::{Harvest, HarvestCoordinator, PersistFailure};
pub use executor::{QueryExecutor, RetryPolicy};
pub use explorer::{ExploreStats, PrefixExplorer};
pub use pacing::{backoff_delay, pacing_delay, PACING_JITTER, RETRY_JITTER};
pub use store::{PersistError, ResultStore};
pub use types::{FailureKind, HttpReply, QueryError};

pub use tokio_util::sync::CancellationToken;
