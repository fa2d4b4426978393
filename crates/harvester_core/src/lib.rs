//! Harvester core: pure domain types for autocomplete namespace discovery.
mod config;
mod discovery;
mod frame;
mod metric;
mod render;
mod report;

pub use config::{ConfigError, HarvestConfig, DEFAULT_ENDPOINT, DEFAULT_OUTPUT_FILENAME};
pub use discovery::{DiscoveryBook, DiscoverySet};
pub use frame::{seed_prefixes, TraversalFrame};
pub use metric::QueryMetric;
pub use render::render_discoveries;
pub use report::{HarvestReport, VersionReport};
