use std::fmt;

use crate::{DiscoveryBook, QueryMetric};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub api_version: String,
    pub entries: usize,
    pub queries: u64,
}

impl fmt::Display for VersionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} results: {} entries found in {} queries",
            self.api_version, self.entries, self.queries
        )
    }
}

/// Read-only summary computed once at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestReport {
    pub versions: Vec<VersionReport>,
    pub total_entries: usize,
    pub total_queries: u64,
    /// The run stopped early; counts cover what was harvested until then.
    pub cancelled: bool,
}

impl HarvestReport {
    pub fn from_versions(versions: Vec<VersionReport>, cancelled: bool) -> Self {
        let total_entries = versions.iter().map(|v| v.entries).sum();
        let total_queries = versions.iter().map(|v| v.queries).sum();
        Self {
            versions,
            total_entries,
            total_queries,
            cancelled,
        }
    }

    /// Builds the report from the book and a metric lookup per version.
    pub fn collect<'a, F>(book: &DiscoveryBook, mut metric_for: F, cancelled: bool) -> Self
    where
        F: FnMut(&str) -> Option<&'a QueryMetric>,
    {
        let versions = book
            .iter()
            .map(|(api_version, set)| VersionReport {
                api_version: api_version.to_string(),
                entries: set.len(),
                queries: metric_for(api_version).map_or(0, QueryMetric::get),
            })
            .collect();
        Self::from_versions(versions, cancelled)
    }

    pub fn version(&self, api_version: &str) -> Option<&VersionReport> {
        self.versions.iter().find(|v| v.api_version == api_version)
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.cancelled {
            "Collection cancelled"
        } else {
            "Collection complete"
        };
        write!(
            f,
            "{label}: {} total entries from {} queries",
            self.total_entries, self.total_queries
        )
    }
}
