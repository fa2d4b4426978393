use std::sync::Arc;

use dashmap::DashSet;

/// Entries confirmed reachable for one API version.
///
/// Grows monotonically. All mutation goes through [`DiscoverySet::insert_if_absent`],
/// which is atomic: of two callers racing on the same entry exactly one sees `true`.
#[derive(Debug, Default)]
pub struct DiscoverySet {
    entries: DashSet<String>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` and reports whether it was not already present.
    pub fn insert_if_absent(&self, entry: &str) -> bool {
        if self.entries.contains(entry) {
            return false;
        }
        // The shard lock taken by `insert` decides races on the same entry.
        self.entries.insert(entry.to_owned())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the entries in ascending lexicographic order.
    pub fn sorted_entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        entries.sort_unstable();
        entries
    }
}

/// One [`DiscoverySet`] per API version, kept in configured version order.
///
/// Versions never share a set.
#[derive(Debug, Default, Clone)]
pub struct DiscoveryBook {
    sets: Vec<(String, Arc<DiscoverySet>)>,
}

impl DiscoveryBook {
    pub fn new<I, S>(api_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sets: Vec<(String, Arc<DiscoverySet>)> = Vec::new();
        for version in api_versions {
            let version = version.into();
            if sets.iter().any(|(existing, _)| *existing == version) {
                continue;
            }
            sets.push((version, Arc::new(DiscoverySet::new())));
        }
        Self { sets }
    }

    pub fn set(&self, api_version: &str) -> Option<Arc<DiscoverySet>> {
        self.sets
            .iter()
            .find(|(version, _)| version == api_version)
            .map(|(_, set)| Arc::clone(set))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiscoverySet)> {
        self.sets
            .iter()
            .map(|(version, set)| (version.as_str(), set.as_ref()))
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|(version, _)| version.as_str())
    }

    pub fn total_entries(&self) -> usize {
        self.sets.iter().map(|(_, set)| set.len()).sum()
    }
}
