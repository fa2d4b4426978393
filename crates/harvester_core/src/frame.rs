use std::sync::Arc;

/// The 26 single-letter seeds, in order.
pub fn seed_prefixes() -> impl Iterator<Item = String> {
    ('a'..='z').map(String::from)
}

/// Transient state for one traversal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalFrame {
    pub api_version: Arc<str>,
    pub prefix: String,
    pub depth: u32,
}

impl TraversalFrame {
    pub fn seed(api_version: Arc<str>, prefix: impl Into<String>) -> Self {
        Self {
            api_version,
            prefix: prefix.into(),
            depth: 0,
        }
    }

    /// Frame for exploring a newly discovered entry one level below this one.
    pub fn child(&self, entry: impl Into<String>) -> Self {
        Self {
            api_version: Arc::clone(&self.api_version),
            prefix: entry.into(),
            depth: self.depth.saturating_add(1),
        }
    }

    pub fn is_within(&self, depth_limit: u32) -> bool {
        self.depth <= depth_limit
    }
}
