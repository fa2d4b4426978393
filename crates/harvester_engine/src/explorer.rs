use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use harvester_core::{DiscoverySet, TraversalFrame};
use tokio_util::sync::CancellationToken;

use crate::executor::QueryExecutor;
use crate::pacing::{pacing_delay, pacing_jitter, pause};
use crate::FailureKind;

/// Counters for one `explore` call, for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExploreStats {
    /// Prefixes handed to the executor.
    pub queried: usize,
    /// Entries newly inserted into the discovery set.
    pub discovered: usize,
    /// Prefixes whose lookup failed.
    pub pruned: usize,
}

enum Step {
    Visit(TraversalFrame),
    /// Suggestions of `parent` not yet examined.
    Resume {
        parent: TraversalFrame,
        remaining: std::vec::IntoIter<String>,
    },
}

/// Depth-bounded, depth-first expansion of one version's namespace.
///
/// Visits prefixes in the same order as the recursive formulation: each newly
/// discovered entry is fully expanded before its next sibling is examined, and the
/// pacing pause follows the last child of every prefix that returned suggestions.
pub struct PrefixExplorer<'a> {
    executor: &'a QueryExecutor,
    entries: Arc<DiscoverySet>,
    depth_limit: u32,
    base_pause: Duration,
    cancel: CancellationToken,
}

impl<'a> PrefixExplorer<'a> {
    pub fn new(
        executor: &'a QueryExecutor,
        entries: Arc<DiscoverySet>,
        depth_limit: u32,
        base_pause: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            executor,
            entries,
            depth_limit,
            base_pause,
            cancel,
        }
    }

    /// Explores the namespace below `seed`, starting at depth 0.
    pub async fn explore(&self, seed: &str) -> ExploreStats {
        let frame = TraversalFrame::seed(Arc::clone(self.executor.api_version()), seed);
        self.explore_from(frame).await
    }

    pub async fn explore_from(&self, frame: TraversalFrame) -> ExploreStats {
        let mut stats = ExploreStats::default();
        let mut stack = vec![Step::Visit(frame)];

        while let Some(step) = stack.pop() {
            if self.cancel.is_cancelled() {
                engine_debug!("{}: traversal cancelled", self.executor.api_version());
                break;
            }
            match step {
                Step::Visit(frame) => {
                    if !frame.is_within(self.depth_limit) {
                        continue;
                    }
                    stats.queried += 1;
                    let outcome = self.executor.execute(&frame.prefix).await;
                    match outcome {
                        Ok(suggestions) if suggestions.is_empty() => {}
                        Ok(suggestions) => stack.push(Step::Resume {
                            parent: frame,
                            remaining: suggestions.into_iter(),
                        }),
                        Err(err) if err.kind == FailureKind::Cancelled => break,
                        Err(err) => {
                            stats.pruned += 1;
                            engine_error!(
                                "Abandoned {:?} on {}: {}",
                                frame.prefix,
                                frame.api_version,
                                err
                            );
                        }
                    }
                }
                Step::Resume {
                    parent,
                    mut remaining,
                } => {
                    let next = remaining.find(|entry| self.entries.insert_if_absent(entry));
                    match next {
                        Some(entry) => {
                            stats.discovered += 1;
                            engine_info!("Found in {}: {}", parent.api_version, entry);
                            let child = parent.child(entry);
                            stack.push(Step::Resume { parent, remaining });
                            stack.push(Step::Visit(child));
                        }
                        None => {
                            let delay = pacing_delay(self.base_pause, pacing_jitter());
                            if pause(&self.cancel, delay).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        stats
    }
}
