use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use harvester_core::QueryMetric;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::AutocompleteClient;
use crate::pacing::{backoff_delay, check_cancelled, pause, retry_jitter};
use crate::{FailureKind, QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_pause: Duration,
    /// Retries after the first attempt.
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize)]
struct AutocompleteBody {
    #[serde(default)]
    results: Option<Vec<String>>,
}

/// Performs autocomplete lookups for one API version.
///
/// Owns the version's [`QueryMetric`] and retries only on HTTP 429. Each version gets
/// its own executor, so backoff on one version never stalls another.
pub struct QueryExecutor {
    client: Arc<dyn AutocompleteClient>,
    api_version: Arc<str>,
    target: Url,
    policy: RetryPolicy,
    metric: Arc<QueryMetric>,
    cancel: CancellationToken,
}

impl QueryExecutor {
    pub fn new(
        client: Arc<dyn AutocompleteClient>,
        api_version: Arc<str>,
        target: Url,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            api_version,
            target,
            policy,
            metric: Arc::new(QueryMetric::new()),
            cancel,
        }
    }

    pub fn api_version(&self) -> &Arc<str> {
        &self.api_version
    }

    pub fn metric(&self) -> &Arc<QueryMetric> {
        &self.metric
    }

    /// Looks up suggestions for `prefix`, retrying rate-limited attempts.
    ///
    /// At most `max_attempts + 1` requests are issued, each one counted.
    pub async fn execute(&self, prefix: &str) -> Result<Vec<String>, QueryError> {
        let url = self.request_url(prefix);

        for attempt in 0..=self.policy.max_attempts {
            check_cancelled(&self.cancel)?;
            self.metric.record_attempt();

            let reply = self.client.get(&url).await?;
            if reply.is_rate_limited() {
                if attempt == self.policy.max_attempts {
                    break;
                }
                let delay = backoff_delay(self.policy.base_pause, attempt, retry_jitter());
                engine_warn!(
                    "Rate limited on {}. Waiting {:.2}s",
                    self.api_version,
                    delay.as_secs_f64()
                );
                pause(&self.cancel, delay).await?;
                continue;
            }
            if !reply.is_success() {
                return Err(QueryError::new(
                    FailureKind::HttpStatus(reply.status),
                    format!("GET {url} returned {}", reply.status),
                ));
            }

            let suggestions = parse_suggestions(&reply.body)?;
            engine_debug!(
                "{} {:?}: {} suggestions",
                self.api_version,
                prefix,
                suggestions.len()
            );
            return Ok(suggestions);
        }

        let attempts = self.policy.max_attempts.saturating_add(1);
        Err(QueryError::new(
            FailureKind::RetriesExhausted { attempts },
            format!("maximum retries exceeded for {prefix:?} on {}", self.api_version),
        ))
    }

    fn request_url(&self, prefix: &str) -> Url {
        let mut url = self.target.clone();
        url.query_pairs_mut().clear().append_pair("query", prefix);
        url
    }
}

fn parse_suggestions(body: &[u8]) -> Result<Vec<String>, QueryError> {
    let parsed: AutocompleteBody = serde_json::from_slice(body)
        .map_err(|err| QueryError::new(FailureKind::MalformedBody, err.to_string()))?;
    Ok(parsed.results.unwrap_or_default())
}
