use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info};
use futures_util::future::join_all;
use harvester_core::{
    seed_prefixes, ConfigError, DiscoveryBook, HarvestConfig, HarvestReport, VersionReport,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::AutocompleteClient;
use crate::executor::{QueryExecutor, RetryPolicy};
use crate::explorer::PrefixExplorer;
use crate::store::{PersistError, ResultStore};

/// Everything a run produced: the per-version entry sets and their summary.
#[derive(Debug)]
pub struct Harvest {
    pub discoveries: DiscoveryBook,
    pub report: HarvestReport,
}

/// Persisting failed; the harvest is handed back so the caller can retry elsewhere.
#[derive(Debug, Error)]
#[error("failed to persist harvest: {source}")]
pub struct PersistFailure {
    pub harvest: Harvest,
    #[source]
    pub source: PersistError,
}

/// Drives the explorer over every configured version and every seed letter.
pub struct HarvestCoordinator {
    config: HarvestConfig,
    client: Arc<dyn AutocompleteClient>,
    targets: Vec<(Arc<str>, Url)>,
    cancel: CancellationToken,
}

impl HarvestCoordinator {
    pub fn new(
        config: HarvestConfig,
        client: Arc<dyn AutocompleteClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let targets = config
            .api_versions
            .iter()
            .map(|version| {
                config
                    .autocomplete_url(version)
                    .map(|url| (Arc::<str>::from(version.as_str()), url))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            config,
            client,
            targets,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl-C.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvests every version. Per-request failures only prune branches, so this
    /// always yields a (possibly partial) harvest.
    pub async fn run(&self) -> Harvest {
        engine_info!("Beginning data collection process...");

        let discoveries = DiscoveryBook::new(self.config.api_versions.iter().cloned());
        let policy = RetryPolicy {
            base_pause: self.config.base_pause(),
            max_attempts: self.config.max_attempts,
        };
        let executors: Vec<QueryExecutor> = self
            .targets
            .iter()
            .map(|(version, url)| {
                QueryExecutor::new(
                    Arc::clone(&self.client),
                    Arc::clone(version),
                    url.clone(),
                    policy,
                    self.cancel.clone(),
                )
            })
            .collect();

        if self.config.concurrent_versions {
            join_all(
                executors
                    .iter()
                    .map(|executor| self.harvest_version(executor, &discoveries)),
            )
            .await;
        } else {
            for executor in &executors {
                self.harvest_version(executor, &discoveries).await;
            }
        }

        let cancelled = self.cancel.is_cancelled();
        let report = HarvestReport::collect(
            &discoveries,
            |version| {
                executors
                    .iter()
                    .find(|executor| &**executor.api_version() == version)
                    .map(|executor| executor.metric().as_ref())
            },
            cancelled,
        );
        engine_info!("{}", report);

        Harvest {
            discoveries,
            report,
        }
    }

    /// Runs the harvest and writes it through `store`.
    pub async fn run_and_save(&self, store: &ResultStore) -> Result<Harvest, PersistFailure> {
        let harvest = self.run().await;
        match store.save(&harvest.discoveries) {
            Ok(path) => {
                engine_info!("Results saved to {}", path.display());
                Ok(harvest)
            }
            Err(source) => {
                engine_error!("Failed to save results to {}: {}", store.path().display(), source);
                Err(PersistFailure { harvest, source })
            }
        }
    }

    async fn harvest_version(&self, executor: &QueryExecutor, discoveries: &DiscoveryBook) {
        let version = executor.api_version();
        let Some(entries) = discoveries.set(version) else {
            return;
        };
        engine_info!("Processing API version: {}", version);

        let explorer = PrefixExplorer::new(
            executor,
            Arc::clone(&entries),
            self.config.depth_limit,
            self.config.base_pause(),
            self.cancel.clone(),
        );
        for seed in seed_prefixes() {
            if self.cancel.is_cancelled() {
                break;
            }
            let stats = explorer.explore(&seed).await;
            engine_debug!(
                "{} seed {:?}: {} queried, {} new, {} pruned",
                version,
                seed,
                stats.queried,
                stats.discovered,
                stats.pruned
            );
        }

        let summary = VersionReport {
            api_version: version.to_string(),
            entries: entries.len(),
            queries: executor.metric().get(),
        };
        engine_info!("{}", summary);
    }
}
