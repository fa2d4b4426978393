mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_warn, LogDestination, LogSettings};
use harvester_engine::{
    CancellationToken, ClientSettings, HarvestCoordinator, ReqwestClient, ResultStore,
};

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = engine_logging::init(LogSettings {
        level: cli.log_level,
        destination: match &cli.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        },
    });

    let config = cli.harvest_config()?;
    let client = ReqwestClient::new(ClientSettings {
        connect_timeout: config.connect_timeout(),
        request_timeout: config.request_timeout(),
        ..ClientSettings::default()
    })
    .context("failed to build http client")?;
    let store = ResultStore::new(config.output_path.clone());

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let coordinator =
        HarvestCoordinator::new(config, Arc::new(client))?.with_cancellation(cancel);
    let harvest = coordinator
        .run_and_save(&store)
        .await
        .context("harvest finished but results could not be saved")?;

    if harvest.report.cancelled {
        engine_warn!("Harvest interrupted; partial results were saved");
    }
    logging.flush();
    Ok(())
}

/// Cancels the harvest on the first Ctrl-C; already discovered entries are kept.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine_warn!("Interrupt received, stopping harvest");
            cancel.cancel();
        }
    });
}
