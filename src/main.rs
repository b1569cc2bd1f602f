mod app;
mod components;
mod config;
mod data;
mod events;
mod logging;
mod theme;
mod utils;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::App;
use crate::config::Config;
use crate::data::calls::Contracts;
use crate::data::chains;
use crate::data::provider::{ChainClient, EthProvider};
use crate::data::{DataService, ServiceSettings};
use crate::events::AppEvent;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(logging::default_log_path);
    logging::setup_tracing(&log_path)?;

    let Some(chain) = chains::get_chain_config(&config.chain) else {
        bail!(
            "Unknown chain '{}', expected one of: {}",
            config.chain,
            chains::supported_chains().join(", ")
        );
    };
    let rpc_url = config
        .rpc_url
        .clone()
        .unwrap_or_else(|| chain.rpc_url.clone());

    // Connect to the node
    eprintln!("Connecting to {rpc_url}...");
    let provider = EthProvider::connect(
        &rpc_url,
        config.private_key.as_deref(),
        config.account,
        config.receipt_poll(),
    )
    .await?;
    let chain_id = provider.chain_id();
    if chain_id != chain.chain_id {
        warn!(preset = %chain.name, expected = chain.chain_id, chain_id, "rpc reports a different chain id");
    }
    info!(
        chain = %chain.name,
        chain_id,
        token = %config.token,
        swap = ?config.swap,
        account = ?provider.account(),
        log = %log_path.display(),
        "token-desk starting"
    );
    eprintln!("Connected to chain {chain_id}, logging to {}", log_path.display());

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _ = event_tx.send(AppEvent::Connected(chain_id));

    let client: Arc<dyn ChainClient> = Arc::new(provider);
    let data_service = Arc::new(DataService::new(
        client,
        Contracts::new(config.token, config.swap),
        ServiceSettings {
            confirm_timeout: config.confirm_timeout(),
            history_window: config.history_window,
        },
        event_tx,
    ));

    let mut app = App::with_service(data_service, event_rx, config.tick_rate_ms);
    app.set_chain_info(chain);

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
