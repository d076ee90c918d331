//! Pipeline entry points for relay operations.
//!
//! - `run_relay`: Poll all sources until shutdown
//! - `run_once`: Run a single cycle
//! - `run_sync`: Seed the seen-set without sending anything

pub mod poll;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::models::Config;
use crate::services::{FanoutDispatcher, HttpSource, MessageFormatter, Source, create_transport};
use crate::storage::{self, SeenStore};
use crate::utils::http;

pub use poll::{CycleMode, CycleStats, PollSettings, Poller};

/// Wire every component from configuration.
pub async fn build_poller(config: &Config, storage_dir: &Path) -> Result<Poller> {
    let client = http::create_client(&config.poll)?;

    let sources: Vec<Arc<dyn Source>> = HttpSource::from_config(config, &client)
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn Source>)
        .collect();

    let store: Arc<dyn SeenStore> = storage::open_store(&config.storage, storage_dir).await?;
    let transport = create_transport(&config.transport, &client)?;
    let dispatcher = FanoutDispatcher::new(
        transport,
        Duration::from_millis(config.dispatch.cooldown_ms),
    );
    let formatter = MessageFormatter::new(&config.format, &config.bot_name);

    Ok(Poller::new(
        sources,
        store,
        formatter,
        dispatcher,
        config.destinations.clone(),
        PollSettings::from_config(config),
    ))
}

/// Poll until `shutdown` resolves.
pub async fn run_relay(
    config: &Config,
    storage_dir: &Path,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut poller = build_poller(config, storage_dir).await?;
    log::info!(
        "Relaying to {} destinations for owner {}",
        config.destinations.len(),
        config.owner
    );
    poller.run_until(shutdown).await;
    Ok(())
}

/// Run one normal cycle.
pub async fn run_once(config: &Config, storage_dir: &Path) -> Result<CycleStats> {
    let mut poller = build_poller(config, storage_dir).await?;
    Ok(poller.run_cycle(CycleMode::Normal).await)
}

/// Seed the seen-set from every source without sending.
pub async fn run_sync(config: &Config, storage_dir: &Path) -> Result<CycleStats> {
    let mut poller = build_poller(config, storage_dir).await?;
    Ok(poller.run_cycle(CycleMode::SyncOnly).await)
}
