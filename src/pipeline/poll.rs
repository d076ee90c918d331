// src/pipeline/poll.rs

//! Poll scheduler.
//!
//! One cycle fetches every source, filters records through the seen-set,
//! formats survivors and fans them out. Cycles never overlap: the next tick
//! is only awaited once the previous cycle has finished.
//!
//! ## First-run sync
//!
//! Each source starts unsynced (unless a persistent seen-set already holds
//! entries). The first successful response from an unsynced source only
//! seeds the seen-set, so history already visible upstream at startup is
//! not replayed to the channels.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::{Config, OtpRecord, RecordIdentity};
use crate::services::{FanoutDispatcher, MessageFormatter, Source, extractor};
use crate::storage::SeenStore;

/// How a cycle treats new identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Emit new records, syncing sources that have not been synced yet
    Normal,
    /// Seed the seen-set from every source, never emit
    SyncOnly,
}

/// Counters for one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    pub sources_total: usize,
    pub sources_failed: usize,
    pub sources_synced: usize,
    pub records_parsed: usize,
    pub records_seen: usize,
    pub records_new: usize,
    pub messages_dispatched: usize,
    pub delivery_failures: usize,
    pub store_failures: usize,
}

impl CycleStats {
    /// One-line summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "sources {}/{} ok ({} synced), records {} parsed / {} seen / {} new, \
             dispatched {}, delivery failures {}, store failures {}",
            self.sources_total - self.sources_failed,
            self.sources_total,
            self.sources_synced,
            self.records_parsed,
            self.records_seen,
            self.records_new,
            self.messages_dispatched,
            self.delivery_failures,
            self.store_failures
        )
    }
}

/// Scheduler settings taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_concurrent: usize,
    pub first_run_sync: bool,
    pub scope_identity_by_source: bool,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: Duration::from_secs(config.poll.interval_secs),
            max_concurrent: config.poll.max_concurrent,
            first_run_sync: config.poll.first_run_sync,
            scope_identity_by_source: config.poll.scope_identity_by_source,
        }
    }
}

/// Drives fetch → dedup → format → fanout on a fixed interval.
pub struct Poller {
    sources: Vec<Arc<dyn Source>>,
    store: Arc<dyn SeenStore>,
    formatter: MessageFormatter,
    dispatcher: FanoutDispatcher,
    destinations: Vec<String>,
    settings: PollSettings,
    /// Per-source sync state, `None` until the first cycle inspects the store
    synced: Option<Vec<bool>>,
}

impl Poller {
    pub fn new(
        sources: Vec<Arc<dyn Source>>,
        store: Arc<dyn SeenStore>,
        formatter: MessageFormatter,
        dispatcher: FanoutDispatcher,
        destinations: Vec<String>,
        settings: PollSettings,
    ) -> Self {
        Self {
            sources,
            store,
            formatter,
            dispatcher,
            destinations,
            settings,
            synced: None,
        }
    }

    /// Poll forever until `shutdown` resolves. An in-flight cycle completes first.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        log::info!(
            "Polling {} sources every {}s",
            self.sources.len(),
            self.settings.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping poll loop");
                    break;
                }
                _ = ticker.tick() => {
                    let stats = self.run_cycle(CycleMode::Normal).await;
                    if stats.records_new > 0 || stats.sources_failed > 0 {
                        log::info!("Cycle: {}", stats.summary());
                    } else {
                        log::debug!("Cycle: {}", stats.summary());
                    }
                }
            }
        }
    }

    /// Run exactly one cycle.
    pub async fn run_cycle(&mut self, mode: CycleMode) -> CycleStats {
        self.init_sync_state().await;

        let mut stats = CycleStats {
            sources_total: self.sources.len(),
            ..CycleStats::default()
        };

        // Fetch concurrently, process in configured order.
        let bodies: Vec<Result<String>> = stream::iter(self.sources.iter())
            .map(|source| source.fetch())
            .buffered(self.settings.max_concurrent.max(1))
            .collect()
            .await;

        for (index, body) in bodies.into_iter().enumerate() {
            let label = self.sources[index].label().to_string();

            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    stats.sources_failed += 1;
                    log::warn!("{}", e);
                    continue;
                }
            };

            let records = match extractor::try_extract(&label, &body) {
                Ok(records) => records,
                Err(e) => {
                    stats.sources_failed += 1;
                    log::warn!("{}", e);
                    continue;
                }
            };
            stats.records_parsed += records.len();

            let synced = self.is_synced(index);
            if mode == CycleMode::SyncOnly || !synced {
                if self.seed(&label, &records, &mut stats).await {
                    self.set_synced(index);
                    stats.sources_synced += 1;
                    log::info!(
                        "{}: synced {} visible records without sending",
                        label,
                        records.len()
                    );
                }
                continue;
            }

            for record in &records {
                self.process_record(&label, record, &mut stats).await;
            }
        }

        stats
    }

    /// Decide the initial sync state once per process.
    async fn init_sync_state(&mut self) {
        if self.synced.is_some() {
            return;
        }

        let already_synced = if !self.settings.first_run_sync {
            true
        } else if self.store.is_persistent() {
            match self.store.len().await {
                Ok(count) if count > 0 => {
                    log::info!("Seen-set holds {} identities, skipping first-run sync", count);
                    true
                }
                Ok(_) => false,
                Err(e) => {
                    log::warn!("Could not size seen-set ({}), running first-run sync", e);
                    false
                }
            }
        } else {
            false
        };

        self.synced = Some(vec![already_synced; self.sources.len()]);
    }

    fn is_synced(&self, index: usize) -> bool {
        self.synced
            .as_ref()
            .and_then(|s| s.get(index).copied())
            .unwrap_or(false)
    }

    fn set_synced(&mut self, index: usize) {
        if let Some(slot) = self.synced.as_mut().and_then(|s| s.get_mut(index)) {
            *slot = true;
        }
    }

    fn identity_for(&self, label: &str, record: &OtpRecord) -> RecordIdentity {
        if self.settings.scope_identity_by_source {
            record.scoped_identity(label)
        } else {
            record.identity()
        }
    }

    /// Mark every record seen without emitting, in one batch. True on success.
    async fn seed(&self, label: &str, records: &[OtpRecord], stats: &mut CycleStats) -> bool {
        let identities: Vec<RecordIdentity> = records
            .iter()
            .map(|record| self.identity_for(label, record))
            .collect();

        match self.store.mark_seen_all(&identities).await {
            Ok(()) => true,
            Err(e) => {
                stats.store_failures += 1;
                log::error!("{}: failed to seed {} records: {}", label, identities.len(), e);
                false
            }
        }
    }

    async fn process_record(&self, label: &str, record: &OtpRecord, stats: &mut CycleStats) {
        let identity = self.identity_for(label, record);

        match self.store.is_seen(&identity).await {
            Ok(true) => {
                stats.records_seen += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Skip rather than risk a duplicate.
                stats.store_failures += 1;
                log::error!("{}: seen-set lookup failed for {}: {}", label, identity, e);
                return;
            }
        }

        stats.records_new += 1;
        log::info!(
            "{}: new {} OTP for {}",
            label,
            record.service,
            crate::services::formatter::mask_identifier(&record.account)
        );

        let message = self.formatter.format(record, label);
        let report = self.dispatcher.dispatch(&message, &self.destinations).await;
        stats.messages_dispatched += 1;
        stats.delivery_failures += report.failed.len();

        if let Err(e) = self.store.mark_seen(&identity).await {
            stats.store_failures += 1;
            log::error!("{}: failed to mark {} seen: {}", label, identity, e);
        }
    }
}
