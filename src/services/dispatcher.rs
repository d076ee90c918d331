// src/services/dispatcher.rs

//! Fanout of one message to every destination channel.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::ChannelAddress;
use crate::services::transport::Transport;

/// Outcome of one fanout.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Destinations that accepted the message
    pub delivered: Vec<String>,
    /// Destinations that failed, with the reason
    pub failed: Vec<(String, AppError)>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sends messages to destinations in order, pausing between sends.
#[derive(Clone)]
pub struct FanoutDispatcher {
    transport: Arc<dyn Transport>,
    cooldown: Duration,
}

impl FanoutDispatcher {
    pub fn new(transport: Arc<dyn Transport>, cooldown: Duration) -> Self {
        Self {
            transport,
            cooldown,
        }
    }

    /// Send `message` to every destination.
    ///
    /// A failing destination never stops the remaining ones.
    pub async fn dispatch(&self, message: &str, destinations: &[String]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (index, destination) in destinations.iter().enumerate() {
            if index > 0 && !self.cooldown.is_zero() {
                tokio::time::sleep(self.cooldown).await;
            }

            let result = match ChannelAddress::parse(destination) {
                Ok(address) => self.transport.send(&address, message).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(ack) => {
                    log::debug!(
                        "Delivered to {} (id: {})",
                        destination,
                        ack.message_id.as_deref().unwrap_or("-")
                    );
                    report.delivered.push(destination.clone());
                }
                Err(e) => {
                    log::warn!("Delivery to {} failed: {}", destination, e);
                    report.failed.push((destination.clone(), e));
                }
            }
        }

        report
    }
}
