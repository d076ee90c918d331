// src/services/transport.rs

//! Outbound message transports.
//!
//! The messaging session itself lives outside this crate. A [`Transport`]
//! only has to accept "send this text to this address" and report the
//! outcome.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ChannelAddress, TransportConfig, TransportKind};

/// Acknowledgement of an accepted delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAck {
    /// Transport-assigned message id, when the transport reports one
    pub message_id: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

impl DeliveryAck {
    pub fn now(message_id: Option<String>) -> Self {
        Self {
            message_id,
            accepted_at: Utc::now(),
        }
    }
}

/// Delivery seam to the messaging session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, to: &ChannelAddress, text: &str) -> Result<DeliveryAck>;
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, to: &ChannelAddress, text: &str) -> Result<DeliveryAck> {
        log::info!("[dry-run] -> {}\n{}", to, text);
        Ok(DeliveryAck::now(None))
    }
}

/// Request body posted to the bridge.
#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    to: String,
    text: &'a str,
}

/// Response body returned by the bridge.
#[derive(Debug, Deserialize, Default)]
struct BridgeReply {
    #[serde(default)]
    id: Option<String>,
}

/// Posts messages as JSON to an HTTP bridge that owns the messaging session.
pub struct WebhookTransport {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl WebhookTransport {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            client,
        }
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send(&self, to: &ChannelAddress, text: &str) -> Result<DeliveryAck> {
        let body = OutgoingMessage {
            to: to.to_string(),
            text,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::delivery(to.to_string(), e))?;

        // Bridges are not required to answer with JSON.
        let reply: BridgeReply = response.json().await.unwrap_or_default();
        Ok(DeliveryAck::now(reply.id))
    }
}

/// Build the configured transport.
pub fn create_transport(config: &TransportConfig, client: &Client) -> Result<Arc<dyn Transport>> {
    match config.kind {
        TransportKind::Log => Ok(Arc::new(LogTransport)),
        TransportKind::Webhook => {
            let endpoint = config
                .endpoint
                .clone()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| AppError::config("transport.endpoint is not set"))?;
            log::info!("Delivering through webhook bridge at {}", endpoint);
            Ok(Arc::new(WebhookTransport::new(
                endpoint,
                config.token.clone(),
                client.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_transport_acks() {
        let to = ChannelAddress::parse("1@newsletter").unwrap();
        let ack = LogTransport.send(&to, "hello").await.unwrap();
        assert!(ack.message_id.is_none());
    }

    #[test]
    fn test_create_webhook_requires_endpoint() {
        let config = TransportConfig {
            kind: TransportKind::Webhook,
            endpoint: None,
            token: None,
        };
        assert!(create_transport(&config, &Client::new()).is_err());
    }

    #[test]
    fn test_outgoing_message_shape() {
        let body = OutgoingMessage {
            to: "1@newsletter".to_string(),
            text: "hi",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"], "1@newsletter");
        assert_eq!(json["text"], "hi");
    }
}
