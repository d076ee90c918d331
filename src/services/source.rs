// src/services/source.rs

//! Upstream OTP feeds.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;

/// An upstream feed that can be polled for a raw payload.
#[async_trait]
pub trait Source: Send + Sync {
    /// Label shown in messages and logs.
    fn label(&self) -> &str;

    /// Fetch the current payload body.
    async fn fetch(&self) -> Result<String>;
}

/// Feed served over HTTP GET.
pub struct HttpSource {
    label: String,
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(label: impl Into<String>, url: impl Into<String>, client: Client) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            client,
        }
    }

    /// Build one source per configured feed, sharing the client.
    pub fn from_config(config: &Config, client: &Client) -> Vec<HttpSource> {
        config
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                HttpSource::new(config.source_label(index), &source.url, client.clone())
            })
            .collect()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Source for HttpSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::unreachable(&self.label, e))?;

        response
            .text()
            .await
            .map_err(|e| AppError::unreachable(&self.label, e))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::{Duration, Instant};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::models::{PollConfig, SourceConfig};
    use crate::utils::http::create_client;

    /// Local HTTP endpoint. `None` accepts connections and never answers.
    pub(crate) async fn local_feed(response: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                match response {
                    Some(reply) => {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(reply.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    None => held.push(socket),
                }
            }
        });

        format!("http://{}/api?type=sms", addr)
    }

    pub(crate) fn short_timeout_client() -> Client {
        create_client(&PollConfig {
            timeout_secs: 1,
            ..PollConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_stalled_feed_times_out_as_unreachable() {
        let url = local_feed(None).await;
        let source = HttpSource::new("API 1", url, short_timeout_client());

        let started = Instant::now();
        let result = source.fetch().await;

        assert!(started.elapsed() < Duration::from_secs(3));
        match result {
            Err(AppError::SourceUnreachable { source_label, .. }) => {
                assert_eq!(source_label, "API 1")
            }
            other => panic!("expected SourceUnreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_unreachable() {
        let url = local_feed(Some(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ))
        .await;
        let source = HttpSource::new("API 2", url, short_timeout_client());

        let result = source.fetch().await;
        assert!(matches!(result, Err(AppError::SourceUnreachable { .. })));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let url = local_feed(Some(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"aaData\":[]}",
        ))
        .await;
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let source = HttpSource::new("API 1", url, client);

        assert_eq!(source.fetch().await.unwrap(), r#"{"aaData":[]}"#);
    }

    #[test]
    fn test_from_config_assigns_labels() {
        let config = Config {
            sources: vec![
                SourceConfig {
                    url: "https://example.com/api?type=sms".to_string(),
                    label: None,
                },
                SourceConfig {
                    url: "https://example.org/sms".to_string(),
                    label: Some("Backup".to_string()),
                },
            ],
            ..Config::default()
        };

        let sources = HttpSource::from_config(&config, &Client::new());
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label(), "API 1");
        assert_eq!(sources[0].url(), "https://example.com/api?type=sms");
        assert_eq!(sources[1].label(), "Backup");
    }
}
