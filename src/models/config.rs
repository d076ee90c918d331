//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ChannelAddress;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Owner account identifier (the paired phone number)
    #[serde(default)]
    pub owner: String,

    /// Display name used in message branding
    #[serde(default = "defaults::bot_name")]
    pub bot_name: String,

    /// Destination channel identifiers, in delivery order
    #[serde(default)]
    pub destinations: Vec<String>,

    /// Upstream OTP feeds, in processing order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Polling behavior settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Fanout settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Outbound transport settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Seen-set backing store
    #[serde(default)]
    pub storage: StorageConfig,

    /// Message template settings
    #[serde(default)]
    pub format: FormatConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(AppError::validation("owner is empty"));
        }
        if self.poll.interval_secs == 0 {
            return Err(AppError::validation("poll.interval_secs must be > 0"));
        }
        if self.poll.timeout_secs == 0 {
            return Err(AppError::validation("poll.timeout_secs must be > 0"));
        }
        if self.poll.timeout_secs >= self.poll.interval_secs {
            return Err(AppError::validation(
                "poll.timeout_secs must be lower than poll.interval_secs",
            ));
        }
        if self.poll.max_concurrent == 0 {
            return Err(AppError::validation("poll.max_concurrent must be > 0"));
        }
        if self.poll.user_agent.trim().is_empty() {
            return Err(AppError::validation("poll.user_agent is empty"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            Url::parse(&source.url)?;
        }
        if self.destinations.is_empty() {
            return Err(AppError::validation("No destinations defined"));
        }
        for destination in &self.destinations {
            ChannelAddress::parse(destination)?;
        }
        if self.transport.kind == TransportKind::Webhook
            && self
                .transport
                .endpoint
                .as_deref()
                .is_none_or(|e| e.trim().is_empty())
        {
            return Err(AppError::validation(
                "transport.endpoint is required for the webhook transport",
            ));
        }
        Ok(())
    }

    /// Display label of the source at `index`.
    pub fn source_label(&self, index: usize) -> String {
        self.sources
            .get(index)
            .and_then(|s| s.label.clone())
            .unwrap_or_else(|| format!("API {}", index + 1))
    }

    /// Path of the seen-set file under the storage directory.
    pub fn seen_store_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.storage.path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: String::new(),
            bot_name: defaults::bot_name(),
            destinations: Vec::new(),
            sources: Vec::new(),
            poll: PollConfig::default(),
            dispatch: DispatchConfig::default(),
            transport: TransportConfig::default(),
            storage: StorageConfig::default(),
            format: FormatConfig::default(),
        }
    }
}

/// One upstream OTP feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint returning an `aaData` payload
    pub url: String,

    /// Label shown in messages (defaults to "API {n}")
    #[serde(default)]
    pub label: Option<String>,
}

/// Polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between cycle starts
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum sources fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Seed the seen-set from each source's first response without sending
    #[serde(default = "defaults::first_run_sync")]
    pub first_run_sync: bool,

    /// Prefix identities with the source label
    #[serde(default)]
    pub scope_identity_by_source: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            user_agent: defaults::user_agent(),
            first_run_sync: defaults::first_run_sync(),
            scope_identity_by_source: false,
        }
    }
}

/// Fanout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Delay between consecutive sends of the same message
    #[serde(default = "defaults::cooldown")]
    pub cooldown_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: defaults::cooldown(),
        }
    }
}

/// Available outbound transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Write messages to the log only
    #[default]
    Log,
    /// POST messages to an HTTP bridge
    Webhook,
}

/// Outbound transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,

    /// Bridge URL for the webhook transport
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent to the bridge
    #[serde(default)]
    pub token: Option<String>,
}

/// Available seen-set backings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process memory, lost on restart
    Memory,
    /// JSON file under the storage directory
    #[default]
    File,
}

/// Seen-set backing store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,

    /// File name, relative to the storage directory
    #[serde(default = "defaults::seen_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            path: defaults::seen_path(),
        }
    }
}

/// Message template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Template with `{placeholder}` fields
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Footer text substituted for `{footer}`
    #[serde(default = "defaults::footer")]
    pub footer: String,

    /// Replace newlines in the raw message with spaces
    #[serde(default)]
    pub flatten_newlines: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
            footer: defaults::footer(),
            flatten_newlines: false,
        }
    }
}

mod defaults {
    pub fn bot_name() -> String {
        "OTP Relay".into()
    }

    // Poll defaults
    pub fn interval() -> u64 {
        6
    }
    pub fn timeout() -> u64 {
        4
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; otp-relay/1.0)".into()
    }
    pub fn first_run_sync() -> bool {
        true
    }

    // Dispatch defaults
    pub fn cooldown() -> u64 {
        1000
    }

    // Storage defaults
    pub fn seen_path() -> String {
        "seen.json".into()
    }

    // Format defaults
    pub fn template() -> String {
        concat!(
            "✨ *{flag} | {service_upper} New Message Received {source}* ⚡\n",
            "\n",
            "> ⏰ *Time* • _{time}_\n",
            "\n",
            "> 🌍 *Country* ✓ _{country}_\n",
            "\n",
            "  📞 *Number* √ _{number}_\n",
            "\n",
            "> ⚙️ *Service* © _{service}_\n",
            "\n",
            "  🔑 *OTP* ~ _{otp}_\n",
            "\n",
            "> 📩 *Full Message*\n",
            "\n",
            "> {message}\n",
            "\n",
            "> {footer}\n",
        )
        .into()
    }
    pub fn footer() -> String {
        "Sent by {bot_name}".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            owner: "923000000000".to_string(),
            destinations: vec!["120363000000000001@newsletter".to_string()],
            sources: vec![SourceConfig {
                url: "https://example.com/api?type=sms".to_string(),
                label: None,
            }],
            ..Config::default()
        }
    }

    #[test]
    fn validate_sample_config_ok() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_default_without_sources() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = sample_config();
        config.poll.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_timeout_not_under_interval() {
        let mut config = sample_config();
        config.poll.timeout_secs = config.poll.interval_secs;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_destination() {
        let mut config = sample_config();
        config.destinations.push("not-an-address".to_string());
        assert!(matches!(config.validate(), Err(AppError::Address(_))));
    }

    #[test]
    fn validate_rejects_bad_source_url() {
        let mut config = sample_config();
        config.sources[0].url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_requires_webhook_endpoint() {
        let mut config = sample_config();
        config.transport.kind = TransportKind::Webhook;
        assert!(config.validate().is_err());
        config.transport.endpoint = Some("http://127.0.0.1:3000/send".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn source_label_falls_back_to_position() {
        let mut config = sample_config();
        config.sources.push(SourceConfig {
            url: "https://example.org/sms".to_string(),
            label: Some("Backup".to_string()),
        });
        assert_eq!(config.source_label(0), "API 1");
        assert_eq!(config.source_label(1), "Backup");
    }

    #[test]
    fn parses_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            owner = "923000000000"
            destinations = ["1@newsletter", "2@newsletter"]

            [poll]
            interval_secs = 10

            [[sources]]
            url = "https://example.com/sms"
            label = "Main"

            [transport]
            kind = "webhook"
            endpoint = "http://localhost:3000/send"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.poll.timeout_secs, 4);
        assert!(config.poll.first_run_sync);
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.transport.kind, TransportKind::Webhook);
        assert_eq!(config.storage.kind, StorageKind::File);
        assert_eq!(config.dispatch.cooldown_ms, 1000);
        assert!(config.validate().is_ok());
    }
}
