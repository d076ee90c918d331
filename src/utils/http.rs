// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::PollConfig;

/// Create the shared asynchronous HTTP client.
///
/// The timeout applies per request, so one stalled feed cannot hold up a cycle
/// for longer than `timeout_secs`.
pub fn create_client(config: &PollConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_client(&PollConfig::default()).is_ok());
    }
}
