//! Minimal blocking client for the Vera controller
//!
//! This crate talks to the Luup `data_request` endpoint of a Vera hub. The
//! only request it needs is the `lu_sdata` change poll, which long-polls the
//! hub and returns the devices that changed since a given cursor.

mod change;
mod error;

pub use change::{ChangeBatch, Cursor, DeviceChange, DeviceId};
pub use error::{ClientError, Result};

use std::time::Duration;

/// Timeouts and long-poll parameters for [`VeraClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Time allowed to establish the TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Base request timeout; the read timeout is twice this so the hub's long
    /// poll returns before the client gives up
    /// Default: 20 seconds
    pub request_timeout: Duration,

    /// How long the hub may hold a change poll open
    /// Default: 30 seconds
    pub poll_timeout: Duration,

    /// Minimum delay the hub waits before answering a change poll
    /// Default: 200 milliseconds
    pub minimum_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(20),
            poll_timeout: Duration::from_secs(30),
            minimum_delay: Duration::from_millis(200),
        }
    }
}

/// A blocking client for one Vera controller
#[derive(Debug, Clone)]
pub struct VeraClient {
    agent: ureq::Agent,
    base_url: String,
    config: ClientConfig,
}

impl VeraClient {
    /// Create a client for the controller at `base_url`, e.g. `http://192.168.1.161:3480`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.request_timeout * 2)
                .build(),
            base_url,
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the devices that changed since `cursor`
    ///
    /// Without a cursor the hub answers immediately with every device. With a
    /// cursor the hub holds the request open until something changes or the
    /// poll timeout expires, in which case the batch is empty.
    pub fn get_changed_devices(&self, cursor: Option<&Cursor>) -> Result<ChangeBatch> {
        let url = format!("{}/data_request", self.base_url);

        let mut request = self.agent.get(&url).query("id", "lu_sdata");
        if let Some(cursor) = cursor {
            request = request
                .query("timeout", &self.config.poll_timeout.as_secs().to_string())
                .query("minimumdelay", &self.config.minimum_delay.as_millis().to_string())
                .query("loadtime", &cursor.loadtime.to_string())
                .query("dataversion", &cursor.dataversion.to_string());
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => ClientError::Status(code),
            ureq::Error::Transport(t) => ClientError::Network(t.to_string()),
        })?;

        let body = response
            .into_string()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if body.trim().is_empty() {
            return Err(ClientError::EmptyResponse);
        }

        ChangeBatch::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = VeraClient::new("http://192.168.1.161:3480/");
        assert_eq!(client.base_url(), "http://192.168.1.161:3480");
        assert_eq!(client.config().poll_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_custom_config() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        };
        let client = VeraClient::with_config("http://vera.local:3480", config);
        assert_eq!(client.config().request_timeout, Duration::from_secs(5));
        assert_eq!(client.config().minimum_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_transport_classification() {
        assert!(ClientError::Network("refused".to_string()).is_transport());
        assert!(!ClientError::Status(500).is_transport());
        assert!(!ClientError::EmptyResponse.is_transport());
        assert!(!ClientError::Parse("eof".to_string()).is_transport());
    }
}
