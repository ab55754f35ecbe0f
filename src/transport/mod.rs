//! HTTPS transport toward the gateway's event log endpoint
//!
//! Certificate validation is relaxed by design: consumer gateways serve
//! self-signed certificates on the LAN, and the trust boundary here is the
//! local network, not the public PKI.

use crate::error::{HubwatchError, Result};
use std::time::Duration;

/// HTTP client bound to one gateway address
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: reqwest::Client,
    address: String,
}

impl DeviceClient {
    /// Build a client for the gateway at `address` (IP or hostname)
    pub fn new(address: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(|e| HubwatchError::Transport {
                source: e,
                context: "Failed to build HTTP client".to_string(),
            })?;

        Ok(Self {
            client,
            address: address.into(),
        })
    }

    /// Event log endpoint URL
    pub fn endpoint(&self) -> String {
        format!("https://{}/rest/v1/cablemodem/eventlog", self.address)
    }

    /// Fetch one batch of raw log lines from the gateway
    ///
    /// Network, TLS, timeout, and HTTP status failures are all reported as
    /// transport errors carrying the request target; the caller skips the
    /// cycle and retries on the next tick.
    pub async fn fetch_raw_batch(&self) -> Result<Vec<String>> {
        let url = self.endpoint();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HubwatchError::Transport {
                source: e,
                context: format!("GET {url}"),
            })?
            .error_for_status()
            .map_err(|e| HubwatchError::Transport {
                source: e,
                context: format!("GET {url}"),
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| HubwatchError::Transport {
                source: e,
                context: format!("Reading response body from {url}"),
            })?;

        Ok(body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}
