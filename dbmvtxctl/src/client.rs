//! HTTP client for communicating with the platform daemon.

use anyhow::{Context, Result};
use dbmvtx_core::api;
use dbmvtx_core::board::WATCHDOG_MAX_TIMEOUT_SECS;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Normalize a server URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// HTTP client for the platform daemon's REST API.
///
/// Requests that fail to reach the server (connection refused, timeouts)
/// are retried with a linearly growing delay. HTTP error statuses are
/// reported immediately.
///
/// # Examples
///
/// ```no_run
/// use dbmvtxctl::client::PlatformClient;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = PlatformClient::with_config(
///     "http://localhost:9180".to_string(),
///     10,
///     3,
///     Duration::from_millis(500),
/// )?;
///
/// let info = client.get_info().await?;
/// println!("Platform: {}", info.platform);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl PlatformClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `server_url` - Base URL of the daemon (e.g., "http://localhost:9180")
    /// * `timeout_secs` - Request timeout in seconds
    /// * `max_retries` - Maximum number of retry attempts for failed requests
    /// * `retry_delay` - Initial delay between retries
    pub fn with_config(
        server_url: String,
        timeout_secs: u64,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("dbmvtxctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: normalize_url(&server_url),
            max_retries,
            retry_delay,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Process an HTTP response and extract the API data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP status code indicates failure (4xx or 5xx)
    /// - The response body cannot be read or deserialized
    /// - The API returns an error response
    async fn handle_response<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", endpoint))?;

        if !status.is_success() {
            // The daemon wraps failures in the same envelope; prefer its message
            let detail = serde_json::from_str::<api::ApiResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|response| match response {
                    api::ApiResponse::Error { error } => Some(error),
                    api::ApiResponse::Success { .. } => None,
                })
                .unwrap_or(text);

            let error_msg = match status {
                StatusCode::NOT_FOUND => format!("Not found at {}: {}", endpoint, detail),
                StatusCode::BAD_REQUEST => format!("Bad request to {}: {}", endpoint, detail),
                StatusCode::NOT_IMPLEMENTED => {
                    format!("Not supported at {}: {}", endpoint, detail)
                }
                StatusCode::INTERNAL_SERVER_ERROR => {
                    format!("Server error at {}: {}", endpoint, detail)
                }
                StatusCode::SERVICE_UNAVAILABLE => {
                    format!("Hardware unavailable at {}: {}", endpoint, detail)
                }
                _ => format!("HTTP {} error at {}: {}", status, endpoint, detail),
            };
            return Err(anyhow::anyhow!(error_msg));
        }

        let api_response: api::ApiResponse<T> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response from {}", endpoint))?;

        match api_response {
            api::ApiResponse::Success { data } => Ok(data),
            api::ApiResponse::Error { error } => {
                Err(anyhow::anyhow!("Server error at {}: {}", endpoint, error))
            }
        }
    }

    /// Execute an HTTP request with automatic retry logic.
    ///
    /// Only connection-level failures are retried. The delay grows with each
    /// attempt (delay * (attempt + 1)).
    async fn execute_with_retry<F, Fut, T>(&self, endpoint: &str, request_fn: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
        T: DeserializeOwned,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match request_fn().await {
                Ok(response) => {
                    return Self::handle_response(response, endpoint).await;
                }
                Err(e) => {
                    let should_retry = e.is_connect() || e.is_timeout() || e.is_request();
                    last_error = Some(e);

                    if attempt < self.max_retries && should_retry {
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    } else {
                        break;
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Failed to reach {} after {} attempts: {}",
            endpoint,
            self.max_retries + 1,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string())
        ))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/api/v0/{}", self.base_url, path);
        self.execute_with_retry(path, || self.client.get(&url).send())
            .await
    }

    /// Retrieve platform and daemon information.
    pub async fn get_info(&self) -> Result<api::InfoResponse> {
        self.get("info").await
    }

    /// Retrieve every chassis and PSU fan.
    pub async fn get_fans(&self) -> Result<api::FansResponse> {
        self.get("fans").await
    }

    /// Retrieve every temperature sensor.
    pub async fn get_thermals(&self) -> Result<api::ThermalsResponse> {
        self.get("thermals").await
    }

    /// Retrieve firmware components and their versions.
    pub async fn get_components(&self) -> Result<api::ComponentsResponse> {
        self.get("components").await
    }

    /// Retrieve the watchdog state.
    pub async fn get_watchdog(&self) -> Result<api::WatchdogStatus> {
        self.get("watchdog").await
    }

    /// Arm the watchdog with a timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error without contacting the server when `seconds` is
    /// above the hardware limit.
    pub async fn arm_watchdog(&self, seconds: u32) -> Result<api::WatchdogArmResponse> {
        if seconds > WATCHDOG_MAX_TIMEOUT_SECS {
            return Err(anyhow::anyhow!(
                "Watchdog timeout must be 0-{} seconds, got {}",
                WATCHDOG_MAX_TIMEOUT_SECS,
                seconds
            ));
        }

        self.get(&format!("watchdog/arm?seconds={}", seconds))
            .await
    }

    /// Disarm the watchdog.
    pub async fn disarm_watchdog(&self) -> Result<()> {
        self.get("watchdog/disarm").await.map(|_: ()| ())
    }

    /// Retrieve the presence of one transceiver.
    ///
    /// # Arguments
    ///
    /// * `port` - 0-based port index
    pub async fn get_sfp_presence(&self, port: usize) -> Result<api::SfpPresenceResponse> {
        self.get(&format!("sfp/{}", port)).await
    }

    /// Retrieve the transceiver events recorded by the daemon.
    pub async fn get_sfp_events(&self) -> Result<api::SfpEventsResponse> {
        self.get("sfp/events").await
    }

    /// Check whether the server is reachable.
    ///
    /// Uses a short timeout (3 seconds) and reports failures as `false`
    /// rather than as errors.
    pub async fn ping(&self) -> Result<bool> {
        let url = format!("{}/", self.base_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .context("Failed to create ping client")?;

        match client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Check connectivity and API health.
    ///
    /// # Returns
    ///
    /// Returns a map containing:
    /// - `connected` - Whether the server is reachable
    /// - `ping_ms` - Response time in milliseconds
    /// - `api_working` - Whether the info endpoint answers (if connected)
    /// - `server_version` - Daemon version (if the API works)
    /// - `mock` - Whether the daemon runs on simulated hardware (if the API works)
    /// - `api_error` - Error message (if connected but the API fails)
    pub async fn health_check(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        let mut health = BTreeMap::new();

        let ping_start = std::time::Instant::now();
        let ping_success = self.ping().await?;
        let ping_duration = ping_start.elapsed();

        health.insert(
            "connected".to_string(),
            serde_json::Value::Bool(ping_success),
        );
        health.insert(
            "ping_ms".to_string(),
            serde_json::Value::Number(serde_json::Number::from(ping_duration.as_millis() as u64)),
        );

        if ping_success {
            match self.get_info().await {
                Ok(info) => {
                    health.insert("api_working".to_string(), serde_json::Value::Bool(true));
                    health.insert(
                        "server_version".to_string(),
                        serde_json::Value::String(info.version),
                    );
                    health.insert("mock".to_string(), serde_json::Value::Bool(info.mock));
                }
                Err(e) => {
                    health.insert("api_working".to_string(), serde_json::Value::Bool(false));
                    health.insert(
                        "api_error".to_string(),
                        serde_json::Value::String(e.to_string()),
                    );
                }
            }
        }

        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockServer;
    use dbmvtx_core::PresenceCode;

    fn client_for(url: &str) -> PlatformClient {
        PlatformClient::with_config(url.to_string(), 5, 0, Duration::from_millis(10)).unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("http://localhost:9180"),
            "http://localhost:9180"
        );
        assert_eq!(
            normalize_url("http://localhost:9180/"),
            "http://localhost:9180"
        );
        assert_eq!(
            normalize_url("http://localhost:9180///"),
            "http://localhost:9180"
        );
    }

    #[tokio::test]
    async fn test_get_fans_and_thermals() {
        let (_server, url) = MockServer::new().start().await.unwrap();
        let client = client_for(&url);

        let fans = client.get_fans().await.unwrap();
        assert_eq!(fans.fans.len(), 3);
        assert_eq!(fans.fans[0].name, "Fantray1_Fan1");

        let thermals = client.get_thermals().await.unwrap();
        assert_eq!(thermals.thermals[0].temperature, Some(28.0));
    }

    #[tokio::test]
    async fn test_sfp_presence_and_events() {
        let (server, url) = MockServer::new().start().await.unwrap();
        let client = client_for(&url);

        assert!(client.get_sfp_presence(0).await.unwrap().present);
        assert!(!client.get_sfp_presence(1).await.unwrap().present);

        let err = client.get_sfp_presence(99).await.unwrap_err();
        assert!(err.to_string().contains("Not found"));

        server.state().push_event(3, PresenceCode::Inserted);
        let events = client.get_sfp_events().await.unwrap();
        assert_eq!(events.events.len(), 1);
        assert_eq!(events.events[0].port, 3);
    }

    #[tokio::test]
    async fn test_arm_watchdog() {
        let (server, url) = MockServer::new().start().await.unwrap();
        let client = client_for(&url);

        let armed = client.arm_watchdog(120).await.unwrap();
        assert_eq!(armed.timeout_secs, 120);
        assert!(client.get_watchdog().await.unwrap().armed);

        client.disarm_watchdog().await.unwrap();
        let status = client.get_watchdog().await.unwrap();
        assert!(!status.armed);
        assert_eq!(status.remaining_secs, -1);
        assert!(!server.state().watchdog_armed());
    }

    #[tokio::test]
    async fn test_arm_watchdog_rejects_large_timeout_locally() {
        // Nothing listens on this URL; validation must fail first
        let client = client_for("http://127.0.0.1:1");
        let err = client.arm_watchdog(341).await.unwrap_err();
        assert!(err.to_string().contains("0-340"));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = PlatformClient::with_config(
            "http://127.0.0.1:1".to_string(),
            1,
            1,
            Duration::from_millis(10),
        )
        .unwrap();

        assert!(!client.ping().await.unwrap());
        let err = client.get_info().await.unwrap_err();
        assert!(err.to_string().contains("after 2 attempts"));

        let health = client.health_check().await.unwrap();
        assert_eq!(health["connected"], serde_json::Value::Bool(false));
        assert!(!health.contains_key("api_working"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_server, url) = MockServer::new().start().await.unwrap();
        let client = client_for(&url);

        let health = client.health_check().await.unwrap();
        assert_eq!(health["connected"], serde_json::Value::Bool(true));
        assert_eq!(health["api_working"], serde_json::Value::Bool(true));
        assert_eq!(health["mock"], serde_json::Value::Bool(true));
    }
}
