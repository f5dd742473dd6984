//! HTTP client construction for verification runs.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Create a blocking HTTP client with timeout configuration.
/// Prevents indefinite hangs on slow or unresponsive servers.
/// - connect_timeout: Maximum time to establish a TCP connection
/// - timeout: Maximum time for the entire request (connection + transfer)
pub fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("authcheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}
