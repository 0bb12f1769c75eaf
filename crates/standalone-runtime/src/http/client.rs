//! HTTP client construction

use reqwest::blocking::Client;
use std::time::Duration;

/// Default timeout for downloads (5 minutes for runtime archives)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("standalone-builder/", env!("CARGO_PKG_VERSION"));

/// Builds HTTP client with the given timeout
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Builds HTTP client with [`DEFAULT_TIMEOUT`]
pub fn build_default_client() -> Result<Client, reqwest::Error> {
    build_client(DEFAULT_TIMEOUT)
}
