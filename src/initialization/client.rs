//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::USER_AGENT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for Places lookups.
///
/// Creates a `reqwest::Client` configured with:
/// - the crate's User-Agent
/// - a per-request timeout
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(timeout: Duration) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_builds() {
        let client = init_client(Duration::from_secs(1));
        assert!(client.is_ok());
    }
}
