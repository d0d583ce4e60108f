//! Google Places "find place from text" client.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

use super::types::{FindPlaceResponse, GeocodeCandidate, PlacesStatus};
use super::Geocoder;
use crate::config::{RetryPolicy, PLACES_FIELDS, PLACES_FIND_PLACE_URL, PLACES_INPUT_TYPE};
use crate::error_handling::GeocodeError;

/// Connection settings for [`PlacesClient`].
#[derive(Debug, Clone)]
pub struct PlacesSettings {
    pub api_key: SecretString,
    pub endpoint: String,
    pub retry: RetryPolicy,
}

impl PlacesSettings {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            endpoint: PLACES_FIND_PLACE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of a single request, before retry handling.
enum Attempt {
    Found(GeocodeCandidate),
    RateLimited,
}

/// Places-backed [`Geocoder`].
///
/// Only the first candidate of an `OK` response is used; the service's own
/// ordering decides ambiguous matches.
pub struct PlacesClient {
    http: Arc<reqwest::Client>,
    settings: PlacesSettings,
}

impl PlacesClient {
    pub fn new(http: Arc<reqwest::Client>, settings: PlacesSettings) -> Self {
        Self { http, settings }
    }

    async fn request_once(&self, query: &str) -> Result<Attempt, GeocodeError> {
        let transport = |source: reqwest::Error| GeocodeError::Transport {
            query: query.to_string(),
            source,
        };

        let body = self
            .http
            .get(&self.settings.endpoint)
            .query(&[
                ("key", self.settings.api_key.expose_secret()),
                ("fields", PLACES_FIELDS),
                ("inputtype", PLACES_INPUT_TYPE),
                ("input", query),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)?;

        let response: FindPlaceResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::MalformedResponse {
                query: query.to_string(),
                status: format!("unparseable response ({e})"),
            })?;

        parse_response(query, response)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.settings.retry.delay_for(attempt);
        let jitter_cap = (base.as_millis() / 10) as u64;
        if jitter_cap == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=jitter_cap))
    }
}

/// Maps a decoded response onto the status taxonomy.
fn parse_response(query: &str, response: FindPlaceResponse) -> Result<Attempt, GeocodeError> {
    let Some(raw_status) = response.status else {
        return Err(GeocodeError::MalformedResponse {
            query: query.to_string(),
            status: "<missing status>".into(),
        });
    };

    // EnumString with a default variant never fails
    let status = PlacesStatus::from_str(&raw_status)
        .unwrap_or_else(|_| PlacesStatus::Other(raw_status.clone()));

    match status {
        PlacesStatus::Ok => {
            let Some(first) = response.candidates.into_iter().next() else {
                return Err(GeocodeError::NoCandidate {
                    query: query.to_string(),
                });
            };
            first
                .into_candidate()
                .map(Attempt::Found)
                .ok_or_else(|| GeocodeError::MalformedResponse {
                    query: query.to_string(),
                    status: "OK (candidate missing address, geometry or name)".into(),
                })
        }
        PlacesStatus::ZeroResults => Err(GeocodeError::NoCandidate {
            query: query.to_string(),
        }),
        PlacesStatus::OverQueryLimit => Ok(Attempt::RateLimited),
        PlacesStatus::RequestDenied => Err(GeocodeError::Denied {
            message: response
                .error_message
                .unwrap_or_else(|| "API key or other request denied error".into()),
        }),
        other => Err(GeocodeError::MalformedResponse {
            query: query.to_string(),
            status: other.as_str().to_string(),
        }),
    }
}

/// Transport failures worth another attempt: timeouts, refused connections, 429 and 5xx.
fn is_transient(error: &GeocodeError) -> bool {
    let GeocodeError::Transport { source, .. } = error else {
        return false;
    };
    if source.is_timeout() || source.is_connect() {
        return true;
    }
    source
        .status()
        .map(|s| s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS)
        .unwrap_or(false)
}

#[async_trait]
impl Geocoder for PlacesClient {
    async fn resolve(&self, query: &str) -> Result<GeocodeCandidate, GeocodeError> {
        let max_attempts = self.settings.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("Places lookup {:?} (attempt {}/{})", query, attempt, max_attempts);
            match self.request_once(query).await {
                Ok(Attempt::Found(candidate)) => return Ok(candidate),
                Ok(Attempt::RateLimited) => {
                    if attempt >= max_attempts {
                        return Err(GeocodeError::RateLimitExceeded {
                            query: query.to_string(),
                            attempts: attempt,
                        });
                    }
                    let delay = self.backoff(attempt);
                    warn!(
                        "Hit query limit! Backing off for {:.1}s (attempt {}/{})",
                        delay.as_secs_f64(),
                        attempt,
                        max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if is_transient(&e) && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!("{e}; retrying in {:.1}s", delay.as_secs_f64());
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
