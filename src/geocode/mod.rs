//! Free-text address lookup.
//!
//! [`Geocoder`] is the seam between the pipeline and the lookup service.
//! [`PlacesClient`] talks to Google Places; tests substitute scripted
//! implementations. Memoization is the caller's job (see [`crate::cache`]).

mod places;
mod types;

use async_trait::async_trait;

use crate::error_handling::GeocodeError;

pub use places::{PlacesClient, PlacesSettings};
pub use types::{GeocodeCandidate, PlacesStatus};

/// Resolves a free-text query to a single candidate location.
///
/// Rate limiting is handled inside implementations and never surfaces except
/// as `RateLimitExceeded` once retries are exhausted.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<GeocodeCandidate, GeocodeError>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    async fn resolve(&self, query: &str) -> Result<GeocodeCandidate, GeocodeError> {
        (**self).resolve(query).await
    }
}
