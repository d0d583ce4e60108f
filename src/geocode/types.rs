//! Geocoding data structures.

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// A single location returned for a query.
///
/// This is also the cache payload, so field names are part of the on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    /// Place categories in service order (e.g. `["stadium", "point_of_interest"]`)
    pub category_tags: Vec<String>,
}

impl GeocodeCandidate {
    /// Category tags joined with `,` for tabular output.
    pub fn types_joined(&self) -> String {
        self.category_tags.join(",")
    }
}

/// `status` field of a Places response.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    #[strum(default)]
    Other(String),
}

impl PlacesStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlacesStatus::Ok => "OK",
            PlacesStatus::ZeroResults => "ZERO_RESULTS",
            PlacesStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            PlacesStatus::RequestDenied => "REQUEST_DENIED",
            PlacesStatus::InvalidRequest => "INVALID_REQUEST",
            PlacesStatus::UnknownError => "UNKNOWN_ERROR",
            PlacesStatus::Other(raw) => raw,
        }
    }
}

// Wire format of findplacefromtext responses
#[derive(Debug, Deserialize)]
pub(crate) struct FindPlaceResponse {
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) candidates: Vec<RawCandidate>,
    pub(crate) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCandidate {
    pub(crate) formatted_address: Option<String>,
    pub(crate) geometry: Option<RawGeometry>,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeometry {
    pub(crate) location: RawLocation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLocation {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
}

impl RawCandidate {
    /// Maps into a candidate, or `None` if a required field is missing.
    pub(crate) fn into_candidate(self) -> Option<GeocodeCandidate> {
        let geometry = self.geometry?;
        Some(GeocodeCandidate {
            formatted_address: self.formatted_address?,
            latitude: geometry.location.lat,
            longitude: geometry.location.lng,
            name: self.name?,
            category_tags: self.types,
        })
    }
}
