//! Error type definitions.
//!
//! This module defines all error and outcome types used throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Configuration problems detected before any record is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing Places API key (set GOOGLE_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Error types for the persistent lookup cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error creating the cache database file.
    #[error("Cache file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("Cache SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A stored payload could not be decoded.
    #[error("Corrupt cache entry for query {query:?}: {source}")]
    Corrupt {
        query: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode cache entry: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors reading the input record table.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Missing required column {column:?} in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("Failed to read input CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors loading the boundary polygon dataset.
#[derive(Error, Debug)]
pub enum ElectorateError {
    #[error("Boundary dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read boundary dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GeoJSON boundary dataset: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Boundary feature {feature_index} has no region name (expected one of {expected:?})")]
    MissingRegionName {
        feature_index: usize,
        expected: &'static [&'static str],
    },

    #[error("Boundary dataset contains no polygons")]
    Empty,
}

/// Lookup failures reported by a geocoder.
///
/// `Denied` is the only variant fatal to a whole run; every other variant routes
/// the record to the missed output.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("No candidate returned for {query:?}")]
    NoCandidate { query: String },

    #[error("Request denied by the geocoding service: {message}")]
    Denied { message: String },

    #[error("Still rate limited after {attempts} attempts for {query:?}")]
    RateLimitExceeded { query: String, attempts: u32 },

    #[error("Bad response for query ({query}): {status}")]
    MalformedResponse { query: String, status: String },

    #[error("Transport error for {query:?}: {source}")]
    Transport {
        query: String,
        #[source]
        source: ReqwestError,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl GeocodeError {
    /// True when no further lookups should be attempted in this run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GeocodeError::Denied { .. } | GeocodeError::Cache(_))
    }

    /// Outcome bucket used for statistics and the missed `reason` column.
    pub fn outcome(&self) -> OutcomeType {
        match self {
            GeocodeError::NoCandidate { .. } => OutcomeType::NoCandidate,
            GeocodeError::Denied { .. } => OutcomeType::Denied,
            GeocodeError::RateLimitExceeded { .. } => OutcomeType::RateLimitExceeded,
            GeocodeError::MalformedResponse { .. } => OutcomeType::MalformedResponse,
            GeocodeError::Transport { .. } => OutcomeType::Transport,
            GeocodeError::Cache(_) => OutcomeType::CacheFailure,
        }
    }
}

/// Errors that stop a pipeline run before final outputs are written.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Geocoding credentials rejected after {processed} records: {source}")]
    Denied {
        processed: usize,
        #[source]
        source: GeocodeError,
    },

    #[error("Interrupted after {processed} records; progress saved to checkpoint")]
    Interrupted { processed: usize },

    #[error("Lookup cache failed after {processed} records: {source}")]
    Cache {
        processed: usize,
        #[source]
        source: CacheError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

/// Failures writing a CSV table to disk.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

/// Per-record outcomes tracked during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum OutcomeType {
    // Terminal record states
    Resolved,
    Missed,
    // Failure reasons
    NoCandidate,
    Denied,
    RateLimitExceeded,
    MalformedResponse,
    Transport,
    CacheFailure,
    // Informational
    NoElectorate,
    CacheHit,
    LiveQuery,
}

impl std::fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OutcomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeType::Resolved => "resolved",
            OutcomeType::Missed => "missed",
            OutcomeType::NoCandidate => "no_candidate",
            OutcomeType::Denied => "denied",
            OutcomeType::RateLimitExceeded => "rate_limit_exceeded",
            OutcomeType::MalformedResponse => "malformed_response",
            OutcomeType::Transport => "transport_error",
            OutcomeType::CacheFailure => "cache_failure",
            OutcomeType::NoElectorate => "no_electorate",
            OutcomeType::CacheHit => "cache_hit",
            OutcomeType::LiveQuery => "live_query",
        }
    }

    /// Whether this outcome explains why a record was missed.
    pub fn is_failure_reason(&self) -> bool {
        matches!(
            self,
            OutcomeType::NoCandidate
                | OutcomeType::Denied
                | OutcomeType::RateLimitExceeded
                | OutcomeType::MalformedResponse
                | OutcomeType::Transport
                | OutcomeType::CacheFailure
        )
    }
}
