//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions, one enum per concern
//! - Outcome categorization for per-record results
//! - Processing statistics tracking
//!
//! Errors fall into three groups:
//! - **Fatal before processing**: configuration, input, boundary, cache setup
//! - **Fatal mid-run**: denied credentials, cache storage failures, interrupts
//! - **Per-record**: geocoding failures that route a record to the missed output

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    CacheError, ConfigError, ElectorateError, GeocodeError, InitializationError, InputError,
    OutcomeType, OutputError, PipelineError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for outcome in OutcomeType::iter() {
            assert_eq!(stats.get(outcome), 0);
        }
        assert_eq!(stats.total_failures(), 0);
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment(OutcomeType::NoCandidate);
        stats.increment(OutcomeType::NoCandidate);
        stats.increment(OutcomeType::CacheHit);
        assert_eq!(stats.get(OutcomeType::NoCandidate), 2);
        assert_eq!(stats.get(OutcomeType::CacheHit), 1);
        // Cache hits are not failures
        assert_eq!(stats.total_failures(), 2);
    }

    #[test]
    fn test_only_denied_and_cache_failures_are_fatal() {
        let denied = GeocodeError::Denied {
            message: "bad key".into(),
        };
        let zero = GeocodeError::NoCandidate {
            query: "Example Club, NSW, Australia".into(),
        };
        let limited = GeocodeError::RateLimitExceeded {
            query: "q".into(),
            attempts: 3,
        };
        let malformed = GeocodeError::MalformedResponse {
            query: "q".into(),
            status: "INVALID_REQUEST".into(),
        };
        assert!(denied.is_fatal());
        assert!(!zero.is_fatal());
        assert!(!limited.is_fatal());
        assert!(!malformed.is_fatal());
        assert!(GeocodeError::from(CacheError::FileCreationError("x".into())).is_fatal());
    }

    #[test]
    fn test_outcome_mapping() {
        let err = GeocodeError::MalformedResponse {
            query: "q".into(),
            status: "UNKNOWN_ERROR".into(),
        };
        assert_eq!(err.outcome(), OutcomeType::MalformedResponse);
        assert_eq!(err.outcome().as_str(), "malformed_response");
        assert!(err.outcome().is_failure_reason());
        assert!(!OutcomeType::Resolved.is_failure_reason());
    }

    #[test]
    fn test_malformed_message_includes_status_and_query() {
        let err = GeocodeError::MalformedResponse {
            query: "Example Club, NSW, Australia".into(),
            status: "INVALID_REQUEST".into(),
        };
        let message = err.to_string();
        assert!(message.contains("INVALID_REQUEST"));
        assert!(message.contains("Example Club, NSW, Australia"));
    }

    #[test]
    fn test_outcome_display() {
        for outcome in OutcomeType::iter() {
            assert_eq!(outcome.to_string(), outcome.as_str());
        }
    }
}
