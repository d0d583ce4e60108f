//! Per-record state and terminal outcomes.

use crate::error_handling::OutcomeType;
use crate::geocode::GeocodeCandidate;
use crate::records::InputRecord;

/// Lifecycle of one record inside a run.
///
/// `Pending → Geocoding → {Geocoded → Matching → Resolved, GeocodeFailed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Pending,
    Geocoding,
    Geocoded,
    GeocodeFailed,
    Matching,
    Resolved,
}

impl RecordState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordState::Resolved | RecordState::GeocodeFailed)
    }
}

/// A record with a location. `electorate` is absent when no polygon contains it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub input: InputRecord,
    pub candidate: GeocodeCandidate,
    pub electorate: Option<String>,
}

/// A record whose lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub struct MissedRecord {
    pub input: InputRecord,
    pub reason: OutcomeType,
}

/// Exactly one per processed record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Resolved(ResolvedRecord),
    Missed(MissedRecord),
}

impl RecordOutcome {
    pub fn input(&self) -> &InputRecord {
        match self {
            RecordOutcome::Resolved(r) => &r.input,
            RecordOutcome::Missed(m) => &m.input,
        }
    }

    pub fn state(&self) -> RecordState {
        match self {
            RecordOutcome::Resolved(_) => RecordState::Resolved,
            RecordOutcome::Missed(_) => RecordState::GeocodeFailed,
        }
    }
}
