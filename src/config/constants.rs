//! Configuration constants (used as defaults).

use std::time::Duration;

// Input
/// Column holding the free-text venue name.
pub const DEFAULT_VENUE_COLUMN: &str = "club";
/// Column holding the state abbreviation.
pub const DEFAULT_STATE_COLUMN: &str = "state";
/// Columns that may hold the funding round, in preference order.
pub const ROUND_COLUMNS: &[&str] = &["rnd", "round"];
/// Column holding the grant amount.
pub const AMOUNT_COLUMN: &str = "amount";

// Paths
pub const DEFAULT_INPUT_PATH: &str = "data/grants.csv";
pub const DEFAULT_BOUNDARIES_PATH: &str = "data/boundaries/electorates.geojson";
pub const DEFAULT_RESOLVED_PATH: &str = "data/grants_geocoded.csv";
pub const DEFAULT_MISSED_PATH: &str = "data/grants_geocoded_missed.csv";
pub const DEFAULT_CACHE_PATH: &str = ".geocode_cache.db";
/// Suffix appended to the resolved output path to form the checkpoint path.
pub const CHECKPOINT_SUFFIX: &str = "_bak";

// Query construction
/// Country appended to every query, after the record's state.
pub const DEFAULT_COUNTRY_SUFFIX: &str = "Australia";

// Places API
pub const PLACES_FIND_PLACE_URL: &str =
    "https://maps.googleapis.com/maps/api/place/findplacefromtext/json";
pub const PLACES_FIELDS: &str = "name,types,formatted_address,geometry";
pub const PLACES_INPUT_TYPE: &str = "textquery";
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Per-request HTTP timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = concat!("electorate_geocoder/", env!("CARGO_PKG_VERSION"));

// Retry strategy for OVER_QUERY_LIMIT and transient transport errors
/// Maximum number of requests issued for one query (first attempt included).
pub const RETRY_MAX_ATTEMPTS: u32 = 6;
/// Delay before the first retry, in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 5_000;
/// Factor by which retry delay is multiplied on each attempt.
pub const RETRY_FACTOR: u32 = 2;
/// Maximum delay between retries in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 120;

// Pipeline cadence
/// Log progress every N processed records.
pub const PROGRESS_INTERVAL: usize = 10;
/// Write a checkpoint every M processed records.
pub const CHECKPOINT_INTERVAL: usize = 100;

// Boundary dataset
/// Region name properties, in preference order (human-readable first).
pub const REGION_NAME_PROPERTIES: &[&str] = &["Elect_div", "Sortname"];

// Output columns appended to every input row
pub const COLUMN_ADDRESS: &str = "address";
pub const COLUMN_LATITUDE: &str = "lat";
pub const COLUMN_LONGITUDE: &str = "lng";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_TYPES: &str = "types";
pub const COLUMN_ELECTORATE: &str = "electorate";
/// Only present in the missed output.
pub const COLUMN_REASON: &str = "reason";

/// Candidate and electorate columns shared by the resolved, missed and checkpoint tables.
pub const GEOCODE_COLUMNS: &[&str] = &[
    COLUMN_ADDRESS,
    COLUMN_LATITUDE,
    COLUMN_LONGITUDE,
    COLUMN_NAME,
    COLUMN_TYPES,
    COLUMN_ELECTORATE,
];
