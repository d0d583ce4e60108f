//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use secrecy::SecretString;

use crate::config::constants::*;
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Backoff policy for rate-limited and transient lookup failures.
///
/// Delay for retry `n` (1-based) is `initial_delay * factor^(n-1)`, capped at
/// `max_delay`. `max_attempts` counts every request, the first one included.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let multiplier = self.factor.max(1).saturating_pow(exponent);
        self.initial_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }

    /// Policy with no waiting between attempts, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            factor: 1,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(RETRY_INITIAL_DELAY_MS),
            factor: RETRY_FACTOR,
            max_delay: Duration::from_secs(RETRY_MAX_DELAY_SECS),
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically, or produced from [`Opt`] via `From`.
///
/// # Examples
///
/// ```no_run
/// use electorate_geocoder::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     input: PathBuf::from("grants.csv"),
///     boundaries: PathBuf::from("electorates.geojson"),
///     query_limit: Some(25),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV file of records to resolve
    pub input: PathBuf,

    /// GeoJSON file of electoral boundary polygons
    pub boundaries: PathBuf,

    /// Resolved output CSV
    pub resolved_output: PathBuf,

    /// Missed output CSV
    pub missed_output: PathBuf,

    /// SQLite file backing the lookup cache
    pub cache_path: PathBuf,

    /// Places API key; required before any lookup is made
    pub api_key: Option<SecretString>,

    /// Places endpoint (overridable for testing)
    pub places_endpoint: String,

    /// Venue name column
    pub venue_column: String,

    /// State column
    pub state_column: String,

    /// Country appended to each query after the state
    pub country_suffix: String,

    /// Stop after this many live (uncached) lookups
    pub query_limit: Option<usize>,

    /// Log progress every N records
    pub progress_interval: usize,

    /// Checkpoint every M records
    pub checkpoint_interval: usize,

    /// Rate-limit backoff policy
    pub retry: RetryPolicy,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Path of the transient checkpoint file (`<resolved_output>_bak`).
    pub fn checkpoint_path(&self) -> PathBuf {
        let mut name = self.resolved_output.as_os_str().to_owned();
        name.push(CHECKPOINT_SUFFIX);
        PathBuf::from(name)
    }

    /// Checks settings that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "progress_interval",
                reason: "must be greater than zero".into(),
            });
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "checkpoint_interval",
                reason: "must be greater than zero".into(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_attempts",
                reason: "must allow at least one request".into(),
            });
        }
        if self.resolved_output == self.missed_output {
            return Err(ConfigError::InvalidValue {
                name: "missed_output",
                reason: "must differ from the resolved output path".into(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            boundaries: PathBuf::from(DEFAULT_BOUNDARIES_PATH),
            resolved_output: PathBuf::from(DEFAULT_RESOLVED_PATH),
            missed_output: PathBuf::from(DEFAULT_MISSED_PATH),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            api_key: None,
            places_endpoint: PLACES_FIND_PLACE_URL.to_string(),
            venue_column: DEFAULT_VENUE_COLUMN.to_string(),
            state_column: DEFAULT_STATE_COLUMN.to_string(),
            country_suffix: DEFAULT_COUNTRY_SUFFIX.to_string(),
            query_limit: None,
            progress_interval: PROGRESS_INTERVAL,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            retry: RetryPolicy::default(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Basic usage (reads GOOGLE_API_KEY from the environment or .env)
/// electorate_geocoder data/grants.csv --boundaries data/boundaries/2016.geojson
///
/// # Dry run against the first 20 uncached lookups
/// electorate_geocoder data/grants.csv --query-limit 20 --log-level debug
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "electorate_geocoder",
    about = "Geocodes venue records and resolves each to its electoral division."
)]
pub struct Opt {
    /// CSV file of records to resolve
    #[arg(value_parser, default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// GeoJSON file of electoral boundary polygons
    #[arg(long, value_parser, default_value = DEFAULT_BOUNDARIES_PATH)]
    pub boundaries: PathBuf,

    /// Resolved records output (CSV)
    #[arg(long, value_parser, default_value = DEFAULT_RESOLVED_PATH)]
    pub output: PathBuf,

    /// Missed records output (CSV)
    #[arg(long, value_parser, default_value = DEFAULT_MISSED_PATH)]
    pub missed_output: PathBuf,

    /// Lookup cache (SQLite file)
    #[arg(long, value_parser, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,

    /// Google Places API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Places "find place from text" endpoint
    #[arg(long, default_value = PLACES_FIND_PLACE_URL)]
    pub places_endpoint: String,

    /// Venue name column in the input
    #[arg(long, default_value = DEFAULT_VENUE_COLUMN)]
    pub venue_column: String,

    /// State column in the input
    #[arg(long, default_value = DEFAULT_STATE_COLUMN)]
    pub state_column: String,

    /// Country appended to each query
    #[arg(long, default_value = DEFAULT_COUNTRY_SUFFIX)]
    pub country: String,

    /// Stop after this many live (uncached) lookups (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub query_limit: usize,

    /// Log progress every N processed records
    #[arg(long, default_value_t = PROGRESS_INTERVAL)]
    pub progress_interval: usize,

    /// Write a checkpoint every M processed records
    #[arg(long, default_value_t = CHECKPOINT_INTERVAL)]
    pub checkpoint_interval: usize,

    /// Maximum requests per query while rate limited
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Initial rate-limit backoff in milliseconds
    #[arg(long, default_value_t = RETRY_INITIAL_DELAY_MS)]
    pub backoff_ms: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            input: opt.input,
            boundaries: opt.boundaries,
            resolved_output: opt.output,
            missed_output: opt.missed_output,
            cache_path: opt.cache_path,
            api_key: opt
                .api_key
                .filter(|key| !key.trim().is_empty())
                .map(|key| SecretString::new(key.into())),
            places_endpoint: opt.places_endpoint,
            venue_column: opt.venue_column,
            state_column: opt.state_column,
            country_suffix: opt.country,
            query_limit: (opt.query_limit > 0).then_some(opt.query_limit),
            progress_interval: opt.progress_interval,
            checkpoint_interval: opt.checkpoint_interval,
            retry: RetryPolicy {
                max_attempts: opt.max_attempts,
                initial_delay: Duration::from_millis(opt.backoff_ms),
                ..RetryPolicy::default()
            },
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
