//! electorate_geocoder library: resolve venue records to electoral divisions
//!
//! This library geocodes free-text venue records through Google Places, then
//! finds the federal electoral division containing each location. Lookups are
//! cached in SQLite so an interrupted batch can be re-run without re-querying,
//! and partial progress is checkpointed on a fixed cadence.
//!
//! # Example
//!
//! ```no_run
//! use electorate_geocoder::{run_geocode, Config};
//! use secrecy::SecretString;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: std::path::PathBuf::from("data/grants.csv"),
//!     api_key: Some(SecretString::new("my-places-key".into())),
//!     ..Default::default()
//! };
//!
//! let report = run_geocode(config).await?;
//! println!("{} resolved, {} missed", report.resolved, report.missed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod cache;
pub mod config;
pub mod electorate;
pub mod error_handling;
pub mod geocode;
pub mod initialization;
pub mod pipeline;
pub mod records;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{GeocodeError, PipelineError};
pub use pipeline::{PipelineReport, PipelineSettings, ResolutionPipeline};
pub use run::{run_geocode, run_geocode_with_cancel};

// Internal run module (wires configuration into a pipeline run)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        print_outcome_statistics, print_run_summary, shutdown_gracefully, spawn_interrupt_watcher,
    };
    use crate::cache::ResultCache;
    use crate::config::{Config, HTTP_TIMEOUT};
    use crate::electorate::ElectorateMatcher;
    use crate::error_handling::ConfigError;
    use crate::geocode::{PlacesClient, PlacesSettings};
    use crate::initialization::init_client;
    use crate::pipeline::{PipelineReport, PipelineSettings, ResolutionPipeline};
    use crate::records::{read_input_records, InputColumns};

    /// Runs a full geocoding batch, stopping cleanly on Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the input or boundary
    /// files cannot be loaded, or the run stops early. Early stops carry a
    /// [`crate::PipelineError`] that callers can recover with
    /// `anyhow::Error::downcast_ref`.
    pub async fn run_geocode(config: Config) -> Result<PipelineReport> {
        let cancel = CancellationToken::new();
        let watcher = spawn_interrupt_watcher(cancel.clone());
        let result = run_geocode_with_cancel(config, cancel).await;
        shutdown_gracefully(Some(watcher)).await;
        result
    }

    /// Like [`run_geocode`], but cancellation is driven by the caller's token.
    pub async fn run_geocode_with_cancel(
        config: Config,
        cancel: CancellationToken,
    ) -> Result<PipelineReport> {
        config.validate().context("Invalid configuration")?;
        let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;

        // Everything that can fail before the first lookup is checked up front
        let columns = InputColumns {
            venue: config.venue_column.clone(),
            state: config.state_column.clone(),
        };
        let table =
            read_input_records(&config.input, &columns).context("Failed to read input records")?;
        let matcher = ElectorateMatcher::from_geojson_path(&config.boundaries)
            .context("Failed to load electoral boundaries")?;
        info!("Loaded {} electoral divisions", matcher.len());

        let cache = ResultCache::open(&config.cache_path)
            .await
            .context("Failed to open lookup cache")?;
        let http = init_client(HTTP_TIMEOUT).context("Failed to initialize HTTP client")?;
        let geocoder = PlacesClient::new(
            http,
            PlacesSettings {
                api_key,
                endpoint: config.places_endpoint.clone(),
                retry: config.retry.clone(),
            },
        );

        let pipeline = ResolutionPipeline::new(
            geocoder,
            Arc::new(cache),
            matcher,
            PipelineSettings::from(&config),
        );
        let result = pipeline.run(table, cancel).await;
        print_outcome_statistics(&pipeline.stats());

        let report = result?;
        print_run_summary(&report);
        Ok(report)
    }
}
