//! Record resolution pipeline.
//!
//! Records are processed one at a time in input order: cached lookup (or a
//! live geocoder call on a miss), then electorate matching. Each record ends
//! up in exactly one of the resolved or missed collections. Progress is logged
//! and a checkpoint written on a fixed cadence; final tables are only written
//! when the run completes or stops at the query cap.

mod checkpoint;
mod output;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::{info, trace, warn};
use tokio_util::sync::CancellationToken;

use crate::app::log_progress;
use crate::cache::{CacheLookup, ResultCache};
use crate::config::{Config, CHECKPOINT_INTERVAL, DEFAULT_COUNTRY_SUFFIX, PROGRESS_INTERVAL};
use crate::electorate::ElectorateMatcher;
use crate::error_handling::{GeocodeError, OutcomeType, PipelineError, ProcessingStats};
use crate::geocode::{GeocodeCandidate, Geocoder};
use crate::records::{InputRecord, InputTable};

pub use checkpoint::{remove_checkpoint, report_existing_checkpoint, write_checkpoint};
pub use output::{write_missed_csv, write_resolved_csv, OutputSchema};
pub use state::{MissedRecord, RecordOutcome, RecordState, ResolvedRecord};

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub country_suffix: String,
    pub progress_interval: usize,
    pub checkpoint_interval: usize,
    /// Stop once this many live lookups have been issued
    pub query_limit: Option<usize>,
    pub resolved_path: PathBuf,
    pub missed_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

impl PipelineSettings {
    pub fn new(resolved_path: PathBuf, missed_path: PathBuf, checkpoint_path: PathBuf) -> Self {
        Self {
            country_suffix: DEFAULT_COUNTRY_SUFFIX.to_string(),
            progress_interval: PROGRESS_INTERVAL,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            query_limit: None,
            resolved_path,
            missed_path,
            checkpoint_path,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            country_suffix: config.country_suffix.clone(),
            progress_interval: config.progress_interval.max(1),
            checkpoint_interval: config.checkpoint_interval.max(1),
            query_limit: config.query_limit,
            resolved_path: config.resolved_output.clone(),
            missed_path: config.missed_output.clone(),
            checkpoint_path: config.checkpoint_path(),
        }
    }
}

/// Summary of a completed (or query-capped) run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Records in the input table
    pub total_records: usize,
    /// Records that reached a terminal state
    pub processed: usize,
    pub resolved: usize,
    pub missed: usize,
    /// Records never attempted because the query cap was reached
    pub skipped: usize,
    /// Lookups that missed the cache and reached the service
    pub live_queries: usize,
    pub cache_hits: usize,
    /// Resolved records outside every boundary polygon
    pub unmatched: usize,
    pub elapsed_seconds: f64,
    pub resolved_path: PathBuf,
    pub missed_path: PathBuf,
}

impl PipelineReport {
    pub fn stopped_at_query_limit(&self) -> bool {
        self.skipped > 0
    }
}

/// Accumulated results for the run in progress.
#[derive(Default)]
struct RunState {
    resolved: Vec<ResolvedRecord>,
    missed: Vec<MissedRecord>,
    live_queries: usize,
    cache_hits: usize,
    unmatched: usize,
}

impl RunState {
    fn processed(&self) -> usize {
        self.resolved.len() + self.missed.len()
    }

    fn record(&mut self, outcome: RecordOutcome) {
        trace!("Row {}: {:?}", outcome.input().row, outcome.state());
        match outcome {
            RecordOutcome::Resolved(resolved) => {
                if resolved.electorate.is_none() {
                    self.unmatched += 1;
                }
                self.resolved.push(resolved);
            }
            RecordOutcome::Missed(missed) => self.missed.push(missed),
        }
    }
}

/// Sequential resolver over an input table.
pub struct ResolutionPipeline<G> {
    geocoder: G,
    cache: Arc<ResultCache>,
    matcher: ElectorateMatcher,
    settings: PipelineSettings,
    stats: Arc<ProcessingStats>,
}

impl<G: Geocoder> ResolutionPipeline<G> {
    pub fn new(
        geocoder: G,
        cache: Arc<ResultCache>,
        matcher: ElectorateMatcher,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            geocoder,
            cache,
            matcher,
            settings,
            stats: Arc::new(ProcessingStats::new()),
        }
    }

    /// Outcome counters, shared with whoever wants to report them.
    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.stats)
    }

    /// Resolves every record, then writes both output tables.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Denied`] when the service rejects the credentials
    /// - [`PipelineError::Interrupted`] when `cancel` fires
    /// - [`PipelineError::Cache`] when the cache cannot be read or written
    /// - [`PipelineError::Output`] when a table or checkpoint cannot be written
    ///
    /// In the first three cases the checkpoint is flushed and no final table
    /// is written.
    pub async fn run(
        &self,
        table: InputTable,
        cancel: CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let start_time = Instant::now();
        let schema = OutputSchema::new(&table.headers);
        let total_records = table.records.len();
        let mut run = RunState::default();
        let mut skipped = 0;

        report_existing_checkpoint(&self.settings.checkpoint_path);
        info!("Resolving {} records", total_records);

        let mut records = table.records.into_iter();
        while let Some(record) = records.next() {
            if cancel.is_cancelled() {
                return Err(self.interrupted(&schema, &run));
            }
            if let Some(limit) = self.settings.query_limit {
                if run.live_queries >= limit {
                    skipped = 1 + records.len();
                    warn!(
                        "Query limit of {} live lookups reached; skipping {} remaining records",
                        limit, skipped
                    );
                    break;
                }
            }

            trace!("Row {}: {:?}", record.row, RecordState::Pending);
            let query = record.query(&self.settings.country_suffix);
            let lookup = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.interrupted(&schema, &run)),
                lookup = self.lookup(record.row, &query) => lookup,
            };

            match lookup {
                Ok(found) => {
                    if found.hit {
                        run.cache_hits += 1;
                        self.stats.increment(OutcomeType::CacheHit);
                    } else {
                        run.live_queries += 1;
                        self.stats.increment(OutcomeType::LiveQuery);
                    }
                    let resolved = self.match_electorate(record, found.value);
                    self.stats.increment(OutcomeType::Resolved);
                    run.record(RecordOutcome::Resolved(resolved));
                }
                Err(GeocodeError::Cache(source)) => {
                    self.stats.increment(OutcomeType::CacheFailure);
                    self.flush_checkpoint(&schema, &run)?;
                    return Err(PipelineError::Cache {
                        processed: run.processed(),
                        source,
                    });
                }
                Err(e @ GeocodeError::Denied { .. }) => {
                    self.stats.increment(OutcomeType::Denied);
                    log::error!("{e}");
                    self.flush_checkpoint(&schema, &run)?;
                    return Err(PipelineError::Denied {
                        processed: run.processed(),
                        source: e,
                    });
                }
                Err(e) => {
                    // Every non-fatal failure still cost a request
                    run.live_queries += 1;
                    self.stats.increment(OutcomeType::LiveQuery);
                    let reason = e.outcome();
                    warn!("Row {}: {}", record.row, e);
                    self.stats.increment(reason);
                    self.stats.increment(OutcomeType::Missed);
                    run.record(RecordOutcome::Missed(MissedRecord {
                        input: record,
                        reason,
                    }));
                }
            }

            let processed = run.processed();
            if processed % self.settings.progress_interval.max(1) == 0 {
                log_progress(start_time, processed, total_records, &self.stats);
            }
            if processed % self.settings.checkpoint_interval.max(1) == 0 {
                self.flush_checkpoint(&schema, &run)?;
            }
        }

        self.finish(schema, run, total_records, skipped, start_time)
    }

    async fn lookup(
        &self,
        row: usize,
        query: &str,
    ) -> Result<CacheLookup<GeocodeCandidate>, GeocodeError> {
        trace!("Row {}: {:?}", row, RecordState::Geocoding);
        let found = self
            .cache
            .get_or_compute(query, || self.geocoder.resolve(query))
            .await?;
        trace!(
            "Row {}: {:?} ({})",
            row,
            RecordState::Geocoded,
            if found.hit { "cached" } else { "live" }
        );
        Ok(found)
    }

    fn match_electorate(&self, input: InputRecord, candidate: GeocodeCandidate) -> ResolvedRecord {
        trace!("Row {}: {:?}", input.row, RecordState::Matching);
        let electorate = self
            .matcher
            .locate(candidate.longitude, candidate.latitude)
            .map(str::to_string);
        if electorate.is_none() {
            self.stats.increment(OutcomeType::NoElectorate);
            warn!(
                "Row {}: no electorate contains {} ({}, {})",
                input.row, candidate.formatted_address, candidate.latitude, candidate.longitude
            );
        }
        ResolvedRecord {
            input,
            candidate,
            electorate,
        }
    }

    fn flush_checkpoint(&self, schema: &OutputSchema, run: &RunState) -> Result<(), PipelineError> {
        let path = &self.settings.checkpoint_path;
        write_checkpoint(path, schema, &run.resolved).map_err(|source| PipelineError::Output {
            path: path.clone(),
            source,
        })
    }

    fn interrupted(&self, schema: &OutputSchema, run: &RunState) -> PipelineError {
        if let Err(e) = self.flush_checkpoint(schema, run) {
            return e;
        }
        PipelineError::Interrupted {
            processed: run.processed(),
        }
    }

    fn finish(
        &self,
        schema: OutputSchema,
        run: RunState,
        total_records: usize,
        skipped: usize,
        start_time: Instant,
    ) -> Result<PipelineReport, PipelineError> {
        let resolved_path = &self.settings.resolved_path;
        let missed_path = &self.settings.missed_path;

        write_resolved_csv(resolved_path, &schema, &run.resolved).map_err(|source| {
            PipelineError::Output {
                path: resolved_path.clone(),
                source,
            }
        })?;
        write_missed_csv(missed_path, &schema, &run.missed).map_err(|source| {
            PipelineError::Output {
                path: missed_path.clone(),
                source,
            }
        })?;
        remove_checkpoint(&self.settings.checkpoint_path);

        info!(
            "Finished: {} resolved, {} missed, {} live queries",
            run.resolved.len(),
            run.missed.len(),
            run.live_queries
        );

        Ok(PipelineReport {
            total_records,
            processed: run.processed(),
            resolved: run.resolved.len(),
            missed: run.missed.len(),
            skipped,
            live_queries: run.live_queries,
            cache_hits: run.cache_hits,
            unmatched: run.unmatched,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            resolved_path: resolved_path.clone(),
            missed_path: missed_path.clone(),
        })
    }
}
