//! Progress logging utilities.

use log::info;
use std::time::Instant;

use crate::error_handling::{OutcomeType, ProcessingStats};

/// Logs progress information about record processing.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `processed` - Records finished so far (resolved or missed)
/// * `total` - Records in the input table
/// * `stats` - Outcome counters for the run
pub fn log_progress(start_time: Instant, processed: usize, total: usize, stats: &ProcessingStats) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {}/{} records in {:.2} seconds (~{:.2} records/sec): {} resolved, {} missed, {} live queries",
        processed,
        total,
        elapsed_secs,
        rate,
        stats.get(OutcomeType::Resolved),
        stats.get(OutcomeType::Missed),
        stats.get(OutcomeType::LiveQuery)
    );
}
