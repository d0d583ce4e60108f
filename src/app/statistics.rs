//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{OutcomeType, ProcessingStats};
use crate::pipeline::PipelineReport;

/// Prints a one-line summary of the run.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_run_summary(report: &PipelineReport) {
    info!(
        "✅ Processed {} record{} ({} resolved, {} missed, {} without electorate) in {:.1}s",
        report.processed,
        if report.processed == 1 { "" } else { "s" },
        report.resolved,
        report.missed,
        report.unmatched,
        report.elapsed_seconds
    );
    info!(
        "Lookups: {} live, {} from cache",
        report.live_queries, report.cache_hits
    );
    if report.stopped_at_query_limit() {
        info!(
            "Stopped at the query limit; {} of {} records were not attempted",
            report.skipped, report.total_records
        );
    }
    info!(
        "Outputs: {} and {}",
        report.resolved_path.display(),
        report.missed_path.display()
    );
}

/// Prints failure and informational outcome counts to the log.
pub fn print_outcome_statistics(stats: &ProcessingStats) {
    let total_failures = stats.total_failures();
    if total_failures > 0 {
        info!("Failure Counts ({} total):", total_failures);
        for outcome in OutcomeType::iter().filter(OutcomeType::is_failure_reason) {
            let count = stats.get(outcome);
            if count > 0 {
                info!("   {}: {}", outcome.as_str(), count);
            }
        }
    }

    let informational = [OutcomeType::NoElectorate, OutcomeType::CacheHit, OutcomeType::LiveQuery];
    if informational.iter().any(|outcome| stats.get(*outcome) > 0) {
        info!("Info Counts:");
        for outcome in informational {
            let count = stats.get(outcome);
            if count > 0 {
                info!("   {}: {}", outcome.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(skipped: usize) -> PipelineReport {
        PipelineReport {
            total_records: 10,
            processed: 10 - skipped,
            resolved: 7 - skipped,
            missed: 3,
            skipped,
            live_queries: 6,
            cache_hits: 4,
            unmatched: 1,
            elapsed_seconds: 1.5,
            resolved_path: PathBuf::from("resolved.csv"),
            missed_path: PathBuf::from("missed.csv"),
        }
    }

    #[test]
    fn test_print_outcome_statistics_no_outcomes() {
        let stats = ProcessingStats::new();
        // Should not panic when nothing happened
        print_outcome_statistics(&stats);
    }

    #[test]
    fn test_print_outcome_statistics_with_failures() {
        let stats = ProcessingStats::new();
        stats.increment(OutcomeType::NoCandidate);
        stats.increment(OutcomeType::RateLimitExceeded);
        stats.increment(OutcomeType::CacheHit);
        print_outcome_statistics(&stats);
    }

    #[test]
    fn test_print_run_summary() {
        print_run_summary(&report(0));
        print_run_summary(&report(2));
        assert!(report(2).stopped_at_query_limit());
        assert!(!report(0).stopped_at_query_limit());
    }
}
