//! Run-level helpers shared by the pipeline and the binary.
//!
//! This module provides progress logging, end-of-run statistics, and
//! interrupt handling.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::{shutdown_gracefully, spawn_interrupt_watcher};
pub use statistics::{print_outcome_statistics, print_run_summary};
