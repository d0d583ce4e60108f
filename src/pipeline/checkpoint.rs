//! Transient checkpoint of resolved records.
//!
//! The checkpoint has the resolved table's layout and is rewritten in full
//! each time. It is only a recovery aid for inspection; resuming relies on the
//! lookup cache, which replays every previously resolved query for free.

use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use super::output::{write_resolved_csv, OutputSchema};
use super::state::ResolvedRecord;
use crate::error_handling::OutputError;

pub fn write_checkpoint(
    path: &Path,
    schema: &OutputSchema,
    resolved: &[ResolvedRecord],
) -> Result<(), OutputError> {
    write_resolved_csv(path, schema, resolved)?;
    debug!("Checkpoint of {} resolved rows saved to {}", resolved.len(), path.display());
    Ok(())
}

/// Deletes the checkpoint after a clean run. A missing file is not an error.
pub fn remove_checkpoint(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed checkpoint {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove checkpoint {}: {}", path.display(), e),
    }
}

/// Logs a checkpoint left by an earlier interrupted run.
pub fn report_existing_checkpoint(path: &Path) {
    if path.is_file() {
        info!(
            "Found checkpoint from a previous run at {}; cached lookups will be replayed",
            path.display()
        );
    }
}
