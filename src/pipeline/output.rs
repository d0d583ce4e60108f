//! CSV output tables.
//!
//! Both outputs share one schema: the input headers followed by the geocode
//! columns; the missed table also carries `reason`. Input columns whose name
//! collides with an appended column are dropped so the appended value wins.
//! Files are written to a temp file in the destination directory and renamed
//! into place, so a crash never leaves a truncated table behind.

use std::path::Path;

use csv::Writer;
use log::debug;
use tempfile::NamedTempFile;

use super::state::{MissedRecord, ResolvedRecord};
use crate::config::{COLUMN_REASON, GEOCODE_COLUMNS};
use crate::error_handling::OutputError;
use crate::records::InputRecord;

/// Column layout shared by the resolved, missed and checkpoint tables.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    input_headers: Vec<String>,
}

impl OutputSchema {
    pub fn new(input_headers: &[String]) -> Self {
        Self {
            input_headers: input_headers
                .iter()
                .filter(|h| !is_appended_column(h))
                .cloned()
                .collect(),
        }
    }

    pub fn resolved_header(&self) -> Vec<&str> {
        self.input_headers
            .iter()
            .map(String::as_str)
            .chain(GEOCODE_COLUMNS.iter().copied())
            .collect()
    }

    pub fn missed_header(&self) -> Vec<&str> {
        let mut header = self.resolved_header();
        header.push(COLUMN_REASON);
        header
    }

    fn input_cells(&self, input: &InputRecord) -> Vec<String> {
        input
            .fields
            .iter()
            .filter(|(header, _)| !is_appended_column(header))
            .map(|(_, value)| value.clone())
            .collect()
    }

    fn resolved_row(&self, record: &ResolvedRecord) -> Vec<String> {
        let candidate = &record.candidate;
        let mut row = self.input_cells(&record.input);
        row.extend([
            candidate.formatted_address.clone(),
            candidate.latitude.to_string(),
            candidate.longitude.to_string(),
            candidate.name.clone(),
            candidate.types_joined(),
            record.electorate.clone().unwrap_or_default(),
        ]);
        row
    }

    fn missed_row(&self, record: &MissedRecord) -> Vec<String> {
        let mut row = self.input_cells(&record.input);
        row.extend(GEOCODE_COLUMNS.iter().map(|_| String::new()));
        row.push(record.reason.as_str().to_string());
        row
    }
}

fn is_appended_column(header: &str) -> bool {
    header == COLUMN_REASON || GEOCODE_COLUMNS.contains(&header)
}

/// Atomically writes the resolved table.
pub fn write_resolved_csv(
    path: &Path,
    schema: &OutputSchema,
    records: &[ResolvedRecord],
) -> Result<(), OutputError> {
    write_atomic(path, |writer| {
        writer.write_record(schema.resolved_header())?;
        for record in records {
            writer.write_record(schema.resolved_row(record))?;
        }
        Ok(())
    })?;
    debug!("Wrote {} resolved rows to {}", records.len(), path.display());
    Ok(())
}

/// Atomically writes the missed table.
pub fn write_missed_csv(
    path: &Path,
    schema: &OutputSchema,
    records: &[MissedRecord],
) -> Result<(), OutputError> {
    write_atomic(path, |writer| {
        writer.write_record(schema.missed_header())?;
        for record in records {
            writer.write_record(schema.missed_row(record))?;
        }
        Ok(())
    })?;
    debug!("Wrote {} missed rows to {}", records.len(), path.display());
    Ok(())
}

fn write_atomic<F>(path: &Path, write_rows: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut Writer<&mut std::fs::File>) -> Result<(), csv::Error>,
{
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = Writer::from_writer(temp.as_file_mut());
        write_rows(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path)?;
    Ok(())
}
