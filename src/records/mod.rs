//! Input record table.
//!
//! Records are read once, up front, so a missing column fails the run before
//! any lookup is made. Every original cell is kept and written through to the
//! outputs unchanged.

mod parse;

use std::path::Path;

use log::{info, warn};

use crate::config::{AMOUNT_COLUMN, DEFAULT_STATE_COLUMN, DEFAULT_VENUE_COLUMN, ROUND_COLUMNS};
use crate::error_handling::InputError;

pub use parse::{parse_amount_cents, parse_round};

/// Names of the columns a lookup query is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumns {
    pub venue: String,
    pub state: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            venue: DEFAULT_VENUE_COLUMN.to_string(),
            state: DEFAULT_STATE_COLUMN.to_string(),
        }
    }
}

/// One row of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub venue_name: String,
    pub state: String,
    pub round: Option<u32>,
    pub amount_cents: Option<i64>,
    /// Every cell of the original row, `(header, value)`, in column order
    pub fields: Vec<(String, String)>,
}

impl InputRecord {
    /// Free-text lookup query: `"{venue}, {state}, {country}"`.
    pub fn query(&self, country: &str) -> String {
        format!("{}, {}, {}", self.venue_name, self.state, country)
    }
}

/// Header row plus records, in file order.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub records: Vec<InputRecord>,
}

impl InputTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads the input CSV.
///
/// # Errors
///
/// - [`InputError::NotFound`] if `path` is not a file
/// - [`InputError::MissingColumn`] if the venue or state column is absent
/// - [`InputError::Csv`] on malformed CSV
pub fn read_input_records(path: &Path, columns: &InputColumns) -> Result<InputTable, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InputError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let venue_idx = column_index(&columns.venue)?;
    let state_idx = column_index(&columns.state)?;
    let round_idx = ROUND_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name));
    let amount_idx = headers.iter().position(|h| h == AMOUNT_COLUMN);

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let cells = result?;
        let cell = |idx: usize| cells.get(idx).unwrap_or("").trim().to_string();

        let round = round_idx.and_then(|idx| parse_optional(row, "round", &cell(idx), parse_round));
        let amount_cents = amount_idx
            .and_then(|idx| parse_optional(row, AMOUNT_COLUMN, &cell(idx), parse_amount_cents));

        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), cells.get(idx).unwrap_or("").to_string()))
            .collect();

        records.push(InputRecord {
            row,
            venue_name: cell(venue_idx),
            state: cell(state_idx),
            round,
            amount_cents,
            fields,
        });
    }

    info!("Read {} records from {}", records.len(), path.display());
    Ok(InputTable { headers, records })
}

/// Empty cells are silently absent; unparseable ones are logged and absent.
fn parse_optional<T>(row: usize, column: &str, raw: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    if raw.is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Row {row}: ignoring unparseable {column} value {raw:?}");
    }
    parsed
}
