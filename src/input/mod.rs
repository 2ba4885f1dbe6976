//! CSV loading of trade setups.
//!
//! Layout: `pair, accountBalance, riskPercent, spread, entry, pivot[, tp1Hit, tp2Hit]`.
//! The first non-comment row is a header; lines starting with `#` are skipped.
//! A file that cannot be read or a malformed CSV aborts the batch. Bad field
//! values only fail their own row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::error::{CalcError, CalcResult, RowError};
use crate::models::{columns, RawTradeInput};

/// A data row and its parse result.
#[derive(Debug)]
pub struct InputRow {
    /// Line number in the source file (1-based)
    pub line: u64,
    pub parsed: Result<RawTradeInput, RowError>,
}

/// Read every setup from a CSV file.
pub fn read_trades(path: &Path) -> CalcResult<Vec<InputRow>> {
    let file = File::open(path).map_err(|source| CalcError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = read_trades_from(file)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded trade setups");
    Ok(rows)
}

/// Read every setup from any CSV source.
pub fn read_trades_from<R: Read>(reader: R) -> CalcResult<Vec<InputRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < columns::REQUIRED {
            return Err(CalcError::MissingColumns {
                line,
                expected: columns::REQUIRED,
                found: record.len(),
            });
        }

        let fields: Vec<&str> = record.iter().collect();
        let parsed = RawTradeInput::from_fields(&fields).map_err(|errors| {
            debug!(line = line, errors = errors.len(), "Row rejected");
            RowError::new(line, errors)
        });

        rows.push(InputRow { line, parsed });
    }

    Ok(rows)
}
