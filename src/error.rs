//! Error types for input loading, policy configuration and trade calculation.

use std::fmt;
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("cannot read input file {}: {source}", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    MissingColumns {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("invalid {field} {raw:?}: {reason}")]
    InvalidField {
        field: &'static str,
        raw: String,
        reason: String,
    },

    #[error("stop-loss {stop_loss} is not usable against entry price {entry_price}")]
    InvalidStopLoss {
        entry_price: Decimal,
        stop_loss: Decimal,
    },

    #[error("entry equals pivot ({price}), direction is ambiguous")]
    EqualPrices { price: Decimal },

    #[error("{field} exceeds the decimal range")]
    Overflow { field: &'static str },

    #[error("invalid formula policy: {0}")]
    Policy(String),

    #[error("cannot load policy file {}: {reason}", path.display())]
    PolicyFile { path: PathBuf, reason: String },
}

impl CalcError {
    pub fn invalid_field(field: &'static str, raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

/// All problems found on a single input row.
#[derive(Debug)]
pub struct RowError {
    /// Line number in the source file (1-based)
    pub line: u64,
    pub errors: Vec<CalcError>,
}

impl RowError {
    pub fn new(line: u64, errors: Vec<CalcError>) -> Self {
        Self { line, errors }
    }

    pub fn single(line: u64, error: CalcError) -> Self {
        Self::new(line, vec![error])
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for RowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_joins_messages() {
        let err = RowError::new(
            4,
            vec![
                CalcError::invalid_field("entry", "abc", "not a number"),
                CalcError::invalid_field("pivot", "", "missing value"),
            ],
        );
        assert_eq!(
            err.to_string(),
            "line 4: invalid entry \"abc\": not a number; invalid pivot \"\": missing value"
        );
    }
}
