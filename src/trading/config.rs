//! Formula policy: the knobs that distinguish one sizing variant from another.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// What the lot-size formula divides the scaled stop distance by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSizeDivisor {
    /// Pair's pip ratio for every pair
    PipRatio,
    /// Stop-loss price for `usd_*` pairs, pip ratio for the rest
    StopLossPrice,
}

impl fmt::Display for LotSizeDivisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PipRatio => write!(f, "pip_ratio"),
            Self::StopLossPrice => write!(f, "stop_loss_price"),
        }
    }
}

/// Direction assigned when entry and pivot are the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualPriceDirection {
    Sell,
    Buy,
    /// Refuse the row
    Reject,
}

impl fmt::Display for EqualPriceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sell => write!(f, "sell"),
            Self::Buy => write!(f, "buy"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Named formula variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// 50-point buffer, raw entry, TPs at 1R and 3R
    Classic,
    /// 5-point buffer, spread applied to entry, TPs at 1R, 2R and 3R
    Slippage,
    /// As `slippage`, sizing `usd_*` pairs against the stop-loss price
    UsdQuoted,
}

/// Configuration of the trade calculation formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaPolicy {
    /// Extra points placed beyond the pivot (divided by magnitude)
    pub stop_loss_buffer: Decimal,

    /// Move the entry by the spread against the trade
    pub apply_spread_to_entry: bool,

    /// Divisor used in lot sizing and money values
    pub lot_size_divisor: LotSizeDivisor,

    /// Risk multiples for take-profit levels; the first two drive the outcome value
    pub tp_multiples: Vec<Decimal>,

    /// Tie-break when entry == pivot
    pub equal_price_direction: EqualPriceDirection,

    /// Extra or replacement pip ratios
    pub pip_ratios: BTreeMap<String, Decimal>,
}

impl Default for FormulaPolicy {
    fn default() -> Self {
        Self::preset(Preset::Classic)
    }
}

impl FormulaPolicy {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self {
                stop_loss_buffer: dec!(50),
                apply_spread_to_entry: false,
                lot_size_divisor: LotSizeDivisor::PipRatio,
                tp_multiples: vec![dec!(1), dec!(3)],
                equal_price_direction: EqualPriceDirection::Sell,
                pip_ratios: BTreeMap::new(),
            },
            Preset::Slippage => Self {
                stop_loss_buffer: dec!(5),
                apply_spread_to_entry: true,
                lot_size_divisor: LotSizeDivisor::PipRatio,
                tp_multiples: vec![dec!(1), dec!(2), dec!(3)],
                equal_price_direction: EqualPriceDirection::Sell,
                pip_ratios: BTreeMap::new(),
            },
            Preset::UsdQuoted => Self {
                lot_size_divisor: LotSizeDivisor::StopLossPrice,
                ..Self::preset(Preset::Slippage)
            },
        }
    }

    /// Load a policy from a JSON file. Missing fields take the classic defaults.
    pub fn from_file(path: &Path) -> CalcResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CalcError::PolicyFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let policy: Self = serde_json::from_str(&contents).map_err(|e| CalcError::PolicyFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.stop_loss_buffer < Decimal::ZERO {
            return Err(CalcError::Policy(format!(
                "stop_loss_buffer must not be negative, got {}",
                self.stop_loss_buffer
            )));
        }

        if self.tp_multiples.len() < 2 {
            return Err(CalcError::Policy(format!(
                "at least two tp_multiples are required, got {}",
                self.tp_multiples.len()
            )));
        }

        if let Some(bad) = self.tp_multiples.iter().find(|m| **m <= Decimal::ZERO) {
            return Err(CalcError::Policy(format!(
                "tp_multiples must be positive, got {}",
                bad
            )));
        }

        if let Some((pair, ratio)) = self.pip_ratios.iter().find(|(_, r)| **r <= Decimal::ZERO) {
            return Err(CalcError::Policy(format!(
                "pip ratio for {} must be positive, got {}",
                pair, ratio
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        for preset in [Preset::Classic, Preset::Slippage, Preset::UsdQuoted] {
            assert!(FormulaPolicy::preset(preset).validate().is_ok(), "{:?}", preset);
        }
    }

    #[test]
    fn test_usd_quoted_preset() {
        let policy = FormulaPolicy::preset(Preset::UsdQuoted);
        assert_eq!(policy.lot_size_divisor, LotSizeDivisor::StopLossPrice);
        assert_eq!(policy.stop_loss_buffer, dec!(5));
        assert!(policy.apply_spread_to_entry);
        assert_eq!(policy.tp_multiples, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn test_validation() {
        let policy = FormulaPolicy {
            tp_multiples: vec![dec!(1)],
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(CalcError::Policy(_))));

        let policy = FormulaPolicy {
            tp_multiples: vec![dec!(1), dec!(0)],
            ..Default::default()
        };
        assert!(policy.validate().is_err());

        let policy = FormulaPolicy {
            stop_loss_buffer: dec!(-1),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"stop_loss_buffer": 5, "tp_multiples": ["1", "2", "3"], "lot_size_divisor": "stop_loss_price"}}"#
        )
        .unwrap();

        let policy = FormulaPolicy::from_file(file.path()).unwrap();
        assert_eq!(policy.stop_loss_buffer, dec!(5));
        assert_eq!(policy.tp_multiples.len(), 3);
        assert_eq!(policy.lot_size_divisor, LotSizeDivisor::StopLossPrice);
        assert!(!policy.apply_spread_to_entry);
        assert_eq!(policy.equal_price_direction, EqualPriceDirection::Sell);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = FormulaPolicy::from_file(Path::new("/nonexistent/policy.json"));
        assert!(matches!(missing, Err(CalcError::PolicyFile { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let garbage = FormulaPolicy::from_file(file.path());
        assert!(matches!(garbage, Err(CalcError::PolicyFile { .. })));
    }
}
