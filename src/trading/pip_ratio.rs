//! Pip ratio lookup: per-pair divisor converting a scaled price distance into money.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{CalcError, CalcResult};

/// Ratio applied to any pair missing from the table.
pub const DEFAULT_PIP_RATIO: Decimal = dec!(1);

const STANDARD_RATIOS: &[(&str, Decimal)] = &[
    ("aud_cad", dec!(1)),
    ("aud_chf", dec!(1)),
    ("aud_jpy", dec!(1.49)),
    ("aud_nzd", dec!(1)),
    ("aud_usd", dec!(1)),
    ("cad_chf", dec!(1)),
    ("cad_jpy", dec!(1)),
    ("chf_jpy", dec!(1.49)),
    ("eur_aud", dec!(1)),
    ("eur_cad", dec!(1)),
    ("eur_chf", dec!(0.9)),
    ("eur_gbp", dec!(0.79)),
    ("eur_jpy", dec!(1.49)),
    ("eur_nzd", dec!(1)),
    ("eur_usd", dec!(1)),
    ("gbp_aud", dec!(1)),
    ("gbp_cad", dec!(1)),
    ("gbp_chf", dec!(1)),
    ("gbp_jpy", dec!(1.49)),
    ("gbp_nzd", dec!(1)),
    ("gbp_usd", dec!(1)),
    ("nzd_cad", dec!(1)),
    ("nzd_chf", dec!(1)),
    ("nzd_jpy", dec!(1)),
    ("nzd_usd", dec!(1)),
    ("usd_cad", dec!(1)),
    ("usd_chf", dec!(0.9)),
    ("usd_jpy", dec!(1.49)),
    ("xau_usd", dec!(1)),
];

/// Normalize a pair identifier to `base_quote` form: `EUR/USD` -> `eur_usd`.
pub fn normalize_pair(pair: &str) -> String {
    pair.trim()
        .chars()
        .map(|c| match c {
            '/' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Immutable pair -> pip ratio mapping, built once and handed to the calculator.
#[derive(Debug, Clone)]
pub struct PipRatioTable {
    ratios: BTreeMap<String, Decimal>,
}

impl PipRatioTable {
    /// The built-in forex table.
    pub fn standard() -> Self {
        let ratios = STANDARD_RATIOS
            .iter()
            .map(|(pair, ratio)| (pair.to_string(), *ratio))
            .collect();
        Self { ratios }
    }

    /// Add or replace entries. Every override must be strictly positive.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Decimal>) -> CalcResult<Self> {
        for (pair, ratio) in overrides {
            if *ratio <= Decimal::ZERO {
                return Err(CalcError::Policy(format!(
                    "pip ratio for {} must be positive, got {}",
                    pair, ratio
                )));
            }
            self.ratios.insert(normalize_pair(pair), *ratio);
        }
        Ok(self)
    }

    /// Ratio for a pair, if the table knows it.
    pub fn get(&self, pair: &str) -> Option<Decimal> {
        self.ratios.get(&normalize_pair(pair)).copied()
    }

    /// Ratio for a pair, falling back to [`DEFAULT_PIP_RATIO`].
    pub fn ratio(&self, pair: &str) -> Decimal {
        self.get(pair).unwrap_or(DEFAULT_PIP_RATIO)
    }

    /// Entries in pair order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.ratios.iter().map(|(pair, ratio)| (pair.as_str(), *ratio))
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }
}
