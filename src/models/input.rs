//! Raw trade setup as entered in the input file.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::trading::{normalize_pair, MagnitudeResolver};

/// Column positions in an input row.
pub mod columns {
    pub const PAIR: usize = 0;
    pub const ACCOUNT_BALANCE: usize = 1;
    pub const RISK_PERCENT: usize = 2;
    pub const SPREAD: usize = 3;
    pub const ENTRY: usize = 4;
    pub const PIVOT: usize = 5;
    pub const TP1_HIT: usize = 6;
    pub const TP2_HIT: usize = 7;

    /// Columns every row must have; hit flags are optional.
    pub const REQUIRED: usize = 6;
}

/// Whether a take-profit level was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitFlag {
    Hit,
    Missed,
    /// Not recorded, or not a recognizable boolean
    Unknown,
}

impl HitFlag {
    /// Permissive boolean parse: `1 t T TRUE true True` / `0 f F FALSE false False`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("1" | "t" | "T" | "TRUE" | "true" | "True") => Self::Hit,
            Some("0" | "f" | "F" | "FALSE" | "false" | "False") => Self::Missed,
            _ => Self::Unknown,
        }
    }
}

/// One candidate trade, parsed and range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTradeInput {
    /// Normalized `base_quote` identifier, e.g. `eur_usd`
    pub pair: String,

    /// Account balance in account currency
    pub account_balance: Decimal,

    /// Percentage of balance to risk (0 to 100)
    pub risk_percent: Decimal,

    /// Spread in points (divided by magnitude)
    pub spread: Decimal,

    /// Entry price
    pub entry: Decimal,

    /// Entry price exactly as typed; its precision sets the magnitude
    pub entry_text: String,

    /// Structural reference level the stop sits behind
    pub pivot: Decimal,

    pub tp1_hit: HitFlag,
    pub tp2_hit: HitFlag,
}

impl RawTradeInput {
    /// Parse one row's fields. Every bad field is reported, not just the first.
    pub fn from_fields(fields: &[&str]) -> Result<Self, Vec<CalcError>> {
        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");
        let mut errors = Vec::new();

        let pair = normalize_pair(field(columns::PAIR));
        if pair.is_empty() {
            errors.push(CalcError::invalid_field("pair", "", "missing value"));
        }

        let account_balance = collect(
            &mut errors,
            parse_decimal("account balance", field(columns::ACCOUNT_BALANCE)).and_then(|v| {
                check(v >= Decimal::ZERO, "account balance", v, "must not be negative")
            }),
        );
        let risk_percent = collect(
            &mut errors,
            parse_decimal("risk percent", field(columns::RISK_PERCENT)).and_then(|v| {
                check(
                    v >= Decimal::ZERO && v <= dec!(100),
                    "risk percent",
                    v,
                    "must be between 0 and 100",
                )
            }),
        );
        let spread = collect(
            &mut errors,
            parse_decimal("spread", field(columns::SPREAD))
                .and_then(|v| check(v >= Decimal::ZERO, "spread", v, "must not be negative")),
        );
        let entry_text = field(columns::ENTRY).to_string();
        let entry = collect(
            &mut errors,
            parse_decimal("entry", &entry_text)
                .and_then(|v| check(v > Decimal::ZERO, "entry", v, "must be positive"))
                .and_then(|v| MagnitudeResolver::resolve(&entry_text).map(|_| v)),
        );
        let pivot = collect(
            &mut errors,
            parse_decimal("pivot", field(columns::PIVOT))
                .and_then(|v| check(v > Decimal::ZERO, "pivot", v, "must be positive")),
        );

        match (account_balance, risk_percent, spread, entry, pivot) {
            (Some(account_balance), Some(risk_percent), Some(spread), Some(entry), Some(pivot))
                if errors.is_empty() =>
            {
                Ok(Self {
                    pair,
                    account_balance,
                    risk_percent,
                    spread,
                    entry,
                    entry_text,
                    pivot,
                    tp1_hit: HitFlag::parse(fields.get(columns::TP1_HIT).copied()),
                    tp2_hit: HitFlag::parse(fields.get(columns::TP2_HIT).copied()),
                })
            }
            _ => Err(errors),
        }
    }

    /// Money put at risk before lot truncation.
    pub fn target_risk(&self) -> Decimal {
        self.risk_percent / dec!(100) * self.account_balance
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> CalcResult<Decimal> {
    if raw.is_empty() {
        return Err(CalcError::invalid_field(field, raw, "missing value"));
    }
    Decimal::from_str(raw).map_err(|e| CalcError::invalid_field(field, raw, e.to_string()))
}

fn check(ok: bool, field: &'static str, value: Decimal, reason: &str) -> CalcResult<Decimal> {
    if ok {
        Ok(value)
    } else {
        Err(CalcError::invalid_field(field, &value.to_string(), reason))
    }
}

fn collect(errors: &mut Vec<CalcError>, result: CalcResult<Decimal>) -> Option<Decimal> {
    result.map_err(|e| errors.push(e)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_flag_parse() {
        assert_eq!(HitFlag::parse(Some("true")), HitFlag::Hit);
        assert_eq!(HitFlag::parse(Some(" T ")), HitFlag::Hit);
        assert_eq!(HitFlag::parse(Some("1")), HitFlag::Hit);
        assert_eq!(HitFlag::parse(Some("False")), HitFlag::Missed);
        assert_eq!(HitFlag::parse(Some("0")), HitFlag::Missed);
        assert_eq!(HitFlag::parse(Some("yes")), HitFlag::Unknown);
        assert_eq!(HitFlag::parse(Some("")), HitFlag::Unknown);
        assert_eq!(HitFlag::parse(None), HitFlag::Unknown);
    }

    #[test]
    fn test_parse_full_row() {
        let input = RawTradeInput::from_fields(&[
            "EUR_USD", "10000", "1", "0.00010", "1.10500", "1.10000", "true", "false",
        ])
        .unwrap();

        assert_eq!(input.pair, "eur_usd");
        assert_eq!(input.account_balance, dec!(10000));
        assert_eq!(input.entry, dec!(1.105));
        assert_eq!(input.entry_text, "1.10500");
        assert_eq!(input.tp1_hit, HitFlag::Hit);
        assert_eq!(input.tp2_hit, HitFlag::Missed);
        assert_eq!(input.target_risk(), dec!(100));
    }

    #[test]
    fn test_hit_columns_optional() {
        let input =
            RawTradeInput::from_fields(&["usd_jpy", "5000", "2", "1.5", "151.250", "150.900"])
                .unwrap();
        assert_eq!(input.tp1_hit, HitFlag::Unknown);
        assert_eq!(input.tp2_hit, HitFlag::Unknown);
    }

    #[test]
    fn test_collects_every_bad_field() {
        let errors =
            RawTradeInput::from_fields(&["eur_usd", "lots", "1", "0.1", "abc", ""]).unwrap_err();

        let fields: Vec<_> = errors
            .iter()
            .map(|e| match e {
                CalcError::InvalidField { field, .. } => *field,
                other => panic!("unexpected error {:?}", other),
            })
            .collect();
        assert_eq!(fields, vec!["account balance", "entry", "pivot"]);
    }

    #[test]
    fn test_range_checks() {
        let errors =
            RawTradeInput::from_fields(&["eur_usd", "-1", "150", "-2", "1.1", "0"]).unwrap_err();
        assert_eq!(errors.len(), 4);

        let errors = RawTradeInput::from_fields(&["", "100", "1", "0", "1.1", "1.0"]).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_entry_precision_limit() {
        let entry = format!("1.{}", "5".repeat(25));
        let errors =
            RawTradeInput::from_fields(&["eur_usd", "1000", "1", "0", &entry, "1.0"]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            CalcError::InvalidField { field: "entry", .. }
        ));
    }
}
