//! Trade model: a fully computed order ready for manual entry.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trading::Outcome;

use super::RawTradeInput;

/// Display format for trade timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }

    /// +1 for buys, -1 for sells: the sign of a favourable price move.
    pub fn sign(&self) -> Decimal {
        match self {
            TradeSide::Buy => Decimal::ONE,
            TradeSide::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One take-profit tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfit {
    /// Distance from entry in units of initial risk (R)
    pub multiple: Decimal,

    /// Target price
    pub price: Decimal,

    /// Money made if the target is reached
    pub profit: Decimal,
}

/// Identity assigned to a trade when it is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
}

/// Computed order parameters for one input row. Built once by the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,

    /// Local wall-clock time of the calculation
    pub created_at: NaiveDateTime,

    #[serde(flatten)]
    pub input: RawTradeInput,

    pub direction: TradeSide,

    /// 10^(fractional digits of the entry as typed)
    pub magnitude: u64,

    /// Pip ratio used for the money conversions
    pub pip_ratio: Decimal,

    /// Order entry price (raw entry, or spread-adjusted)
    pub entry_price: Decimal,

    pub stop_loss: Decimal,

    /// Position size, truncated to 2 decimals
    pub lot_size: Decimal,

    /// Money lost at the stop with the truncated lot size
    pub risk_amount: Decimal,

    pub take_profits: Vec<TakeProfit>,

    pub outcome: Outcome,

    /// Realized value; `None` while the outcome is unknown
    pub trade_value: Option<Decimal>,
}

impl Trade {
    /// First characters of the id, as shown in the report.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..4].to_string()
    }

    pub fn timestamp(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Entry-to-stop price distance (1R).
    pub fn point_distance(&self) -> Decimal {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Returns true if the stop sits on the losing side of the entry.
    pub fn is_stop_protective(&self) -> bool {
        match self.direction {
            TradeSide::Buy => self.stop_loss < self.entry_price,
            TradeSide::Sell => self.stop_loss > self.entry_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HitFlag;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_trade(direction: TradeSide, entry_price: Decimal, stop_loss: Decimal) -> Trade {
        Trade {
            id: Uuid::parse_str("9f1c2d3e-0000-4000-8000-000000000000").unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 5)
                .unwrap(),
            input: RawTradeInput {
                pair: "eur_usd".to_string(),
                account_balance: dec!(10000),
                risk_percent: dec!(1),
                spread: dec!(0),
                entry: entry_price,
                entry_text: entry_price.to_string(),
                pivot: stop_loss,
                tp1_hit: HitFlag::Unknown,
                tp2_hit: HitFlag::Unknown,
            },
            direction,
            magnitude: 100_000,
            pip_ratio: dec!(1),
            entry_price,
            stop_loss,
            lot_size: dec!(0.5),
            risk_amount: dec!(100),
            take_profits: vec![],
            outcome: Outcome::Unknown,
            trade_value: None,
        }
    }

    #[test]
    fn test_display_fields() {
        let trade = make_trade(TradeSide::Buy, dec!(1.105), dec!(1.1));
        assert_eq!(trade.short_id(), "9f1c");
        assert_eq!(trade.timestamp(), "2024-03-01 09:30:05");
        assert_eq!(trade.direction.to_string(), "BUY");
        assert_eq!(trade.point_distance(), dec!(0.005));
    }

    #[test]
    fn test_stop_side() {
        assert!(make_trade(TradeSide::Buy, dec!(1.105), dec!(1.1)).is_stop_protective());
        assert!(!make_trade(TradeSide::Sell, dec!(1.105), dec!(1.1)).is_stop_protective());
        assert!(make_trade(TradeSide::Sell, dec!(1.1), dec!(1.105)).is_stop_protective());
    }
}
