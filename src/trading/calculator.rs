//! Trade calculator: stop-loss, lot size and take-profit tiers for one setup.
//!
//! For a setup with entry `E`, pivot `P`, spread `s`, buffer `b` and magnitude `m`:
//!
//! ```text
//! direction   = BUY if E > P else SELL
//! stop_loss   = P -/+ (s + b) / m
//! distance    = |entry_price - stop_loss|
//! lot_size    = floor2(risk% * balance / (distance * m / divisor))
//! risk_amount = lot_size * distance * m / divisor
//! tp_k        = entry_price + k * (entry_price - stop_loss)
//! ```
//!
//! `divisor` is the pair's pip ratio, or the stop-loss price for `usd_*` pairs
//! under [`LotSizeDivisor::StopLossPrice`].

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::error::{CalcError, CalcResult, RowError};
use crate::input::InputRow;
use crate::models::{RawTradeInput, Stamp, TakeProfit, Trade, TradeSide};

use super::{
    EqualPriceDirection, FormulaPolicy, LotSizeDivisor, MagnitudeResolver, Outcome,
    OutcomeValuator, PipRatioTable, StampSource, DEFAULT_PIP_RATIO,
};

/// Decimal places kept on the lot size.
pub const LOT_SIZE_DP: u32 = 2;

/// Trades and row failures from one input batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub trades: Vec<Trade>,
    pub errors: Vec<RowError>,
}

impl BatchResult {
    /// Sum of trade values whose outcome is known. `None` if the sum overflows.
    pub fn realized_total(&self) -> Option<Decimal> {
        self.trades
            .iter()
            .filter_map(|t| t.trade_value)
            .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
    }
}

/// Computes trades under a fixed formula policy and pip-ratio table.
pub struct TradeCalculator {
    policy: FormulaPolicy,
    pip_ratios: PipRatioTable,
}

impl TradeCalculator {
    /// Create a calculator. The policy is validated and its pip-ratio
    /// overrides are merged into `pip_ratios`.
    pub fn new(policy: FormulaPolicy, pip_ratios: PipRatioTable) -> CalcResult<Self> {
        policy.validate()?;
        let pip_ratios = pip_ratios.with_overrides(&policy.pip_ratios)?;
        Ok(Self { policy, pip_ratios })
    }

    pub fn policy(&self) -> &FormulaPolicy {
        &self.policy
    }

    pub fn pip_ratios(&self) -> &PipRatioTable {
        &self.pip_ratios
    }

    /// Compute the full order for one setup.
    pub fn calculate(&self, input: RawTradeInput, stamp: Stamp) -> CalcResult<Trade> {
        let direction = self.direction(input.entry, input.pivot)?;
        let magnitude = MagnitudeResolver::resolve(&input.entry_text)?;
        let scale = Decimal::from(magnitude);
        let sign = direction.sign();

        let spread = input.spread / scale;
        let buffer = self.policy.stop_loss_buffer / scale;
        let offset = checked(spread.checked_add(buffer), "stop-loss")?;
        let stop_loss = checked(input.pivot.checked_sub(sign * offset), "stop-loss")?;

        let entry_price = if self.policy.apply_spread_to_entry {
            checked(input.entry.checked_add(sign * spread), "entry price")?
        } else {
            input.entry
        };

        let one_r = checked(entry_price.checked_sub(stop_loss), "stop-loss")?;
        let point_distance = one_r.abs();
        if point_distance.is_zero() {
            return Err(CalcError::InvalidStopLoss {
                entry_price,
                stop_loss,
            });
        }

        if self.pip_ratios.get(&input.pair).is_none() {
            warn!(pair = %input.pair, "Unknown pair, using default pip ratio {}", DEFAULT_PIP_RATIO);
        }
        let pip_ratio = self.pip_ratios.ratio(&input.pair);
        let divisor = self.divisor(&input.pair, stop_loss, pip_ratio);

        // Only the stop-price divisor can be non-positive
        if divisor <= Decimal::ZERO {
            return Err(CalcError::InvalidStopLoss {
                entry_price,
                stop_loss,
            });
        }

        // Money moved per lot over one R
        let value_per_lot = checked(
            point_distance
                .checked_mul(scale)
                .and_then(|v| v.checked_div(divisor)),
            "risk amount",
        )?;

        let target_risk = input.target_risk();
        let lot_size = checked(target_risk.checked_div(value_per_lot), "lot size")?
            .round_dp_with_strategy(LOT_SIZE_DP, RoundingStrategy::ToNegativeInfinity);
        let risk_amount = checked(lot_size.checked_mul(value_per_lot), "risk amount")?;

        let take_profits = self
            .policy
            .tp_multiples
            .iter()
            .map(|multiple| -> CalcResult<TakeProfit> {
                let reach = multiple.checked_mul(one_r);
                let price = checked(
                    reach.and_then(|r| entry_price.checked_add(r)),
                    "take-profit",
                )?;
                let profit = checked(
                    lot_size
                        .checked_mul((price - entry_price).abs())
                        .and_then(|v| v.checked_mul(scale))
                        .and_then(|v| v.checked_div(divisor)),
                    "take-profit",
                )?;
                Ok(TakeProfit {
                    multiple: *multiple,
                    price,
                    profit,
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;

        // validate() guarantees at least two tiers
        let outcome = Outcome::from_flags(input.tp1_hit, input.tp2_hit);
        let trade_value = OutcomeValuator::value(
            outcome,
            take_profits[0].profit,
            take_profits[1].profit,
            risk_amount,
        )?;

        let trade = Trade {
            id: stamp.id,
            created_at: stamp.created_at,
            input,
            direction,
            magnitude,
            pip_ratio,
            entry_price,
            stop_loss,
            lot_size,
            risk_amount,
            take_profits,
            outcome,
            trade_value,
        };
        debug_assert!(trade.is_stop_protective());

        debug!(
            pair = %trade.input.pair,
            direction = %trade.direction,
            magnitude = magnitude,
            distance = %trade.point_distance(),
            lot_size = %lot_size,
            risk_amount = %risk_amount,
            "Trade calculated"
        );

        Ok(trade)
    }

    /// Compute every parsed row, collecting failures per row.
    pub fn run_batch(&self, rows: Vec<InputRow>, stamps: &mut dyn StampSource) -> BatchResult {
        let mut result = BatchResult::default();

        for row in rows {
            let input = match row.parsed {
                Ok(input) => input,
                Err(err) => {
                    result.errors.push(err);
                    continue;
                }
            };

            match self.calculate(input, stamps.next_stamp()) {
                Ok(trade) => result.trades.push(trade),
                Err(err) => result.errors.push(RowError::single(row.line, err)),
            }
        }

        result
    }

    fn direction(&self, entry: Decimal, pivot: Decimal) -> CalcResult<TradeSide> {
        if entry > pivot {
            return Ok(TradeSide::Buy);
        }
        if entry < pivot {
            return Ok(TradeSide::Sell);
        }

        match self.policy.equal_price_direction {
            EqualPriceDirection::Sell => Ok(TradeSide::Sell),
            EqualPriceDirection::Buy => Ok(TradeSide::Buy),
            EqualPriceDirection::Reject => Err(CalcError::EqualPrices { price: entry }),
        }
    }

    fn divisor(&self, pair: &str, stop_loss: Decimal, pip_ratio: Decimal) -> Decimal {
        match self.policy.lot_size_divisor {
            LotSizeDivisor::StopLossPrice if pair.starts_with("usd") => stop_loss,
            _ => pip_ratio,
        }
    }
}

fn checked(value: Option<Decimal>, field: &'static str) -> CalcResult<Decimal> {
    value.ok_or(CalcError::Overflow { field })
}
