//! Trading logic: formula policy, pip ratios, magnitude and the trade calculator.

mod calculator;
mod config;
mod magnitude;
mod outcome;
mod pip_ratio;
mod stamp;

pub use calculator::{BatchResult, TradeCalculator};
pub use config::{EqualPriceDirection, FormulaPolicy, LotSizeDivisor, Preset};
pub use magnitude::MagnitudeResolver;
pub use outcome::{Outcome, OutcomeValuator};
pub use pip_ratio::{normalize_pair, PipRatioTable, DEFAULT_PIP_RATIO};
#[cfg(test)]
pub use stamp::FixedStamps;
pub use stamp::{StampSource, SystemStamps};
