//! Data models for trade setups and computed trades.

mod input;
mod trade;

pub use input::{columns, HitFlag, RawTradeInput};
pub use trade::{Stamp, TakeProfit, Trade, TradeSide};
