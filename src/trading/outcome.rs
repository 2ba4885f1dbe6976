//! Realized value of a trade from its take-profit hit/miss flags.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::models::HitFlag;

/// Every combination of the two take-profit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one flag was not recorded
    Unknown,
    BothHit,
    Tp1Only,
    Tp2Only,
    NoneHit,
}

impl Outcome {
    pub fn from_flags(tp1: HitFlag, tp2: HitFlag) -> Self {
        match (tp1, tp2) {
            (HitFlag::Unknown, _) | (_, HitFlag::Unknown) => Self::Unknown,
            (HitFlag::Hit, HitFlag::Hit) => Self::BothHit,
            (HitFlag::Hit, HitFlag::Missed) => Self::Tp1Only,
            (HitFlag::Missed, HitFlag::Hit) => Self::Tp2Only,
            (HitFlag::Missed, HitFlag::Missed) => Self::NoneHit,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::BothHit => write!(f, "both hit"),
            Self::Tp1Only => write!(f, "tp1 only"),
            Self::Tp2Only => write!(f, "tp2 only"),
            Self::NoneHit => write!(f, "none hit"),
        }
    }
}

/// Computes what a trade was worth once its outcome is known.
pub struct OutcomeValuator;

impl OutcomeValuator {
    /// `Ok(None)` means the outcome is not yet known.
    pub fn value(
        outcome: Outcome,
        tp1_profit: Decimal,
        tp2_profit: Decimal,
        risk_amount: Decimal,
    ) -> CalcResult<Option<Decimal>> {
        let value = match outcome {
            Outcome::Unknown => return Ok(None),
            Outcome::BothHit => tp1_profit.checked_add(tp2_profit),
            Outcome::Tp1Only => tp1_profit.checked_sub(risk_amount),
            Outcome::Tp2Only => risk_amount.checked_sub(tp2_profit),
            Outcome::NoneHit => risk_amount.checked_mul(dec!(2)).map(|v| -v),
        };
        value
            .map(Some)
            .ok_or(CalcError::Overflow { field: "trade value" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_flags() {
        assert_eq!(Outcome::from_flags(HitFlag::Hit, HitFlag::Hit), Outcome::BothHit);
        assert_eq!(Outcome::from_flags(HitFlag::Hit, HitFlag::Missed), Outcome::Tp1Only);
        assert_eq!(Outcome::from_flags(HitFlag::Missed, HitFlag::Hit), Outcome::Tp2Only);
        assert_eq!(Outcome::from_flags(HitFlag::Missed, HitFlag::Missed), Outcome::NoneHit);
        assert_eq!(Outcome::from_flags(HitFlag::Unknown, HitFlag::Hit), Outcome::Unknown);
        assert_eq!(Outcome::from_flags(HitFlag::Missed, HitFlag::Unknown), Outcome::Unknown);
    }

    #[test]
    fn test_values() {
        let (tp1, tp2, risk) = (dec!(55), dec!(165), dec!(55));

        let value = |outcome| OutcomeValuator::value(outcome, tp1, tp2, risk).unwrap();

        assert_eq!(value(Outcome::Unknown), None);
        assert_eq!(value(Outcome::BothHit), Some(dec!(220)));
        assert_eq!(value(Outcome::Tp1Only), Some(dec!(0)));
        assert_eq!(value(Outcome::Tp2Only), Some(dec!(-110)));
        assert_eq!(value(Outcome::NoneHit), Some(dec!(-110)));
    }

    #[test]
    fn test_value_overflow_is_an_error() {
        let big = Decimal::MAX / dec!(2) + dec!(1);

        let result = OutcomeValuator::value(Outcome::BothHit, big, big, dec!(1));
        assert!(matches!(result, Err(CalcError::Overflow { .. })));

        let result = OutcomeValuator::value(Outcome::NoneHit, dec!(1), dec!(1), big);
        assert!(matches!(result, Err(CalcError::Overflow { .. })));

        let result = OutcomeValuator::value(Outcome::Unknown, big, big, big);
        assert_eq!(result.unwrap(), None);
    }
}
