//! Price magnitude: the power-of-ten scale implied by how a price was typed.
//!
//! `1.10500` and `1.105` are the same number but not the same quote. The
//! magnitude comes from the text as entered, so trailing zeros count.

use crate::error::{CalcError, CalcResult};

/// Largest number of fractional digits that still fits a `u64` magnitude.
pub const MAX_DECIMALS: u32 = 18;

/// Derives the decimal scaling factor from a price's original text.
pub struct MagnitudeResolver;

impl MagnitudeResolver {
    /// Number of digits after the decimal separator.
    pub fn decimals(raw: &str) -> u32 {
        let Some((_, fraction)) = raw.trim().split_once('.') else {
            return 0;
        };

        fraction.chars().take_while(|c| c.is_ascii_digit()).count() as u32
    }

    /// 10^decimals. A price without fractional digits has magnitude 1.
    /// Prices typed with more than [`MAX_DECIMALS`] digits are refused.
    pub fn resolve(raw: &str) -> CalcResult<u64> {
        let decimals = Self::decimals(raw);
        if decimals > MAX_DECIMALS {
            return Err(CalcError::invalid_field(
                "entry",
                raw,
                format!("more than {} decimal places", MAX_DECIMALS),
            ));
        }
        Ok(10u64.pow(decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_from_text() {
        assert_eq!(MagnitudeResolver::resolve("1.2345").unwrap(), 10_000);
        assert_eq!(MagnitudeResolver::resolve("1.5").unwrap(), 10);
        assert_eq!(MagnitudeResolver::resolve("2").unwrap(), 1);
        assert_eq!(MagnitudeResolver::resolve("157.123").unwrap(), 1_000);
    }

    #[test]
    fn test_trailing_zeros_count() {
        assert_eq!(MagnitudeResolver::resolve("1.10000").unwrap(), 100_000);
        assert_eq!(MagnitudeResolver::resolve("1.1").unwrap(), 10);
    }

    #[test]
    fn test_degenerate_forms() {
        assert_eq!(MagnitudeResolver::resolve("1.").unwrap(), 1);
        assert_eq!(MagnitudeResolver::resolve("  0.001 ").unwrap(), 1_000);
        assert_eq!(MagnitudeResolver::resolve("-1.25").unwrap(), 100);
        assert_eq!(MagnitudeResolver::resolve("").unwrap(), 1);
    }

    #[test]
    fn test_too_many_decimals_are_refused() {
        let raw = format!("0.{}", "1".repeat(25));
        assert_eq!(MagnitudeResolver::decimals(&raw), 25);
        assert!(matches!(
            MagnitudeResolver::resolve(&raw),
            Err(CalcError::InvalidField { field: "entry", .. })
        ));

        let raw = format!("0.{}", "1".repeat(MAX_DECIMALS as usize));
        assert_eq!(MagnitudeResolver::resolve(&raw).unwrap(), 10u64.pow(MAX_DECIMALS));
    }
}
