//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Used for every percentage and currency amount in the crate. Floats only
//! appear at the edges (slider input, history averages).

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Lossless decimal numeric type for percentages and payout amounts.
///
/// Serializes to a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Convert from a float. NaN and infinities yield `None`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        RustDecimal::from_f64(value).map(Decimal)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Integer value, if this is a whole number that fits in `u32`.
    pub fn to_u32(&self) -> Option<u32> {
        if self.0.fract().is_zero() {
            self.0.to_u32()
        } else {
            None
        }
    }

    /// Format without trailing zeros or exponent notation.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// Round half away from zero to `dp` places and render with exactly `dp`
    /// fractional digits ("33" -> "33.00").
    pub fn to_fixed(&self, dp: u32) -> String {
        let mut rounded = self.round_half_up(dp).0;
        rounded.rescale(dp);
        format!("{}", rounded)
    }

    /// Half-up rounding for non-negative values (half away from zero in general).
    pub fn round_half_up(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    /// `None` on overflow. The operator impls panic instead.
    pub fn checked_add(&self, rhs: Decimal) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn checked_mul(&self, rhs: Decimal) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// `None` on overflow or division by zero.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Self> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Clamp into the percentage range `[0, 100]`.
    pub fn clamp_percentage(&self) -> Self {
        (*self).clamp(Decimal::zero(), Decimal::hundred())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + *d)
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_to_fixed_pads_whole_numbers() {
        assert_eq!(d("33").to_fixed(2), "33.00");
        assert_eq!(d("0").to_fixed(2), "0.00");
        assert_eq!(d("12.5").to_fixed(2), "12.50");
    }

    #[test]
    fn test_to_fixed_rounds_half_up() {
        assert_eq!(d("0.125").to_fixed(2), "0.13");
        assert_eq!(d("0.124").to_fixed(2), "0.12");
        assert_eq!(d("33.335").to_fixed(2), "33.34");
    }

    #[test]
    fn test_canonical_string_strips_trailing_zeros() {
        assert_eq!(d("40.00").to_canonical_string(), "40");
        assert_eq!(d("12.50").to_canonical_string(), "12.5");
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert!(Decimal::from_f64(f64::INFINITY).is_none());
        assert_eq!(Decimal::from_f64(40.0), Some(d("40")));
    }

    #[test]
    fn test_to_u32_only_for_whole_numbers() {
        assert_eq!(d("40").to_u32(), Some(40));
        assert_eq!(d("40.5").to_u32(), None);
        assert_eq!(d("-1").to_u32(), None);
    }

    #[test]
    fn test_clamp_percentage() {
        assert_eq!(d("-5").clamp_percentage(), Decimal::zero());
        assert_eq!(d("150").clamp_percentage(), Decimal::hundred());
        assert_eq!(d("42.5").clamp_percentage(), d("42.5"));
    }

    #[test]
    fn test_sum() {
        let values = vec![d("33"), d("33"), d("34")];
        let total: Decimal = values.iter().sum();
        assert_eq!(total, Decimal::hundred());
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(d("2").checked_mul(d("3")), Some(d("6")));
        assert_eq!(Decimal::new(RustDecimal::MAX).checked_mul(d("2")), None);
        assert_eq!(Decimal::new(RustDecimal::MAX).checked_add(d("1")), None);
        assert_eq!(d("1").checked_div(Decimal::zero()), None);
        assert_eq!(d("1").checked_div(d("4")), Some(d("0.25")));
    }

    #[test]
    fn test_json_serialization_is_number() {
        let json = serde_json::to_value(d("40")).unwrap();
        assert!(json.is_number());
    }
}
