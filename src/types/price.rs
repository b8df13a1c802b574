use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in minor units (US cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    const MULTIPLIER: i64 = 100;  // cents per dollar

    pub fn from_cents(value: i64) -> Self {
        Price(value)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Converts a dollar amount, rounding to the nearest cent.
    /// Returns `None` for NaN, infinities and negative amounts.
    pub fn from_usd(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * Self::MULTIPLIER as f64).round();
        if cents > i64::MAX as f64 {
            return None;
        }
        Some(Price(cents as i64))
    }

    pub fn to_usd(&self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    pub fn zero() -> Self {
        Price(0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / Self::MULTIPLIER, (self.0 % Self::MULTIPLIER).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_usd_rounds_to_nearest_cent() {
        assert_eq!(Price::from_usd(123.45), Some(Price::from_cents(12345)));
        assert_eq!(Price::from_usd(0.125), Some(Price::from_cents(13)));
        assert_eq!(Price::from_usd(50000.0), Some(Price::from_cents(5_000_000)));
    }

    #[test]
    fn from_usd_rejects_garbage() {
        assert_eq!(Price::from_usd(f64::NAN), None);
        assert_eq!(Price::from_usd(f64::INFINITY), None);
        assert_eq!(Price::from_usd(-1.0), None);
    }

    #[test]
    fn displays_as_dollars() {
        assert_eq!(Price::from_cents(5_100_007).to_string(), "51000.07");
        assert_eq!(Price::zero().to_string(), "0.00");
    }
}
