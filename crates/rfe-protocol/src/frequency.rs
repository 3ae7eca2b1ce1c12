//! Frequency values
//!
//! The RF Explorer wire protocol transmits frequencies as 7-digit kHz
//! fields while the public API deals in Hz, so frequencies get their own
//! type instead of bare `u64`s with a unit convention.

use std::fmt::Display;
use std::ops::{Add, Div, Mul, Sub};

/// A frequency with hertz resolution
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frequency(u64);

impl Frequency {
    pub const fn from_hz(hz: u64) -> Self {
        Frequency(hz)
    }

    pub const fn from_khz(khz: u64) -> Self {
        Frequency(khz * 1_000)
    }

    pub const fn from_mhz(mhz: u64) -> Self {
        Frequency(mhz * 1_000_000)
    }

    pub const fn from_ghz(ghz: u64) -> Self {
        Frequency(ghz * 1_000_000_000)
    }

    /// Builds a frequency from a fractional MHz value, saturating negative
    /// inputs to zero.
    pub fn from_mhz_f64(mhz: f64) -> Self {
        if mhz.is_sign_negative() || !mhz.is_finite() {
            return Frequency::default();
        }
        Frequency((mhz * 1_000_000.0) as u64)
    }

    pub const fn as_hz(&self) -> u64 {
        self.0
    }

    pub const fn as_khz(&self) -> u64 {
        self.0 / 1_000
    }

    pub const fn as_mhz(&self) -> u64 {
        self.0 / 1_000_000
    }

    pub fn as_mhz_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Absolute difference between two frequencies
    pub const fn abs_diff(&self, other: Frequency) -> Frequency {
        Frequency(self.0.abs_diff(other.0))
    }
}

impl From<u64> for Frequency {
    fn from(hz: u64) -> Self {
        Frequency::from_hz(hz)
    }
}

impl Add for Frequency {
    type Output = Frequency;

    fn add(self, rhs: Frequency) -> Self::Output {
        Frequency(self.0 + rhs.0)
    }
}

impl Sub for Frequency {
    type Output = Frequency;

    fn sub(self, rhs: Frequency) -> Self::Output {
        Frequency(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u64> for Frequency {
    type Output = Frequency;

    fn mul(self, rhs: u64) -> Self::Output {
        Frequency(self.0 * rhs)
    }
}

impl Div<u64> for Frequency {
    type Output = Frequency;

    fn div(self, rhs: u64) -> Self::Output {
        Frequency(self.0 / rhs)
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} MHz", self.as_mhz_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        let freq = Frequency::from_ghz(1);
        assert_eq!(freq.as_hz(), 1_000_000_000);
        assert_eq!(freq.as_khz(), 1_000_000);
        assert_eq!(freq.as_mhz(), 1_000);

        assert_eq!(Frequency::from_khz(96_000).as_hz(), 96_000_000);
        assert_eq!(Frequency::from_mhz_f64(14.25).as_hz(), 14_250_000);
    }

    #[test]
    fn test_arithmetic() {
        let start = Frequency::from_mhz(96);
        let step = Frequency::from_hz(90_072);
        let stop = start + step * 111;
        assert_eq!(stop.as_hz(), 105_997_992);
        assert_eq!((stop - start).as_hz(), 9_997_992);
        assert_eq!((start + stop) / 2, Frequency::from_hz(100_998_996));
    }

    #[test]
    fn test_subtraction_saturates() {
        let small = Frequency::from_hz(1);
        let big = Frequency::from_ghz(1);
        assert_eq!((small - big).as_hz(), 0);
    }

    #[test]
    fn test_abs_diff() {
        let a = Frequency::from_khz(100);
        let b = Frequency::from_khz(103);
        assert_eq!(a.abs_diff(b), Frequency::from_khz(3));
        assert_eq!(b.abs_diff(a), Frequency::from_khz(3));
    }

    #[test]
    fn test_negative_mhz_saturates_to_zero() {
        assert_eq!(Frequency::from_mhz_f64(-1.0).as_hz(), 0);
    }
}
