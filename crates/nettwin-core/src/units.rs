//! Compile-time unit safety for grid quantities.
//!
//! Raw `f64` values make it easy to mix incompatible units (MW added to Mvar,
//! kV used where p.u. is expected). The newtypes here catch such mistakes at
//! compile time while keeping the memory layout of a plain `f64`
//! (`#[repr(transparent)]`), so there is no runtime cost.
//!
//! ```
//! use nettwin_core::units::{Megawatts, Megavars};
//!
//! let p = Megawatts(100.0) + Megawatts(20.0);
//! assert_eq!(p.value(), 120.0);
//! // Megawatts(1.0) + Megavars(1.0) does not compile.
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Reactive power in megavars (Mvar)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megavars(pub f64);

impl_unit_ops!(Megavars, "Mvar");

/// Voltage level in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Current in kiloamperes (kA); thermal line limits are stated in this unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kiloamperes(pub f64);

impl_unit_ops!(Kiloamperes, "kA");

/// Route length in kilometers (km)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilometers(pub f64);

impl_unit_ops!(Kilometers, "km");

/// Per-unit quantity (voltage magnitudes, setpoints)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl Default for PerUnit {
    fn default() -> Self {
        PerUnit(1.0)
    }
}

/// Series impedance per route kilometer (Ω/km), used for both resistance and
/// reactance of overhead-line parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct OhmsPerKm(pub f64);

impl_unit_ops!(OhmsPerKm, "Ohm/km");

/// Shunt capacitance per route kilometer (nF/km)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NanofaradsPerKm(pub f64);

impl_unit_ops!(NanofaradsPerKm, "nF/km");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_stays_in_unit() {
        let total = Megawatts(2000.0) + Megawatts(300.0) - Megawatts(50.0);
        assert_eq!(total.value(), 2250.0);
        assert_eq!((total / 2.0).value(), 1125.0);
        assert_eq!((2.0 * Kilovolts(190.0)).value(), 380.0);
    }

    #[test]
    fn ratio_of_same_unit_is_dimensionless() {
        let loading = Kiloamperes(1.5) / Kiloamperes(2.0);
        assert!((loading - 0.75).abs() < 1e-12);
    }

    #[test]
    fn sum_over_iterator() {
        let loads = [Megavars(10.0), Megavars(5.5)];
        let total: Megavars = loads.iter().sum();
        assert_eq!(total.value(), 15.5);
    }

    #[test]
    fn per_unit_defaults_to_one() {
        assert_eq!(PerUnit::default().value(), 1.0);
    }

    #[test]
    fn display_includes_unit_suffix() {
        assert_eq!(format!("{}", OhmsPerKm(0.03)), "0.0300 Ohm/km");
    }
}
