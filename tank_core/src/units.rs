//! # Unit Types
//!
//! Type-safe wrappers for the lengths handled by the engine, plus the
//! [`UnitSystem`] flag that tells the normalizer how to read user input.
//!
//! ## Canonical Units
//!
//! Everything past normalization is in one system:
//! - Height, diameter, plate width, liquid head: meters (m)
//! - Thickness, corrosion allowance: millimeters (mm)
//! - Stress: megapascals (MPa), carried as plain `f64` fields suffixed `_mpa`
//!
//! ## Example
//!
//! ```rust
//! use tank_core::units::{Feet, Inches, Meters, Millimeters};
//!
//! let height: Meters = Feet(40.0).into();
//! assert!((height.0 - 12.192).abs() < 1e-9);
//!
//! let ca: Millimeters = Inches(0.125).into();
//! assert!((ca.0 - 3.175).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Feet to meters
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Inches to millimeters
pub const MILLIMETERS_PER_INCH: f64 = 25.4;

/// Millimeters per meter
pub const MILLIMETERS_PER_METER: f64 = 1000.0;

// ============================================================================
// Unit System
// ============================================================================

/// Unit system of the raw user input.
///
/// `Metric` reads height/diameter/plate width in meters and thickness/corrosion
/// allowance in millimeters. `Imperial` reads height/diameter in feet and
/// thickness/corrosion allowance/plate width in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    #[serde(alias = "m/mm", alias = "SI")]
    Metric,
    #[serde(alias = "in/ft")]
    Imperial,
}

impl UnitSystem {
    /// Read a height or diameter
    pub fn length(self, value: f64) -> Meters {
        match self {
            UnitSystem::Metric => Meters(value),
            UnitSystem::Imperial => Feet(value).into(),
        }
    }

    /// Read a thickness or corrosion allowance
    pub fn thickness(self, value: f64) -> Millimeters {
        match self {
            UnitSystem::Metric => Millimeters(value),
            UnitSystem::Imperial => Inches(value).into(),
        }
    }

    /// Read a plate width. Imperial widths are in inches.
    pub fn plate_width(self, value: f64) -> Meters {
        match self {
            UnitSystem::Metric => Meters(value),
            UnitSystem::Imperial => Inches(value).into(),
        }
    }

    /// Short label used in reports ("m/mm" or "in/ft")
    pub fn label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/mm",
            UnitSystem::Imperial => "in/ft",
        }
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 * METERS_PER_FOOT)
    }
}

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MILLIMETERS_PER_INCH)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / MILLIMETERS_PER_METER)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * MILLIMETERS_PER_METER)
    }
}

impl From<Inches> for Meters {
    fn from(inches: Inches) -> Self {
        Millimeters::from(inches).into()
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
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

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Feet);
impl_arithmetic!(Inches);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_to_meters() {
        let m: Meters = Feet(10.0).into();
        assert!((m.0 - 3.048).abs() < 1e-12);
    }

    #[test]
    fn test_inches_to_meters_goes_through_millimeters() {
        let m: Meters = Inches(96.0).into();
        assert!((m.0 - 2.4384).abs() < 1e-12);
        assert!((UnitSystem::Imperial.plate_width(96.0).value() - 2.4384).abs() < 1e-12);
    }

    #[test]
    fn test_metric_is_identity() {
        let u = UnitSystem::Metric;
        assert_eq!(u.length(12.5), Meters(12.5));
        assert_eq!(u.thickness(1.6), Millimeters(1.6));
        assert_eq!(u.plate_width(2.4), Meters(2.4));
    }

    #[test]
    fn test_arithmetic() {
        let a = Millimeters(10.0);
        let b = Millimeters(2.5);
        assert_eq!((a + b).0, 12.5);
        assert_eq!((a - b).0, 7.5);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 4.0).0, 2.5);
    }

    #[test]
    fn test_unit_system_serialization() {
        assert_eq!(serde_json::to_string(&UnitSystem::Imperial).unwrap(), "\"imperial\"");
        let legacy: UnitSystem = serde_json::from_str("\"in/ft\"").unwrap();
        assert_eq!(legacy, UnitSystem::Imperial);
        let si: UnitSystem = serde_json::from_str("\"m/mm\"").unwrap();
        assert_eq!(si, UnitSystem::Metric);
    }
}
