//! # Unit Types
//!
//! Type-safe length wrappers and the unit convention used by the calculator.
//!
//! ## Internal Unit
//!
//! Every length inside rebar_core is in **millimetres**. Host applications
//! often store geometry in feet or metres while their reinforcement dialogs
//! take millimetres; both are converted into mm once, at the boundary
//! (see [`crate::job::LayoutJob::prepare`] and
//! [`crate::params::ReinforcementForm::into_parameters`]), and never mixed
//! inside a computation.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::units::{Feet, LengthUnit, Millimeters};
//!
//! let length: Millimeters = Feet(10.0).into();
//! assert!((length.0 - 3048.0).abs() < 1e-9);
//!
//! assert!((LengthUnit::Inches.to_mm(2.0) - 50.8).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

const MM_PER_METER: f64 = 1000.0;
const MM_PER_FOOT: f64 = 304.8;
const MM_PER_INCH: f64 = 25.4;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres (the internal unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * MM_PER_METER)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / MM_PER_METER)
    }
}

impl From<Feet> for Millimeters {
    fn from(ft: Feet) -> Self {
        Millimeters(ft.0 * MM_PER_FOOT)
    }
}

impl From<Millimeters> for Feet {
    fn from(mm: Millimeters) -> Self {
        Feet(mm.0 / MM_PER_FOOT)
    }
}

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_INCH)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 / MM_PER_INCH)
    }
}

// ============================================================================
// Unit Selector
// ============================================================================

/// Length unit selector for values crossing the boundary of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    /// Millimetres per one of this unit
    pub fn mm_factor(self) -> f64 {
        match self {
            LengthUnit::Millimeters => 1.0,
            LengthUnit::Meters => MM_PER_METER,
            LengthUnit::Feet => MM_PER_FOOT,
            LengthUnit::Inches => MM_PER_INCH,
        }
    }

    /// Convert a value in this unit to millimetres
    pub fn to_mm(self, value: f64) -> f64 {
        value * self.mm_factor()
    }

    /// Convert a millimetre value into this unit
    pub fn from_mm(self, value_mm: f64) -> f64 {
        value_mm / self.mm_factor()
    }

    /// Short unit symbol
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Meters => "m",
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
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

impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(Feet);
impl_arithmetic!(Inches);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_feet_to_millimeters() {
        let mm: Millimeters = Feet(1.0).into();
        assert_relative_eq!(mm.0, 304.8);

        let back: Feet = mm.into();
        assert_relative_eq!(back.0, 1.0);
    }

    #[test]
    fn test_unit_selector_matches_newtypes() {
        let via_newtype: Millimeters = Inches(3.0).into();
        assert_relative_eq!(LengthUnit::Inches.to_mm(3.0), via_newtype.0);
        assert_relative_eq!(LengthUnit::Meters.from_mm(2500.0), 2.5);
        assert_relative_eq!(LengthUnit::Millimeters.to_mm(42.0), 42.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Millimeters(400.0);
        let b = Millimeters(60.0);
        assert_eq!((a - b).0, 340.0);
        assert_eq!((a + b).0, 460.0);
        assert_eq!((a / 2.0).0, 200.0);
        assert_eq!((b * 0.5).0, 30.0);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&LengthUnit::Feet).unwrap();
        assert_eq!(json, "\"ft\"");
        let unit: LengthUnit = serde_json::from_str("\"mm\"").unwrap();
        assert_eq!(unit, LengthUnit::Millimeters);

        let mm = Millimeters(12.5);
        assert_eq!(serde_json::to_string(&mm).unwrap(), "12.5");
    }
}
