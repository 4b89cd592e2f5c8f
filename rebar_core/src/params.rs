//! # Reinforcement Parameters
//!
//! The six numbers that drive a layout, plus parsing of the raw values a
//! reinforcement dialog posts back.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "top_count": 2,
//!   "bottom_count": 3,
//!   "cover_mm": 30.0,
//!   "bar_diameter_mm": 16.0,
//!   "stirrup_diameter_mm": 8.0,
//!   "stirrup_spacing_mm": 150.0,
//!   "bar_type": "16M"
//! }
//! ```
//!
//! ## Form Input
//!
//! Dialog values arrive as strings or numbers, in the dialog's unit:
//!
//! ```rust
//! use rebar_core::params::ReinforcementForm;
//! use rebar_core::units::LengthUnit;
//!
//! let form: ReinforcementForm = serde_json::from_str(r#"{
//!     "rebarId": "16M",
//!     "top": "2",
//!     "bottom": 3,
//!     "cover": "30",
//!     "bar_diameter": "16",
//!     "stirrup_diameter": "8",
//!     "stirrup_spacing": 150
//! }"#).unwrap();
//!
//! let params = form.into_parameters(LengthUnit::Millimeters).unwrap();
//! assert_eq!(params.top_count, 2);
//! assert_eq!(params.bottom_count, 3);
//! assert_eq!(params.bar_type.as_deref(), Some("16M"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{RebarError, RebarResult};
use crate::units::LengthUnit;

/// Upper bound on bars in one layer
pub const MAX_BARS_PER_LAYER: u32 = 1_000;

/// Bar counts and dimensions for one layout request (millimetres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementParameters {
    /// Number of top longitudinal bars
    pub top_count: u32,

    /// Number of bottom longitudinal bars
    pub bottom_count: u32,

    /// Clear cover from section face to bar surface
    pub cover_mm: f64,

    /// Longitudinal bar diameter
    pub bar_diameter_mm: f64,

    /// Stirrup bar diameter
    pub stirrup_diameter_mm: f64,

    /// Center-to-center stirrup spacing along the beam
    pub stirrup_spacing_mm: f64,

    /// Host bar type name, carried through to the output untouched
    #[serde(default)]
    pub bar_type: Option<String>,
}

impl Default for ReinforcementParameters {
    fn default() -> Self {
        ReinforcementParameters {
            top_count: 2,
            bottom_count: 2,
            cover_mm: 30.0,
            bar_diameter_mm: 16.0,
            stirrup_diameter_mm: 8.0,
            stirrup_spacing_mm: 150.0,
            bar_type: None,
        }
    }
}

impl ReinforcementParameters {
    /// Validate before any beam is computed.
    pub fn validate(&self) -> RebarResult<()> {
        for (field, count) in [("top_count", self.top_count), ("bottom_count", self.bottom_count)] {
            if count > MAX_BARS_PER_LAYER {
                return Err(RebarError::invalid_parameter(
                    field,
                    count.to_string(),
                    format!("At most {} bars per layer", MAX_BARS_PER_LAYER),
                ));
            }
        }
        let lengths = [
            ("cover_mm", self.cover_mm),
            ("bar_diameter_mm", self.bar_diameter_mm),
            ("stirrup_diameter_mm", self.stirrup_diameter_mm),
            ("stirrup_spacing_mm", self.stirrup_spacing_mm),
        ];
        for (field, value) in lengths {
            if !value.is_finite() {
                return Err(RebarError::invalid_parameter(field, value.to_string(), "Value must be a finite number"));
            }
            if value < 0.0 {
                return Err(RebarError::invalid_parameter(field, value.to_string(), "Value must be non-negative"));
            }
        }
        if self.stirrup_spacing_mm == 0.0 {
            return Err(RebarError::invalid_parameter(
                "stirrup_spacing_mm",
                self.stirrup_spacing_mm.to_string(),
                "Stirrup spacing must be positive",
            ));
        }
        Ok(())
    }

    pub fn bar_radius_mm(&self) -> f64 {
        self.bar_diameter_mm / 2.0
    }

    pub fn stirrup_radius_mm(&self) -> f64 {
        self.stirrup_diameter_mm / 2.0
    }
}

/// A single dialog value: either a JSON number or the text typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    fn as_number(&self, field: &str) -> RebarResult<f64> {
        let value = match self {
            FormValue::Number(n) => *n,
            FormValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                RebarError::invalid_parameter(field, s.clone(), "Value is not a number")
            })?,
        };
        if !value.is_finite() {
            return Err(RebarError::invalid_parameter(field, value.to_string(), "Value must be a finite number"));
        }
        if value < 0.0 {
            return Err(RebarError::invalid_parameter(field, value.to_string(), "Value must be non-negative"));
        }
        Ok(value)
    }

    /// Parse as a whole, non-negative bar count.
    pub fn parse_count(&self, field: &str) -> RebarResult<u32> {
        let value = self.as_number(field)?;
        if value.fract() != 0.0 {
            return Err(RebarError::invalid_parameter(field, value.to_string(), "Count must be a whole number"));
        }
        if value > f64::from(u32::MAX) {
            return Err(RebarError::invalid_parameter(field, value.to_string(), "Count is too large"));
        }
        Ok(value as u32)
    }

    /// Parse as a non-negative length in `unit`, returned in millimetres.
    pub fn parse_length_mm(&self, field: &str, unit: LengthUnit) -> RebarResult<f64> {
        Ok(unit.to_mm(self.as_number(field)?))
    }
}

/// Raw values posted by the reinforcement dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementForm {
    #[serde(default, alias = "rebarId")]
    pub bar_type: Option<String>,
    pub top: FormValue,
    pub bottom: FormValue,
    pub cover: FormValue,
    pub bar_diameter: FormValue,
    pub stirrup_diameter: FormValue,
    pub stirrup_spacing: FormValue,
}

impl ReinforcementForm {
    /// Parse every field, convert lengths from `unit` to mm, and validate.
    ///
    /// The first field that fails is named in the returned `InvalidParameter`.
    pub fn into_parameters(self, unit: LengthUnit) -> RebarResult<ReinforcementParameters> {
        let params = ReinforcementParameters {
            top_count: self.top.parse_count("top")?,
            bottom_count: self.bottom.parse_count("bottom")?,
            cover_mm: self.cover.parse_length_mm("cover", unit)?,
            bar_diameter_mm: self.bar_diameter.parse_length_mm("bar_diameter", unit)?,
            stirrup_diameter_mm: self.stirrup_diameter.parse_length_mm("stirrup_diameter", unit)?,
            stirrup_spacing_mm: self.stirrup_spacing.parse_length_mm("stirrup_spacing", unit)?,
            bar_type: self.bar_type.filter(|name| !name.trim().is_empty()),
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn form() -> ReinforcementForm {
        ReinforcementForm {
            bar_type: Some("16M".to_string()),
            top: FormValue::Text("2".to_string()),
            bottom: FormValue::Number(3.0),
            cover: FormValue::Text(" 30 ".to_string()),
            bar_diameter: FormValue::Number(16.0),
            stirrup_diameter: FormValue::Number(8.0),
            stirrup_spacing: FormValue::Number(150.0),
        }
    }

    fn failing_field(result: RebarResult<ReinforcementParameters>) -> String {
        match result {
            Err(RebarError::InvalidParameter { field, .. }) => field,
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(ReinforcementParameters::default().validate().is_ok());
    }

    #[test]
    fn test_negative_cover_rejected() {
        let params = ReinforcementParameters {
            cover_mm: -1.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("cover_mm"));
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let params = ReinforcementParameters {
            stirrup_spacing_mm: 0.0,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_bar_count_capped() {
        let params = ReinforcementParameters {
            bottom_count: MAX_BARS_PER_LAYER,
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        let params = ReinforcementParameters {
            top_count: u32::MAX,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, RebarError::InvalidParameter { ref field, .. } if field == "top_count"));

        let mut huge = form();
        huge.bottom = FormValue::Number(4_000_000_000.0);
        assert_eq!(failing_field(huge.into_parameters(LengthUnit::Millimeters)), "bottom_count");
    }

    #[test]
    fn test_nan_rejected() {
        let params = ReinforcementParameters {
            bar_diameter_mm: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_form_parses() {
        let params = form().into_parameters(LengthUnit::Millimeters).unwrap();
        assert_eq!(params.top_count, 2);
        assert_eq!(params.bottom_count, 3);
        assert_relative_eq!(params.cover_mm, 30.0);
        assert_relative_eq!(params.bar_radius_mm(), 8.0);
        assert_relative_eq!(params.stirrup_radius_mm(), 4.0);
    }

    #[test]
    fn test_form_converts_units_once() {
        let mut f = form();
        f.cover = FormValue::Number(1.5);
        f.bar_diameter = FormValue::Number(0.625);
        f.stirrup_diameter = FormValue::Number(0.375);
        f.stirrup_spacing = FormValue::Number(6.0);
        let params = f.into_parameters(LengthUnit::Inches).unwrap();
        assert_relative_eq!(params.cover_mm, 38.1, epsilon = 1e-9);
        assert_relative_eq!(params.stirrup_spacing_mm, 152.4, epsilon = 1e-9);
    }

    #[test]
    fn test_form_reports_failing_field() {
        let mut f = form();
        f.top = FormValue::Text("two".to_string());
        assert_eq!(failing_field(f.into_parameters(LengthUnit::Millimeters)), "top");

        let mut f = form();
        f.bottom = FormValue::Number(-1.0);
        assert_eq!(failing_field(f.into_parameters(LengthUnit::Millimeters)), "bottom");

        let mut f = form();
        f.bottom = FormValue::Number(2.5);
        assert_eq!(failing_field(f.into_parameters(LengthUnit::Millimeters)), "bottom");

        let mut f = form();
        f.stirrup_diameter = FormValue::Text("".to_string());
        assert_eq!(failing_field(f.into_parameters(LengthUnit::Millimeters)), "stirrup_diameter");

        let mut f = form();
        f.stirrup_spacing = FormValue::Number(0.0);
        assert_eq!(failing_field(f.into_parameters(LengthUnit::Millimeters)), "stirrup_spacing_mm");
    }

    #[test]
    fn test_blank_bar_type_dropped() {
        let mut f = form();
        f.bar_type = Some("  ".to_string());
        let params = f.into_parameters(LengthUnit::Millimeters).unwrap();
        assert!(params.bar_type.is_none());
    }

    #[test]
    fn test_parameters_serialization_roundtrip() {
        let params = ReinforcementParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let roundtrip: ReinforcementParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, roundtrip);
    }
}
