//! # Tank Input and Normalization
//!
//! Two shapes of the same data:
//!
//! - [`TankInput`]: what a form or JSON file supplies. Numeric fields may be
//!   numbers or text (`"7,5"` is accepted), lengths are in the user's
//!   [`UnitSystem`].
//! - [`TankInputs`]: the canonical form the engine works on. Heights, diameter
//!   and plate widths in meters, corrosion allowances in millimeters.
//!
//! [`TankInput::normalize`] never fails. Values that cannot be read become NaN
//! (or zero for corrosion allowance) and are reported by
//! [`validate`](crate::validation::validate).
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "tag": "TQ-101",
//!   "fluid": "Diesel",
//!   "unit_system": "metric",
//!   "diameter": 30.0,
//!   "height": "12,0",
//!   "relative_density": 0.9,
//!   "rings": [
//!     { "material": "A36", "corrosion_allowance": 1.5, "plate_width": 2.4 },
//!     { "material": "A36", "corrosion_allowance": 1.5, "plate_width": 2.4 }
//!   ],
//!   "method": "fixed_point"
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::Method;
//! use tank_core::tank::{NumericField, RingInput, TankInput};
//! use tank_core::units::UnitSystem;
//!
//! let input = TankInput {
//!     tag: Some("TQ-7".to_string()),
//!     fluid: None,
//!     unit_system: UnitSystem::Imperial,
//!     diameter: NumericField::from(50.0),
//!     height: NumericField::from("40"),
//!     relative_density: NumericField::from(1.0),
//!     joint_efficiency: None,
//!     rings: vec![RingInput::new("A36", 0.125, 96.0)],
//!     method: Method::FixedPoint,
//! };
//!
//! let inputs = input.normalize();
//! assert!((inputs.height_m - 12.192).abs() < 1e-9);
//! assert!((inputs.rings[0].corrosion_allowance_mm - 3.175).abs() < 1e-9);
//! assert!((inputs.rings[0].plate_width_m - 2.4384).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::Method;
use crate::units::{UnitSystem, MILLIMETERS_PER_METER};

/// Label used when the tag or fluid is left blank
pub const NOT_INFORMED: &str = "Not informed";

// ============================================================================
// Raw Input
// ============================================================================

/// A numeric form field: either a JSON number or the text typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    /// Read the field as a number.
    ///
    /// Text is trimmed and a decimal comma is read as a decimal point.
    /// Returns `None` for blank or unreadable text.
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericField::Number(v) => Some(*v),
            NumericField::Text(s) => {
                let cleaned = s.trim().replace(',', ".");
                if cleaned.is_empty() {
                    None
                } else {
                    cleaned.parse::<f64>().ok()
                }
            }
        }
    }

    /// Read the field, falling back to NaN so the validator can reject it
    pub fn value_or_nan(&self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

impl Default for NumericField {
    fn default() -> Self {
        NumericField::Text(String::new())
    }
}

impl From<f64> for NumericField {
    fn from(v: f64) -> Self {
        NumericField::Number(v)
    }
}

impl From<&str> for NumericField {
    fn from(s: &str) -> Self {
        NumericField::Text(s.to_string())
    }
}

/// One shell course as entered by the user (bottom ring first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingInput {
    /// Plate material identifier (e.g. "A36", "A516 Grade 70")
    #[serde(default)]
    pub material: String,

    /// Corrosion allowance (mm or in). Blank means zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrosion_allowance: Option<NumericField>,

    /// Plate width, i.e. the ring's vertical extent (m or in)
    #[serde(default)]
    pub plate_width: NumericField,
}

impl RingInput {
    pub fn new(material: impl Into<String>, corrosion_allowance: f64, plate_width: f64) -> Self {
        Self {
            material: material.into(),
            corrosion_allowance: Some(NumericField::Number(corrosion_allowance)),
            plate_width: NumericField::Number(plate_width),
        }
    }
}

/// Tank data as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankInput {
    /// Equipment tag (e.g. "TQ-101")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Stored product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid: Option<String>,

    /// Unit system of every length below
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Nominal diameter (m or ft)
    #[serde(default)]
    pub diameter: NumericField,

    /// Nominal design liquid height (m or ft)
    #[serde(default)]
    pub height: NumericField,

    /// Relative density (specific gravity) of the stored product
    #[serde(default)]
    pub relative_density: NumericField,

    /// Weld joint efficiency, used by Annex A only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_efficiency: Option<NumericField>,

    /// Shell rings, bottom to top
    #[serde(default)]
    pub rings: Vec<RingInput>,

    /// Calculation method
    pub method: Method,
}

impl TankInput {
    /// Convert to canonical units.
    pub fn normalize(&self) -> TankInputs {
        let units = self.unit_system;
        let diameter_nominal = self.diameter.value_or_nan();
        let height_nominal = self.height.value_or_nan();

        let rings = self
            .rings
            .iter()
            .map(|ring| RingSpec {
                material: ring.material.trim().to_string(),
                corrosion_allowance_mm: units
                    .thickness(
                        ring.corrosion_allowance
                            .as_ref()
                            .and_then(NumericField::value)
                            .unwrap_or(0.0),
                    )
                    .value(),
                plate_width_m: units.plate_width(ring.plate_width.value_or_nan()).value(),
            })
            .collect();

        TankInputs {
            tag: non_blank_or_default(self.tag.as_deref()),
            fluid: non_blank_or_default(self.fluid.as_deref()),
            unit_system: units,
            method: self.method,
            diameter_nominal,
            height_nominal,
            diameter_m: units.length(diameter_nominal).value(),
            height_m: units.length(height_nominal).value(),
            relative_density: self.relative_density.value_or_nan(),
            joint_efficiency: self.joint_efficiency.as_ref().and_then(NumericField::value),
            rings,
        }
    }
}

fn non_blank_or_default(s: Option<&str>) -> String {
    match s.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_INFORMED.to_string(),
    }
}

// ============================================================================
// Canonical Input
// ============================================================================

/// One shell ring in canonical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingSpec {
    pub material: String,
    pub corrosion_allowance_mm: f64,
    pub plate_width_m: f64,
}

/// Normalized tank data. Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankInputs {
    pub tag: String,
    pub fluid: String,
    pub unit_system: UnitSystem,
    pub method: Method,
    /// Diameter as supplied, in the input unit system
    pub diameter_nominal: f64,
    /// Height as supplied, in the input unit system
    pub height_nominal: f64,
    pub diameter_m: f64,
    pub height_m: f64,
    pub relative_density: f64,
    /// Raw joint efficiency; defaulting happens in the Annex A method
    pub joint_efficiency: Option<f64>,
    pub rings: Vec<RingSpec>,
}

impl TankInputs {
    /// Liquid head above the bottom of ring `ring_index`: H - sum of the
    /// widths of the rings below it (m).
    pub fn liquid_head_m(&self, ring_index: usize) -> f64 {
        self.height_m
            - self
                .rings
                .iter()
                .take(ring_index)
                .map(|r| r.plate_width_m)
                .sum::<f64>()
    }

    /// Liquid head for every ring, bottom to top
    pub fn liquid_heads_m(&self) -> Vec<f64> {
        self.rings
            .iter()
            .scan(self.height_m, |head, ring| {
                let current = *head;
                *head -= ring.plate_width_m;
                Some(current)
            })
            .collect()
    }

    /// Sum of all plate widths (m)
    pub fn total_plate_width_m(&self) -> f64 {
        self.rings.iter().map(|r| r.plate_width_m).sum()
    }

    /// Tank radius (mm)
    pub fn radius_mm(&self) -> f64 {
        self.diameter_m / 2.0 * MILLIMETERS_PER_METER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn metric_input() -> TankInput {
        TankInput {
            tag: None,
            fluid: Some("  ".to_string()),
            unit_system: UnitSystem::Metric,
            diameter: NumericField::from(30.0),
            height: NumericField::from(12.0),
            relative_density: NumericField::from(0.9),
            joint_efficiency: None,
            rings: vec![RingInput::new("A36", 1.5, 2.4); 5],
            method: Method::FixedPoint,
        }
    }

    #[test]
    fn test_decimal_comma_is_accepted() {
        assert_eq!(NumericField::from("7,5").value(), Some(7.5));
        assert_eq!(NumericField::from(" 12.25 ").value(), Some(12.25));
        assert_eq!(NumericField::from("").value(), None);
        assert_eq!(NumericField::from("abc").value(), None);
    }

    #[test]
    fn test_metric_is_identity() {
        let inputs = metric_input().normalize();
        assert_eq!(inputs.diameter_m, 30.0);
        assert_eq!(inputs.height_m, 12.0);
        assert_eq!(inputs.rings[0].corrosion_allowance_mm, 1.5);
        assert_eq!(inputs.rings[0].plate_width_m, 2.4);
    }

    #[test]
    fn test_blank_tag_and_fluid_default() {
        let inputs = metric_input().normalize();
        assert_eq!(inputs.tag, NOT_INFORMED);
        assert_eq!(inputs.fluid, NOT_INFORMED);
    }

    #[test]
    fn test_imperial_conversion() {
        let mut input = metric_input();
        input.unit_system = UnitSystem::Imperial;
        input.diameter = NumericField::from(100.0);
        input.height = NumericField::from(40.0);
        input.rings = vec![RingInput::new("A36", 0.0625, 96.0)];

        let inputs = input.normalize();
        assert!(approx(inputs.diameter_m, 30.48));
        assert!(approx(inputs.height_m, 12.192));
        assert!(approx(inputs.rings[0].corrosion_allowance_mm, 1.5875));
        assert!(approx(inputs.rings[0].plate_width_m, 2.4384));
        assert_eq!(inputs.diameter_nominal, 100.0);
    }

    #[test]
    fn test_unreadable_values() {
        let mut input = metric_input();
        input.height = NumericField::from("");
        input.rings[0].corrosion_allowance = Some(NumericField::from(""));
        input.rings[1].corrosion_allowance = None;
        input.rings[2].plate_width = NumericField::from("wide");

        let inputs = input.normalize();
        assert!(inputs.height_m.is_nan());
        assert_eq!(inputs.rings[0].corrosion_allowance_mm, 0.0);
        assert_eq!(inputs.rings[1].corrosion_allowance_mm, 0.0);
        assert!(inputs.rings[2].plate_width_m.is_nan());
    }

    #[test]
    fn test_liquid_head_strictly_decreases() {
        let inputs = metric_input().normalize();
        let heads = inputs.liquid_heads_m();
        assert_eq!(heads.len(), 5);
        assert!(approx(heads[0], 12.0));
        assert!(approx(heads[1], 9.6));
        assert!(approx(heads[4], 2.4));
        for pair in heads.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        for (i, head) in heads.iter().enumerate() {
            assert!(approx(*head, inputs.liquid_head_m(i)));
        }
    }

    #[test]
    fn test_json_with_text_fields() {
        let json = r#"{
            "tag": "TQ-101",
            "unit_system": "m/mm",
            "diameter": "20",
            "height": "10,0",
            "relative_density": 1,
            "joint_efficiency": "0,85",
            "rings": [{ "material": "A36", "plate_width": "2,5" }],
            "method": "annex_a"
        }"#;
        let input: TankInput = serde_json::from_str(json).unwrap();
        let inputs = input.normalize();
        assert_eq!(inputs.height_m, 10.0);
        assert_eq!(inputs.joint_efficiency, Some(0.85));
        assert_eq!(inputs.rings[0].plate_width_m, 2.5);
        assert_eq!(inputs.rings[0].corrosion_allowance_mm, 0.0);
        assert_eq!(inputs.method, Method::AnnexA);
    }
}
