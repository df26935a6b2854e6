//! # Input Validation
//!
//! Every rule is checked independently and all violations are reported
//! together in one [`CalcError::ValidationFailed`]. Nothing is calculated when
//! validation fails.

use crate::errors::{CalcError, CalcResult};
use crate::tank::TankInputs;

/// Slack allowed when comparing the summed plate widths against the height,
/// so that e.g. five 2.4 m rings still fit a 12 m tank.
const WIDTH_SUM_TOLERANCE_M: f64 = 1e-9;

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Check normalized inputs.
///
/// # Rules
/// - Height, diameter and relative density finite and greater than zero
/// - Every corrosion allowance finite
/// - Every plate width finite and greater than zero
/// - Sum of plate widths not above the height
/// - At least one ring
pub fn validate(inputs: &TankInputs) -> CalcResult<()> {
    let mut violations = Vec::new();

    if !positive(inputs.height_m) {
        violations.push("Height must be greater than 0 and a valid number.".to_string());
    }
    if !positive(inputs.diameter_m) {
        violations.push("Diameter must be greater than 0 and a valid number.".to_string());
    }
    if !positive(inputs.relative_density) {
        violations.push("Relative density must be greater than 0 and a valid number.".to_string());
    }

    if inputs.rings.is_empty() {
        violations.push("At least one shell ring must be supplied.".to_string());
    }

    for (i, ring) in inputs.rings.iter().enumerate() {
        if !ring.corrosion_allowance_mm.is_finite() {
            violations.push(format!("Corrosion allowance of ring {} must be a valid number.", i + 1));
        }
        if !positive(ring.plate_width_m) {
            violations.push(format!(
                "Plate width of ring {} must be greater than 0 and a valid number.",
                i + 1
            ));
        }
    }

    let total_width = inputs.total_plate_width_m();
    if total_width > inputs.height_m + WIDTH_SUM_TOLERANCE_M {
        violations.push(format!(
            "The sum of plate widths ({:.3} m) exceeds the tank height ({:.3} m).",
            total_width, inputs.height_m
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "input rejected");
        Err(CalcError::ValidationFailed { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::Method;
    use crate::tank::{RingSpec, TankInputs};
    use crate::units::UnitSystem;

    fn inputs() -> TankInputs {
        TankInputs {
            tag: "T".to_string(),
            fluid: "Water".to_string(),
            unit_system: UnitSystem::Metric,
            method: Method::FixedPoint,
            diameter_nominal: 30.0,
            height_nominal: 12.0,
            diameter_m: 30.0,
            height_m: 12.0,
            relative_density: 1.0,
            joint_efficiency: None,
            rings: (0..5)
                .map(|_| RingSpec {
                    material: "A36".to_string(),
                    corrosion_allowance_mm: 1.5,
                    plate_width_m: 2.4,
                })
                .collect(),
        }
    }

    fn violations(result: CalcResult<()>) -> Vec<String> {
        match result {
            Err(CalcError::ValidationFailed { violations }) => violations,
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert!(validate(&inputs()).is_ok());
    }

    #[test]
    fn test_negative_height_is_reported() {
        let mut data = inputs();
        data.height_m = -1.0;
        let v = violations(validate(&data));
        assert!(v.iter().any(|m| m.contains("Height")));
    }

    #[test]
    fn test_all_violations_are_aggregated() {
        let mut data = inputs();
        data.diameter_m = f64::NAN;
        data.relative_density = 0.0;
        data.rings[1].corrosion_allowance_mm = f64::INFINITY;
        data.rings[3].plate_width_m = -2.0;

        let v = violations(validate(&data));
        assert_eq!(v.len(), 4);
        assert!(v[0].contains("Diameter"));
        assert!(v[1].contains("Relative density"));
        assert!(v[2].contains("ring 2"));
        assert!(v[3].contains("ring 4"));
    }

    #[test]
    fn test_widths_exceeding_height() {
        let mut data = inputs();
        data.rings[4].plate_width_m = 3.0;
        let v = violations(validate(&data));
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("exceeds the tank height"));
    }

    #[test]
    fn test_no_rings() {
        let mut data = inputs();
        data.rings.clear();
        let v = violations(validate(&data));
        assert!(v[0].contains("At least one"));
    }
}
