//! # One-Foot Method (API 650 5.6.3)
//!
//! Each ring is sized at 0.3 m above its bottom for both the design and the
//! hydrostatic test condition; the larger governs. The method is limited to
//! tanks of 61 m diameter or less. A larger tank gets the bottom ring
//! computed and marked "NA", then the calculation stops.

use super::memory::{EquationTrail, RingResult};
use super::{MethodRun, TankAlert};
use crate::equations::shell::{FIXED_POINT_MAX_DIAMETER_M, SMALL_TANK_BOTTOM_RING_MIN_MM};
use crate::equations::{
    minimum_thickness, one_foot_design_thickness, one_foot_hydrotest_thickness, small_tank_bottom_ring_applies,
    Clause,
};
use crate::materials::MaterialProperties;
use crate::tank::TankInputs;

pub(crate) fn calculate_rings(inputs: &TankInputs, properties: &[MaterialProperties]) -> MethodRun {
    let d = inputs.diameter_m;
    let g = inputs.relative_density;
    let t_min = minimum_thickness(d);

    let alert = if d > FIXED_POINT_MAX_DIAMETER_M {
        tracing::info!(diameter_m = d, "one-foot method not applicable, stopping after the bottom ring");
        TankAlert::FixedPointDiameterExceeded
    } else {
        TankAlert::None
    };
    let halted = alert != TankAlert::None;

    let mut rings = Vec::with_capacity(inputs.rings.len());

    for ((i, ring), props) in inputs.rings.iter().enumerate().zip(properties) {
        let head = inputs.liquid_head_m(i);
        let td = one_foot_design_thickness(d, head, g, props.design_stress_mpa, ring.corrosion_allowance_mm);
        let tt = one_foot_hydrotest_thickness(d, head, props.hydrotest_stress_mpa);
        let governing = td.max(tt);
        let note4 = small_tank_bottom_ring_applies(d, i, governing);

        let mut t = governing.max(t_min);
        if small_tank_bottom_ring_applies(d, i, t) {
            t = SMALL_TANK_BOTTOM_RING_MIN_MM;
        }

        let mut trail = EquationTrail::for_ring(i);
        if i == 0 || halted {
            trail.push(Clause::MinimumThickness, t_min);
        }
        trail.push(Clause::FixedPointDesign, td);
        trail.push(Clause::FixedPointHydrotest, tt);
        trail.push(Clause::FixedPointThickness, t);
        if note4 {
            trail.push(Clause::SmallTankBottomRing, t);
        }
        if halted {
            trail.push_not_applicable(Clause::FixedPointNotApplicable);
        }

        tracing::debug!(ring = i + 1, head, td, tt, thickness = t, "one-foot ring");
        rings.push(RingResult::new(inputs, i, t, Some(props), trail));

        if halted {
            break;
        }
    }

    MethodRun { rings, alert }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::Method;
    use crate::materials::builtin_table;
    use crate::tank::RingSpec;
    use crate::units::UnitSystem;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn tank(d: f64, h: f64, g: f64, ca: f64, widths: &[f64]) -> TankInputs {
        TankInputs {
            tag: "T".to_string(),
            fluid: "Diesel".to_string(),
            unit_system: UnitSystem::Metric,
            method: Method::FixedPoint,
            diameter_nominal: d,
            height_nominal: h,
            diameter_m: d,
            height_m: h,
            relative_density: g,
            joint_efficiency: None,
            rings: widths
                .iter()
                .map(|w| RingSpec {
                    material: "A36".to_string(),
                    corrosion_allowance_mm: ca,
                    plate_width_m: *w,
                })
                .collect(),
        }
    }

    fn run(inputs: &TankInputs) -> MethodRun {
        let props = builtin_table().resolve_all(&inputs.rings).unwrap();
        calculate_rings(inputs, &props)
    }

    #[test]
    fn test_five_ring_tank() {
        let result = run(&tank(30.0, 12.0, 0.9, 1.5, &[2.4; 5]));
        assert_eq!(result.alert, TankAlert::None);
        assert_eq!(result.rings.len(), 5);

        let bottom = &result.rings[0];
        assert!(approx(bottom.thickness_mm, 11.1744));
        assert!(approx(bottom.equation_trail.value_of(Clause::FixedPointHydrotest).and_then(|v| v.as_f64()).unwrap(), 10.0579));
        assert_eq!(bottom.design_stress_mpa, Some(160.0));
        assert_eq!(bottom.hydrotest_stress_mpa, Some(171.0));

        assert!(approx(result.rings[1].thickness_mm, 9.1899));
        assert!(approx(result.rings[2].thickness_mm, 7.2054));
        // Minimum thickness governs at the top
        assert_eq!(result.rings[3].thickness_mm, 6.0);
        assert_eq!(result.rings[4].thickness_mm, 6.0);

        assert_eq!(
            bottom.equation_trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::MinimumThickness,
                Clause::FixedPointDesign,
                Clause::FixedPointHydrotest,
                Clause::FixedPointThickness,
            ]
        );
        assert_eq!(
            result.rings[1].equation_trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::FixedPointDesign,
                Clause::FixedPointHydrotest,
                Clause::FixedPointThickness,
            ]
        );
    }

    #[test]
    fn test_diameter_above_61_m_halts_after_bottom_ring() {
        let result = run(&tank(65.0, 15.0, 1.0, 0.0, &[2.5; 6]));
        assert_eq!(result.alert, TankAlert::FixedPointDiameterExceeded);
        assert_eq!(result.rings.len(), 1);
        assert_eq!(
            result.rings[0].equation_trail.labels().last(),
            Some(&Clause::FixedPointNotApplicable)
        );
    }

    #[test]
    fn test_small_tank_bottom_ring() {
        let result = run(&tank(8.0, 4.0, 1.0, 0.0, &[2.0, 2.0]));
        assert_eq!(result.rings[0].thickness_mm, 6.0);
        assert!(result.rings[0]
            .equation_trail
            .labels()
            .contains(&Clause::SmallTankBottomRing));
        assert_eq!(result.rings[1].thickness_mm, 5.0);
    }
}
