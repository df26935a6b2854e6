//! # Annex A (Small Tanks)
//!
//! t = 4.9·D·(H - 0.3)·G / (E·145) + CA per ring, with the minimum thickness
//! rules applied. Annex A only covers shells up to 13 mm: the first ring
//! above that is recorded with an "NA" marker and the calculation stops.
//!
//! - Relative density below 1 is taken as 1 (A.4.1).
//! - The joint efficiency is used when it lies in (0, 1], otherwise 1.
//! - Allowable stresses are not used, so no material lookup is made.

use super::memory::{EquationTrail, RingResult};
use super::{MethodRun, TankAlert};
use crate::equations::shell::{ANNEX_A_MAX_THICKNESS_MM, SMALL_TANK_BOTTOM_RING_MIN_MM};
use crate::equations::{annex_a_thickness, minimum_thickness, small_tank_bottom_ring_applies, Clause};
use crate::tank::TankInputs;

/// Joint efficiency actually applied
pub fn effective_joint_efficiency(joint_efficiency: Option<f64>) -> f64 {
    match joint_efficiency {
        Some(e) if e > 0.0 && e <= 1.0 => e,
        _ => 1.0,
    }
}

/// Relative density actually applied (never below water)
pub fn effective_relative_density(g: f64) -> f64 {
    g.max(1.0)
}

pub(crate) fn calculate_rings(inputs: &TankInputs) -> MethodRun {
    let d = inputs.diameter_m;
    let g = effective_relative_density(inputs.relative_density);
    let e = effective_joint_efficiency(inputs.joint_efficiency);
    let t_min = minimum_thickness(d);

    let mut rings = Vec::with_capacity(inputs.rings.len());
    let mut alert = TankAlert::None;

    for (i, ring) in inputs.rings.iter().enumerate() {
        let head = inputs.liquid_head_m(i);
        let raw = annex_a_thickness(d, head, g, e, ring.corrosion_allowance_mm);
        let note4 = small_tank_bottom_ring_applies(d, i, raw);

        let mut t = raw.max(t_min);
        if small_tank_bottom_ring_applies(d, i, t) {
            t = SMALL_TANK_BOTTOM_RING_MIN_MM;
        }

        if t > ANNEX_A_MAX_THICKNESS_MM {
            alert = TankAlert::AnnexThicknessExceeded;
        }
        let halted = alert != TankAlert::None;

        let mut trail = EquationTrail::for_ring(i);
        if i == 0 || halted {
            trail.push(Clause::MinimumThickness, t_min);
        }
        trail.push(Clause::AnnexAThickness, t);
        if i == 0 && note4 {
            trail.push(Clause::SmallTankBottomRing, t);
        }
        if halted {
            trail.push_not_applicable(Clause::AnnexANotApplicable);
        }

        tracing::debug!(ring = i + 1, head, raw, thickness = t, "annex A ring");
        rings.push(RingResult::new(inputs, i, t, None, trail));

        if halted {
            tracing::info!(ring = i + 1, thickness = t, "annex A not applicable, stopping");
            break;
        }
    }

    MethodRun { rings, alert }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::Method;
    use crate::tank::RingSpec;
    use crate::units::UnitSystem;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn tank(d: f64, h: f64, g: f64, e: Option<f64>, rings: usize) -> TankInputs {
        TankInputs {
            tag: "T".to_string(),
            fluid: "Water".to_string(),
            unit_system: UnitSystem::Metric,
            method: Method::AnnexA,
            diameter_nominal: d,
            height_nominal: h,
            diameter_m: d,
            height_m: h,
            relative_density: g,
            joint_efficiency: e,
            rings: (0..rings)
                .map(|_| RingSpec {
                    material: "A36".to_string(),
                    corrosion_allowance_mm: 0.0,
                    plate_width_m: 2.5,
                })
                .collect(),
        }
    }

    #[test]
    fn test_joint_efficiency_defaulting() {
        assert_eq!(effective_joint_efficiency(Some(0.85)), 0.85);
        assert_eq!(effective_joint_efficiency(Some(1.0)), 1.0);
        assert_eq!(effective_joint_efficiency(Some(0.0)), 1.0);
        assert_eq!(effective_joint_efficiency(Some(1.2)), 1.0);
        assert_eq!(effective_joint_efficiency(None), 1.0);
    }

    #[test]
    fn test_reference_tank() {
        let run = calculate_rings(&tank(20.0, 10.0, 1.0, Some(0.85), 4));
        assert_eq!(run.alert, TankAlert::None);
        assert_eq!(run.rings.len(), 4);
        assert!(approx(run.rings[0].thickness_mm, 7.7128));
        // Upper rings floored at 6 mm (D = 20 m)
        assert_eq!(run.rings[1].thickness_mm, 6.0);
        assert_eq!(run.rings[3].thickness_mm, 6.0);

        assert_eq!(
            run.rings[0].equation_trail.labels(),
            vec![Clause::RingNumber, Clause::MinimumThickness, Clause::AnnexAThickness]
        );
        assert_eq!(
            run.rings[2].equation_trail.labels(),
            vec![Clause::RingNumber, Clause::AnnexAThickness]
        );
        assert!(run.rings[0].design_stress_mpa.is_none());
    }

    #[test]
    fn test_density_below_water_is_raised() {
        let light = calculate_rings(&tank(20.0, 12.0, 0.8, Some(0.85), 1));
        let water = calculate_rings(&tank(20.0, 12.0, 1.0, Some(0.85), 1));
        assert_eq!(light.rings[0].thickness_mm, water.rings[0].thickness_mm);
        assert!(approx(light.rings[0].thickness_mm, 9.3030));
    }

    #[test]
    fn test_small_tank_note_4() {
        let run = calculate_rings(&tank(10.0, 5.0, 1.0, Some(1.0), 2));
        assert_eq!(run.rings[0].thickness_mm, 6.0);
        assert_eq!(
            run.rings[0].equation_trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::MinimumThickness,
                Clause::AnnexAThickness,
                Clause::SmallTankBottomRing
            ]
        );
        // Note 4 only affects the bottom ring
        assert_eq!(run.rings[1].thickness_mm, 5.0);
    }

    #[test]
    fn test_thickness_above_13_mm_halts() {
        let run = calculate_rings(&tank(40.0, 20.0, 1.0, Some(1.0), 2));
        assert_eq!(run.alert, TankAlert::AnnexThicknessExceeded);
        assert_eq!(run.rings.len(), 1);
        assert!(approx(run.rings[0].thickness_mm, 26.6290));

        let trail = &run.rings[0].equation_trail;
        assert_eq!(trail.labels().last(), Some(&Clause::AnnexANotApplicable));
        assert_eq!(trail.value_of(Clause::AnnexANotApplicable).map(|v| v.to_string()), Some("NA".to_string()));
    }
}
