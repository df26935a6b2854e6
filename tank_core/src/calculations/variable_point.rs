//! # Variable-Design-Point Method (API 650 5.6.4)
//!
//! The rings form a chain: every ring after the first is derived from the
//! design and hydrostatic test thicknesses of the ring below, so both bases
//! are carried forward from ring to ring.
//!
//! - Bottom ring: the lesser of the one-foot and the 5.6.4.4 thickness per
//!   basis, then the larger basis governs. The method applies while
//!   L/H <= 1000/6; otherwise the bottom ring is marked "NA" and the
//!   calculation stops.
//! - Second ring: selected by h1/√(r·t1) per basis (5.6.4.5).
//! - Third ring and above: the iteration of 5.6.4.6, seeded from the ring below.

use super::iteration::{solve, Basis, IterationOutcome, SolverInput, SolverSettings};
use super::memory::{EquationTrail, RingResult};
use super::{MethodRun, TankAlert};
use crate::equations::shell::{
    SECOND_RING_RATIO_LOWER, SECOND_RING_RATIO_UPPER, SLENDERNESS_LIMIT, SMALL_TANK_BOTTOM_RING_MIN_MM,
};
use crate::equations::{
    bottom_ring_design_thickness, bottom_ring_hydrotest_thickness, minimum_thickness, one_foot_design_thickness,
    one_foot_hydrotest_thickness, second_ring_ratio, second_ring_transition_thickness, slenderness_ratio,
    small_tank_bottom_ring_applies, Clause,
};
use crate::materials::MaterialProperties;
use crate::tank::TankInputs;
use crate::units::MILLIMETERS_PER_METER;

/// Per-basis thicknesses of the previous ring.
///
/// `design_mm` includes that ring's corrosion allowance; `hydrotest_mm` has none.
#[derive(Debug, Clone, Copy)]
struct BasisThickness {
    design_mm: f64,
    hydrotest_mm: f64,
    corrosion_allowance_mm: f64,
    /// Final thickness of that ring
    thickness_mm: f64,
}

impl BasisThickness {
    fn value(&self, basis: Basis) -> f64 {
        match basis {
            Basis::Design => self.design_mm,
            Basis::Hydrotest => self.hydrotest_mm,
        }
    }

    fn corroded(&self, basis: Basis) -> f64 {
        match basis {
            Basis::Design => self.design_mm - self.corrosion_allowance_mm,
            Basis::Hydrotest => self.hydrotest_mm,
        }
    }
}

/// Shared per-tank values
struct Shell<'a> {
    inputs: &'a TankInputs,
    properties: &'a [MaterialProperties],
    settings: &'a SolverSettings,
    t_min: f64,
    radius_mm: f64,
}

impl Shell<'_> {
    fn solver_input(&self, i: usize, basis: Basis, lower_thickness_mm: f64) -> SolverInput {
        let props = &self.properties[i];
        SolverInput {
            basis,
            lower_thickness_mm,
            radius_mm: self.radius_mm,
            liquid_head_m: self.inputs.liquid_head_m(i),
            allowable_stress_mpa: match basis {
                Basis::Design => props.design_stress_mpa,
                Basis::Hydrotest => props.hydrotest_stress_mpa,
            },
            corrosion_allowance_mm: self.inputs.rings[i].corrosion_allowance_mm,
            diameter_m: self.inputs.diameter_m,
            relative_density: self.inputs.relative_density,
        }
    }
}

pub(crate) fn calculate_rings(
    inputs: &TankInputs,
    properties: &[MaterialProperties],
    settings: &SolverSettings,
) -> MethodRun {
    let shell = Shell {
        inputs,
        properties,
        settings,
        t_min: minimum_thickness(inputs.diameter_m),
        radius_mm: inputs.radius_mm(),
    };

    let ring_count = inputs.rings.len().min(properties.len());
    let mut rings = Vec::with_capacity(ring_count);

    let (bottom, mut previous, alert) = bottom_ring(&shell);
    rings.push(bottom);
    if alert != TankAlert::None {
        return MethodRun { rings, alert };
    }

    for i in 1..ring_count {
        let (result, current) = if i == 1 {
            second_ring(&shell, previous)
        } else {
            upper_ring(&shell, i, previous)
        };
        rings.push(result);
        previous = current;
    }

    MethodRun { rings, alert }
}

fn bottom_ring(shell: &Shell<'_>) -> (RingResult, BasisThickness, TankAlert) {
    let inputs = shell.inputs;
    let props = &shell.properties[0];
    let (d, h, g) = (inputs.diameter_m, inputs.height_m, inputs.relative_density);
    let ca = inputs.rings[0].corrosion_allowance_mm;

    let t1pd = one_foot_design_thickness(d, h, g, props.design_stress_mpa, ca);
    let t1pt = one_foot_hydrotest_thickness(d, h, props.hydrotest_stress_mpa);
    let t1d = bottom_ring_design_thickness(d, h, g, props.design_stress_mpa, ca);
    let t1t = bottom_ring_hydrotest_thickness(d, h, props.hydrotest_stress_mpa);

    let design = t1d.min(t1pd);
    let hydrotest = t1t.min(t1pt);

    let mut t1 = design.max(hydrotest).max(shell.t_min);
    if small_tank_bottom_ring_applies(d, 0, t1) {
        t1 = SMALL_TANK_BOTTOM_RING_MIN_MM;
    }

    let l_over_h = slenderness_ratio(d, h, t1 - ca);
    let alert = if l_over_h > SLENDERNESS_LIMIT {
        tracing::info!(l_over_h, "variable-design-point method not applicable, stopping");
        TankAlert::VariablePointSlendernessExceeded
    } else {
        TankAlert::None
    };

    let mut trail = EquationTrail::for_ring(0);
    trail.push(Clause::MinimumThickness, shell.t_min);
    trail.push(Clause::BottomRingOneFootDesign, t1pd);
    trail.push(Clause::BottomRingOneFootHydrotest, t1pt);
    trail.push(Clause::BottomRingDesign, t1d);
    trail.push(Clause::BottomRingHydrotest, t1t);
    trail.push(Clause::SlendernessRatio, l_over_h);
    trail.push(Clause::BottomRingThickness, t1);
    if alert != TankAlert::None {
        trail.push_not_applicable(Clause::SlendernessExceeded);
    }

    tracing::debug!(ring = 1, design, hydrotest, thickness = t1, l_over_h, "variable-point bottom ring");

    let result = RingResult::new(inputs, 0, t1, Some(props), trail);
    let carried = BasisThickness {
        design_mm: design,
        hydrotest_mm: hydrotest,
        corrosion_allowance_mm: ca,
        thickness_mm: t1,
    };
    (result, carried, alert)
}

/// Second ring thickness for one basis, including the second ring's corrosion
/// allowance on the design basis.
///
/// At or below the lower ratio the bottom ring's basis value carries over
/// unchanged. Returns the thickness, the ratio and the iteration when one was
/// needed.
fn second_ring_basis(
    shell: &Shell<'_>,
    basis: Basis,
    previous: BasisThickness,
) -> (f64, f64, Option<IterationOutcome>) {
    let h1 = shell.inputs.rings[0].plate_width_m * MILLIMETERS_PER_METER;
    let r = shell.radius_mm;
    let t1 = previous.corroded(basis);
    let ratio = second_ring_ratio(h1, r, t1);

    if ratio <= SECOND_RING_RATIO_LOWER {
        return (previous.value(basis), ratio, None);
    }

    let ca = match basis {
        Basis::Design => shell.inputs.rings[1].corrosion_allowance_mm,
        Basis::Hydrotest => 0.0,
    };

    let outcome = solve(&shell.solver_input(1, basis, t1), shell.settings);
    let t2a = outcome.thickness_corroded_mm;
    let t2 = if ratio < SECOND_RING_RATIO_UPPER {
        second_ring_transition_thickness(t2a, t1, h1, r)
    } else {
        t2a
    };
    (t2 + ca, ratio, Some(outcome))
}

fn second_ring(shell: &Shell<'_>, previous: BasisThickness) -> (RingResult, BasisThickness) {
    let inputs = shell.inputs;
    let ca = inputs.rings[1].corrosion_allowance_mm;

    let (design, ratio_d, design_iter) = second_ring_basis(shell, Basis::Design, previous);
    let (hydrotest, ratio_t, hydro_iter) = second_ring_basis(shell, Basis::Hydrotest, previous);
    let t2 = if design_iter.is_none() && hydro_iter.is_none() {
        previous.thickness_mm
    } else {
        design.max(hydrotest).max(shell.t_min)
    };

    let mut trail = EquationTrail::for_ring(1);
    let mut warnings = Vec::new();
    for (basis, outcome) in [(Basis::Design, &design_iter), (Basis::Hydrotest, &hydro_iter)] {
        if let Some(outcome) = outcome {
            trail.push_passes(basis, &outcome.passes);
            warnings.extend(outcome.warning.clone());
        }
    }
    trail.push(Clause::MinimumThickness, shell.t_min);
    trail.push(Clause::SecondRingRatioDesign, ratio_d);
    trail.push(Clause::SecondRingRatioHydrotest, ratio_t);

    tracing::debug!(ring = 2, ratio_d, ratio_t, design, hydrotest, thickness = t2, "variable-point second ring");

    let result = RingResult::new(inputs, 1, t2, Some(&shell.properties[1]), trail).with_warnings(warnings);
    // A carried-over design value still holds the bottom ring's allowance
    let carried = BasisThickness {
        design_mm: design,
        hydrotest_mm: hydrotest,
        corrosion_allowance_mm: if design_iter.is_some() { ca } else { previous.corrosion_allowance_mm },
        thickness_mm: t2,
    };
    (result, carried)
}

fn upper_ring(shell: &Shell<'_>, i: usize, previous: BasisThickness) -> (RingResult, BasisThickness) {
    let inputs = shell.inputs;
    let ca = inputs.rings[i].corrosion_allowance_mm;

    let design_iter = solve(
        &shell.solver_input(i, Basis::Design, previous.corroded(Basis::Design)),
        shell.settings,
    );
    let hydro_iter = solve(
        &shell.solver_input(i, Basis::Hydrotest, previous.corroded(Basis::Hydrotest)),
        shell.settings,
    );

    let design = design_iter.thickness_corroded_mm + ca;
    let hydrotest = hydro_iter.thickness_corroded_mm;
    let t = design.max(hydrotest).max(shell.t_min);

    let mut trail = EquationTrail::for_ring(i);
    trail.push_passes(Basis::Design, &design_iter.passes);
    trail.push_passes(Basis::Hydrotest, &hydro_iter.passes);
    trail.push(Clause::UpperRingThickness, t);

    let warnings: Vec<String> = design_iter.warning.into_iter().chain(hydro_iter.warning).collect();

    tracing::debug!(
        ring = i + 1,
        design,
        hydrotest,
        thickness = t,
        passes_d = design_iter.passes.len(),
        passes_t = hydro_iter.passes.len(),
        "variable-point upper ring"
    );

    let result = RingResult::new(inputs, i, t, Some(&shell.properties[i]), trail).with_warnings(warnings);
    let carried = BasisThickness {
        design_mm: design,
        hydrotest_mm: hydrotest,
        corrosion_allowance_mm: ca,
        thickness_mm: t,
    };
    (result, carried)
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

    fn tank(d: f64, h: f64, ca: f64, widths: &[f64]) -> TankInputs {
        TankInputs {
            tag: "T".to_string(),
            fluid: "Water".to_string(),
            unit_system: UnitSystem::Metric,
            method: Method::VariablePoint,
            diameter_nominal: d,
            height_nominal: h,
            diameter_m: d,
            height_m: h,
            relative_density: 1.0,
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

    fn run_with(inputs: &TankInputs, settings: &SolverSettings) -> MethodRun {
        let props = builtin_table().resolve_all(&inputs.rings).unwrap();
        calculate_rings(inputs, &props, settings)
    }

    fn run(inputs: &TankInputs) -> MethodRun {
        run_with(inputs, &SolverSettings::default())
    }

    #[test]
    fn test_second_ring_carries_bottom_thickness_when_ratio_is_low() {
        let result = run(&tank(20.0, 20.0, 0.0, &[0.4, 2.4, 2.4, 2.4]));
        assert_eq!(result.alert, TankAlert::None);
        assert_eq!(result.rings.len(), 4);

        // One-foot design governs the bottom ring
        assert!(approx(result.rings[0].thickness_mm, 12.06625));
        assert!(approx(result.rings[1].thickness_mm, result.rings[0].thickness_mm));

        let trail = &result.rings[1].equation_trail;
        assert_eq!(trail.count_of(Clause::PassNumber), 0);
        assert_eq!(
            trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::MinimumThickness,
                Clause::SecondRingRatioDesign,
                Clause::SecondRingRatioHydrotest,
            ]
        );
        assert!(approx(trail.value_of(Clause::SecondRingRatioDesign).and_then(|v| v.as_f64()).unwrap(), 1.1515));
        assert!(approx(trail.value_of(Clause::SecondRingRatioHydrotest).and_then(|v| v.as_f64()).unwrap(), 1.1905));

        assert!(approx(result.rings[2].thickness_mm, 10.2946));
        assert!(approx(result.rings[3].thickness_mm, 8.8423));
    }

    #[test]
    fn test_second_ring_carry_over_keeps_bottom_allowance() {
        let mut inputs = tank(20.0, 20.0, 0.0, &[0.4, 2.4, 2.4]);
        inputs.rings[0].corrosion_allowance_mm = 3.0;
        inputs.rings[1].corrosion_allowance_mm = 1.0;
        inputs.rings[2].corrosion_allowance_mm = 1.0;
        let result = run(&inputs);

        assert!(approx(result.rings[0].thickness_mm, 15.06625));
        assert_eq!(result.rings[1].thickness_mm, result.rings[0].thickness_mm);
        assert_eq!(result.rings[1].equation_trail.count_of(Clause::PassNumber), 0);
        assert!(result.rings[2].thickness_mm < result.rings[1].thickness_mm);
    }

    #[test]
    fn test_small_tank_bottom_ring_floor() {
        let result = run(&tank(10.0, 5.0, 0.0, &[2.5, 2.5]));
        assert_eq!(result.alert, TankAlert::None);
        assert_eq!(result.rings.len(), 2);

        // Note 4 lifts the bottom ring above the 5 mm minimum for D < 15 m
        let bottom = &result.rings[0];
        assert_eq!(bottom.thickness_mm, 6.0);
        assert_eq!(
            bottom.equation_trail.value_of(Clause::BottomRingThickness).and_then(|v| v.as_f64()),
            Some(6.0)
        );
        assert_eq!(
            bottom.equation_trail.value_of(Clause::MinimumThickness).and_then(|v| v.as_f64()),
            Some(5.0)
        );
        assert_eq!(
            bottom.equation_trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::MinimumThickness,
                Clause::BottomRingOneFootDesign,
                Clause::BottomRingOneFootHydrotest,
                Clause::BottomRingDesign,
                Clause::BottomRingHydrotest,
                Clause::SlendernessRatio,
                Clause::BottomRingThickness,
            ]
        );

        // Only the bottom ring is lifted
        assert_eq!(result.rings[1].thickness_mm, 5.0);
        assert!(result.rings[1].equation_trail.count_of(Clause::PassNumber) > 0);
    }

    #[test]
    fn test_bottom_ring_trail() {
        let result = run(&tank(20.0, 20.0, 0.0, &[0.4, 2.4]));
        assert_eq!(
            result.rings[0].equation_trail.labels(),
            vec![
                Clause::RingNumber,
                Clause::MinimumThickness,
                Clause::BottomRingOneFootDesign,
                Clause::BottomRingOneFootHydrotest,
                Clause::BottomRingDesign,
                Clause::BottomRingHydrotest,
                Clause::SlendernessRatio,
                Clause::BottomRingThickness,
            ]
        );
    }

    #[test]
    fn test_slenderness_limit_halts() {
        let result = run(&tank(50.0, 2.0, 0.0, &[1.0, 1.0]));
        assert_eq!(result.alert, TankAlert::VariablePointSlendernessExceeded);
        assert_eq!(result.rings.len(), 1);
        assert_eq!(result.rings[0].thickness_mm, 8.0);
        assert_eq!(
            result.rings[0].equation_trail.labels().last(),
            Some(&Clause::SlendernessExceeded)
        );
    }

    #[test]
    fn test_large_tank_second_ring_above_upper_ratio() {
        let result = run(&tank(60.0, 15.0, 2.0, &[2.5; 6]));
        assert_eq!(result.alert, TankAlert::None);
        let t: Vec<f64> = result.rings.iter().map(|r| r.thickness_mm).collect();
        assert!(approx(t[0], 28.8870));
        assert!(approx(t[1], 23.1863));
        assert!(approx(t[2], 18.9032));
        assert!(approx(t[3], 14.4080));
        assert!(approx(t[4], 10.0857));
        assert_eq!(t[5], 8.0);

        // Both bases iterate for the second ring, two passes each
        let trail = &result.rings[1].equation_trail;
        assert_eq!(trail.count_of(Clause::PassNumber), 4);
        assert_eq!(trail.count_of(Clause::UpperRingDesign), 2);
        assert_eq!(trail.count_of(Clause::UpperRingHydrotest), 2);
        assert_eq!(trail.labels().last(), Some(&Clause::SecondRingRatioHydrotest));

        let top = &result.rings[5].equation_trail;
        assert_eq!(top.labels().last(), Some(&Clause::UpperRingThickness));
    }

    #[test]
    fn test_large_tank_second_ring_in_transition_band() {
        let mut widths = vec![1.5];
        widths.extend([2.5; 5]);
        let result = run(&tank(60.0, 15.0, 2.0, &widths));
        let ratio = result.rings[1]
            .equation_trail
            .value_of(Clause::SecondRingRatioDesign)
            .and_then(|v| v.as_f64())
            .unwrap();
        assert!(ratio > SECOND_RING_RATIO_LOWER && ratio < SECOND_RING_RATIO_UPPER);
        assert!(approx(result.rings[1].thickness_mm, 28.0434));
        assert!(approx(result.rings[2].thickness_mm, 20.5428));
    }

    #[test]
    fn test_iteration_cap_is_reported_on_the_ring() {
        let settings = SolverSettings {
            tolerance_mm: 0.0,
            max_passes: 1,
        };
        let result = run_with(&tank(60.0, 15.0, 2.0, &[2.5; 3]), &settings);
        assert_eq!(result.rings.len(), 3);
        assert!(result.rings[0].warnings.is_empty());
        assert_eq!(result.rings[2].warnings.len(), 2);
        assert!(result.rings.iter().all(|r| r.thickness_mm >= 8.0));
    }
}
