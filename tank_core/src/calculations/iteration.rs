//! # Variable-Design-Point Iteration (API 650 5.6.4.6 - 5.6.4.7)
//!
//! Computes an upper ring's thickness from the thickness of the ring below
//! it. Each pass locates the variable design point x from the current trial
//! thickness and recomputes the thickness at that point, until two successive
//! trials agree within the tolerance.
//!
//! The design basis works on corroded thicknesses: the trial `tu` and the
//! lower thickness `tL` exclude corrosion allowance while the per-pass result
//! includes it. The hydrostatic test basis has no corrosion allowance.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::iteration::{solve, Basis, SolverInput, SolverSettings};
//!
//! let input = SolverInput {
//!     basis: Basis::Design,
//!     lower_thickness_mm: 10.0,
//!     radius_mm: 10_000.0,
//!     liquid_head_m: 12.0,
//!     allowable_stress_mpa: 160.0,
//!     corrosion_allowance_mm: 1.0,
//!     diameter_m: 20.0,
//!     relative_density: 1.0,
//! };
//!
//! let outcome = solve(&input, &SolverSettings::default());
//! assert!(outcome.converged);
//! assert_eq!(outcome.passes.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::{design_point_candidates, one_foot_design_thickness, one_foot_hydrotest_thickness, shape_factor, variable_point_thickness};

/// Convergence settings for the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Stop once successive trials differ by no more than this (mm)
    pub tolerance_mm: f64,
    /// Hard cap on passes per solve
    pub max_passes: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance_mm: 0.254,
            max_passes: 200,
        }
    }
}

/// Loading condition a thickness is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Product at design density, allowable Sd, with corrosion allowance
    Design,
    /// Water test, allowable St, no corrosion allowance
    Hydrotest,
}

/// Everything the iteration needs for one ring and one basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverInput {
    pub basis: Basis,
    /// Thickness of the ring below, corroded for the design basis (mm)
    pub lower_thickness_mm: f64,
    /// Tank radius (mm)
    pub radius_mm: f64,
    /// Liquid head above the bottom of this ring (m)
    pub liquid_head_m: f64,
    /// Sd or St depending on basis (MPa)
    pub allowable_stress_mpa: f64,
    /// Corrosion allowance of this ring (mm); ignored for the hydrotest basis
    pub corrosion_allowance_mm: f64,
    pub diameter_m: f64,
    /// Relative density; ignored for the hydrotest basis
    pub relative_density: f64,
}

impl SolverInput {
    fn corrosion(&self) -> f64 {
        match self.basis {
            Basis::Design => self.corrosion_allowance_mm,
            Basis::Hydrotest => 0.0,
        }
    }

    fn density(&self) -> f64 {
        match self.basis {
            Basis::Design => self.relative_density,
            Basis::Hydrotest => 1.0,
        }
    }

    /// One-foot thickness used as the first trial, without corrosion allowance
    fn first_trial(&self) -> f64 {
        match self.basis {
            Basis::Design => one_foot_design_thickness(
                self.diameter_m,
                self.liquid_head_m,
                self.relative_density,
                self.allowable_stress_mpa,
                0.0,
            ),
            Basis::Hydrotest => {
                one_foot_hydrotest_thickness(self.diameter_m, self.liquid_head_m, self.allowable_stress_mpa)
            }
        }
    }
}

/// Values computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationPass {
    /// Pass number, starting at 0 as in the reported iteration history
    pub pass: u32,
    /// Trial upper ring thickness tu (mm)
    pub upper_trial_mm: f64,
    /// Lower ring thickness tL (mm)
    pub lower_mm: f64,
    /// K = tL / tu
    pub k: f64,
    /// Shape factor C
    pub c: f64,
    pub x1_mm: f64,
    pub x2_mm: f64,
    pub x3_mm: f64,
    /// Governing design point x = min(x1, x2, x3)
    pub x_mm: f64,
    /// Thickness at x, including corrosion allowance on the design basis (mm)
    pub thickness_mm: f64,
    /// |new trial - tu| (mm)
    pub delta_mm: f64,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationOutcome {
    /// Upper ring thickness without corrosion allowance (mm)
    pub thickness_corroded_mm: f64,
    pub passes: Vec<IterationPass>,
    pub converged: bool,
    /// Set when the pass cap was reached or the inputs were degenerate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Run the iteration for one ring and one basis.
///
/// Always performs at least one pass unless the first trial is degenerate.
/// Reaching `max_passes` is not an error: the last estimate is returned with
/// `converged = false` and a warning.
pub fn solve(input: &SolverInput, settings: &SolverSettings) -> IterationOutcome {
    let ca = input.corrosion();
    let g = input.density();
    let tl = input.lower_thickness_mm;
    let r = input.radius_mm;
    let head = input.liquid_head_m;
    let max_passes = settings.max_passes.max(1);

    let mut passes: Vec<IterationPass> = Vec::new();
    let mut estimate: f64 = 0.0;

    loop {
        let tu = match passes.last() {
            None => input.first_trial(),
            Some(last) => last.thickness_mm - ca,
        };

        if !(tu.is_finite() && tu > 0.0 && tl.is_finite() && tl > 0.0) {
            let warning = format!(
                "{:?} iteration stopped: non-positive thickness (tu = {:.3} mm, tL = {:.3} mm)",
                input.basis, tu, tl
            );
            tracing::warn!(basis = ?input.basis, tu, tl, "degenerate iteration input");
            return IterationOutcome {
                thickness_corroded_mm: estimate.max(0.0),
                passes,
                converged: false,
                warning: Some(warning),
            };
        }

        let k = tl / tu;
        let c = shape_factor(k);
        let (x1, x2, x3) = design_point_candidates(r, tu, c, head);
        let x = x1.min(x2).min(x3);
        let thickness = variable_point_thickness(input.diameter_m, head, x, g, input.allowable_stress_mpa, ca);
        estimate = thickness - ca;
        let delta = (estimate - tu).abs();

        passes.push(IterationPass {
            pass: passes.len() as u32,
            upper_trial_mm: tu,
            lower_mm: tl,
            k,
            c,
            x1_mm: x1,
            x2_mm: x2,
            x3_mm: x3,
            x_mm: x,
            thickness_mm: thickness,
            delta_mm: delta,
        });

        if delta <= settings.tolerance_mm {
            return IterationOutcome {
                thickness_corroded_mm: estimate,
                passes,
                converged: true,
                warning: None,
            };
        }

        if passes.len() as u32 >= max_passes {
            tracing::warn!(basis = ?input.basis, passes = passes.len(), delta, "iteration cap reached");
            return IterationOutcome {
                thickness_corroded_mm: estimate,
                passes,
                converged: false,
                warning: Some(format!(
                    "{:?} iteration did not converge within {} passes (last delta {:.4} mm)",
                    input.basis, max_passes, delta
                )),
            };
        }
    }
}
