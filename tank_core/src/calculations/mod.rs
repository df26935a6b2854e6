//! # Shell Thickness Calculation
//!
//! One entry point, [`calculate`], runs the whole pipeline:
//!
//! 1. normalize the raw [`TankInput`] to canonical units
//! 2. validate (all rules, aggregated)
//! 3. resolve every ring's allowable stresses (skipped for Annex A)
//! 4. run the selected [`Method`] ring by ring, bottom to top
//! 5. assemble the [`CalculationOutcome`] with its per-ring memory
//!
//! Invalid input and unresolved materials are errors and produce no outcome.
//! A method that turns out not to apply to the tank is not an error: the
//! outcome carries a [`TankAlert`] and the rings computed up to that point.
//!
//! ## Available Methods
//!
//! - [`annex_a`] - Annex A small tanks
//! - [`fixed_point`] - one-foot method (5.6.3)
//! - [`variable_point`] - variable-design-point method (5.6.4), using [`iteration`]
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::{calculate, Method, TankAlert};
//! use tank_core::materials::builtin_table;
//! use tank_core::tank::{NumericField, RingInput, TankInput};
//! use tank_core::units::UnitSystem;
//!
//! let input = TankInput {
//!     tag: Some("TQ-101".to_string()),
//!     fluid: Some("Water".to_string()),
//!     unit_system: UnitSystem::Metric,
//!     diameter: NumericField::from(20.0),
//!     height: NumericField::from(10.0),
//!     relative_density: NumericField::from(1.0),
//!     joint_efficiency: Some(NumericField::from(0.85)),
//!     rings: vec![RingInput::new("A36", 0.0, 2.5); 4],
//!     method: Method::AnnexA,
//! };
//!
//! let outcome = calculate(&input, builtin_table()).unwrap();
//! assert_eq!(outcome.alert, TankAlert::None);
//! assert!((outcome.results[0].required_thickness_mm - 7.71).abs() < 0.01);
//! ```

pub mod annex_a;
pub mod fixed_point;
pub mod iteration;
pub mod memory;
pub mod variable_point;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use iteration::{Basis, IterationOutcome, SolverSettings};
pub use memory::{EquationTrail, RingResult, TrailValue};

use crate::errors::CalcResult;
use crate::materials::{ExcessFlag, MaterialTable};
use crate::tank::{RingSpec, TankInput, TankInputs};
use crate::units::UnitSystem;
use crate::validation::validate;

/// Shell thickness method. Exactly one is applied per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Annex A, small tanks with shells up to 13 mm
    AnnexA,
    /// One-foot method, D <= 61 m
    FixedPoint,
    /// Variable-design-point method
    VariablePoint,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::AnnexA, Method::FixedPoint, Method::VariablePoint];

    pub fn display_name(&self) -> &'static str {
        match self {
            Method::AnnexA => "Annex A",
            Method::FixedPoint => "One-Foot (Fixed Point)",
            Method::VariablePoint => "Variable Design Point",
        }
    }

    /// Whether the method sizes rings from material allowable stresses
    pub fn uses_material_stresses(&self) -> bool {
        !matches!(self, Method::AnnexA)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Tank-level applicability alert. At most one per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankAlert {
    #[default]
    None,
    /// A ring exceeded 13 mm under Annex A (A.1.1)
    AnnexThicknessExceeded,
    /// Diameter above 61 m under the one-foot method (5.6.3.1)
    FixedPointDiameterExceeded,
    /// L/H above 1000/6 under the variable-design-point method (5.6.4.1)
    VariablePointSlendernessExceeded,
}

impl TankAlert {
    pub fn message(&self) -> &'static str {
        match self {
            TankAlert::None => "None",
            TankAlert::AnnexThicknessExceeded => {
                "One or more shell rings are thicker than 13 mm; Annex A is not applicable (API 650 A.1.1)."
            }
            TankAlert::FixedPointDiameterExceeded => {
                "Tank diameter exceeds 61 m; the one-foot method is not applicable (API 650 5.6.3.1)."
            }
            TankAlert::VariablePointSlendernessExceeded => {
                "The tank does not meet the L/H requirement of API 650 5.6.4.1; the variable-design-point method is not applicable."
            }
        }
    }

    pub fn is_raised(&self) -> bool {
        *self != TankAlert::None
    }
}

impl fmt::Display for TankAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Rings and alert produced by one method run
#[derive(Debug, Clone)]
pub(crate) struct MethodRun {
    pub rings: Vec<RingResult>,
    pub alert: TankAlert,
}

/// Normalized inputs as echoed in the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEcho {
    pub method: Method,
    pub unit_system: UnitSystem,
    pub tag: String,
    pub fluid: String,
    /// As supplied, in `unit_system`
    pub diameter_nominal: f64,
    /// As supplied, in `unit_system`
    pub height_nominal: f64,
    pub diameter_m: f64,
    pub height_m: f64,
    pub relative_density: f64,
    /// Joint efficiency applied (Annex A only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_efficiency: Option<f64>,
    pub ring_count: usize,
    pub rings: Vec<RingSpec>,
}

impl InputEcho {
    fn from_inputs(inputs: &TankInputs) -> Self {
        Self {
            method: inputs.method,
            unit_system: inputs.unit_system,
            tag: inputs.tag.clone(),
            fluid: inputs.fluid.clone(),
            diameter_nominal: inputs.diameter_nominal,
            height_nominal: inputs.height_nominal,
            diameter_m: inputs.diameter_m,
            height_m: inputs.height_m,
            relative_density: inputs.relative_density,
            joint_efficiency: match inputs.method {
                Method::AnnexA => Some(annex_a::effective_joint_efficiency(inputs.joint_efficiency)),
                _ => None,
            },
            ring_count: inputs.rings.len(),
            rings: inputs.rings.clone(),
        }
    }
}

/// Required thickness of one ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingThickness {
    pub ring_index: usize,
    pub required_thickness_mm: f64,
}

/// Excess-thickness flag of one ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingExcessFlag {
    pub ring_index: usize,
    pub flag: ExcessFlag,
}

/// Complete result of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub inputs: InputEcho,
    pub results: Vec<RingThickness>,
    pub excess_flags: Vec<RingExcessFlag>,
    pub alert: TankAlert,
    pub memory: Vec<RingResult>,
}

impl CalculationOutcome {
    fn assemble(inputs: &TankInputs, run: MethodRun) -> Self {
        let results = run
            .rings
            .iter()
            .map(|r| RingThickness {
                ring_index: r.ring_index,
                required_thickness_mm: r.thickness_mm,
            })
            .collect();
        let excess_flags = run
            .rings
            .iter()
            .map(|r| RingExcessFlag {
                ring_index: r.ring_index,
                flag: r.excess_flag,
            })
            .collect();

        Self {
            inputs: InputEcho::from_inputs(inputs),
            results,
            excess_flags,
            alert: run.alert,
            memory: run.rings,
        }
    }

    /// Required thickness of every computed ring, bottom to top (mm)
    pub fn thicknesses(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.required_thickness_mm).collect()
    }

    /// True when every supplied ring was computed
    pub fn is_complete(&self) -> bool {
        self.results.len() == self.inputs.ring_count
    }

    /// Non-fatal warnings from all rings, prefixed with the ring number
    pub fn warnings(&self) -> Vec<String> {
        self.memory
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| format!("Ring {}: {}", r.ring_index + 1, w)))
            .collect()
    }
}

/// Run a calculation with default solver settings.
pub fn calculate(input: &TankInput, table: &MaterialTable) -> CalcResult<CalculationOutcome> {
    calculate_with_settings(input, table, &SolverSettings::default())
}

/// Run a calculation.
///
/// # Errors
/// - [`CalcError::ValidationFailed`](crate::errors::CalcError::ValidationFailed) listing every violated rule
/// - [`CalcError::UnresolvedMaterials`](crate::errors::CalcError::UnresolvedMaterials) listing every ring
///   whose material is missing from `table` (not for Annex A)
pub fn calculate_with_settings(
    input: &TankInput,
    table: &MaterialTable,
    settings: &SolverSettings,
) -> CalcResult<CalculationOutcome> {
    let inputs = input.normalize();
    calculate_normalized(&inputs, table, settings)
}

/// Run a calculation on inputs that are already in canonical units.
pub fn calculate_normalized(
    inputs: &TankInputs,
    table: &MaterialTable,
    settings: &SolverSettings,
) -> CalcResult<CalculationOutcome> {
    validate(inputs)?;

    let run = match inputs.method {
        Method::AnnexA => annex_a::calculate_rings(inputs),
        Method::FixedPoint => {
            let properties = table.resolve_all(&inputs.rings)?;
            fixed_point::calculate_rings(inputs, &properties)
        }
        Method::VariablePoint => {
            let properties = table.resolve_all(&inputs.rings)?;
            variable_point::calculate_rings(inputs, &properties, settings)
        }
    };

    tracing::debug!(
        tag = %inputs.tag,
        method = %inputs.method,
        rings = run.rings.len(),
        alert = ?run.alert,
        "calculation finished"
    );

    Ok(CalculationOutcome::assemble(inputs, run))
}
