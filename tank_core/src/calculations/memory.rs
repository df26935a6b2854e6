//! # Calculation Memory
//!
//! The per-ring audit trail. Each ring carries an ordered list of
//! (clause, value) entries appended as the method computes them, so the
//! report shows exactly what was evaluated and in which order.
//!
//! ```rust
//! use tank_core::calculations::memory::EquationTrail;
//! use tank_core::equations::Clause;
//!
//! let mut trail = EquationTrail::for_ring(0);
//! trail.push(Clause::MinimumThickness, 6.0);
//! trail.push_not_applicable(Clause::FixedPointNotApplicable);
//!
//! assert_eq!(trail.labels(), vec![
//!     Clause::RingNumber,
//!     Clause::MinimumThickness,
//!     Clause::FixedPointNotApplicable,
//! ]);
//! assert_eq!(trail.entries()[0].value.to_string(), "Ring 1");
//! assert_eq!(trail.entries()[1].value.to_string(), "6.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::iteration::{Basis, IterationPass};
use crate::equations::Clause;
use crate::materials::{excess_thickness_flag, ExcessFlag, MaterialProperties};
use crate::tank::TankInputs;

/// Marker recorded against a clause that made the method inapplicable
pub const NOT_APPLICABLE: &str = "NA";

/// Value of one trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrailValue {
    /// Counters such as the iteration pass number
    Count(u32),
    /// Computed quantity, full precision
    Number(f64),
    /// Labels and markers ("Ring 2", "NA")
    Text(String),
}

impl fmt::Display for TrailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrailValue::Count(n) => write!(f, "{}", n),
            TrailValue::Number(v) => write!(f, "{:.2}", v),
            TrailValue::Text(s) => f.write_str(s),
        }
    }
}

impl TrailValue {
    /// Numeric value, if this entry holds one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TrailValue::Count(n) => Some(f64::from(*n)),
            TrailValue::Number(v) => Some(*v),
            TrailValue::Text(_) => None,
        }
    }
}

impl From<f64> for TrailValue {
    fn from(v: f64) -> Self {
        TrailValue::Number(v)
    }
}

impl From<u32> for TrailValue {
    fn from(n: u32) -> Self {
        TrailValue::Count(n)
    }
}

impl From<&str> for TrailValue {
    fn from(s: &str) -> Self {
        TrailValue::Text(s.to_string())
    }
}

impl From<String> for TrailValue {
    fn from(s: String) -> Self {
        TrailValue::Text(s)
    }
}

/// One (clause, value) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub label: Clause,
    pub value: TrailValue,
}

/// Ordered equation trail of one ring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquationTrail {
    entries: Vec<TrailEntry>,
}

impl EquationTrail {
    /// Start a ring's trail with its "Ring N" entry
    pub fn for_ring(ring_index: usize) -> Self {
        let mut trail = Self::default();
        trail.push(Clause::RingNumber, format!("Ring {}", ring_index + 1));
        trail
    }

    pub fn push(&mut self, label: Clause, value: impl Into<TrailValue>) {
        self.entries.push(TrailEntry {
            label,
            value: value.into(),
        });
    }

    /// Record the clause that made the method inapplicable
    pub fn push_not_applicable(&mut self, label: Clause) {
        self.push(label, NOT_APPLICABLE);
    }

    /// Append every solver pass: n, tu, tl, K, C, x1, x2, x3, x, then the
    /// pass thickness under the basis' own clause.
    pub fn push_passes(&mut self, basis: Basis, passes: &[IterationPass]) {
        let thickness_clause = match basis {
            Basis::Design => Clause::UpperRingDesign,
            Basis::Hydrotest => Clause::UpperRingHydrotest,
        };
        for pass in passes {
            self.push(Clause::PassNumber, pass.pass);
            self.push(Clause::UpperRingTrial, pass.upper_trial_mm);
            self.push(Clause::LowerRingThickness, pass.lower_mm);
            self.push(Clause::ThicknessRatio, pass.k);
            self.push(Clause::ShapeFactor, pass.c);
            self.push(Clause::DesignPointX1, pass.x1_mm);
            self.push(Clause::DesignPointX2, pass.x2_mm);
            self.push(Clause::DesignPointX3, pass.x3_mm);
            self.push(Clause::DesignPoint, pass.x_mm);
            self.push(thickness_clause, pass.thickness_mm);
        }
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<Clause> {
        self.entries.iter().map(|e| e.label).collect()
    }

    /// First value recorded under `label`
    pub fn value_of(&self, label: Clause) -> Option<&TrailValue> {
        self.entries.iter().find(|e| e.label == label).map(|e| &e.value)
    }

    /// Number of entries recorded under `label`
    pub fn count_of(&self, label: Clause) -> usize {
        self.entries.iter().filter(|e| e.label == label).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Calculation memory of one ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingResult {
    /// Zero-based ring index, 0 = bottom
    pub ring_index: usize,
    /// Liquid head above the bottom of the ring (m)
    pub liquid_head_m: f64,
    /// Required thickness including corrosion allowance (mm)
    pub thickness_mm: f64,
    pub corrosion_allowance_mm: f64,
    pub material: String,
    pub excess_flag: ExcessFlag,
    /// Absent for Annex A
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_stress_mpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydrotest_stress_mpa: Option<f64>,
    pub equation_trail: EquationTrail,
    /// Non-fatal notes, e.g. iteration cap reached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RingResult {
    /// Assemble a ring's memory entry. The excess-thickness flag is derived
    /// here from the final thickness and the ring's material.
    pub fn new(
        inputs: &TankInputs,
        ring_index: usize,
        thickness_mm: f64,
        properties: Option<&MaterialProperties>,
        equation_trail: EquationTrail,
    ) -> Self {
        let ring = &inputs.rings[ring_index];
        Self {
            ring_index,
            liquid_head_m: inputs.liquid_head_m(ring_index),
            thickness_mm,
            corrosion_allowance_mm: ring.corrosion_allowance_mm,
            material: ring.material.clone(),
            excess_flag: excess_thickness_flag(thickness_mm, &ring.material),
            design_stress_mpa: properties.map(|p| p.design_stress_mpa),
            hydrotest_stress_mpa: properties.map(|p| p.hydrotest_stress_mpa),
            equation_trail,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_value_display() {
        assert_eq!(TrailValue::from(7.712778).to_string(), "7.71");
        assert_eq!(TrailValue::from(3u32).to_string(), "3");
        assert_eq!(TrailValue::from("NA").to_string(), "NA");
    }

    #[test]
    fn test_trail_value_keeps_precision_in_json() {
        let json = serde_json::to_string(&TrailValue::from(7.712778)).unwrap();
        assert_eq!(json, "7.712778");
        let back: TrailValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TrailValue::Number(7.712778));
        let count: TrailValue = serde_json::from_str("2").unwrap();
        assert_eq!(count, TrailValue::Count(2));
    }

    #[test]
    fn test_trail_serializes_as_label_value_pairs() {
        let mut trail = EquationTrail::for_ring(1);
        trail.push(Clause::AnnexAThickness, 6.0);
        let json = serde_json::to_string(&trail).unwrap();
        assert_eq!(
            json,
            r#"[{"label":"Ring N","value":"Ring 2"},{"label":"A.4.1","value":6.0}]"#
        );
    }

    #[test]
    fn test_push_passes_order() {
        let pass = IterationPass {
            pass: 1,
            upper_trial_mm: 7.0,
            lower_mm: 10.0,
            k: 1.4,
            c: 0.18,
            x1_mm: 840.0,
            x2_mm: 2100.0,
            x3_mm: 326.0,
            x_mm: 326.0,
            thickness_mm: 8.1,
            delta_mm: 0.02,
        };
        let mut trail = EquationTrail::default();
        trail.push_passes(Basis::Hydrotest, &[pass.clone(), pass]);
        assert_eq!(trail.len(), 20);
        assert_eq!(trail.entries()[0].label, Clause::PassNumber);
        assert_eq!(trail.entries()[9].label, Clause::UpperRingHydrotest);
        assert_eq!(trail.count_of(Clause::PassNumber), 2);
        assert_eq!(trail.value_of(Clause::DesignPoint).and_then(TrailValue::as_f64), Some(326.0));
    }
}
