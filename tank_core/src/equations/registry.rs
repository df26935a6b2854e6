//! # Clause Registry
//!
//! Every entry of an equation trail is labelled with a [`Clause`]. The enum
//! serializes to the clause label used in reports ("5.6.3(d)", "A.4.1", ...)
//! and carries metadata for the reference document.
//!
//! ## Usage
//!
//! ```rust
//! use tank_core::equations::registry::Clause;
//!
//! assert_eq!(Clause::FixedPointDesign.label(), "5.6.3(d)");
//!
//! let meta = Clause::FixedPointDesign.metadata();
//! println!("{}: {}", meta.name, meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Clause Categories
// ============================================================================

/// Grouping used in the reference document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseCategory {
    /// Ring identification and minimum thickness rules
    General,
    /// Annex A small tanks
    AnnexA,
    /// One-foot (fixed design point) method
    FixedPoint,
    /// Variable design point method, bottom and second ring
    VariablePoint,
    /// Variable design point iteration for upper rings
    Iteration,
    /// Method applicability limits
    Applicability,
}

impl ClauseCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ClauseCategory::General => "General",
            ClauseCategory::AnnexA => "Annex A",
            ClauseCategory::FixedPoint => "One-Foot Method",
            ClauseCategory::VariablePoint => "Variable-Design-Point Method",
            ClauseCategory::Iteration => "Variable-Design-Point Iteration",
            ClauseCategory::Applicability => "Applicability Limits",
        }
    }

    /// Sort order for the reference document (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            ClauseCategory::General => 1,
            ClauseCategory::AnnexA => 2,
            ClauseCategory::FixedPoint => 3,
            ClauseCategory::VariablePoint => 4,
            ClauseCategory::Iteration => 5,
            ClauseCategory::Applicability => 6,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in a clause formula.
#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Clause Metadata
// ============================================================================

/// Reference data for one trail label.
#[derive(Debug, Clone)]
pub struct ClauseMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// What the trail value holds
    pub description: &'static str,
    /// Formula in plain text
    pub formula_plain: &'static str,
    /// API 650 clause cited
    pub reference: &'static str,
    pub variables: Vec<Variable>,
    pub category: ClauseCategory,
    /// Module implementing the clause
    pub source_module: &'static str,
    /// Function implementing the clause
    pub source_function: &'static str,
}

// ============================================================================
// Clause Enum
// ============================================================================

/// Label of an equation trail entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clause {
    /// First entry of every ring's trail, value "Ring N"
    #[serde(rename = "Ring N")]
    RingNumber,
    #[serde(rename = "5.6.1")]
    MinimumThickness,
    #[serde(rename = "Note 4 - 5.6.1.2")]
    SmallTankBottomRing,

    // Annex A
    #[serde(rename = "A.4.1")]
    AnnexAThickness,
    #[serde(rename = "A.1.1")]
    AnnexANotApplicable,

    // One-foot method
    #[serde(rename = "5.6.3(d)")]
    FixedPointDesign,
    #[serde(rename = "5.6.3(t)")]
    FixedPointHydrotest,
    #[serde(rename = "5.6.3")]
    FixedPointThickness,
    #[serde(rename = "5.6.3.1")]
    FixedPointNotApplicable,

    // Variable-design-point: bottom ring
    #[serde(rename = "5.6.3.2(d)")]
    BottomRingOneFootDesign,
    #[serde(rename = "5.6.3.2(t)")]
    BottomRingOneFootHydrotest,
    #[serde(rename = "5.6.4.4(d)")]
    BottomRingDesign,
    #[serde(rename = "5.6.4.4(t)")]
    BottomRingHydrotest,
    #[serde(rename = "5.6.4.1")]
    SlendernessRatio,
    #[serde(rename = "5.6.4")]
    BottomRingThickness,
    #[serde(rename = "5.6.4.1(fail)")]
    SlendernessExceeded,

    // Variable-design-point: second ring
    #[serde(rename = "5.6.4.1(ratio)(d)")]
    SecondRingRatioDesign,
    #[serde(rename = "5.6.4.1(ratio)(t)")]
    SecondRingRatioHydrotest,

    // Variable-design-point: iteration
    #[serde(rename = "5.6.4.6(n)")]
    PassNumber,
    #[serde(rename = "5.6.4.6(tu)")]
    UpperRingTrial,
    #[serde(rename = "5.6.4.6(tl)")]
    LowerRingThickness,
    #[serde(rename = "5.6.4.6(K)")]
    ThicknessRatio,
    #[serde(rename = "5.6.4.6(C)")]
    ShapeFactor,
    #[serde(rename = "5.6.4.6(x1)")]
    DesignPointX1,
    #[serde(rename = "5.6.4.6(x2)")]
    DesignPointX2,
    #[serde(rename = "5.6.4.6(x3)")]
    DesignPointX3,
    #[serde(rename = "5.6.4.6(x)")]
    DesignPoint,
    #[serde(rename = "5.6.4.7(d)")]
    UpperRingDesign,
    #[serde(rename = "5.6.4.7(t)")]
    UpperRingHydrotest,
    #[serde(rename = "5.6.4(i>=2)")]
    UpperRingThickness,
}

impl Clause {
    /// Report label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Clause::RingNumber => "Ring N",
            Clause::MinimumThickness => "5.6.1",
            Clause::SmallTankBottomRing => "Note 4 - 5.6.1.2",
            Clause::AnnexAThickness => "A.4.1",
            Clause::AnnexANotApplicable => "A.1.1",
            Clause::FixedPointDesign => "5.6.3(d)",
            Clause::FixedPointHydrotest => "5.6.3(t)",
            Clause::FixedPointThickness => "5.6.3",
            Clause::FixedPointNotApplicable => "5.6.3.1",
            Clause::BottomRingOneFootDesign => "5.6.3.2(d)",
            Clause::BottomRingOneFootHydrotest => "5.6.3.2(t)",
            Clause::BottomRingDesign => "5.6.4.4(d)",
            Clause::BottomRingHydrotest => "5.6.4.4(t)",
            Clause::SlendernessRatio => "5.6.4.1",
            Clause::BottomRingThickness => "5.6.4",
            Clause::SlendernessExceeded => "5.6.4.1(fail)",
            Clause::SecondRingRatioDesign => "5.6.4.1(ratio)(d)",
            Clause::SecondRingRatioHydrotest => "5.6.4.1(ratio)(t)",
            Clause::PassNumber => "5.6.4.6(n)",
            Clause::UpperRingTrial => "5.6.4.6(tu)",
            Clause::LowerRingThickness => "5.6.4.6(tl)",
            Clause::ThicknessRatio => "5.6.4.6(K)",
            Clause::ShapeFactor => "5.6.4.6(C)",
            Clause::DesignPointX1 => "5.6.4.6(x1)",
            Clause::DesignPointX2 => "5.6.4.6(x2)",
            Clause::DesignPointX3 => "5.6.4.6(x3)",
            Clause::DesignPoint => "5.6.4.6(x)",
            Clause::UpperRingDesign => "5.6.4.7(d)",
            Clause::UpperRingHydrotest => "5.6.4.7(t)",
            Clause::UpperRingThickness => "5.6.4(i>=2)",
        }
    }

    /// Get the full metadata for this clause
    pub fn metadata(&self) -> ClauseMetadata {
        use ClauseCategory::*;

        let d = Variable::new("D", "Nominal tank diameter", "m");
        let h = Variable::new("H", "Design liquid level above the bottom of the ring", "m");
        let g = Variable::new("G", "Design relative density of the liquid", "-");
        let ca = Variable::new("CA", "Corrosion allowance", "mm");
        let sd = Variable::new("Sd", "Allowable stress for the design condition", "MPa");
        let st = Variable::new("St", "Allowable stress for the hydrostatic test condition", "MPa");
        let r = Variable::new("r", "Nominal tank radius", "mm");

        match self {
            Clause::RingNumber => ClauseMetadata {
                name: "Ring Number",
                description: "Identifies the shell ring, numbered from the bottom",
                formula_plain: "Ring i+1",
                reference: "-",
                variables: vec![],
                category: General,
                source_module: "calculations/memory.rs",
                source_function: "EquationTrail::for_ring",
            },
            Clause::MinimumThickness => ClauseMetadata {
                name: "Minimum Shell Thickness",
                description: "Minimum nominal thickness by tank diameter",
                formula_plain: "5 mm (D < 15), 6 mm (15 <= D < 36), 8 mm (36 <= D <= 60), 10 mm (D > 60)",
                reference: "API 650 5.6.1.1",
                variables: vec![d],
                category: General,
                source_module: "equations/shell.rs",
                source_function: "minimum_thickness",
            },
            Clause::SmallTankBottomRing => ClauseMetadata {
                name: "Small Tank Bottom Ring",
                description: "Bottom ring of a tank under 15 m raised to 6 mm",
                formula_plain: "t = 6 mm when D < 15 and t < 6",
                reference: "API 650 5.6.1.1 Note 4",
                variables: vec![d],
                category: General,
                source_module: "equations/shell.rs",
                source_function: "small_tank_bottom_ring_applies",
            },
            Clause::AnnexAThickness => ClauseMetadata {
                name: "Annex A Shell Thickness",
                description: "Required thickness of the ring, after the minimum thickness is applied",
                formula_plain: "t = 4.9 D (H - 0.3) G / (E 145) + CA",
                reference: "API 650 A.4.1",
                variables: vec![
                    d,
                    h,
                    g,
                    Variable::new("E", "Joint efficiency", "-"),
                    ca,
                ],
                category: AnnexA,
                source_module: "equations/shell.rs",
                source_function: "annex_a_thickness",
            },
            Clause::AnnexANotApplicable => ClauseMetadata {
                name: "Annex A Not Applicable",
                description: "A ring exceeded 13 mm; the calculation stops at that ring",
                formula_plain: "t > 13 mm",
                reference: "API 650 A.1.1",
                variables: vec![],
                category: Applicability,
                source_module: "calculations/annex_a.rs",
                source_function: "calculate_rings",
            },
            Clause::FixedPointDesign => ClauseMetadata {
                name: "One-Foot Design Thickness",
                description: "Design condition thickness at 0.3 m above the ring bottom",
                formula_plain: "td = 4.9 D (H - 0.3) G / Sd + CA",
                reference: "API 650 5.6.3.2",
                variables: vec![d, h, g, sd, ca],
                category: FixedPoint,
                source_module: "equations/shell.rs",
                source_function: "one_foot_design_thickness",
            },
            Clause::FixedPointHydrotest => ClauseMetadata {
                name: "One-Foot Hydrostatic Test Thickness",
                description: "Hydrostatic test thickness at 0.3 m above the ring bottom",
                formula_plain: "tt = 4.9 D (H - 0.3) / St",
                reference: "API 650 5.6.3.2",
                variables: vec![d, h, st],
                category: FixedPoint,
                source_module: "equations/shell.rs",
                source_function: "one_foot_hydrotest_thickness",
            },
            Clause::FixedPointThickness => ClauseMetadata {
                name: "One-Foot Ring Thickness",
                description: "Governing thickness, after the minimum thickness is applied",
                formula_plain: "t = max(td, tt, t_min)",
                reference: "API 650 5.6.3",
                variables: vec![],
                category: FixedPoint,
                source_module: "calculations/fixed_point.rs",
                source_function: "calculate_rings",
            },
            Clause::FixedPointNotApplicable => ClauseMetadata {
                name: "One-Foot Method Not Applicable",
                description: "Diameter above 61 m; the calculation stops after the current ring",
                formula_plain: "D > 61 m",
                reference: "API 650 5.6.3.1",
                variables: vec![],
                category: Applicability,
                source_module: "calculations/fixed_point.rs",
                source_function: "calculate_rings",
            },
            Clause::BottomRingOneFootDesign => ClauseMetadata {
                name: "Bottom Ring One-Foot Design Thickness",
                description: "Upper bound for the bottom ring, design condition",
                formula_plain: "t1pd = 4.9 D (H - 0.3) G / Sd + CA",
                reference: "API 650 5.6.3.2",
                variables: vec![d, h, g, sd, ca],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "one_foot_design_thickness",
            },
            Clause::BottomRingOneFootHydrotest => ClauseMetadata {
                name: "Bottom Ring One-Foot Hydrostatic Test Thickness",
                description: "Upper bound for the bottom ring, hydrostatic test condition",
                formula_plain: "t1pt = 4.9 D (H - 0.3) / St",
                reference: "API 650 5.6.3.2",
                variables: vec![d, h, st],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "one_foot_hydrotest_thickness",
            },
            Clause::BottomRingDesign => ClauseMetadata {
                name: "Bottom Ring Design Thickness",
                description: "Variable-design-point bottom ring, design condition",
                formula_plain: "t1d = (1.06 - (0.069 D / H) sqrt(H G / Sd)) (4.9 H D G / Sd) + CA",
                reference: "API 650 5.6.4.4",
                variables: vec![d, h, g, sd, ca],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "bottom_ring_design_thickness",
            },
            Clause::BottomRingHydrotest => ClauseMetadata {
                name: "Bottom Ring Hydrostatic Test Thickness",
                description: "Variable-design-point bottom ring, hydrostatic test condition",
                formula_plain: "t1t = (1.06 - (0.069 D / H) sqrt(H / St)) (4.9 H D / St)",
                reference: "API 650 5.6.4.4",
                variables: vec![d, h, st],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "bottom_ring_hydrotest_thickness",
            },
            Clause::SlendernessRatio => ClauseMetadata {
                name: "Slenderness Ratio",
                description: "L/H; the method applies while L/H <= 1000/6",
                formula_plain: "L / H, L = sqrt(500 D t), t = corroded bottom ring thickness",
                reference: "API 650 5.6.4.1",
                variables: vec![d, Variable::new("t", "Bottom ring thickness less corrosion allowance", "mm")],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "slenderness_ratio",
            },
            Clause::BottomRingThickness => ClauseMetadata {
                name: "Bottom Ring Thickness",
                description: "Governing bottom ring thickness, after the minimum thickness is applied",
                formula_plain: "t1 = max(min(t1d, t1pd), min(t1t, t1pt), t_min)",
                reference: "API 650 5.6.4.4",
                variables: vec![],
                category: VariablePoint,
                source_module: "calculations/variable_point.rs",
                source_function: "bottom_ring",
            },
            Clause::SlendernessExceeded => ClauseMetadata {
                name: "Variable-Design-Point Method Not Applicable",
                description: "L/H above 1000/6; the calculation stops at the bottom ring",
                formula_plain: "L / H > 1000 / 6",
                reference: "API 650 5.6.4.1",
                variables: vec![],
                category: Applicability,
                source_module: "calculations/variable_point.rs",
                source_function: "bottom_ring",
            },
            Clause::SecondRingRatioDesign => ClauseMetadata {
                name: "Second Ring Ratio (Design)",
                description: "Selects how the second ring is derived, design condition",
                formula_plain: "h1 / sqrt(r t1)",
                reference: "API 650 5.6.4.5",
                variables: vec![
                    Variable::new("h1", "Height of the bottom ring", "mm"),
                    r.clone(),
                    Variable::new("t1", "Corroded bottom ring design thickness", "mm"),
                ],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "second_ring_ratio",
            },
            Clause::SecondRingRatioHydrotest => ClauseMetadata {
                name: "Second Ring Ratio (Hydrostatic Test)",
                description: "Selects how the second ring is derived, hydrostatic test condition",
                formula_plain: "h1 / sqrt(r t1)",
                reference: "API 650 5.6.4.5",
                variables: vec![
                    Variable::new("h1", "Height of the bottom ring", "mm"),
                    r.clone(),
                    Variable::new("t1", "Bottom ring hydrostatic test thickness", "mm"),
                ],
                category: VariablePoint,
                source_module: "equations/shell.rs",
                source_function: "second_ring_ratio",
            },
            Clause::PassNumber => ClauseMetadata {
                name: "Iteration Pass",
                description: "Pass number of the upper ring iteration, starting at 0",
                formula_plain: "n",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "calculations/iteration.rs",
                source_function: "solve",
            },
            Clause::UpperRingTrial => ClauseMetadata {
                name: "Upper Ring Trial Thickness",
                description: "One-foot thickness on the first pass, then the previous pass result (corroded)",
                formula_plain: "tu",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "calculations/iteration.rs",
                source_function: "solve",
            },
            Clause::LowerRingThickness => ClauseMetadata {
                name: "Lower Ring Thickness",
                description: "Thickness of the ring below (corroded for the design condition)",
                formula_plain: "tL",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "calculations/iteration.rs",
                source_function: "solve",
            },
            Clause::ThicknessRatio => ClauseMetadata {
                name: "Thickness Ratio",
                description: "Ratio of lower to upper ring thickness",
                formula_plain: "K = tL / tu",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "calculations/iteration.rs",
                source_function: "solve",
            },
            Clause::ShapeFactor => ClauseMetadata {
                name: "Shape Factor",
                description: "Shape factor of the girth joint",
                formula_plain: "C = sqrt(K) (K - 1) / (1 + K^1.5)",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "shape_factor",
            },
            Clause::DesignPointX1 => ClauseMetadata {
                name: "Design Point x1",
                description: "First candidate distance of the variable design point above the girth joint",
                formula_plain: "x1 = 0.61 sqrt(r tu) + 320 C H",
                reference: "API 650 5.6.4.6",
                variables: vec![r.clone(), h.clone()],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "design_point_candidates",
            },
            Clause::DesignPointX2 => ClauseMetadata {
                name: "Design Point x2",
                description: "Second candidate distance of the variable design point",
                formula_plain: "x2 = 1000 C H",
                reference: "API 650 5.6.4.6",
                variables: vec![h.clone()],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "design_point_candidates",
            },
            Clause::DesignPointX3 => ClauseMetadata {
                name: "Design Point x3",
                description: "Third candidate distance of the variable design point",
                formula_plain: "x3 = 1.22 sqrt(r tu)",
                reference: "API 650 5.6.4.6",
                variables: vec![r],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "design_point_candidates",
            },
            Clause::DesignPoint => ClauseMetadata {
                name: "Variable Design Point",
                description: "Governing design point distance",
                formula_plain: "x = min(x1, x2, x3)",
                reference: "API 650 5.6.4.6",
                variables: vec![],
                category: Iteration,
                source_module: "calculations/iteration.rs",
                source_function: "solve",
            },
            Clause::UpperRingDesign => ClauseMetadata {
                name: "Upper Ring Design Thickness",
                description: "Thickness at the variable design point, design condition",
                formula_plain: "tdx = 4.9 D (H - x / 1000) G / Sd + CA",
                reference: "API 650 5.6.4.7",
                variables: vec![d, h, g, sd, ca],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "variable_point_thickness",
            },
            Clause::UpperRingHydrotest => ClauseMetadata {
                name: "Upper Ring Hydrostatic Test Thickness",
                description: "Thickness at the variable design point, hydrostatic test condition",
                formula_plain: "ttx = 4.9 D (H - x / 1000) / St",
                reference: "API 650 5.6.4.7",
                variables: vec![d, h, st],
                category: Iteration,
                source_module: "equations/shell.rs",
                source_function: "variable_point_thickness",
            },
            Clause::UpperRingThickness => ClauseMetadata {
                name: "Upper Ring Thickness",
                description: "Governing thickness for the third ring and above",
                formula_plain: "t = max(tdx, ttx, t_min)",
                reference: "API 650 5.6.4.7",
                variables: vec![],
                category: VariablePoint,
                source_module: "calculations/variable_point.rs",
                source_function: "upper_ring",
            },
        }
    }

    /// Get all clauses in a given category
    pub fn in_category(category: ClauseCategory) -> Vec<Clause> {
        ALL_CLAUSES
            .iter()
            .filter(|c| c.metadata().category == category)
            .copied()
            .collect()
    }

    /// All categories in document order
    pub fn all_categories() -> Vec<ClauseCategory> {
        use ClauseCategory::*;
        let mut cats = vec![General, AnnexA, FixedPoint, VariablePoint, Iteration, Applicability];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All clauses in the registry (for iteration)
pub static ALL_CLAUSES: &[Clause] = &[
    Clause::RingNumber,
    Clause::MinimumThickness,
    Clause::SmallTankBottomRing,
    Clause::AnnexAThickness,
    Clause::AnnexANotApplicable,
    Clause::FixedPointDesign,
    Clause::FixedPointHydrotest,
    Clause::FixedPointThickness,
    Clause::FixedPointNotApplicable,
    Clause::BottomRingOneFootDesign,
    Clause::BottomRingOneFootHydrotest,
    Clause::BottomRingDesign,
    Clause::BottomRingHydrotest,
    Clause::SlendernessRatio,
    Clause::BottomRingThickness,
    Clause::SlendernessExceeded,
    Clause::SecondRingRatioDesign,
    Clause::SecondRingRatioHydrotest,
    Clause::PassNumber,
    Clause::UpperRingTrial,
    Clause::LowerRingThickness,
    Clause::ThicknessRatio,
    Clause::ShapeFactor,
    Clause::DesignPointX1,
    Clause::DesignPointX2,
    Clause::DesignPointX3,
    Clause::DesignPoint,
    Clause::UpperRingDesign,
    Clause::UpperRingHydrotest,
    Clause::UpperRingThickness,
];

// ============================================================================
// Markdown Reference
// ============================================================================

/// Generate the clause reference document (EQUATIONS.md).
///
/// ```rust
/// use tank_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Shell Thickness Equations Reference"));
/// assert!(markdown.contains("5.6.4.6(x1)"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(
        r#"# Shell Thickness Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

Every label that can appear in a ring's equation trail is listed below with
its formula and API 650 clause. Units: D, H in m; thicknesses, CA, r, x in mm;
stresses in MPa.

---

"#,
    );

    let categories = Clause::all_categories();

    for category in &categories {
        let clauses = Clause::in_category(*category);
        if clauses.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for clause in clauses {
            let meta = clause.metadata();

            output.push_str(&format!("### `{}` {}\n\n", clause.label(), meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));
            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Clauses:** {}\n- **Categories:** {}\n",
        ALL_CLAUSES.len(),
        categories.len()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_clauses_have_metadata() {
        assert_eq!(ALL_CLAUSES.len(), 30);
        for clause in ALL_CLAUSES {
            let meta = clause.metadata();
            assert!(!meta.name.is_empty(), "{:?} has no name", clause);
            assert!(!meta.formula_plain.is_empty(), "{:?} has no formula", clause);
            assert!(!meta.source_module.is_empty());
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<&str> = ALL_CLAUSES.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), ALL_CLAUSES.len());
    }

    #[test]
    fn test_serialized_form_is_label() {
        for clause in ALL_CLAUSES {
            let json = serde_json::to_string(clause).unwrap();
            assert_eq!(json, format!("\"{}\"", clause.label()));
            let back: Clause = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *clause);
        }
    }

    #[test]
    fn test_every_clause_is_in_a_listed_category() {
        let listed: usize = Clause::all_categories()
            .iter()
            .map(|c| Clause::in_category(*c).len())
            .sum();
        assert_eq!(listed, ALL_CLAUSES.len());
    }

    #[test]
    fn test_generate_equations_markdown() {
        let md = generate_equations_markdown();
        assert!(md.contains("## Annex A"));
        assert!(md.contains("### `5.6.4.1(ratio)(d)`"));
        assert!(md.contains("**Total Clauses:** 30"));
    }
}
