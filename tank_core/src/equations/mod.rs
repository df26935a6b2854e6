//! # Shell Thickness Equations
//!
//! The API 650 formulas used by the calculation methods, kept in one place so
//! they can be checked against the standard independently of the ring loops.
//!
//! ## Modules
//!
//! - [`shell`] - thickness formulas, minimum thickness, design point terms
//! - [`registry`] - clause labels and metadata for equation trails
//!
//! ## Units
//!
//! Diameters and liquid heads in m, thicknesses and corrosion allowances in
//! mm, radii and design-point distances in mm, stresses in MPa.

pub mod registry;
pub mod shell;

pub use shell::{
    annex_a_thickness,
    bottom_ring_design_thickness,
    bottom_ring_hydrotest_thickness,
    design_point_candidates,
    minimum_thickness,
    one_foot_design_thickness,
    one_foot_hydrotest_thickness,
    second_ring_ratio,
    second_ring_transition_thickness,
    shape_factor,
    slenderness_ratio,
    small_tank_bottom_ring_applies,
    variable_point_thickness,
};

pub use registry::{generate_equations_markdown, Clause, ClauseCategory, ClauseMetadata, ALL_CLAUSES};
