//! # tank_core - Storage Tank Shell Thickness Engine
//!
//! `tank_core` sizes the cylindrical shell rings of vertical atmospheric
//! storage tanks per API 650. All inputs and outputs are JSON-serializable,
//! and every ring result carries the labeled intermediate values ("equation
//! trail") a report writer needs to reproduce the calculation.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: `calculate` is a pure function of its input and the material table
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Traceable**: Every reported value is tied to its API 650 clause
//!
//! ## Quick Start
//!
//! ```rust
//! use tank_core::{calculate, Method, NumericField, RingInput, TankInput, UnitSystem};
//! use tank_core::materials::builtin_table;
//!
//! let input = TankInput {
//!     tag: Some("TQ-101".to_string()),
//!     fluid: Some("Diesel".to_string()),
//!     unit_system: UnitSystem::Metric,
//!     diameter: NumericField::from(30.0),
//!     height: NumericField::from(12.0),
//!     relative_density: NumericField::from(0.9),
//!     joint_efficiency: None,
//!     rings: vec![RingInput::new("A36", 1.5, 2.4); 5],
//!     method: Method::FixedPoint,
//! };
//!
//! let outcome = calculate(&input, builtin_table()).unwrap();
//! let json = serde_json::to_string_pretty(&outcome).unwrap();
//! assert!(json.contains("5.6.3"));
//! ```
//!
//! ## Modules
//!
//! - [`tank`] - Raw tank input and its normalized canonical form
//! - [`validation`] - Input checks, all violations reported at once
//! - [`materials`] - Allowable stress tables and the excess-thickness check
//! - [`equations`] - Shell formulas and the clause registry
//! - [`calculations`] - Method engines, iteration solver, calculation memory
//! - [`project`] - Multi-tank project container and settings
//! - [`units`] - Unit systems and type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic JSON file operations

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod materials;
pub mod project;
pub mod tank;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, calculate_with_settings, CalculationOutcome, Method, TankAlert};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_project, load_tank_input, save_outcome, save_project};
pub use project::{GlobalSettings, Project, ProjectMetadata};
pub use tank::{NumericField, RingInput, TankInput};
pub use units::UnitSystem;
