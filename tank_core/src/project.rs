//! # Project Data Structures
//!
//! A `Project` groups the tanks of one job with the settings used to size
//! them. Projects serialize to `.tank` files as human-readable JSON.
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (schema version, engineer, job, timestamps)
//! ├── settings: GlobalSettings (solver, default units, material table)
//! └── items: HashMap<Uuid, TankInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::Method;
//! use tank_core::project::Project;
//! use tank_core::tank::{NumericField, RingInput, TankInput};
//! use tank_core::units::UnitSystem;
//!
//! let mut project = Project::new("Jane Engineer", "26-014", "Terminal North");
//! let id = project.add_tank(TankInput {
//!     tag: Some("TQ-201".to_string()),
//!     fluid: Some("Diesel".to_string()),
//!     unit_system: UnitSystem::Metric,
//!     diameter: NumericField::from(30.0),
//!     height: NumericField::from(12.0),
//!     relative_density: NumericField::from(0.9),
//!     joint_efficiency: None,
//!     rings: vec![RingInput::new("A36", 1.5, 2.4); 5],
//!     method: Method::FixedPoint,
//! });
//!
//! let results = project.calculate_all(tank_core::materials::builtin_table());
//! assert!(results[0].1.is_ok());
//! assert_eq!(results[0].0, id);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{calculate_with_settings, CalculationOutcome, SolverSettings};
use crate::errors::CalcResult;
use crate::materials::MaterialTable;
use crate::tank::TankInput;
use crate::units::UnitSystem;

/// Current schema version for .tank files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container, serialized to `.tank` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    #[serde(default)]
    pub settings: GlobalSettings,

    /// Tanks keyed by UUID
    #[serde(default)]
    pub items: HashMap<Uuid, TankInput>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// ```rust
    /// use tank_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "26-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// assert_eq!(project.item_count(), 0);
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a tank and return its UUID.
    pub fn add_tank(&mut self, tank: TankInput) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, tank);
        self.touch();
        id
    }

    pub fn remove_tank(&mut self, id: &Uuid) -> Option<TankInput> {
        let tank = self.items.remove(id);
        if tank.is_some() {
            self.touch();
        }
        tank
    }

    pub fn get_tank(&self, id: &Uuid) -> Option<&TankInput> {
        self.items.get(id)
    }

    /// Mutable access. Marks the project as modified when the tank exists.
    pub fn get_tank_mut(&mut self, id: &Uuid) -> Option<&mut TankInput> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Tanks ordered by tag, then UUID, for stable listings
    pub fn tanks_sorted(&self) -> Vec<(Uuid, &TankInput)> {
        let mut tanks: Vec<_> = self.items.iter().map(|(id, t)| (*id, t)).collect();
        tanks.sort_by(|(ida, a), (idb, b)| {
            let ta = a.tag.as_deref().unwrap_or_default();
            let tb = b.tag.as_deref().unwrap_or_default();
            ta.cmp(tb).then(ida.cmp(idb))
        });
        tanks
    }

    /// Size every tank with the project's solver settings.
    ///
    /// Each tank is independent: one failing tank does not stop the others.
    pub fn calculate_all(&self, table: &MaterialTable) -> Vec<(Uuid, CalcResult<CalculationOutcome>)> {
        self.tanks_sorted()
            .into_iter()
            .map(|(id, tank)| (id, calculate_with_settings(tank, table, &self.settings.solver)))
            .collect()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub engineer: String,
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Settings shared by every tank in the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub solver: SolverSettings,

    /// Unit system offered for new tanks
    #[serde(default)]
    pub default_unit_system: UnitSystem,

    /// Material table (xlsx, CSV or JSON) used instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_table: Option<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            solver: SolverSettings::default(),
            default_unit_system: UnitSystem::Metric,
            material_table: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::Method;
    use crate::materials::builtin_table;
    use crate::tank::{NumericField, RingInput};

    fn tank(tag: &str, height: f64) -> TankInput {
        TankInput {
            tag: Some(tag.to_string()),
            fluid: None,
            unit_system: UnitSystem::Metric,
            diameter: NumericField::from(20.0),
            height: NumericField::from(height),
            relative_density: NumericField::from(1.0),
            joint_efficiency: None,
            rings: vec![RingInput::new("A36", 1.0, 2.5); 4],
            method: Method::FixedPoint,
        }
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "26-001", "Acme Terminal");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "26-001");
        assert_eq!(project.meta.client, "Acme Terminal");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.solver.tolerance_mm, 0.254);
        assert_eq!(project.settings.solver.max_passes, 200);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Jane Engineer", "26-042", "Test Client");
        project.add_tank(tank("TQ-1", 10.0));
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("tolerance_mm"));
        assert!(!json.contains("material_table"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.item_count(), 1);
    }

    #[test]
    fn test_settings_default_when_missing() {
        let json = r#"{
            "meta": {
                "version": "0.1.0",
                "engineer": "E",
                "job_id": "J",
                "client": "C",
                "created": "2026-01-05T10:00:00Z",
                "modified": "2026-01-05T10:00:00Z"
            }
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.settings, GlobalSettings::default());
        assert_eq!(project.item_count(), 0);
    }

    #[test]
    fn test_add_remove_tank() {
        let mut project = Project::new("Engineer", "26-001", "Client");
        let id = project.add_tank(tank("TQ-1", 10.0));
        assert_eq!(project.item_count(), 1);
        assert!(project.get_tank(&id).is_some());

        project.get_tank_mut(&id).unwrap().height = NumericField::from(11.0);
        assert_eq!(project.get_tank(&id).unwrap().height.value(), Some(11.0));

        assert!(project.remove_tank(&id).is_some());
        assert!(project.remove_tank(&id).is_none());
        assert_eq!(project.item_count(), 0);
    }

    #[test]
    fn test_calculate_all_keeps_going_after_a_failure() {
        let mut project = Project::new("Engineer", "26-001", "Client");
        project.add_tank(tank("TQ-2", -1.0));
        project.add_tank(tank("TQ-1", 10.0));

        let results = project.calculate_all(builtin_table());
        assert_eq!(results.len(), 2);
        // Sorted by tag
        assert_eq!(project.get_tank(&results[0].0).unwrap().tag.as_deref(), Some("TQ-1"));
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }
}
