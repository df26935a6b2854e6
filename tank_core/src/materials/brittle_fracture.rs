//! # Excess Thickness (Brittle Fracture)
//!
//! API 650 4.2.2 limits the plate thickness each grade may be used at without
//! impact testing. A ring above its grade's limit is flagged; the required
//! thickness itself is never changed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Excess-thickness flag for one ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcessFlag {
    #[default]
    NotExcessive,
    Excessive,
}

impl ExcessFlag {
    /// Report text
    pub fn message(self) -> &'static str {
        match self {
            ExcessFlag::NotExcessive => "No",
            ExcessFlag::Excessive => "Yes. Excessive thickness!",
        }
    }

    pub fn is_excessive(self) -> bool {
        self == ExcessFlag::Excessive
    }
}

impl fmt::Display for ExcessFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// (grade, maximum thickness in mm)
const THICKNESS_LIMITS_MM: &[(&str, f64)] = &[
    ("A36", 40.0),
    ("A516 Grade 55", 40.0),
    ("A516 Grade 60", 40.0),
    ("A516 Grade 65", 40.0),
    ("A516 Grade 70", 40.0),
    ("A573 Grade 70", 40.0),
    ("A131 Grade B", 25.0),
    ("A283 Grade C", 25.0),
    ("A131 Grade A", 13.0),
];

/// Maximum thickness for a grade, if it has one. Matching ignores case and
/// surrounding whitespace.
pub fn thickness_limit_mm(material: &str) -> Option<f64> {
    let material = material.trim();
    THICKNESS_LIMITS_MM
        .iter()
        .find(|(grade, _)| grade.eq_ignore_ascii_case(material))
        .map(|(_, limit)| *limit)
}

/// Flag a ring thickness (mm) against its grade's limit.
///
/// Grades without a listed limit are never excessive.
///
/// ```rust
/// use tank_core::materials::{excess_thickness_flag, ExcessFlag};
///
/// assert_eq!(excess_thickness_flag(14.0, "A131 Grade A"), ExcessFlag::Excessive);
/// assert_eq!(excess_thickness_flag(40.0, "A36"), ExcessFlag::NotExcessive);
/// ```
pub fn excess_thickness_flag(thickness_mm: f64, material: &str) -> ExcessFlag {
    match thickness_limit_mm(material) {
        Some(limit) if thickness_mm > limit => ExcessFlag::Excessive,
        _ => ExcessFlag::NotExcessive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_by_grade() {
        assert_eq!(thickness_limit_mm("A573 Grade 70"), Some(40.0));
        assert_eq!(thickness_limit_mm("a283 grade c"), Some(25.0));
        assert_eq!(thickness_limit_mm("A131 Grade A"), Some(13.0));
        assert_eq!(thickness_limit_mm("A999"), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(excess_thickness_flag(25.0, "A131 Grade B"), ExcessFlag::NotExcessive);
        assert_eq!(excess_thickness_flag(25.01, "A131 Grade B"), ExcessFlag::Excessive);
        assert_eq!(excess_thickness_flag(40.5, "A516 Grade 60"), ExcessFlag::Excessive);
    }

    #[test]
    fn test_unknown_grade_is_never_excessive() {
        assert_eq!(excess_thickness_flag(500.0, "Custom"), ExcessFlag::NotExcessive);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ExcessFlag::NotExcessive.to_string(), "No");
        assert_eq!(ExcessFlag::Excessive.to_string(), "Yes. Excessive thickness!");
        assert!(ExcessFlag::Excessive.is_excessive());
    }
}
