//! # Shell Plate Materials
//!
//! Allowable stresses for shell plate grades and the lookup that maps each
//! ring's material identifier to its design (Sd) and hydrostatic-test (St)
//! allowable stress.
//!
//! ## Sources
//!
//! - [`builtin_table`]: API 650 Table 5-2a values for the common plate grades
//! - [`MaterialTable::load_from_spreadsheet`]: the first sheet of an `.xlsx` workbook
//!   (the Table 5.2a workbook layout), one row per grade
//! - [`MaterialTable::load_from_csv`]: a CSV export of the same sheet
//! - [`MaterialTable::from_json`]: an array of [`MaterialRow`] objects
//!
//! ## Example
//!
//! ```rust
//! use tank_core::materials::builtin_table;
//!
//! let a36 = builtin_table().lookup(" a36 ").unwrap();
//! assert_eq!(a36.design_stress_mpa, 160.0);
//! assert_eq!(a36.hydrotest_stress_mpa, 171.0);
//! ```

pub mod brittle_fracture;

pub use brittle_fracture::{excess_thickness_flag, ExcessFlag};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{CalcError, CalcResult, UnresolvedMaterial};
use crate::tank::RingSpec;

/// Allowable stresses for one plate grade. Both are finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Design allowable stress Sd (MPa)
    pub design_stress_mpa: f64,
    /// Hydrostatic test allowable stress St (MPa)
    pub hydrotest_stress_mpa: f64,
}

impl MaterialProperties {
    /// Build from raw cells; fails unless both stresses are finite and positive
    pub fn new(design_stress_mpa: Option<f64>, hydrotest_stress_mpa: Option<f64>) -> Result<Self, String> {
        match (design_stress_mpa, hydrotest_stress_mpa) {
            (Some(sd), Some(st)) if valid_stress(sd) && valid_stress(st) => Ok(Self {
                design_stress_mpa: sd,
                hydrotest_stress_mpa: st,
            }),
            (sd, st) => Err(format!(
                "invalid allowable stresses (Sd = {}, St = {})",
                describe(sd),
                describe(st)
            )),
        }
    }
}

fn valid_stress(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn describe(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "missing".to_string())
}

/// One row of a material table as read from a file.
///
/// Stress cells are optional so that incomplete rows load and fail at lookup
/// time with a reason, not at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    #[serde(alias = "Especificacao_Chapa_ASTM")]
    pub material: String,
    #[serde(default, alias = "Produto_de_Tensao_de_Projeto_MPa")]
    pub design_stress_mpa: Option<f64>,
    #[serde(default, alias = "Tensao_de_Teste_Hidrostatico_MPa")]
    pub hydrotest_stress_mpa: Option<f64>,
}

/// Lookup key: trimmed and case-folded
fn material_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Material reference table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    rows: Vec<MaterialRow>,
}

impl MaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows
    pub fn from_rows(rows: Vec<MaterialRow>) -> Self {
        Self { rows }
    }

    /// Add a row. Later lookups return the first matching row.
    pub fn insert(&mut self, row: MaterialRow) {
        self.rows.push(row);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in table order
    pub fn rows(&self) -> &[MaterialRow] {
        &self.rows
    }

    fn find(&self, material: &str) -> Option<&MaterialRow> {
        let key = material_key(material);
        self.rows
            .iter()
            .filter(|row| !row.material.trim().is_empty())
            .find(|row| material_key(&row.material) == key)
    }

    /// Look up a grade.
    ///
    /// Matching ignores surrounding whitespace and case.
    pub fn lookup(&self, material: &str) -> CalcResult<MaterialProperties> {
        let row = self
            .find(material)
            .ok_or_else(|| CalcError::material_not_found(material.trim()))?;
        MaterialProperties::new(row.design_stress_mpa, row.hydrotest_stress_mpa)
            .map_err(|reason| CalcError::invalid_input("material", material.trim(), reason))
    }

    /// Resolve every ring before any ring is calculated.
    ///
    /// All failures are collected into one [`CalcError::UnresolvedMaterials`].
    pub fn resolve_all(&self, rings: &[RingSpec]) -> CalcResult<Vec<MaterialProperties>> {
        let mut resolved = Vec::with_capacity(rings.len());
        let mut failures = Vec::new();

        for (ring_index, ring) in rings.iter().enumerate() {
            let outcome = match self.find(&ring.material) {
                Some(row) => MaterialProperties::new(row.design_stress_mpa, row.hydrotest_stress_mpa),
                None => Err("not found in material table".to_string()),
            };
            match outcome {
                Ok(props) => resolved.push(props),
                Err(reason) => {
                    tracing::debug!(ring = ring_index + 1, material = %ring.material, %reason, "material unresolved");
                    failures.push(UnresolvedMaterial {
                        ring_index,
                        material: ring.material.clone(),
                        reason,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(resolved)
        } else {
            Err(CalcError::UnresolvedMaterials { rings: failures })
        }
    }

    /// Load a table from a CSV file.
    ///
    /// The header row must name a material column (`material` or
    /// `Especificacao_Chapa_ASTM`). Stress columns are `design_stress_mpa` /
    /// `Produto_de_Tensao_de_Projeto_MPa` and `hydrotest_stress_mpa` /
    /// `Tensao_de_Teste_Hidrostatico_MPa`. Decimal commas are not supported
    /// since the comma is the field separator; use `;` as separator for those.
    pub fn load_from_csv(path: &str) -> CalcResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("open", path, format!("Failed to open CSV: {}", e)))?;
        Self::parse_csv(&text).map_err(|reason| CalcError::file_error("parse", path, reason))
    }

    /// Parse CSV text (see [`load_from_csv`](Self::load_from_csv))
    pub fn parse_csv(text: &str) -> Result<Self, String> {
        let mut lines = text.lines();
        let header_line = lines.next().ok_or_else(|| "CSV file is empty".to_string())?;

        let separator = if header_line.contains(';') { ';' } else { ',' };
        let headers: Vec<&str> = header_line
            .trim_start_matches('\u{feff}')
            .split(separator)
            .map(str::trim)
            .collect();
        let columns = Columns::locate(&headers)?;

        let mut table = MaterialTable::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(separator).collect();
            let material = fields.get(columns.material).map(|s| s.trim()).unwrap_or("");
            if material.is_empty() {
                continue;
            }
            let cell = |idx: usize| fields.get(idx).and_then(|v| parse_optional_f64(v, separator));

            table.insert(MaterialRow {
                material: material.to_string(),
                design_stress_mpa: cell(columns.design),
                hydrotest_stress_mpa: cell(columns.hydrotest),
            });
        }

        tracing::debug!(rows = table.len(), "material table parsed");
        Ok(table)
    }

    /// Parse a JSON array of rows
    pub fn from_json(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: format!("Failed to parse material table: {}", e),
        })
    }

    /// Load a table from the first sheet of a spreadsheet (`.xlsx`, `.xls`, `.ods`).
    ///
    /// The first row is the header, with the same column names as the CSV form.
    pub fn load_from_spreadsheet(path: &str) -> CalcResult<Self> {
        use calamine::{open_workbook_auto, Reader};

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| CalcError::file_error("open", path, format!("Failed to open spreadsheet: {}", e)))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CalcError::file_error("parse", path, "Spreadsheet has no sheets"))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| CalcError::file_error("parse", path, format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

        Self::from_range(&range).map_err(|reason| CalcError::file_error("parse", path, reason))
    }

    /// Build a table from worksheet cells (see [`load_from_spreadsheet`](Self::load_from_spreadsheet))
    pub fn from_range(range: &calamine::Range<calamine::Data>) -> Result<Self, String> {
        let mut rows = range.rows();
        let header_row = rows.next().ok_or_else(|| "Sheet is empty".to_string())?;
        let headers: Vec<String> = header_row.iter().map(|c| cell_text(c).trim().to_string()).collect();
        let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
        let columns = Columns::locate(&headers)?;

        let mut table = MaterialTable::new();
        for row in rows {
            let material = row.get(columns.material).map(cell_text).unwrap_or_default();
            let material = material.trim();
            if material.is_empty() {
                continue;
            }
            table.insert(MaterialRow {
                material: material.to_string(),
                design_stress_mpa: row.get(columns.design).and_then(cell_f64),
                hydrotest_stress_mpa: row.get(columns.hydrotest).and_then(cell_f64),
            });
        }

        tracing::debug!(rows = table.len(), "material sheet parsed");
        Ok(table)
    }

    /// Load a table from a `.json`, spreadsheet or `.csv` file, chosen by extension
    pub fn load(path: &str) -> CalcResult<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json") {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
            Self::from_json(&text)
        } else if [".xlsx", ".xlsm", ".xls", ".ods"].iter().any(|ext| lower.ends_with(ext)) {
            Self::load_from_spreadsheet(path)
        } else {
            Self::load_from_csv(path)
        }
    }
}

/// Column positions of a material table header
#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    material: usize,
    design: usize,
    hydrotest: usize,
}

impl Columns {
    fn locate(headers: &[&str]) -> Result<Self, String> {
        let col_index = |names: &[&str]| -> Option<usize> {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        Ok(Columns {
            material: col_index(&["material", "Especificacao_Chapa_ASTM"])
                .ok_or_else(|| "Missing 'material' column".to_string())?,
            design: col_index(&["design_stress_mpa", "Produto_de_Tensao_de_Projeto_MPa"])
                .ok_or_else(|| "Missing 'design_stress_mpa' column".to_string())?,
            hydrotest: col_index(&["hydrotest_stress_mpa", "Tensao_de_Teste_Hidrostatico_MPa"])
                .ok_or_else(|| "Missing 'hydrotest_stress_mpa' column".to_string())?,
        })
    }
}

fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Numeric cell; text cells may use a decimal comma
fn cell_f64(cell: &calamine::Data) -> Option<f64> {
    use calamine::Data;
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_optional_f64(s, ';'),
        _ => None,
    }
}

/// Parse an optional numeric cell. With a `;` separator, a decimal comma is accepted.
fn parse_optional_f64(s: &str, separator: char) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    if separator == ';' {
        f64::from_str(&trimmed.replace(',', ".")).ok()
    } else {
        f64::from_str(trimmed).ok()
    }
}

// ============================================================================
// Built-in Table (API 650 Table 5-2a)
// ============================================================================

static BUILTIN: Lazy<MaterialTable> = Lazy::new(|| {
    // (grade, Sd MPa, St MPa)
    let grades = [
        ("A131 Grade A", 157.0, 171.0),
        ("A131 Grade B", 157.0, 171.0),
        ("A36", 160.0, 171.0),
        ("A283 Grade C", 137.0, 154.0),
        ("A516 Grade 55", 137.0, 154.0),
        ("A516 Grade 60", 147.0, 165.0),
        ("A516 Grade 65", 160.0, 180.0),
        ("A516 Grade 70", 173.0, 195.0),
        ("A573 Grade 70", 193.0, 208.0),
    ];
    MaterialTable::from_rows(
        grades
            .iter()
            .map(|(material, sd, st)| MaterialRow {
                material: material.to_string(),
                design_stress_mpa: Some(*sd),
                hydrotest_stress_mpa: Some(*st),
            })
            .collect(),
    )
});

/// Built-in table of the plate grades offered by default
pub fn builtin_table() -> &'static MaterialTable {
    &BUILTIN
}
