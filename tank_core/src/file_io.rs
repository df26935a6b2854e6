//! # File I/O Module
//!
//! JSON documents on disk:
//! - **Projects** (`.tank`): saved atomically, loaded with schema-version validation
//! - **Tank inputs**: a single [`TankInput`] document
//! - **Outcomes**: a [`CalculationOutcome`] written for report tools
//!
//! Every write goes to a `.tmp` sibling first, is synced, then renamed over
//! the target, so an interrupted save never leaves a truncated file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tank_core::file_io::{load_project, save_project};
//! use tank_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Engineer", "26-001", "Client");
//! let path = Path::new("terminal.tank");
//!
//! save_project(&project, path)?;
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.meta.job_id, "26-001");
//! # Ok::<(), tank_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calculations::CalculationOutcome;
use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, SCHEMA_VERSION};
use crate::tank::TankInput;

/// Save a project with atomic write semantics.
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    write_json_atomic(project, path)?;
    tracing::debug!(path = %path.display(), tanks = project.item_count(), "project saved");
    Ok(())
}

/// Load a project from a file.
///
/// # Errors
///
/// * `CalcError::VersionMismatch` - file schema is incompatible
/// * `CalcError::SerializationError` - invalid JSON
/// * `CalcError::FileError` - I/O error
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let project: Project = read_json(path)?;
    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a single tank input document.
///
/// Numeric fields may be numbers or text (`"12,5"` is accepted); unreadable
/// values surface later as validation failures, not parse errors.
pub fn load_tank_input(path: &Path) -> CalcResult<TankInput> {
    read_json(path)
}

/// Write a calculation outcome as pretty JSON.
pub fn save_outcome(outcome: &CalculationOutcome, path: &Path) -> CalcResult<()> {
    write_json_atomic(outcome, path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(contents.trim_start_matches('\u{feff}')).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Temp path next to `path`: `outcome.json` becomes `outcome.json.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Serialize, write to `.tmp`, fsync, rename over `path`.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Check that a file's schema version can be read by this build.
///
/// Major versions must match; while on 0.x, a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.trim().parse().ok()).collect() };
    let file_parts = parse(file_version).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
