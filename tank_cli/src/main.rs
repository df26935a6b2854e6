//! # Tankcalc CLI Application
//!
//! Runs shell thickness calculations from JSON files.
//!
//! ```text
//! tank_cli calc tank.json [--materials table.csv] [--output outcome.json]
//! tank_cli project terminal.tank [--materials table.csv]
//! tank_cli materials [--materials table.csv]
//! ```
//!
//! A readable summary goes to stdout followed by the JSON outcome. Errors are
//! printed to stderr in their JSON form and the process exits with status 1.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tank_core::calculations::CalculationOutcome;
use tank_core::materials::{builtin_table, MaterialTable};
use tank_core::{load_project, load_tank_input, save_outcome, CalcError, CalcResult};

#[derive(Debug, Parser)]
#[command(name = "tank_cli", version, about = "API 650 shell thickness calculator")]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate one tank from a JSON input file
    Calc {
        /// Tank input JSON
        input: PathBuf,

        /// Material table (.xlsx, .csv or .json) instead of the built-in grades
        #[arg(short, long)]
        materials: Option<PathBuf>,

        /// Write the outcome JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Calculate every tank of a project file
    Project {
        /// Project file (.tank)
        path: PathBuf,

        /// Material table, overriding the project's setting
        #[arg(short, long)]
        materials: Option<PathBuf>,
    },

    /// List the material table in use
    Materials {
        #[arg(short, long)]
        materials: Option<PathBuf>,
    },
}

impl Cli {
    fn run(self) -> CalcResult<()> {
        Self::setup_logging(self.verbose);

        match self.command {
            Command::Calc {
                input,
                materials,
                output,
            } => run_calc(&input, materials.as_deref(), output.as_deref()),
            Command::Project { path, materials } => run_project(&path, materials.as_deref()),
            Command::Materials { materials } => run_materials(materials.as_deref()),
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_line_number(false);

        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }
}

/// Table from `path`, or the built-in grades
fn material_table(path: Option<&Path>) -> CalcResult<MaterialTable> {
    match path {
        Some(p) => {
            let table = MaterialTable::load(&p.display().to_string())?;
            tracing::info!(path = %p.display(), grades = table.len(), "material table loaded");
            Ok(table)
        }
        None => Ok(builtin_table().clone()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> CalcResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError { reason: e.to_string() })
}

fn run_calc(input: &Path, materials: Option<&Path>, output: Option<&Path>) -> CalcResult<()> {
    let table = material_table(materials)?;
    let tank = load_tank_input(input)?;
    let outcome = tank_core::calculate(&tank, &table)?;

    print!("{}", render_summary(&outcome));
    match output {
        Some(path) => {
            save_outcome(&outcome, path)?;
            println!("Outcome written to {}", path.display());
        }
        None => println!("{}", to_json(&outcome)?),
    }
    Ok(())
}

fn run_project(path: &Path, materials: Option<&Path>) -> CalcResult<()> {
    let project = load_project(path)?;

    // A relative table path in the project is resolved next to the project file
    let project_table = project.settings.material_table.as_ref().map(|t| {
        let t = PathBuf::from(t);
        match path.parent() {
            Some(dir) if t.is_relative() => dir.join(t),
            _ => t,
        }
    });
    let table = material_table(materials.or(project_table.as_deref()))?;

    println!(
        "Project {} ({}) - {} tank(s)",
        project.meta.job_id,
        project.meta.client,
        project.item_count()
    );

    let mut report = serde_json::Map::new();
    for (id, result) in project.calculate_all(&table) {
        let entry = match result {
            Ok(outcome) => {
                print!("{}", render_summary(&outcome));
                serde_json::to_value(&outcome)
            }
            Err(err) => {
                println!("Tank {}: {}", id, err);
                serde_json::to_value(&err)
            }
        }
        .map_err(|e| CalcError::SerializationError { reason: e.to_string() })?;
        report.insert(id.to_string(), entry);
    }

    println!("{}", to_json(&report)?);
    Ok(())
}

fn run_materials(materials: Option<&Path>) -> CalcResult<()> {
    let table = material_table(materials)?;
    println!("{:<20} {:>10} {:>10}", "Material", "Sd (MPa)", "St (MPa)");
    for row in table.rows() {
        let cell = |v: Option<f64>| v.map(|x| format!("{:.1}", x)).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:>10} {:>10}",
            row.material,
            cell(row.design_stress_mpa),
            cell(row.hydrotest_stress_mpa)
        );
    }
    Ok(())
}

/// Human-readable summary of one outcome
fn render_summary(outcome: &CalculationOutcome) -> String {
    let inputs = &outcome.inputs;
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════\n");
    out.push_str(&format!("  {} - {}\n", inputs.tag, inputs.method));
    out.push_str("═══════════════════════════════════════\n");
    out.push_str(&format!("  Fluid:    {}\n", inputs.fluid));
    out.push_str(&format!(
        "  D = {:.3} m   H = {:.3} m   G = {:.3}\n",
        inputs.diameter_m, inputs.height_m, inputs.relative_density
    ));
    if let Some(e) = inputs.joint_efficiency {
        out.push_str(&format!("  E = {:.2}\n", e));
    }
    out.push('\n');

    for (ring, result) in outcome.memory.iter().zip(&outcome.results) {
        out.push_str(&format!(
            "  Ring {:>2}  {:<16} t = {:>7.2} mm  {}\n",
            ring.ring_index + 1,
            ring.material,
            result.required_thickness_mm,
            if ring.excess_flag.is_excessive() {
                ring.excess_flag.message()
            } else {
                ""
            }
        ));
    }

    if outcome.alert.is_raised() {
        out.push_str(&format!("\n  ALERT: {}\n", outcome.alert.message()));
    }
    for warning in outcome.warnings() {
        out.push_str(&format!("  warning: {}\n", warning));
    }
    out.push('\n');
    out
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.error_code(), "{}", err);
            match serde_json::to_string_pretty(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_core::{Method, NumericField, RingInput, TankInput, UnitSystem};

    #[test]
    fn test_parse_calc() {
        let cli = Cli::try_parse_from(["tank_cli", "calc", "tank.json", "-m", "grades.csv", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Calc {
                input,
                materials,
                output,
            } => {
                assert_eq!(input, PathBuf::from("tank.json"));
                assert_eq!(materials, Some(PathBuf::from("grades.csv")));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_project_and_materials() {
        let cli = Cli::try_parse_from(["tank_cli", "project", "plant.tank"]).unwrap();
        assert!(matches!(cli.command, Command::Project { materials: None, .. }));

        let cli = Cli::try_parse_from(["tank_cli", "materials"]).unwrap();
        assert!(matches!(cli.command, Command::Materials { materials: None }));
    }

    #[test]
    fn test_calc_requires_input() {
        assert!(Cli::try_parse_from(["tank_cli", "calc"]).is_err());
        assert!(Cli::try_parse_from(["tank_cli"]).is_err());
    }

    #[test]
    fn test_summary_mentions_rings_and_alert() {
        let input = TankInput {
            tag: Some("TQ-9".to_string()),
            fluid: None,
            unit_system: UnitSystem::Metric,
            diameter: NumericField::from(65.0),
            height: NumericField::from(15.0),
            relative_density: NumericField::from(1.0),
            joint_efficiency: None,
            rings: vec![RingInput::new("A36", 0.0, 2.5); 6],
            method: Method::FixedPoint,
        };
        let outcome = tank_core::calculate(&input, builtin_table()).unwrap();
        let summary = render_summary(&outcome);
        assert!(summary.contains("TQ-9"));
        assert!(summary.contains("Ring  1"));
        assert!(!summary.contains("Ring  2"));
        assert!(summary.contains("ALERT"));
        assert!(summary.contains("Not informed"));
    }

    #[test]
    fn test_builtin_table_when_no_path() {
        let table = material_table(None).unwrap();
        assert_eq!(table.len(), 9);
    }
}
