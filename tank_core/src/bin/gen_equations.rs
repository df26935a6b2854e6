//! Generate EQUATIONS.md from the clause registry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-equations
//! ```
//!
//! The file is written to `tank_core/src/equations/EQUATIONS.md`, or to the
//! path given as the first argument.

use std::fs;
use std::path::PathBuf;

use tank_core::equations::{generate_equations_markdown, ALL_CLAUSES};

fn main() {
    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tank_core/src/equations/EQUATIONS.md"));

    println!("Generating EQUATIONS.md ({} clauses)...", ALL_CLAUSES.len());
    let markdown = generate_equations_markdown();

    match fs::write(&output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            std::process::exit(1);
        }
    }
}
