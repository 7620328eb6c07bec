//! `mwanga run` — evaluate a source file

use anyhow::{Context, Result};
use colored::Colorize;
use mwanga_runtime::Mwanga;

/// Run a source file; diagnostics go to stderr in red
pub fn run(file: &str) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Imeshindikana kusoma faili '{}'", file))?;

    let runtime = Mwanga::new();
    if let Err(error) = runtime.eval(&source) {
        for line in error.to_string().lines() {
            eprintln!("{}", line.red());
        }
        std::process::exit(1);
    }

    Ok(())
}
