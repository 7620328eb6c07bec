use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mwanga")]
#[command(about = "Mwanga programming language runtime", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Mwanga source file
    Run {
        /// Path to the Mwanga source file
        file: String,
    },
    /// Start an interactive REPL
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => {
            commands::run::run(&file)?;
        }
        Commands::Repl => {
            commands::repl::run()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from(["mwanga", "run", "programu.mwa"]);
        match cli.command {
            Commands::Run { file } => assert_eq!(file, "programu.mwa"),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_parses_repl() {
        let cli = Cli::parse_from(["mwanga", "repl"]);
        assert!(matches!(cli.command, Commands::Repl));
    }
}
