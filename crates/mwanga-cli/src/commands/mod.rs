//! CLI subcommands

pub mod repl;
pub mod run;
