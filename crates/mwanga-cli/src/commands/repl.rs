//! `mwanga repl` — interactive session

use anyhow::Result;
use colored::Colorize;
use mwanga_runtime::{ReplSession, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
pub fn run() -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut session = ReplSession::new();

    println!("Mwanga v{}", mwanga_runtime::VERSION);
    println!("Andika programu yako, au :toka kuondoka");
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == ":toka" || trimmed == ":q" {
                    println!("Kwa heri!");
                    break;
                }
                if trimmed == ":futa" {
                    session.reset();
                    println!("Kumbukumbu imefutwa");
                    continue;
                }
                if trimmed == ":saidia" || trimmed == ":h" {
                    print_help();
                    continue;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let result = session.eval_line(&line);

                // Program output first, then the line's value or error
                if !result.output.is_empty() {
                    print!("{}", result.output);
                }
                if let Some(error) = &result.error {
                    for line in error.to_string().lines() {
                        eprintln!("{}", line.red());
                    }
                }
                if let Some(value) = &result.value {
                    if !matches!(value, Value::Null) {
                        println!("{}", value);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                println!("Tumia :toka kuondoka");
            }
            Err(ReadlineError::Eof) => {
                println!("Kwa heri!");
                break;
            }
            Err(err) => {
                eprintln!("Hitilafu: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Amri za REPL:");
    println!("  :toka, :q     Ondoka");
    println!("  :futa         Futa kumbukumbu zote");
    println!("  :saidia, :h   Onyesha msaada huu");
    println!();
    println!("Mifano:");
    println!("  >> fanya jumla = unda(x, y) {{ rudisha x + y }}");
    println!("  >> jumla(2, 3)");
    println!("  >> kwa i, v ktk [1, 2, 3] {{ andika(i, v) }}");
}
