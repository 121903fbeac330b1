//! `generate-ast`: regenerate the Lox AST modules.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lox_astgen::{generate, grammars, load_grammar, render_all, stale, GrammarSpec};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate-ast")]
#[command(about = "Generate Lox AST node types and visitors")]
struct Cli {
    /// Grammar file (.toml or .json); repeatable. Defaults to the built-in Lox grammars
    #[arg(short, long = "grammar", global = true)]
    grammars: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one module per grammar into a directory
    Write {
        /// Output directory
        #[arg(short, long, default_value = "src")]
        out: PathBuf,
    },

    /// Fail if any module in a directory is missing or out of date
    Check {
        /// Directory holding the generated modules
        #[arg(short, long, default_value = "src")]
        out: PathBuf,
    },

    /// Print the generated modules to stdout
    Print,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("lox_astgen=info".parse()?)
                .add_directive("generate_ast=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let grammars = load_grammars(&cli.grammars)?;

    match cli.command {
        Commands::Write { out } => {
            for path in generate(&grammars, &out)? {
                println!("Wrote: {}", path.display());
            }
        }

        Commands::Check { out } => {
            let stale = stale(&grammars, &out)?;
            if !stale.is_empty() {
                for path in &stale {
                    eprintln!("out of date: {}", path.display());
                }
                return Err(format!(
                    "{} generated module(s) out of date; run `generate-ast write`",
                    stale.len()
                )
                .into());
            }
            info!("{} generated module(s) up to date", grammars.len());
        }

        Commands::Print => {
            for unit in render_all(&grammars)? {
                print!("{}", unit.source);
            }
        }
    }

    Ok(())
}

/// Load grammar files, or fall back to the built-in Lox grammars.
fn load_grammars(paths: &[PathBuf]) -> Result<Vec<GrammarSpec>, Box<dyn Error>> {
    if paths.is_empty() {
        return Ok(grammars::lox()?);
    }

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        info!("Loading grammar: {}", path.display());
        loaded.push(load_grammar(path)?);
    }
    Ok(loaded)
}
