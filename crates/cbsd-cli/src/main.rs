//! # cbsd CLI entry point
//!
//! Parses command-line arguments, installs logging, loads the validator
//! configuration and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cbsd_cli::dump::{run_dump, DumpArgs};
use cbsd_cli::id::{run_id, IdArgs};
use cbsd_cli::schema::{run_schema, SchemaArgs};
use cbsd_cli::validate::{run_validate, ValidateArgs};

/// CbsdData toolkit.
///
/// Validates CBSD registration-plus-grants records against the CbsdData
/// JSON Schema, prints the schema, checks CBSD identifiers, and summarizes
/// Full Activity Dumps.
#[derive(Parser, Debug)]
#[command(name = "cbsd", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a validator configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate CbsdData documents against the schema.
    Validate(ValidateArgs),

    /// Print the CbsdData schema or its external references.
    Schema(SchemaArgs),

    /// Check a CBSD identifier and print its components.
    Id(IdArgs),

    /// Validate and summarize Full Activity Dump files.
    Dump(DumpArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cbsd_cli::load_config(cli.config.as_deref()).and_then(|config| {
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &config),
            Commands::Schema(args) => run_schema(args),
            Commands::Id(args) => run_id(args),
            Commands::Dump(args) => run_dump(args, &config),
        }
    });

    ExitCode::from(cbsd_cli::exit_code(result))
}
