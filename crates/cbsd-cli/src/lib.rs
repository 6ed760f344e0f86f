//! # cbsd-cli — Command-Line Interface for CbsdData Records
//!
//! Provides the `cbsd` binary.
//!
//! ## Subcommands
//!
//! - `cbsd validate` — Validate CbsdData documents (JSON or YAML).
//! - `cbsd schema` — Print the embedded CbsdData schema or its references.
//! - `cbsd id` — Check and decompose a CBSD identifier.
//! - `cbsd dump` — Validate and summarize Full Activity Dump files.
//!
//! ```bash
//! cbsd validate record.json --schema-dir schemas --strict-refs
//! cbsd dump sas_uut_fad.json --peer sas_th_1.json --peer sas_th_2.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to `cbsd-core` and `cbsd-schema` and return an exit code.
//! - Exit codes: 0 success, 1 validation failure, 2 hard error.

pub mod dump;
pub mod id;
pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use cbsd_schema::{SchemaValidator, UnresolvedRefPolicy, ValidatorConfig};

/// Exit code for errors that stop a command before it can report on its inputs.
pub const HARD_ERROR_EXIT_CODE: u8 = 2;

/// Map the outcome of a command to the process exit code, logging hard errors.
pub fn exit_code(result: Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            HARD_ERROR_EXIT_CODE
        }
    }
}

/// Load the configuration file, or the default configuration when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}

/// Build a validator from the configuration, letting command-line flags win.
pub fn validator_for(
    config: &ValidatorConfig,
    schema_dir: Option<&Path>,
    strict_refs: bool,
) -> Result<SchemaValidator> {
    let mut config = config.clone();
    if let Some(dir) = schema_dir {
        config.schema_dir = Some(dir.to_path_buf());
    }
    if strict_refs {
        config.unresolved_refs = UnresolvedRefPolicy::Strict;
    }
    tracing::debug!(?config, "building schema validator");
    SchemaValidator::new(&config).context("failed to load schemas")
}
