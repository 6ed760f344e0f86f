//! # Schema Subcommand
//!
//! Prints the embedded CbsdData schema, writes it to a file, or lists the
//! external references it depends on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cbsd_schema::{cbsd_data_schema, external_references, CBSD_DATA_SCHEMA_JSON};

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Write the schema to this file instead of stdout.
    #[arg(long, conflicts_with = "references")]
    pub out: Option<PathBuf>,

    /// List the external `$ref` targets instead of the schema text.
    #[arg(long)]
    pub references: bool,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    if args.references {
        for reference in external_references(cbsd_data_schema()) {
            println!("{reference}");
        }
        return Ok(0);
    }

    match &args.out {
        Some(path) => {
            std::fs::write(path, CBSD_DATA_SCHEMA_JSON)
                .with_context(|| format!("failed to write schema: {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote CbsdData schema");
        }
        None => print!("{CBSD_DATA_SCHEMA_JSON}"),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_schema_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("CbsdData.schema.json");
        let args = SchemaArgs {
            out: Some(out.clone()),
            references: false,
        };

        assert_eq!(run_schema(&args).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), CBSD_DATA_SCHEMA_JSON);
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let args = SchemaArgs {
            out: Some(PathBuf::from("/nonexistent/dir/CbsdData.schema.json")),
            references: false,
        };
        assert!(run_schema(&args).is_err());
    }

    #[test]
    fn references_listing_succeeds() {
        let args = SchemaArgs {
            out: None,
            references: true,
        };
        assert_eq!(run_schema(&args).unwrap(), 0);
    }
}
