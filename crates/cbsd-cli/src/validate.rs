//! # Validate Subcommand
//!
//! Validates CbsdData documents against the CbsdData schema.
//!
//! ```bash
//! cbsd validate record.json other.yaml
//! cbsd validate record.json --schema-dir schemas --strict-refs --typed
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cbsd_core::CbsdData;
use cbsd_schema::{load_document, SchemaValidationError, ValidatorConfig};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// CbsdData documents to validate (`.json`, `.yaml` or `.yml`).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory holding the referenced sub-schemas.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Fail when a schema reference cannot be resolved.
    #[arg(long)]
    pub strict_refs: bool,

    /// Also build the typed record and print its id and grant count.
    #[arg(long)]
    pub typed: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code 0 when every document passes, 1 otherwise. Documents
/// that cannot be read count as failures; a schema that cannot be compiled
/// aborts the run.
pub fn run_validate(args: &ValidateArgs, config: &ValidatorConfig) -> Result<u8> {
    let validator = crate::validator_for(config, args.schema_dir.as_deref(), args.strict_refs)?;
    let compiled = validator
        .compile_cbsd_data()
        .context("failed to compile CbsdData schema")?;

    let mut failed = 0usize;
    for path in &args.files {
        let outcome = load_document(path).and_then(|instance| {
            compiled.validate(&instance)?;
            Ok(instance)
        });

        match outcome {
            Ok(instance) => {
                println!("OK    {}", path.display());
                if args.typed {
                    let record = CbsdData::from_value(instance)?;
                    println!("      id: {}  grants: {}", record.id, record.grant_count());
                }
            }
            Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
                println!("FAIL  {}", path.display());
                println!("{violations}");
                failed += 1;
            }
            Err(e @ SchemaValidationError::DocumentLoadError { .. }) => {
                println!("FAIL  {}", path.display());
                println!("  {e}");
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(total = args.files.len(), failed, "validation finished");
    println!();
    println!(
        "{} passed, {} failed",
        args.files.len() - failed,
        failed
    );

    Ok(if failed == 0 { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(files: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            files,
            schema_dir: None,
            strict_refs: false,
            typed: true,
        }
    }

    #[test]
    fn valid_documents_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let json = write(
            dir.path(),
            "a.json",
            r#"{"id": "cbsd/X/Y", "registration": {}, "grants": []}"#,
        );
        let yaml = write(
            dir.path(),
            "b.yaml",
            "id: cbsd/FCC1/abc\nregistration: {}\ngrants:\n  - id: g1\n",
        );

        let code = run_validate(&args(vec![json, yaml]), &ValidatorConfig::default()).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn invalid_document_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(
            dir.path(),
            "good.json",
            r#"{"id": "cbsd/X/Y", "registration": {}, "grants": []}"#,
        );
        let bad = write(dir.path(), "bad.json", r#"{"id": "abc", "grants": []}"#);

        let code = run_validate(&args(vec![good, bad]), &ValidatorConfig::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn unreadable_document_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let code = run_validate(
            &args(vec![dir.path().join("missing.json")]),
            &ValidatorConfig::default(),
        )
        .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn strict_refs_without_sub_schemas_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = write(
            dir.path(),
            "a.json",
            r#"{"id": "cbsd/X/Y", "registration": {}, "grants": []}"#,
        );
        let mut args = args(vec![doc]);
        args.strict_refs = true;

        assert!(run_validate(&args, &ValidatorConfig::default()).is_err());
    }
}
