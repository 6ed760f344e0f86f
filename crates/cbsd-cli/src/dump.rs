//! # Dump Subcommand
//!
//! Validates every CbsdData record in Full Activity Dump files and prints
//! CBSD and grant totals for the primary SAS, each peer SAS, and all of
//! them together.
//!
//! ```bash
//! cbsd dump uut_fad_1.json uut_fad_2.json --peer th_1_fad.json --peer th_2_fad.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use cbsd_core::{grant_entries_across, DumpFile, FullActivityDump};
use cbsd_schema::{load_document, CompiledSchema, SchemaValidationError, ValidatorConfig};

/// Arguments for the dump subcommand.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Dump files of the primary SAS.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Dump file of a peer SAS. Repeat for each peer.
    #[arg(long = "peer")]
    pub peers: Vec<PathBuf>,

    /// Directory holding the referenced sub-schemas.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Fail when a schema reference cannot be resolved.
    #[arg(long)]
    pub strict_refs: bool,
}

/// Execute the dump subcommand.
///
/// Returns exit code 1 if any record fails schema validation.
pub fn run_dump(args: &DumpArgs, config: &ValidatorConfig) -> Result<u8> {
    let validator = crate::validator_for(config, args.schema_dir.as_deref(), args.strict_refs)?;
    let compiled = validator
        .compile_cbsd_data()
        .context("failed to compile CbsdData schema")?;

    let mut invalid = false;
    let mut primary_files = Vec::new();
    for path in &args.files {
        match check_dump_file(&compiled, path)? {
            Some(file) => primary_files.push(file),
            None => invalid = true,
        }
    }

    let mut peer_dumps = Vec::new();
    for path in &args.peers {
        match check_dump_file(&compiled, path)? {
            Some(file) => peer_dumps.push(
                FullActivityDump::from_files([file])
                    .with_context(|| format!("invalid dump {}", path.display()))?,
            ),
            None => invalid = true,
        }
    }

    if invalid {
        println!();
        println!("dump contains invalid CbsdData records");
        return Ok(1);
    }

    let primary = FullActivityDump::from_files(primary_files).context("invalid primary dump")?;
    println!(
        "primary: {} CBSDs, {} grants",
        primary.len(),
        primary.grant_count()
    );
    for (path, peer) in args.peers.iter().zip(&peer_dumps) {
        println!(
            "peer {}: {} CBSDs, {} grants",
            path.display(),
            peer.len(),
            peer.grant_count()
        );
    }

    let total = grant_entries_across(&primary, &peer_dumps).len();
    tracing::info!(peers = peer_dumps.len(), grants = total, "dump summary");
    println!("total grants across {} SAS: {total}", peer_dumps.len() + 1);

    Ok(0)
}

/// Validate each record of a dump file against the CbsdData schema.
///
/// Returns `None` after printing the violations if any record is invalid.
fn check_dump_file(compiled: &CompiledSchema, path: &Path) -> Result<Option<DumpFile>> {
    let value = load_document(path)?;
    let records = value
        .get("recordData")
        .and_then(Value::as_array)
        .with_context(|| format!("{}: missing recordData array", path.display()))?;

    let mut invalid = 0usize;
    for (index, record) in records.iter().enumerate() {
        match compiled.validate(record) {
            Ok(()) => {}
            Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
                println!("FAIL  {} recordData[{index}]", path.display());
                println!("{violations}");
                invalid += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if invalid > 0 {
        tracing::warn!(path = %path.display(), invalid, "dump file has invalid records");
        return Ok(None);
    }

    let file: DumpFile = serde_json::from_value(value)
        .with_context(|| format!("{}: malformed dump file", path.display()))?;
    file.check_window()
        .with_context(|| format!("{}: invalid dump window", path.display()))?;
    Ok(Some(file))
}
