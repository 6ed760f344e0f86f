//! # Id Subcommand
//!
//! Checks a CBSD identifier against `cbsd/.+/.+` and prints its parts.

use anyhow::Result;
use clap::Args;

use cbsd_core::CbsdId;

/// Arguments for the id subcommand.
#[derive(Args, Debug)]
pub struct IdArgs {
    /// Identifier to check, e.g. `cbsd/FCC123/3f78...001b`.
    pub id: String,
}

/// Execute the id subcommand. Returns 1 when the identifier is invalid.
pub fn run_id(args: &IdArgs) -> Result<u8> {
    let id = match CbsdId::parse(args.id.as_str()) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            return Ok(1);
        }
    };

    println!("valid:        {id}");
    match id.components() {
        Some((fcc_id, serial_hash)) => {
            println!("fcc_id:       {fcc_id}");
            println!("serial_hash:  {serial_hash}");
        }
        None => println!("(pattern match is not in canonical cbsd/<fcc_id>/<serial_hash> form)"),
    }
    Ok(0)
}
