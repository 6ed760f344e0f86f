//! # cbsd-core — Foundational Types for CbsdData Records
//!
//! A CbsdData record is one CBSD registration together with every active and
//! pending grant the CBSD holds. This crate defines the typed form of that
//! record and the identifiers it is keyed by.
//!
//! ## Key Design Principles
//!
//! 1. **Validated identifier newtype.** `CbsdId` can only be constructed from
//!    a string that matches the `cbsd/.+/.+` pattern of the published schema.
//!    No bare strings for CBSD identifiers.
//!
//! 2. **Opaque sub-records.** Registration and grant bodies are described by
//!    external schemas (`CbsdRecordData`, `GrantRecord`). They are carried as
//!    JSON values so that this crate never drifts from those shapes.
//!
//! 3. **Dumps are keyed, not listed.** A `FullActivityDump` indexes records
//!    by `CbsdId`; a duplicate identifier is an error, not a silent overwrite.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cbsd-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. `.expect()` is allowed only
//!   on values fixed at compile time, such as the identifier pattern.

pub mod dump;
pub mod error;
pub mod identity;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use dump::{grant_entries_across, DumpFile, FullActivityDump, GrantEntry};
pub use error::CbsdError;
pub use identity::{CbsdId, CBSD_ID_PATTERN, CBSD_ID_PREFIX};
pub use record::CbsdData;
