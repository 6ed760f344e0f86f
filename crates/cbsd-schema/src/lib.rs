//! # cbsd-schema — The CbsdData Schema
//!
//! Ships the CbsdData JSON Schema (draft-04) and hands it, together with any
//! sub-schemas a consumer supplies, to the `jsonschema` crate.
//!
//! ## Embedded Schema (`embedded`)
//!
//! `schemas/CbsdData.schema.json` is compiled into the crate. Its two
//! external references (`file:CbsdRecordData.schema.json`,
//! `file:GrantRecord.schema.json`) are not shipped here.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SchemaValidator`] resolves `file:` references by file name against the
//! schemas it has loaded and never touches the network. What happens to a
//! reference with no loaded target is decided by [`UnresolvedRefPolicy`].
//!
//! ## Crate Policy
//!
//! - Depends only on `cbsd-core` internally.
//! - The schema text lives in exactly one file; nothing here rewrites it.
//! - Invalid documents are rejected with structured violations carrying
//!   instance path, schema path, and violation kind.

pub mod config;
pub mod embedded;
pub mod validate;

pub use config::{UnresolvedRefPolicy, ValidatorConfig};
pub use embedded::{
    cbsd_data_schema, external_references, reference_file_name, CBSD_DATA_SCHEMA_JSON,
    CBSD_DATA_SCHEMA_NAME, CBSD_RECORD_DATA_SCHEMA_NAME, GRANT_RECORD_SCHEMA_NAME,
};
pub use validate::{
    load_document, CompiledSchema, SchemaValidationError, SchemaValidator, ValidationViolations, Violation,
    ViolationKind,
};
