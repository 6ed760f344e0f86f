//! # Embedded Schema
//!
//! The CbsdData schema text, compiled into the crate from
//! `schemas/CbsdData.schema.json`, and helpers for walking its references.

use once_cell::sync::Lazy;
use serde_json::Value;

/// File name of the CbsdData schema.
pub const CBSD_DATA_SCHEMA_NAME: &str = "CbsdData.schema.json";

/// File name of the registration sub-schema referenced by CbsdData.
pub const CBSD_RECORD_DATA_SCHEMA_NAME: &str = "CbsdRecordData.schema.json";

/// File name of the grant sub-schema referenced by CbsdData.
pub const GRANT_RECORD_SCHEMA_NAME: &str = "GrantRecord.schema.json";

/// JSON Schema (draft-04) describing a CbsdData record.
pub static CBSD_DATA_SCHEMA_JSON: &str = include_str!("../../../schemas/CbsdData.schema.json");

static CBSD_DATA_SCHEMA_VALUE: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(CBSD_DATA_SCHEMA_JSON)
        .expect("embedded CbsdData schema must be valid JSON")
});

/// The parsed CbsdData schema.
pub fn cbsd_data_schema() -> &'static Value {
    &CBSD_DATA_SCHEMA_VALUE
}

/// Every `$ref` string in `schema`, in document order.
///
/// Object members are visited in the order they appear in the source text
/// (`serde_json` is built with `preserve_order`).
pub fn external_references(schema: &Value) -> Vec<&str> {
    let mut refs = Vec::new();
    collect_refs(schema, &mut refs);
    refs
}

fn collect_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(target)) => out.push(target),
                    _ => collect_refs(child, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

/// File-name component of a reference URI.
///
/// `file:GrantRecord.schema.json`, `file:///schemas/GrantRecord.schema.json`
/// and `GrantRecord.schema.json#/definitions/x` all yield
/// `GrantRecord.schema.json`.
pub fn reference_file_name(uri: &str) -> &str {
    let without_fragment = uri.split('#').next().unwrap_or(uri);
    without_fragment
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(without_fragment)
}
