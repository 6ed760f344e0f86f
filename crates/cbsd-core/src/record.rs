//! # CbsdData Record
//!
//! The typed form of a CbsdData document: a CBSD identifier, the CBSD's
//! registration (installation parameters) and every active or pending grant.
//!
//! Registration and grant bodies conform to the external `CbsdRecordData`
//! and `GrantRecord` shapes. They are kept as JSON so that a field added to
//! those shapes survives a round trip through this type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CbsdError;
use crate::identity::CbsdId;

/// A CBSD registration plus all of its grants.
///
/// All three fields are required on deserialization. `grants` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbsdData {
    /// `cbsd/$FCC_ID/sha1($SERIAL_NUMBER)`.
    pub id: CbsdId,
    /// Installation parameters of the CBSD.
    pub registration: Map<String, Value>,
    /// Active and pending grants.
    pub grants: Vec<Value>,
}

impl CbsdData {
    /// Create a record with no grants.
    pub fn new(id: CbsdId, registration: Map<String, Value>) -> Self {
        Self {
            id,
            registration,
            grants: Vec::new(),
        }
    }

    /// Builder-style variant of [`CbsdData::push_grant`].
    pub fn with_grant(mut self, grant: Value) -> Self {
        self.grants.push(grant);
        self
    }

    /// Append a grant.
    pub fn push_grant(&mut self, grant: Value) {
        self.grants.push(grant);
    }

    /// Number of grants held by the CBSD.
    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    /// Returns true if the CBSD holds at least one grant.
    pub fn has_grants(&self) -> bool {
        !self.grants.is_empty()
    }

    /// Convert a JSON value into a record.
    ///
    /// Fails with [`CbsdError::InvalidRecord`] when the value is not an
    /// object, a required field is missing, `registration` is not an object,
    /// `grants` is not an array, or `id` does not match the identifier
    /// pattern.
    pub fn from_value(value: Value) -> Result<Self, CbsdError> {
        if !value.is_object() {
            return Err(CbsdError::InvalidRecord(format!(
                "expected a JSON object, found {}",
                json_type_name(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| CbsdError::InvalidRecord(e.to_string()))
    }

    /// Convert the record back into a JSON value.
    pub fn to_value(&self) -> Result<Value, CbsdError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(raw: &str) -> CbsdId {
        CbsdId::parse(raw).unwrap()
    }

    #[test]
    fn minimal_record_parses() {
        let record =
            CbsdData::from_value(json!({"id": "cbsd/X/Y", "registration": {}, "grants": []}))
                .unwrap();
        assert_eq!(record.id.as_str(), "cbsd/X/Y");
        assert!(record.registration.is_empty());
        assert!(!record.has_grants());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let full = json!({"id": "cbsd/X/Y", "registration": {}, "grants": []});
        for field in ["id", "registration", "grants"] {
            let mut doc = full.clone();
            doc.as_object_mut().unwrap().remove(field);
            let err = CbsdData::from_value(doc).unwrap_err();
            assert!(
                err.to_string().contains(field),
                "error for missing {field} should name it: {err}"
            );
        }
    }

    #[test]
    fn invalid_id_is_rejected() {
        let err = CbsdData::from_value(json!({"id": "cbsd/", "registration": {}, "grants": []}))
            .unwrap_err();
        assert!(matches!(err, CbsdError::InvalidRecord(_)));
    }

    #[test]
    fn registration_must_be_object() {
        let err =
            CbsdData::from_value(json!({"id": "cbsd/X/Y", "registration": [], "grants": []}))
                .unwrap_err();
        assert!(matches!(err, CbsdError::InvalidRecord(_)));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = CbsdData::from_value(json!("cbsd/X/Y")).unwrap_err();
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn grant_bodies_are_preserved() {
        let grant = json!({"id": "grant/1", "operationParam": {"maxEirp": 20}, "extra": true});
        let record = CbsdData::new(id("cbsd/X/Y"), Map::new()).with_grant(grant.clone());
        assert_eq!(record.grant_count(), 1);

        let value = record.to_value().unwrap();
        assert_eq!(value["grants"][0], grant);
        assert_eq!(CbsdData::from_value(value).unwrap(), record);
    }

    #[test]
    fn push_grant_appends_in_order() {
        let mut record = CbsdData::new(id("cbsd/X/Y"), Map::new());
        record.push_grant(json!({"id": "g1"}));
        record.push_grant(json!({"id": "g2"}));
        assert_eq!(record.grants[0]["id"], "g1");
        assert_eq!(record.grants[1]["id"], "g2");
    }
}
