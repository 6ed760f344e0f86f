//! # CBSD Identifier
//!
//! `CbsdId` wraps the `id` attribute of a CbsdData record. The identifier is
//! formed as `cbsd/$FCC_ID/sha1($SERIAL_NUMBER)`; this module checks and
//! decomposes such identifiers but never derives one from a serial number.
//!
//! ## Pattern Semantics
//!
//! Construction applies the same `cbsd/.+/.+` pattern as the published
//! schema, with the same unanchored search semantics that JSON Schema uses
//! for `pattern`. A string the schema accepts is a valid `CbsdId` and vice
//! versa.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CbsdError;

/// Pattern every CBSD identifier must match.
pub const CBSD_ID_PATTERN: &str = "cbsd/.+/.+";

/// Leading namespace of a canonical CBSD identifier.
pub const CBSD_ID_PREFIX: &str = "cbsd/";

static CBSD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(CBSD_ID_PATTERN).expect("CBSD id pattern is a valid regex"));

/// Identifier of a CBSD within a SAS, e.g.
/// `cbsd/FCC123/3f786850e387550fdab836ed7e6dc881de23001b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CbsdId(String);

impl CbsdId {
    /// Parse an identifier, rejecting anything that does not match
    /// [`CBSD_ID_PATTERN`].
    pub fn parse(value: impl Into<String>) -> Result<Self, CbsdError> {
        let value = value.into();
        if CBSD_ID_RE.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(CbsdError::InvalidId { value })
        }
    }

    /// Returns true if `value` would be accepted by [`CbsdId::parse`].
    pub fn is_valid(value: &str) -> bool {
        CBSD_ID_RE.is_match(value)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a canonical identifier into `(fcc_id, serial_hash)`.
    ///
    /// Returns `None` when the identifier only matches the pattern somewhere
    /// inside the string (for example `x-cbsd/a/b`) rather than starting
    /// with `cbsd/`.
    pub fn components(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix(CBSD_ID_PREFIX)?;
        let (fcc_id, serial_hash) = rest.split_once('/')?;
        if fcc_id.is_empty() || serial_hash.is_empty() {
            return None;
        }
        Some((fcc_id, serial_hash))
    }

    /// FCC ID component of a canonical identifier.
    pub fn fcc_id(&self) -> Option<&str> {
        self.components().map(|(fcc_id, _)| fcc_id)
    }

    /// Serial-number hash component of a canonical identifier.
    pub fn serial_hash(&self) -> Option<&str> {
        self.components().map(|(_, serial_hash)| serial_hash)
    }
}

impl fmt::Display for CbsdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CbsdId {
    type Err = CbsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CbsdId {
    type Error = CbsdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CbsdId> for String {
    fn from(id: CbsdId) -> Self {
        id.0
    }
}

impl AsRef<str> for CbsdId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_identifier() {
        let id = CbsdId::parse("cbsd/FCC123/3f786850e387550fdab836ed7e6dc881de23001b").unwrap();
        assert_eq!(id.fcc_id(), Some("FCC123"));
        assert_eq!(
            id.serial_hash(),
            Some("3f786850e387550fdab836ed7e6dc881de23001b")
        );
    }

    #[test]
    fn rejects_strings_outside_pattern() {
        for bad in ["abc", "", "cbsd/", "cbsd//", "cbsd/x/", "cbsd/x", "CBSD/x/y"] {
            let err = CbsdId::parse(bad).unwrap_err();
            assert!(
                matches!(err, CbsdError::InvalidId { ref value } if value == bad),
                "expected InvalidId for {bad:?}, got {err}"
            );
        }
    }

    #[test]
    fn pattern_is_unanchored() {
        // JSON Schema `pattern` searches; a leading prefix is allowed.
        let id = CbsdId::parse("x-cbsd/a/b").unwrap();
        assert_eq!(id.components(), None);
    }

    #[test]
    fn serial_hash_keeps_extra_slashes() {
        let id = CbsdId::parse("cbsd/FCC/abc/def").unwrap();
        assert_eq!(id.components(), Some(("FCC", "abc/def")));
    }

    #[test]
    fn components_require_non_empty_fcc_id() {
        // `cbsd//a/b` matches the pattern via `.+` spanning `/a`.
        let id = CbsdId::parse("cbsd//a/b").unwrap();
        assert_eq!(id.components(), None);
    }

    #[test]
    fn serde_round_trip_is_plain_string() {
        let id: CbsdId = serde_json::from_str(r#""cbsd/X/Y""#).unwrap();
        assert_eq!(id.as_str(), "cbsd/X/Y");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""cbsd/X/Y""#);
    }

    #[test]
    fn serde_rejects_invalid_identifier() {
        let result: Result<CbsdId, _> = serde_json::from_str(r#""cbsd/""#);
        assert!(result.is_err());
    }

    #[test]
    fn from_str_and_display() {
        let id: CbsdId = "cbsd/A1/b2".parse().unwrap();
        assert_eq!(id.to_string(), "cbsd/A1/b2");
    }
}
