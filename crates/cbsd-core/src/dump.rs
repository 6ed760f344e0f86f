//! # Full Activity Dump
//!
//! A SAS exports every CbsdData record it manages as a Full Activity Dump
//! (FAD): one or more dump files, each carrying a `recordData` array and an
//! optional `startTime`/`endTime` window.
//!
//! Interference analyses look at grants, not CBSDs, and at the grants of
//! every SAS at once. [`grant_entries_across`] flattens the dump of the SAS
//! under test followed by the dumps of its peers into one grant sequence,
//! each grant paired with the registration of the CBSD that holds it.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CbsdError;
use crate::identity::CbsdId;
use crate::record::CbsdData;

/// One file of a Full Activity Dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpFile {
    /// Start of the activity window covered by this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// End of the activity window covered by this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// CbsdData records in this file.
    pub record_data: Vec<CbsdData>,
}

impl DumpFile {
    /// Parse a dump file and check its activity window.
    pub fn from_json(content: &str) -> Result<Self, CbsdError> {
        let file: Self = serde_json::from_str(content)?;
        file.check_window()?;
        Ok(file)
    }

    /// Reject a window whose end precedes its start.
    pub fn check_window(&self) -> Result<(), CbsdError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(CbsdError::InvalidDumpWindow {
                    start: start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    end: end.to_rfc3339_opts(SecondsFormat::Secs, true),
                });
            }
        }
        Ok(())
    }
}

/// A grant paired with the CBSD that holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrantEntry<'a> {
    /// Identifier of the CBSD holding the grant.
    pub cbsd_id: &'a CbsdId,
    /// Registration of the CBSD holding the grant.
    pub registration: &'a Map<String, Value>,
    /// The grant itself.
    pub grant: &'a Value,
}

/// All CbsdData records exported by one SAS, keyed by CBSD identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullActivityDump {
    records: BTreeMap<CbsdId, CbsdData>,
}

impl FullActivityDump {
    /// Create an empty dump.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the records of several dump files.
    ///
    /// # Errors
    ///
    /// Returns [`CbsdError::DuplicateRecord`] if a CBSD appears in more
    /// than one record.
    pub fn from_files<I>(files: I) -> Result<Self, CbsdError>
    where
        I: IntoIterator<Item = DumpFile>,
    {
        let mut dump = Self::new();
        for file in files {
            for record in file.record_data {
                dump.insert(record)?;
            }
        }
        Ok(dump)
    }

    /// Add a record, rejecting a second record for the same CBSD.
    pub fn insert(&mut self, record: CbsdData) -> Result<(), CbsdError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(existing) => Err(CbsdError::DuplicateRecord {
                id: existing.key().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Look up the record of a CBSD.
    pub fn get(&self, id: &CbsdId) -> Option<&CbsdData> {
        self.records.get(id)
    }

    /// Number of CBSDs in the dump.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dump holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by CBSD identifier.
    pub fn records(&self) -> impl Iterator<Item = &CbsdData> {
        self.records.values()
    }

    /// Total number of grants across all CBSDs.
    pub fn grant_count(&self) -> usize {
        self.records.values().map(CbsdData::grant_count).sum()
    }

    /// Every grant in the dump, in record order then grant order.
    pub fn grant_entries(&self) -> impl Iterator<Item = GrantEntry<'_>> {
        self.records.values().flat_map(|record| {
            record.grants.iter().map(move |grant| GrantEntry {
                cbsd_id: &record.id,
                registration: &record.registration,
                grant,
            })
        })
    }
}

/// Flatten the grants of a primary dump followed by those of each peer dump.
pub fn grant_entries_across<'a>(
    primary: &'a FullActivityDump,
    peers: &'a [FullActivityDump],
) -> Vec<GrantEntry<'a>> {
    std::iter::once(primary)
        .chain(peers.iter())
        .flat_map(FullActivityDump::grant_entries)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, grants: &[&str]) -> CbsdData {
        let mut registration = Map::new();
        registration.insert("cbsdCategory".into(), json!("A"));
        let mut record = CbsdData::new(CbsdId::parse(id).unwrap(), registration);
        for grant in grants {
            record.push_grant(json!({ "id": grant }));
        }
        record
    }

    fn file(records: Vec<CbsdData>) -> DumpFile {
        DumpFile {
            start_time: None,
            end_time: None,
            record_data: records,
        }
    }

    #[test]
    fn parse_dump_file_with_window() {
        let content = r#"{
            "startTime": "2018-01-01T00:00:00Z",
            "endTime": "2018-01-02T00:00:00Z",
            "recordData": [
                {"id": "cbsd/FCC1/aa", "registration": {}, "grants": [{"id": "g1"}]}
            ]
        }"#;
        let file = DumpFile::from_json(content).unwrap();
        assert!(file.start_time.is_some());
        assert_eq!(file.record_data.len(), 1);
        assert_eq!(file.record_data[0].grant_count(), 1);
    }

    #[test]
    fn dump_file_without_window_is_accepted() {
        let file = DumpFile::from_json(r#"{"recordData": []}"#).unwrap();
        assert!(file.start_time.is_none());
        assert!(file.end_time.is_none());
        assert!(file.record_data.is_empty());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let content = r#"{
            "startTime": "2018-01-02T00:00:00Z",
            "endTime": "2018-01-01T00:00:00Z",
            "recordData": []
        }"#;
        let err = DumpFile::from_json(content).unwrap_err();
        match err {
            CbsdError::InvalidDumpWindow { start, end } => {
                assert_eq!(start, "2018-01-02T00:00:00Z");
                assert_eq!(end, "2018-01-01T00:00:00Z");
            }
            other => panic!("expected InvalidDumpWindow, got {other}"),
        }
    }

    #[test]
    fn invalid_record_in_file_fails_parse() {
        let content = r#"{"recordData": [{"id": "abc", "registration": {}, "grants": []}]}"#;
        assert!(DumpFile::from_json(content).is_err());
    }

    #[test]
    fn merge_files_and_count_grants() {
        let dump = FullActivityDump::from_files([
            file(vec![record("cbsd/B/2", &["g3"])]),
            file(vec![record("cbsd/A/1", &["g1", "g2"]), record("cbsd/C/3", &[])]),
        ])
        .unwrap();

        assert_eq!(dump.len(), 3);
        assert_eq!(dump.grant_count(), 3);
        let ids: Vec<&str> = dump.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["cbsd/A/1", "cbsd/B/2", "cbsd/C/3"]);
        assert!(dump
            .get(&CbsdId::parse("cbsd/C/3").unwrap())
            .is_some_and(|r| !r.has_grants()));
    }

    #[test]
    fn duplicate_cbsd_across_files_is_rejected() {
        let err = FullActivityDump::from_files([
            file(vec![record("cbsd/A/1", &[])]),
            file(vec![record("cbsd/A/1", &["g1"])]),
        ])
        .unwrap_err();
        assert!(matches!(err, CbsdError::DuplicateRecord { ref id } if id == "cbsd/A/1"));
    }

    #[test]
    fn grant_entries_carry_owning_cbsd() {
        let dump = FullActivityDump::from_files([file(vec![
            record("cbsd/A/1", &["g1", "g2"]),
            record("cbsd/B/2", &["g3"]),
        ])])
        .unwrap();

        let entries: Vec<_> = dump.grant_entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].cbsd_id.as_str(), "cbsd/A/1");
        assert_eq!(entries[0].grant["id"], "g1");
        assert_eq!(entries[1].grant["id"], "g2");
        assert_eq!(entries[2].cbsd_id.as_str(), "cbsd/B/2");
        assert_eq!(entries[2].registration["cbsdCategory"], "A");
    }

    #[test]
    fn grant_entries_across_puts_primary_first() {
        let primary = FullActivityDump::from_files([file(vec![record("cbsd/Z/9", &["uut"])])])
            .unwrap();
        let peers = vec![
            FullActivityDump::from_files([file(vec![record("cbsd/A/1", &["th1"])])]).unwrap(),
            FullActivityDump::new(),
            FullActivityDump::from_files([file(vec![record("cbsd/A/1", &["th2"])])]).unwrap(),
        ];

        let grants: Vec<Value> = grant_entries_across(&primary, &peers)
            .into_iter()
            .map(|e| e.grant["id"].clone())
            .collect();
        assert_eq!(grants, vec![json!("uut"), json!("th1"), json!("th2")]);
    }
}
