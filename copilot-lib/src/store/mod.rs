//! Record storage
//!
//! Maps a record position (as returned by the vector index) to the record's
//! fields. Loaded once at startup and never mutated afterwards, so one store
//! can be shared by every concurrent query.
//!
//! # Storage Model
//!
//! The persisted file is a JSON array. Array position is record position:
//!
//! ```json
//! [
//!   {"id": 0, "delay_reason": "Weather", "shipment_status": "Delayed"},
//!   {"id": 1, "delay_reason": "Traffic"}
//! ]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

/// A historical delay record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Identifier assigned by the indexing step
    pub id: u64,
    /// Free-text reason the shipment was delayed
    pub delay_reason: String,
    /// Any other columns carried over from the source dataset
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Record {
    #[must_use]
    pub fn new(id: u64, delay_reason: impl Into<String>) -> Self {
        Self {
            id,
            delay_reason: delay_reason.into(),
            extra: HashMap::new(),
        }
    }
}

/// Immutable, position-keyed record collection
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create a store from records in position order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Load a persisted record file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
        let records: Vec<Record> = serde_json::from_str(&raw).map_err(|e| Error::load(path, e))?;

        info!(path = %path.display(), records = records.len(), "loaded record store");
        Ok(Self::new(records))
    }

    /// Look up the record at an index position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    /// Get total number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_get_by_position() {
        let store = RecordStore::new(vec![
            Record::new(10, "Heavy rain"),
            Record::new(11, "Traffic jam on I-95"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().delay_reason, "Traffic jam on I-95");
        assert_eq!(store.get(1).unwrap().id, 11);
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_empty_store() {
        let store = RecordStore::default();
        assert!(store.is_empty());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn test_load_keeps_extra_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 0, "delay_reason": "Weather", "shipment_status": "Delayed", "delay_flag": 1}}]"#
        )
        .unwrap();

        let store = RecordStore::load(file.path()).unwrap();
        let record = store.get(0).unwrap();
        assert_eq!(record.delay_reason, "Weather");
        assert_eq!(record.extra["shipment_status"], "Delayed");
        assert_eq!(record.extra["delay_flag"], 1);
    }

    #[test]
    fn test_load_rejects_missing_reason() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 0}}]"#).unwrap();

        let err = RecordStore::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
