use crate::error::{FacetryError, Result};
use crate::types::{Record, RecordId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Immutable record collection for one session.
///
/// Clones share the same records, so a server can hand one loaded catalog to
/// many sessions. Iteration order is the order records were passed to
/// [`RecordStore::load`], which is also the tie-break order for sorting.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: Vec<Record>,
    positions: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Build a store from `records`, rejecting duplicate ids.
    pub fn load(records: Vec<Record>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if positions.insert(record.id.clone(), idx).is_some() {
                return Err(FacetryError::DuplicateRecordId(record.id.clone()));
            }
        }
        tracing::info!(records = records.len(), "[STORE] loaded record store");
        Ok(RecordStore {
            inner: Arc::new(StoreInner { records, positions }),
        })
    }

    /// Load a JSON array of record objects, as written by a catalog export.
    pub fn load_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Self::load(records_from_json(&json)?)
    }

    pub fn all(&self) -> &[Record] {
        &self.inner.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.inner
            .positions
            .get(id)
            .map(|&idx| &self.inner.records[idx])
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }
}

pub fn records_from_json(json: &serde_json::Value) -> Result<Vec<Record>> {
    let items = json.as_array().ok_or_else(|| {
        FacetryError::InvalidDocument("Expected a JSON array of records".to_string())
    })?;
    items.iter().map(Record::from_json).collect()
}
