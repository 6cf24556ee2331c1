use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::parser::command::TransactionMode;

/// Storage collaborator holding schema records and the schema version.
///
/// Records are opaque bytes keyed by the case-folded object name. Writes are
/// only allowed inside a write transaction and become visible to other
/// readers at `commit`.
pub trait SchemaStore: std::fmt::Debug {
    fn begin(&mut self, mode: TransactionMode) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    fn in_transaction(&self) -> bool;

    /// Reads a record, including the current transaction's own writes.
    fn read_record(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn write_record(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn delete_record(&mut self, name: &str) -> Result<(), StoreError>;

    /// Keys of all visible records, sorted.
    fn record_names(&self) -> Result<Vec<String>, StoreError>;

    fn schema_version(&self) -> u64;

    /// Increments the schema version inside the current transaction and
    /// returns the new value.
    fn bump_schema_version(&mut self) -> Result<u64, StoreError>;
}

/// Committed contents shared by the bundled stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StoreState {
    pub records: BTreeMap<String, Vec<u8>>,
    pub schema_version: u64,
}

/// Uncommitted writes of one store transaction.
#[derive(Debug)]
pub(crate) struct PendingTx {
    pub mode: TransactionMode,
    /// `None` marks a deletion.
    pub writes: BTreeMap<String, Option<Vec<u8>>>,
    pub schema_version: Option<u64>,
}

impl PendingTx {
    pub fn new(mode: TransactionMode) -> Self {
        Self {
            mode,
            writes: BTreeMap::new(),
            schema_version: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.schema_version.is_none()
    }

    pub fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.mode.is_write() {
            Ok(())
        } else {
            Err(StoreError::Transaction(
                "cannot write inside a read-only transaction".to_string(),
            ))
        }
    }

    pub fn apply_to(self, state: &mut StoreState) {
        for (key, value) in self.writes {
            match value {
                Some(bytes) => {
                    state.records.insert(key, bytes);
                }
                None => {
                    state.records.remove(&key);
                }
            }
        }
        if let Some(version) = self.schema_version {
            state.schema_version = version;
        }
    }
}

pub(crate) fn require_tx(pending: Option<&mut PendingTx>) -> Result<&mut PendingTx, StoreError> {
    pending.ok_or_else(|| StoreError::Transaction("no active transaction".to_string()))
}

pub(crate) fn read_through(
    state: &StoreState,
    pending: Option<&PendingTx>,
    name: &str,
) -> Option<Vec<u8>> {
    if let Some(write) = pending.and_then(|p| p.writes.get(name)) {
        return write.clone();
    }
    state.records.get(name).cloned()
}

pub(crate) fn visible_names(state: &StoreState, pending: Option<&PendingTx>) -> Vec<String> {
    let mut names: BTreeMap<&str, bool> = state
        .records
        .keys()
        .map(|k| (k.as_str(), true))
        .collect();
    if let Some(pending) = pending {
        for (key, value) in &pending.writes {
            names.insert(key.as_str(), value.is_some());
        }
    }
    names
        .into_iter()
        .filter(|(_, present)| *present)
        .map(|(k, _)| k.to_string())
        .collect()
}

pub(crate) fn visible_version(state: &StoreState, pending: Option<&PendingTx>) -> u64 {
    pending
        .and_then(|p| p.schema_version)
        .unwrap_or(state.schema_version)
}
