use crate::error::StoreError;
use crate::parser::command::TransactionMode;
use crate::storage::engine::{
    read_through, require_tx, visible_names, visible_version, PendingTx, SchemaStore, StoreState,
};

/// In-memory schema store; contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemStore {
    state: StoreState,
    pending: Option<PendingTx>,
}

impl MemStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for MemStore {
    fn begin(&mut self, mode: TransactionMode) -> Result<(), StoreError> {
        if self.pending.is_some() {
            return Err(StoreError::Transaction(
                "transaction already active".to_string(),
            ));
        }
        self.pending = Some(PendingTx::new(mode));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| StoreError::Transaction("no active transaction".to_string()))?;
        pending.apply_to(&mut self.state);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.pending = None;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn read_record(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(read_through(&self.state, self.pending.as_ref(), name))
    }

    fn write_record(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.writes.insert(name.to_string(), Some(bytes.to_vec()));
        Ok(())
    }

    fn delete_record(&mut self, name: &str) -> Result<(), StoreError> {
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.writes.insert(name.to_string(), None);
        Ok(())
    }

    fn record_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(visible_names(&self.state, self.pending.as_ref()))
    }

    fn schema_version(&self) -> u64 {
        visible_version(&self.state, self.pending.as_ref())
    }

    fn bump_schema_version(&mut self) -> Result<u64, StoreError> {
        let current = self.schema_version();
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.schema_version = Some(current + 1);
        Ok(current + 1)
    }
}
