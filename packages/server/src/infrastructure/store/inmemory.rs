//! In-memory StateStore implementation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{StateStore, StateTable, StoreError};

/// StateStore backed by a `HashMap` per table.
#[derive(Default)]
pub struct InMemoryStateStore {
    tables: Mutex<HashMap<StateTable, BTreeMap<String, String>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, table: StateTable, key: &str) -> Result<Option<String>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.get(&table).and_then(|rows| rows.get(key)).cloned())
    }

    async fn set(&self, table: StateTable, key: &str, value: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .entry(table)
            .or_default()
            .insert(key.to_string(), value.to_string());
        tracing::trace!("{}[{}] = {}", table, key, value);
        Ok(())
    }

    async fn snapshot(&self, table: StateTable) -> Result<BTreeMap<String, String>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.get(&table).cloned().unwrap_or_default())
    }
}
