//! JSON file StateStore implementation.
//!
//! The whole document is loaded once when the store is opened and kept in
//! memory. Every `set` writes the full document to a sibling temporary file
//! and renames it over the original, so a crash mid-write leaves the previous
//! document intact.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{StateStore, StateTable, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    state: BTreeMap<String, String>,
    #[serde(default)]
    game_state: BTreeMap<String, String>,
}

impl StateDocument {
    fn table(&self, table: StateTable) -> &BTreeMap<String, String> {
        match table {
            StateTable::State => &self.state,
            StateTable::GameState => &self.game_state,
        }
    }

    fn table_mut(&mut self, table: StateTable) -> &mut BTreeMap<String, String> {
        match table {
            StateTable::State => &mut self.state,
            StateTable::GameState => &mut self.game_state,
        }
    }
}

/// Durable StateStore backed by one JSON file.
pub struct JsonFileStateStore {
    path: PathBuf,
    document: Mutex<StateDocument>,
}

impl JsonFileStateStore {
    /// Open the store at `path`, creating the file (and its parent
    /// directory) with empty tables if it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| io_error(parent, source))?;
                }
                let document = StateDocument::default();
                persist(&path, &document).await?;
                tracing::info!("Created state store at {}", path.display());
                document
            }
            Err(source) => return Err(io_error(&path, source)),
        };

        tracing::debug!(
            "Opened state store {} ({} state keys, {} game_state keys)",
            path.display(),
            document.state.len(),
            document.game_state.len()
        );

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, table: StateTable, key: &str) -> Result<Option<String>, StoreError> {
        let document = self.document.lock().await;
        Ok(document.table(table).get(key).cloned())
    }

    async fn set(&self, table: StateTable, key: &str, value: &str) -> Result<(), StoreError> {
        let mut document = self.document.lock().await;

        // Commit to memory only once the file is written.
        let mut updated = document.clone();
        updated
            .table_mut(table)
            .insert(key.to_string(), value.to_string());
        persist(&self.path, &updated).await?;
        *document = updated;

        tracing::trace!("{}[{}] = {}", table, key, value);
        Ok(())
    }

    async fn snapshot(&self, table: StateTable) -> Result<BTreeMap<String, String>, StoreError> {
        let document = self.document.lock().await;
        Ok(document.table(table).clone())
    }
}

async fn persist(path: &Path, document: &StateDocument) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(document)?;

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(|source| io_error(&tmp, source))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory removed when dropped, even if the test panics.
    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("kiosk-store-{}", uuid::Uuid::new_v4())))
        }

        fn path(&self, name: &str) -> PathBuf {
            self.0.join(name)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn test_temp_dir_is_removed_after_use() {
        // テスト項目: テスト用の一時ディレクトリは使用後に削除される
        // given (前提条件):
        let dir = TempDir::new();
        let path = dir.path("shared_data.json");
        JsonFileStateStore::open(&path).await.unwrap();
        assert!(path.exists());

        // when (操作):
        let root = dir.0.clone();
        drop(dir);

        // then (期待する結果):
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_open_creates_missing_file() {
        // テスト項目: ファイルが存在しない場合は空のテーブルで作成される
        // given (前提条件):
        let dir = TempDir::new();
        let path = dir.path("shared_data.json");

        // when (操作):
        let store = JsonFileStateStore::open(&path).await.unwrap();

        // then (期待する結果):
        assert!(path.exists());
        assert!(store.snapshot(StateTable::State).await.unwrap().is_empty());
        assert!(store.snapshot(StateTable::GameState).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        // テスト項目: 書き込んだ値は再オープン後も残っている（永続化）
        // given (前提条件):
        let dir = TempDir::new();
        let path = dir.path("shared_data.json");
        let store = JsonFileStateStore::open(&path).await.unwrap();
        store.set(StateTable::State, "active_button", "True").await.unwrap();
        store.set(StateTable::GameState, "state", "PERDEDOR").await.unwrap();
        drop(store);

        // when (操作):
        let reopened = JsonFileStateStore::open(&path).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            reopened.get(StateTable::State, "active_button").await.unwrap().as_deref(),
            Some("True")
        );
        assert_eq!(
            reopened.get(StateTable::GameState, "state").await.unwrap().as_deref(),
            Some("PERDEDOR")
        );
    }

    #[tokio::test]
    async fn test_open_accepts_document_with_missing_table() {
        // テスト項目: 片方のテーブルしか持たないドキュメントも読み込める
        // given (前提条件):
        let dir = TempDir::new();
        let path = dir.path("partial.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, r#"{"state":{"active_button":"False"}}"#)
            .await
            .unwrap();

        // when (操作):
        let store = JsonFileStateStore::open(&path).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            store.get(StateTable::State, "active_button").await.unwrap().as_deref(),
            Some("False")
        );
        assert!(store.snapshot(StateTable::GameState).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_document() {
        // テスト項目: 壊れた JSON はシリアライズエラーになる
        // given (前提条件):
        let dir = TempDir::new();
        let path = dir.path("corrupt.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "not json").await.unwrap();

        // when (操作):
        let result = JsonFileStateStore::open(&path).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
