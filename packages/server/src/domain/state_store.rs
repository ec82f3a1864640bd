//! Shared State Table
//!
//! A durable key/value store shared between the command channel's handlers
//! and the game logic. It holds two logical tables, each key has at most one
//! current value and the last writer wins. There are no multi-key
//! transactions.

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;

use super::StoreError;

/// Key of the spin-permission flag in [`StateTable::State`].
pub const ACTIVE_BUTTON_KEY: &str = "active_button";
/// Key of the game phase label in [`StateTable::GameState`].
pub const GAME_PHASE_KEY: &str = "state";

const TRUE_TEXT: &str = "True";
const FALSE_TEXT: &str = "False";

/// The logical tables of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateTable {
    /// Transient flags such as the spin button
    State,
    /// Game progress such as the current phase
    GameState,
}

impl StateTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateTable::State => "state",
            StateTable::GameState => "game_state",
        }
    }
}

impl fmt::Display for StateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value store interface.
///
/// Every operation is a single independent read or write, so implementations
/// only need to serialize individual calls.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Current value of `key`, or `None` if it was never written.
    async fn get(&self, table: StateTable, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace the value of `key`.
    async fn set(&self, table: StateTable, key: &str, value: &str) -> Result<(), StoreError>;

    /// Copy of every entry in `table`, ordered by key.
    async fn snapshot(&self, table: StateTable) -> Result<BTreeMap<String, String>, StoreError>;
}

/// Phase label of the slot machine game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePhase {
    /// Reels are spinning (`"PROCESANDO..."`)
    Processing,
    /// Last spin won (`"GANADOR"`)
    Winner,
    /// Last spin lost (`"PERDEDOR"`)
    Loser,
    /// Any other label written by the game logic
    Other(String),
}

impl GamePhase {
    pub fn from_label(label: &str) -> Self {
        match label {
            "PROCESANDO..." => GamePhase::Processing,
            "GANADOR" => GamePhase::Winner,
            "PERDEDOR" => GamePhase::Loser,
            other => GamePhase::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GamePhase::Processing => "PROCESANDO...",
            GamePhase::Winner => "GANADOR",
            GamePhase::Loser => "PERDEDOR",
            GamePhase::Other(label) => label,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed access to the well-known keys of the store.
#[derive(Clone)]
pub struct SharedState {
    store: Arc<dyn StateStore>,
}

impl SharedState {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Underlying store, for keys without a typed accessor.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Whether a spin is currently permitted.
    ///
    /// Only the exact text `"True"` counts as active; a missing key or any
    /// other text is inactive.
    pub async fn active_button(&self) -> Result<bool, StoreError> {
        let value = self.store.get(StateTable::State, ACTIVE_BUTTON_KEY).await?;
        Ok(value.as_deref() == Some(TRUE_TEXT))
    }

    pub async fn set_active_button(&self, active: bool) -> Result<(), StoreError> {
        let text = if active { TRUE_TEXT } else { FALSE_TEXT };
        self.store
            .set(StateTable::State, ACTIVE_BUTTON_KEY, text)
            .await
    }

    pub async fn game_phase(&self) -> Result<Option<GamePhase>, StoreError> {
        let value = self.store.get(StateTable::GameState, GAME_PHASE_KEY).await?;
        Ok(value.as_deref().map(GamePhase::from_label))
    }

    pub async fn set_game_phase(&self, phase: &GamePhase) -> Result<(), StoreError> {
        self.store
            .set(StateTable::GameState, GAME_PHASE_KEY, phase.label())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::InMemoryStateStore;

    fn create_shared_state() -> SharedState {
        SharedState::new(Arc::new(InMemoryStateStore::new()))
    }

    #[tokio::test]
    async fn test_active_button_defaults_to_inactive() {
        // テスト項目: キーが存在しない場合はボタン無効として扱う
        // given (前提条件):
        let shared = create_shared_state();

        // when (操作):
        let active = shared.active_button().await.unwrap();

        // then (期待する結果):
        assert!(!active);
    }

    #[tokio::test]
    async fn test_active_button_uses_text_flag() {
        // テスト項目: ボタン状態は "True"/"False" のテキストで保存される
        // given (前提条件):
        let shared = create_shared_state();

        // when (操作):
        shared.set_active_button(true).await.unwrap();

        // then (期待する結果):
        assert!(shared.active_button().await.unwrap());
        let raw = shared
            .store()
            .get(StateTable::State, ACTIVE_BUTTON_KEY)
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some("True"));

        shared.set_active_button(false).await.unwrap();
        let raw = shared
            .store()
            .get(StateTable::State, ACTIVE_BUTTON_KEY)
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some("False"));
    }

    #[tokio::test]
    async fn test_active_button_rejects_other_spellings() {
        // テスト項目: "True" 以外のテキストは無効として扱う
        // given (前提条件):
        let shared = create_shared_state();
        shared
            .store()
            .set(StateTable::State, ACTIVE_BUTTON_KEY, "true")
            .await
            .unwrap();

        // when (操作):
        let active = shared.active_button().await.unwrap();

        // then (期待する結果):
        assert!(!active);
    }

    #[tokio::test]
    async fn test_game_phase_labels() {
        // テスト項目: ゲームフェーズがラベル文字列で保存・復元される
        // given (前提条件):
        let shared = create_shared_state();
        assert_eq!(shared.game_phase().await.unwrap(), None);

        // when (操作):
        shared.set_game_phase(&GamePhase::Winner).await.unwrap();

        // then (期待する結果):
        assert_eq!(shared.game_phase().await.unwrap(), Some(GamePhase::Winner));
        let raw = shared
            .store()
            .get(StateTable::GameState, GAME_PHASE_KEY)
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some("GANADOR"));
    }

    #[test]
    fn test_game_phase_keeps_unknown_labels() {
        // テスト項目: 未知のラベルは Other として保持される
        let phase = GamePhase::from_label("ESPERANDO");
        assert_eq!(phase, GamePhase::Other("ESPERANDO".to_string()));
        assert_eq!(phase.label(), "ESPERANDO");
        assert_eq!(GamePhase::from_label("PROCESANDO..."), GamePhase::Processing);
        assert_eq!(GamePhase::Loser.to_string(), "PERDEDOR");
    }
}
