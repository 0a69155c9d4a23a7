//! Tab-scoped session state and the bounded debug log.
//!
//! All storage access goes through [`TabStore`] so key namespacing and the
//! debug-ring cap stay in one place. The backend is ephemeral by contract:
//! state for a tab is dropped when the host reports the tab closed.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::types::{DebugEntry, DebugLevel, TabId, TabState};

const TAB_KEY_PREFIX: &str = "tab:";
const DEBUG_KEY_PREFIX: &str = "debug:";
const DEBUG_LIMIT: usize = 50;

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ephemeral key-value backend the host environment provides.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value);
    async fn remove(&self, key: &str);
}

/// In-memory [`SessionStorage`] implementation.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: Value) {
        self.entries.lock().await.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

/// Bucket a debug entry belongs to: a tab, or the shared global bucket for
/// events that arrive without a tab context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugScope {
    Tab(TabId),
    Global,
}

impl DebugScope {
    fn key(&self) -> String {
        match self {
            DebugScope::Tab(tab_id) => format!("{DEBUG_KEY_PREFIX}{tab_id}"),
            DebugScope::Global => format!("{DEBUG_KEY_PREFIX}global"),
        }
    }
}

fn tab_key(tab_id: TabId) -> String {
    format!("{TAB_KEY_PREFIX}{tab_id}")
}

/// Per-tab state store plus the capped debug log.
pub struct TabStore {
    storage: Arc<dyn SessionStorage>,
    tab_locks: Mutex<HashMap<TabId, Arc<Mutex<()>>>>,
}

impl TabStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            tab_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Lock guarding read-modify-write sequences against one tab's state.
    /// Two capture paths can report the same tab concurrently; holding this
    /// lock across get/set keeps the update atomic per tab.
    pub async fn tab_lock(&self, tab_id: TabId) -> Arc<Mutex<()>> {
        let mut locks = self.tab_locks.lock().await;
        locks
            .entry(tab_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn get_state(&self, tab_id: TabId) -> Option<TabState> {
        let value = self.storage.get(&tab_key(tab_id)).await?;
        serde_json::from_value(value).ok()
    }

    pub async fn set_state(&self, tab_id: TabId, state: &TabState) {
        if let Ok(value) = serde_json::to_value(state) {
            self.storage.set(&tab_key(tab_id), value).await;
        }
    }

    pub async fn clear_state(&self, tab_id: TabId) {
        self.storage.remove(&tab_key(tab_id)).await;
    }

    /// Append a debug entry, keeping only the most recent `DEBUG_LIMIT`.
    /// Best-effort: serialization failures are dropped, never surfaced.
    pub async fn add_debug(
        &self,
        scope: DebugScope,
        level: DebugLevel,
        message: &str,
        data: Option<Value>,
    ) {
        let key = scope.key();
        let mut entries: Vec<DebugEntry> = match self.storage.get(&key).await {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Vec::new(),
        };
        entries.push(DebugEntry {
            ts_ms: now_ms(),
            level,
            message: message.to_string(),
            data,
        });
        if entries.len() > DEBUG_LIMIT {
            let excess = entries.len() - DEBUG_LIMIT;
            entries.drain(..excess);
        }
        if let Ok(value) = serde_json::to_value(&entries) {
            self.storage.set(&key, value).await;
        }
    }

    pub async fn get_debug(&self, scope: DebugScope) -> Vec<DebugEntry> {
        match self.storage.get(&scope.key()).await {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub async fn clear_debug(&self, scope: DebugScope) {
        self.storage.remove(&scope.key()).await;
    }

    /// Drop everything owned by a closed tab.
    pub async fn remove_tab(&self, tab_id: TabId) {
        self.clear_state(tab_id).await;
        self.clear_debug(DebugScope::Tab(tab_id)).await;
        self.tab_locks.lock().await.remove(&tab_id);
    }
}
