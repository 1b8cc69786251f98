//! InMemoryHistoryStore - 開発用の履歴ストア
//!
//! # 学習ポイント
//! - Mutex による排他制御
//! - await をまたいでロックを保持しない

use std::sync::{Mutex, PoisonError};

use crate::domain::Role;
use crate::ports::{HistoryEntry, HistoryStore};

/// 全エントリを `Mutex` 越しの `Vec` に保持する
#[derive(Default)]
pub struct InMemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, entry: HistoryEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn list(&self, app: &str, role: Role) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.app == app && e.role == role)
            .cloned()
            .collect()
    }
}
