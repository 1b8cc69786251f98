//! HistoryStore port - ライフサイクル結果の記録先
//!
//! # 実装
//! - `InMemoryHistoryStore` (impls)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HistoryId, Role};

/// 記録されたライフサイクル結果 1 件（build / push / deploy / release）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub app: String,
    pub role: Role,
    /// 結果を生んだコンポーネントの subtype 名
    pub component: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// HistoryStore はエントリを挿入順に保持する
pub trait HistoryStore: Send + Sync {
    fn append(&self, entry: HistoryEntry);

    /// `app` と `role` のエントリ（古い順）
    fn list(&self, app: &str, role: Role) -> Vec<HistoryEntry>;
}
