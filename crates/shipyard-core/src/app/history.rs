//! HistoryClient - App 内から見たライフサイクル履歴
//!
//! 動的呼び出しのたびに渡され、操作が過去の build や deploy を参照できる。
//! App のコンバータプールを保持するので、この App 用に登録されたプラグインの
//! コンバータを履歴のペイロードにも使える。

use std::sync::Arc;

use crate::domain::Role;
use crate::dynamic::Func;
use crate::ports::{Clock, HistoryEntry, HistoryStore, IdGenerator};

#[derive(Clone)]
pub struct HistoryClient {
    app: String,
    store: Arc<dyn HistoryStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    converters: Vec<Func>,
}

impl HistoryClient {
    pub fn new(
        app: impl Into<String>,
        store: Arc<dyn HistoryStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        converters: Vec<Func>,
    ) -> Self {
        Self {
            app: app.into(),
            store,
            ids,
            clock,
            converters,
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// 紐づく App のコンバータ（プール順）
    pub fn converters(&self) -> &[Func] {
        &self.converters
    }

    pub fn record(
        &self,
        role: Role,
        component: impl Into<String>,
        payload: serde_json::Value,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.ids.generate_history_id(),
            app: self.app.clone(),
            role,
            component: component.into(),
            recorded_at: self.clock.now(),
            payload,
        };
        self.store.append(entry.clone());
        entry
    }

    /// `role` のエントリ（古い順）
    pub fn list(&self, role: Role) -> Vec<HistoryEntry> {
        self.store.list(&self.app, role)
    }

    pub fn latest(&self, role: Role) -> Option<HistoryEntry> {
        self.list(role).pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryHistoryStore;
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn client(app: &str, store: Arc<InMemoryHistoryStore>) -> HistoryClient {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
        HistoryClient::new(
            app,
            store,
            Arc::new(UlidGenerator::new(Arc::clone(&clock))),
            clock,
            Vec::new(),
        )
    }

    #[test]
    fn record_then_latest() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let c = client("web", Arc::clone(&store));

        c.record(Role::Platform, "docker", json!({"id": "d1"}));
        let second = c.record(Role::Platform, "docker", json!({"id": "d2"}));

        let latest = c.latest(Role::Platform).unwrap();
        assert_eq!(latest, second);
        assert_eq!(latest.payload["id"], "d2");
        assert_eq!(latest.recorded_at, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        assert_eq!(c.list(Role::Platform).len(), 2);
        assert!(c.latest(Role::Builder).is_none());
    }

    #[test]
    fn apps_do_not_see_each_other() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let web = client("web", Arc::clone(&store));
        let api = client("api", Arc::clone(&store));

        web.record(Role::Builder, "pack", json!(null));
        assert!(api.list(Role::Builder).is_empty());
        assert_eq!(store.len(), 1);
    }
}
