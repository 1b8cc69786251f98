//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: `Clock` を使った ULID 生成

use crate::domain::ids::HistoryId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はプロセス外に出るレコードの ID を生成
///
/// # スレッド安全性
/// - `Send + Sync`: Project の全 App で共有する
pub trait IdGenerator: Send + Sync {
    fn generate_history_id(&self) -> HistoryId;
}

/// UlidGenerator は Clock のタイムスタンプと乱数から ULID を生成
///
/// `FixedClock` を使うとタイムスタンプ部分は決定的になる。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_history_id(&self) -> HistoryId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        HistoryId::from(ulid)
    }
}
