//! Context - ブロックしうる呼び出しに運ばれるキャンセルと期限
//!
//! コンストラクタと動的呼び出しは呼び出し側の `Context` を監視する。
//! コア自身がタイマーを起動するのは teardown のタイムアウトだけ。
//!
//! # 学習ポイント
//! - `CancellationToken`（tokio-util）による協調的キャンセル
//! - `tokio::select!` でキャンセルと本処理を競争させる

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Context はキャンセルトークンと任意の期限の組
///
/// clone は軽く、clone 同士は同じトークンを共有する。
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// `cancel()` を呼ばない限りキャンセルされない Context
    pub fn background() -> Self {
        Self::default()
    }

    /// 親のキャンセルに連動し、さらに `timeout` 後に期限切れになる子を作る
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: self.token.child_token(),
            deadline: Some(match self.deadline {
                Some(parent) if parent < deadline => parent,
                _ => deadline,
            }),
        }
    }

    /// 親とは独立してキャンセルできる子を作る
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// キャンセルされるか期限を過ぎると完了する
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}
