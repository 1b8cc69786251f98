//! Teardown - プラグイン資源の順序付き後始末
//!
//! # 方針
//! - アクションは登録順に、それぞれ高々 1 回実行
//! - 各アクションはタイムアウトで打ち切り、タイムアウトは失敗として数える
//! - 失敗はログに残して集計し、残りのアクションは止めない

use std::time::Duration;

use tracing::{Span, warn};

use crate::ports::TeardownFn;

/// teardown 1 回分の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// 開始したアクション数
    pub ran: usize,
    /// 失敗またはタイムアウトしたアクションごとのメッセージ（実行順）
    pub failures: Vec<String>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Teardown {
    actions: Vec<TeardownFn>,
    timeout: Duration,
}

impl Teardown {
    pub fn new(timeout: Duration) -> Self {
        Self {
            actions: Vec::new(),
            timeout,
        }
    }

    pub fn push(&mut self, action: TeardownFn) {
        self.actions.push(action);
    }

    /// `other` の未実行アクションをすべて末尾に移す
    pub fn absorb(&mut self, mut other: Teardown) {
        self.actions.append(&mut other.actions);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 未実行のアクションをすべて実行して破棄
    ///
    /// 再度呼ぶと、前回以降に登録されたアクションだけが実行される。
    pub async fn run(&mut self, span: &Span) -> TeardownReport {
        let mut report = TeardownReport::default();
        for (index, action) in std::mem::take(&mut self.actions).into_iter().enumerate() {
            report.ran += 1;
            match tokio::time::timeout(self.timeout, action()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(parent: span, index, error = %e, "teardown action failed");
                    report.failures.push(e.to_string());
                }
                Err(_) => {
                    let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                    warn!(parent: span, index, timeout_ms, "teardown action timed out");
                    report.failures.push(format!(
                        "teardown action {index} timed out after {:?}",
                        self.timeout
                    ));
                }
            }
        }
        report
    }
}
