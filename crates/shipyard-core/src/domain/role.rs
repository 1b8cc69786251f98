//! Role - アプリケーションの差し替え可能な 4 つの責務

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role はコンポーネントが埋めるライフサイクルのスロットを表す
///
/// シリアライズと表示は小文字（`builder`, `registry`, `platform`, `releaser`）。
/// 同じ文字列をデータディレクトリ名とログ span 名にも使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Builder,
    Registry,
    Platform,
    Releaser,
}

impl Role {
    /// 初期化順に並べた全ロール
    pub const ALL: [Role; 4] = [Role::Builder, Role::Registry, Role::Platform, Role::Releaser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Builder => "builder",
            Role::Registry => "registry",
            Role::Platform => "platform",
            Role::Releaser => "releaser",
        }
    }

    /// このロールを満たすためにコンポーネントが実装すべきトレイト名
    pub fn trait_name(&self) -> &'static str {
        match self {
            Role::Builder => "dyn Builder",
            Role::Registry => "dyn Registry",
            Role::Platform => "dyn Platform",
            Role::Releaser => "dyn ReleaseManager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
