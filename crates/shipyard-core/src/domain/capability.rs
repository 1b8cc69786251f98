use serde::{Deserialize, Serialize};
use std::fmt;

/// platform が任意でサポートする拡張機能
///
/// 集合は閉じている。サポートの有無は `Component::supports` で確認し、
/// 任意のトレイトを探ることはしない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// デプロイ済みアプリケーションに対してコマンドを実行
    Exec,
    /// 名前付きの設定変数の読み書き
    Config,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Exec => f.write_str("exec"),
            Capability::Config => f.write_str("config"),
        }
    }
}
