//! Component - プラグインが実装するトレイト
//!
//! コンストラクタは `Box<dyn Component>` を返す。その値がロールを満たせるか、
//! どの任意機能を持つかは下の `as_*` で問い合わせる。
//! それ以外の実行時の型判定は行わない。
//!
//! # 学習ポイント
//! - トレイトオブジェクトからの機能の問い合わせ（`Option<&dyn Trait>`）
//! - ダウンキャストを使わない能力判定
//!
//! # ロールのトレイト
//! - `Builder::build_func` → `Arc<dyn Artifact>`
//! - `Registry::push_func` → `Arc<dyn Artifact>`
//! - `Platform::deploy_func` → `Arc<dyn Deployment>`
//! - `ReleaseManager::release_func` → `Arc<dyn Release>`
//!
//! # 機能トレイト（platform のみ）
//! - `ExecPlatform::exec_func`
//! - `ConfigPlatform::config_get_func` → `ConfigVar`, `config_set_func`

use std::fmt;

use serde::de::DeserializeOwned;

use crate::domain::{Capability, Diagnostics, Role};
use crate::dynamic::Operation;

pub trait Component: Send + Sync + 'static {
    /// 具象型の名前（型不一致エラーで使う）
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// App 設定の設定本体を適用
    ///
    /// デフォルト実装は本体が無いか空の場合のみ受け付ける。
    fn configure(&mut self, body: &serde_json::Value) -> Result<(), Diagnostics> {
        if is_empty_body(body) {
            Ok(())
        } else {
            Err(Diagnostics::error(format!(
                "{} does not accept configuration",
                self.type_name()
            )))
        }
    }

    fn as_builder(&self) -> Option<&dyn Builder> {
        None
    }

    fn as_registry(&self) -> Option<&dyn Registry> {
        None
    }

    fn as_platform(&self) -> Option<&dyn Platform> {
        None
    }

    fn as_release_manager(&self) -> Option<&dyn ReleaseManager> {
        None
    }

    fn as_exec(&self) -> Option<&dyn ExecPlatform> {
        None
    }

    fn as_config(&self) -> Option<&dyn ConfigPlatform> {
        None
    }
}

impl dyn Component {
    /// このコンポーネントを `role` のスロットに割り当てられるか
    pub fn fills(&self, role: Role) -> bool {
        match role {
            Role::Builder => self.as_builder().is_some(),
            Role::Registry => self.as_registry().is_some(),
            Role::Platform => self.as_platform().is_some(),
            Role::Releaser => self.as_release_manager().is_some(),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Exec => self.as_exec().is_some(),
            Capability::Config => self.as_config().is_some(),
        }
    }
}

pub trait Builder: Send + Sync {
    fn build_func(&self) -> Operation;
}

pub trait Registry: Send + Sync {
    fn push_func(&self) -> Operation;
}

pub trait Platform: Send + Sync {
    fn deploy_func(&self) -> Operation;
}

pub trait ReleaseManager: Send + Sync {
    fn release_func(&self) -> Operation;
}

pub trait ExecPlatform: Platform {
    fn exec_func(&self) -> Operation;
}

pub trait ConfigPlatform: Platform {
    /// 名前だけが入った `ConfigVar` を受け取り、値を埋めた `ConfigVar` を返す
    fn config_get_func(&self) -> Operation;

    /// 名前と値が入った `ConfigVar` を受け取る
    fn config_set_func(&self) -> Operation;
}

/// build / push の出力
pub trait Artifact: Send + Sync + fmt::Debug {
    fn id(&self) -> String;
}

/// deploy の出力
pub trait Deployment: Send + Sync + fmt::Debug {
    fn id(&self) -> String;
}

/// release の出力
pub trait Release: Send + Sync + fmt::Debug {
    fn url(&self) -> Option<String> {
        None
    }
}

/// 設定本体を `T` にデコード
///
/// 本体が無い（`null`）場合は空オブジェクトとして扱い、`#[serde(default)]` を効かせる。
/// 厳しさは `T` 次第（`#[serde(deny_unknown_fields)]` など）。
pub fn decode_config<T: DeserializeOwned>(body: &serde_json::Value) -> Result<T, Diagnostics> {
    let body = if body.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        body.clone()
    };
    serde_json::from_value(body).map_err(|e| {
        let mut d = Diagnostics::new();
        d.push("invalid configuration", Some(e.to_string()));
        d
    })
}

fn is_empty_body(body: &serde_json::Value) -> bool {
    match body {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
