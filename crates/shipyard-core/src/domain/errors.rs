//! Errors - エラー型と分類
//!
//! コアはエラーを握りつぶさない。ロール名や型名を付け加えるか、元のエラーを
//! そのまま通す。失敗をログに残して処理を続けるのは teardown だけ。

use std::path::PathBuf;

use thiserror::Error;

use super::capability::Capability;
use super::diagnostics::Diagnostics;
use super::ids::ComponentId;
use super::role::Role;

/// ErrorKind は `CoreError` の分類（呼び出し側の方針分岐用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 未知の subtype、不正な設定本体や App 設定
    Configuration,
    /// コンポーネントまたは結果の型が違う
    TypeMismatch,
    /// 機能が無い、またはロールが未設定
    Unsupported,
    /// 操作のチェーンを構築できない
    Resolution,
    /// 操作またはコンバータが失敗
    Execution,
    /// ディレクトリ確保またはプラグイン構築の失敗
    Resource,
    /// 呼び出し側の Context がキャンセルされたか期限切れ
    Cancelled,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown type: {name:?} (role {role})")]
    UnknownType { role: Role, name: String },

    #[error("duplicate factory for type {name:?} (role {role})")]
    DuplicateFactory { role: Role, name: String },

    #[error("missing types for {role}: {names:?}. These types were expected but not registered.")]
    MissingFactories { role: Role, names: Vec<String> },

    #[error("invalid app config: {0}")]
    InvalidAppConfig(String),

    #[error("configuring {role} {name:?}: {diagnostics}")]
    Configure {
        role: Role,
        name: String,
        diagnostics: Diagnostics,
    },

    #[error("component {actual} not assignable to type {expected} (role {role})")]
    ComponentTypeMismatch {
        role: Role,
        expected: &'static str,
        actual: String,
    },

    #[error("operation expected result type {expected}, got {actual}")]
    ResultTypeMismatch { expected: String, actual: String },

    #[error("this {role} does not support {capability}")]
    Unsupported { role: Role, capability: Capability },

    #[error("no {0} configured for this app")]
    RoleNotConfigured(Role),

    #[error("component dir not found for: {0}")]
    NoDirectory(ComponentId),

    #[error("malformed operation: {0}")]
    InvalidFunc(String),

    #[error("cannot resolve argument of type {type_name} for {func}")]
    Resolve { func: String, type_name: String },

    #[error("argument of type {type_name} not provided to {func}")]
    MissingArgument { func: String, type_name: String },

    #[error(transparent)]
    Execution(#[from] anyhow::Error),

    #[error("creating directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("constructing {role} {name:?}: {source}")]
    Construct {
        role: Role,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("context cancelled")]
    Cancelled,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::UnknownType { .. }
            | CoreError::DuplicateFactory { .. }
            | CoreError::MissingFactories { .. }
            | CoreError::InvalidAppConfig(_)
            | CoreError::Configure { .. } => ErrorKind::Configuration,
            CoreError::ComponentTypeMismatch { .. } | CoreError::ResultTypeMismatch { .. } => {
                ErrorKind::TypeMismatch
            }
            CoreError::Unsupported { .. } | CoreError::RoleNotConfigured(_) => {
                ErrorKind::Unsupported
            }
            CoreError::NoDirectory(_)
            | CoreError::InvalidFunc(_)
            | CoreError::Resolve { .. }
            | CoreError::MissingArgument { .. } => ErrorKind::Resolution,
            CoreError::Execution(_) => ErrorKind::Execution,
            CoreError::Directory { .. } | CoreError::Construct { .. } => ErrorKind::Resource,
            CoreError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
