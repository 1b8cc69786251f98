//! ドメインモデル（ID、ロール、設定、Context、エラー）

pub mod capability;
pub mod config;
pub mod config_var;
pub mod context;
pub mod diagnostics;
pub mod errors;
pub mod ids;
pub mod role;
pub mod source;

pub use self::capability::Capability;
pub use self::config::{AppConfig, ComponentConfig, ProjectSettings};
pub use self::config_var::ConfigVar;
pub use self::context::Context;
pub use self::diagnostics::{Diagnostic, Diagnostics};
pub use self::errors::{CoreError, ErrorKind};
pub use self::ids::{ComponentId, HistoryId, Id, IdMarker};
pub use self::role::Role;
pub use self::source::Source;
