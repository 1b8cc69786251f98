//! DirectoryProvider port - App ごと・コンポーネントごとに分離された保存領域
//!
//! # 実装
//! - `FsDirectoryProvider` (impls): `<root>/app/<app>/<role>/<subtype>`

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{CoreError, Role};

/// 1 つのアプリケーションの保存領域のルート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDir {
    path: PathBuf,
}

impl AppDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// コンポーネントインスタンス 1 つ分の保存領域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDir {
    path: PathBuf,
    role: Role,
    subtype: String,
}

impl ComponentDir {
    pub fn new(path: impl Into<PathBuf>, role: Role, subtype: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role,
            subtype: subtype.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }
}

/// DirectoryProvider は保存領域を払い出す
///
/// どちらの呼び出しもストレージ I/O を伴いうる。
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn app(&self, app: &str) -> Result<AppDir, CoreError>;

    async fn component(
        &self,
        app: &AppDir,
        role: Role,
        subtype: &str,
    ) -> Result<ComponentDir, CoreError>;
}
