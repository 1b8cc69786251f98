//! FsDirectoryProvider - ローカルファイルシステム上のデータディレクトリ
//!
//! レイアウト:
//! ```text
//! <root>/app/<app>/<role>/<subtype>
//! ```
//!
//! App 名と subtype はどちらも単一のパス要素でなければならない。

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{CoreError, Role};
use crate::ports::{AppDir, ComponentDir, DirectoryProvider};

pub struct FsDirectoryProvider {
    root: PathBuf,
}

impl FsDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

async fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| CoreError::Directory {
            path: path.to_path_buf(),
            source,
        })
}

fn segment<'a>(what: &str, name: &'a str) -> Result<&'a str, CoreError> {
    let mut parts = Path::new(name).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(name),
        _ => Err(CoreError::InvalidAppConfig(format!(
            "{what} {name:?} is not a single path segment"
        ))),
    }
}

#[async_trait]
impl DirectoryProvider for FsDirectoryProvider {
    async fn app(&self, app: &str) -> Result<AppDir, CoreError> {
        let path = self.root.join("app").join(segment("app name", app)?);
        ensure_dir(&path).await?;
        Ok(AppDir::new(path))
    }

    async fn component(
        &self,
        app: &AppDir,
        role: Role,
        subtype: &str,
    ) -> Result<ComponentDir, CoreError> {
        let path = app.path().join(role.as_str()).join(segment("subtype", subtype)?);
        ensure_dir(&path).await?;
        Ok(ComponentDir::new(path, role, subtype))
    }
}
