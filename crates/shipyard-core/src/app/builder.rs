//! ProjectBuilder - ファクトリとコラボレータのワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装（各コラボレータに同梱のデフォルトあり）
//! - 起動時検証（Fail-fast 設計）: 期待する subtype は初回利用時ではなく `build()` で検査

use std::collections::HashMap;
use std::sync::Arc;

use super::project::Project;
use super::services::Services;
use crate::domain::{CoreError, ProjectSettings, Role};
use crate::dynamic::Func;
use crate::impls::{ConsoleUi, FsDirectoryProvider, InMemoryHistoryStore, TypeChainBuilder};
use crate::ports::{
    ChainBuilder, Clock, ComponentFactory, DirectoryProvider, FactoryRegistry, HistoryStore,
    IdGenerator, SystemClock, Ui, UlidGenerator,
};

/// ProjectBuilder は `Project` を構築
///
/// # 使用例
/// ```ignore
/// let project = Project::builder()
///     .factory(Role::Platform, "docker", Arc::new(DockerFactory))?
///     .converter(artifact_to_image)
///     .expect_types(Role::Platform, &["docker"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_types() で呼び出し側が前提とする subtype を登録
/// - build() 時にロールごとに「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば `CoreError::MissingFactories` を返す
pub struct ProjectBuilder {
    factories: HashMap<Role, FactoryRegistry>,
    converters: Vec<Func>,
    expected: Vec<(Role, Vec<String>)>,
    directories: Option<Arc<dyn DirectoryProvider>>,
    chain_builder: Option<Arc<dyn ChainBuilder>>,
    history: Option<Arc<dyn HistoryStore>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    ui: Option<Arc<dyn Ui>>,
    settings: ProjectSettings,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            factories: Role::ALL
                .into_iter()
                .map(|role| (role, FactoryRegistry::new(role)))
                .collect(),
            converters: Vec::new(),
            expected: Vec::new(),
            directories: None,
            chain_builder: None,
            history: None,
            clock: None,
            ids: None,
            ui: None,
            settings: ProjectSettings::default(),
        }
    }

    /// `role` の subtype 1 つ分のコンストラクタを登録
    pub fn factory(
        mut self,
        role: Role,
        name: impl Into<String>,
        factory: Arc<dyn ComponentFactory>,
    ) -> Result<Self, CoreError> {
        self.factories
            .entry(role)
            .or_insert_with(|| FactoryRegistry::new(role))
            .register(name, factory)?;
        Ok(self)
    }

    /// Project レベルのコンバータを追加
    pub fn converter(mut self, converter: Func) -> Self {
        self.converters.push(converter);
        self
    }

    /// `build()` 時点で `role` に登録済みであるべき subtype
    pub fn expect_types(mut self, role: Role, names: &[&str]) -> Self {
        self.expected
            .push((role, names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn directories(mut self, directories: Arc<dyn DirectoryProvider>) -> Self {
        self.directories = Some(directories);
        self
    }

    pub fn chain_builder(mut self, chain_builder: Arc<dyn ChainBuilder>) -> Self {
        self.chain_builder = Some(chain_builder);
        self
    }

    pub fn history_store(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn settings(mut self, settings: ProjectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Project を構築
    ///
    /// # デフォルト
    /// - directories: `settings.data_dir` をルートとする `FsDirectoryProvider`
    /// - chain builder: `TypeChainBuilder`
    /// - history: `InMemoryHistoryStore`
    /// - clock / ids: `SystemClock` / `UlidGenerator`
    /// - ui: `ConsoleUi`
    pub fn build(self) -> Result<Project, CoreError> {
        for (role, names) in &self.expected {
            let registered = self
                .factories
                .get(role)
                .map(FactoryRegistry::registered_types)
                .unwrap_or_default();
            let missing: Vec<String> = names
                .iter()
                .filter(|n| !registered.contains(*n))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(CoreError::MissingFactories {
                    role: *role,
                    names: missing,
                });
            }
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let directories = self
            .directories
            .unwrap_or_else(|| Arc::new(FsDirectoryProvider::new(self.settings.data_dir.clone())));

        let services = Services {
            directories,
            chain_builder: self
                .chain_builder
                .unwrap_or_else(|| Arc::new(TypeChainBuilder::new())),
            history: self
                .history
                .unwrap_or_else(|| Arc::new(InMemoryHistoryStore::new())),
            ids,
            clock,
            ui: self.ui.unwrap_or_else(|| Arc::new(ConsoleUi)),
            settings: self.settings,
        };
        Ok(Project::new(self.factories, self.converters, services))
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::dynamic::{FuncSpec, Value};
    use crate::ports::{ConstructorResult, FnFactory};
    use tracing::Span;

    struct Nothing;

    impl Component for Nothing {}

    fn nothing() -> Arc<dyn ComponentFactory> {
        Arc::new(FnFactory::new(|_, _| {
            Ok(ConstructorResult::Plain(Box::new(Nothing)))
        }))
    }

    #[test]
    fn test_build_success() {
        let project = ProjectBuilder::new()
            .factory(Role::Platform, "docker", nothing())
            .unwrap()
            .expect_types(Role::Platform, &["docker"])
            .build();
        assert!(project.is_ok());
    }

    #[test]
    fn test_build_missing_types() {
        let project = ProjectBuilder::new()
            .factory(Role::Platform, "docker", nothing())
            .unwrap()
            .expect_types(Role::Platform, &["docker", "nomad"])
            .build();
        assert!(matches!(
            project,
            Err(CoreError::MissingFactories { role: Role::Platform, names })
                if names == vec!["nomad".to_string()]
        ));
    }

    #[test]
    fn test_build_no_expect_types() {
        let project = ProjectBuilder::new()
            .factory(Role::Builder, "pack", nothing())
            .unwrap()
            .build();
        assert!(project.is_ok());
    }

    #[test]
    fn test_duplicate_factory() {
        let result = ProjectBuilder::new()
            .factory(Role::Builder, "pack", nothing())
            .unwrap()
            .factory(Role::Builder, "pack", nothing());
        assert!(matches!(result, Err(CoreError::DuplicateFactory { .. })));
    }

    #[test]
    fn converters_keep_registration_order() {
        let conv = |name: &str| {
            FuncSpec::new(name)
                .output::<u8>()
                .handler(|_| async { Ok(Value::new(0u8)) })
                .build(Span::none())
                .unwrap()
        };
        let project = ProjectBuilder::new()
            .converter(conv("a"))
            .converter(conv("b"))
            .build()
            .unwrap();
        let names: Vec<&str> = project.converters().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(project.factories(Role::Releaser).is_some());
    }
}
