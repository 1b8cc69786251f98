//! App - 1 つのアプリケーションと、それに対して実行できる操作
//!
//! App が有効なのは `Project::app` が返したものだけ。
//! 設定された各ロールのコンポーネント初期化を通るのはこの経路に限られる。
//!
//! # 可変性
//! - `&mut self`: コンポーネント初期化、`close`
//! - `&self`: ディスパッチとファサード操作
//!
//! 初期化と並行するディスパッチはコンパイル時に弾かれ、
//! `close` が実行中のディスパッチと重なることもない。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tracing::{Span, info_span};

use super::history::HistoryClient;
use super::services::Services;
use super::teardown::{Teardown, TeardownReport};
use crate::component::{
    Artifact, Builder, Component, ConfigPlatform, Deployment, ExecPlatform, Platform, Registry,
    Release, ReleaseManager,
};
use crate::domain::{Capability, ComponentId, ConfigVar, Context, CoreError, Role, Source};
use crate::dynamic::{Func, Value};
use crate::ports::{AppDir, ComponentDir, Ui};

/// 初期化を通過し、ロールを満たすコンポーネント
pub(super) struct Published {
    pub(super) id: ComponentId,
    pub(super) component: Box<dyn Component>,
}

/// 公開済みコンポーネントのメタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMeta {
    pub role: Role,
    /// App 設定上の subtype 名（例: `"docker"`）
    pub subtype: String,
}

pub struct App {
    pub(super) name: String,
    pub(super) source: Source,
    pub(super) span: Span,
    pub(super) dir: AppDir,
    pub(super) ui: Arc<dyn Ui>,
    pub(super) services: Services,

    pub(super) builder: Option<Published>,
    pub(super) registry: Option<Published>,
    pub(super) platform: Option<Published>,
    pub(super) releaser: Option<Published>,

    /// Project のコンバータが先、続いてプラグインのコンバータ（初期化順）
    pub(super) converters: Vec<Func>,
    pub(super) component_dirs: HashMap<ComponentId, ComponentDir>,
    pub(super) components: HashMap<ComponentId, ComponentMeta>,
    pub(super) teardown: Teardown,
    next_id: u64,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("components", &self.components)
            .field("converters", &self.converters.len())
            .field("pending_teardown", &self.teardown.len())
            .finish()
    }
}

impl App {
    /// コンポーネント未登録の App
    ///
    /// `converters` は値で受け取る。App が自分のプールを所有するので、
    /// 後からの追加が Project 側に届くことはない。
    pub(super) fn new(name: &str, dir: AppDir, converters: Vec<Func>, services: Services) -> Self {
        Self {
            name: name.to_string(),
            source: Source::new(name),
            span: info_span!("app", name = %name),
            dir,
            ui: Arc::clone(&services.ui),
            teardown: Teardown::new(services.settings.teardown_timeout()),
            services,
            builder: None,
            registry: None,
            platform: None,
            releaser: None,
            converters,
            component_dirs: HashMap::new(),
            components: HashMap::new(),
            next_id: 0,
        }
    }

    pub(super) fn allocate_id(&mut self) -> ComponentId {
        self.next_id += 1;
        ComponentId::new(self.next_id)
    }

    pub(super) fn slot_mut(&mut self, role: Role) -> &mut Option<Published> {
        match role {
            Role::Builder => &mut self.builder,
            Role::Registry => &mut self.registry,
            Role::Platform => &mut self.platform,
            Role::Releaser => &mut self.releaser,
        }
    }

    fn slot(&self, role: Role) -> Option<&Published> {
        match role {
            Role::Builder => self.builder.as_ref(),
            Role::Registry => self.registry.as_ref(),
            Role::Platform => self.platform.as_ref(),
            Role::Releaser => self.releaser.as_ref(),
        }
    }

    fn published(&self, role: Role) -> Result<&Published, CoreError> {
        self.slot(role).ok_or(CoreError::RoleNotConfigured(role))
    }

    /// ロールのログ span（App の span の子）
    pub(super) fn role_span(&self, role: Role) -> Span {
        match role {
            Role::Builder => info_span!(parent: &self.span, "builder"),
            Role::Registry => info_span!(parent: &self.span, "registry"),
            Role::Platform => info_span!(parent: &self.span, "platform"),
            Role::Releaser => info_span!(parent: &self.span, "releaser"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn dir(&self) -> &AppDir {
        &self.dir
    }

    pub fn ui(&self) -> &Arc<dyn Ui> {
        &self.ui
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn converters(&self) -> &[Func] {
        &self.converters
    }

    pub fn component(&self, role: Role) -> Option<&dyn Component> {
        self.slot(role).map(|p| p.component.as_ref())
    }

    pub fn component_id(&self, role: Role) -> Option<ComponentId> {
        self.slot(role).map(|p| p.id)
    }

    pub fn platform_id(&self) -> Option<ComponentId> {
        self.component_id(Role::Platform)
    }

    pub fn builder(&self) -> Option<&dyn Builder> {
        self.component(Role::Builder)?.as_builder()
    }

    pub fn registry(&self) -> Option<&dyn Registry> {
        self.component(Role::Registry)?.as_registry()
    }

    pub fn platform(&self) -> Option<&dyn Platform> {
        self.component(Role::Platform)?.as_platform()
    }

    pub fn releaser(&self) -> Option<&dyn ReleaseManager> {
        self.component(Role::Releaser)?.as_release_manager()
    }

    pub fn component_meta(&self, id: ComponentId) -> Option<&ComponentMeta> {
        self.components.get(&id)
    }

    pub fn component_dir(&self, id: ComponentId) -> Option<&ComponentDir> {
        self.component_dirs.get(&id)
    }

    /// 公開済みコンポーネント（id 順）
    pub fn components(&self) -> Vec<(ComponentId, &ComponentMeta)> {
        let mut out: Vec<_> = self.components.iter().map(|(id, m)| (*id, m)).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// 未実行の teardown アクション数
    pub fn pending_teardown(&self) -> usize {
        self.teardown.len()
    }

    /// この App の現在のコンバータプールに紐づく履歴クライアント
    pub fn history(&self) -> HistoryClient {
        HistoryClient::new(
            self.name.clone(),
            Arc::clone(&self.services.history),
            Arc::clone(&self.services.ids),
            Arc::clone(&self.services.clock),
            self.converters.clone(),
        )
    }

    /// platform の exec 操作を実行
    pub async fn exec(&self, ctx: &Context) -> Result<(), CoreError> {
        let (id, exec) = self.exec_platform()?;
        self.dispatch(ctx, None, id, exec.exec_func(), Vec::new())
            .await?;
        Ok(())
    }

    /// platform 経由で設定変数を書き込む
    pub async fn config_set(
        &self,
        ctx: &Context,
        name: &str,
        value: &str,
    ) -> Result<(), CoreError> {
        let (id, config) = self.config_platform()?;
        let var = ConfigVar::new(name, value);
        self.dispatch(ctx, None, id, config.config_set_func(), vec![Value::new(var)])
            .await?;
        Ok(())
    }

    /// platform 経由で設定変数を読み出す
    ///
    /// 操作には名前だけが入った `ConfigVar` が渡され、値を埋めて返す必要がある。
    pub async fn config_get(&self, ctx: &Context, name: &str) -> Result<ConfigVar, CoreError> {
        let (id, config) = self.config_platform()?;
        let var = self
            .dispatch_as::<ConfigVar>(
                ctx,
                id,
                config.config_get_func(),
                vec![Value::new(ConfigVar::named(name))],
            )
            .await?;
        Ok((*var).clone())
    }

    pub async fn build(&self, ctx: &Context) -> Result<Arc<dyn Artifact>, CoreError> {
        let p = self.published(Role::Builder)?;
        let op = p
            .component
            .as_builder()
            .ok_or(CoreError::RoleNotConfigured(Role::Builder))?
            .build_func();
        let artifact = self
            .dispatch_as::<Arc<dyn Artifact>>(ctx, p.id, op, Vec::new())
            .await?;
        let artifact = Arc::clone(&*artifact);
        self.record(Role::Builder, p.id, json!({ "artifact": artifact.id() }));
        Ok(artifact)
    }

    pub async fn push(
        &self,
        ctx: &Context,
        artifact: Arc<dyn Artifact>,
    ) -> Result<Arc<dyn Artifact>, CoreError> {
        let p = self.published(Role::Registry)?;
        let op = p
            .component
            .as_registry()
            .ok_or(CoreError::RoleNotConfigured(Role::Registry))?
            .push_func();
        let pushed = self
            .dispatch_as::<Arc<dyn Artifact>>(ctx, p.id, op, vec![Value::new(artifact)])
            .await?;
        let pushed = Arc::clone(&*pushed);
        self.record(Role::Registry, p.id, json!({ "artifact": pushed.id() }));
        Ok(pushed)
    }

    pub async fn deploy(
        &self,
        ctx: &Context,
        artifact: Arc<dyn Artifact>,
    ) -> Result<Arc<dyn Deployment>, CoreError> {
        let p = self.published(Role::Platform)?;
        let op = p
            .component
            .as_platform()
            .ok_or(CoreError::RoleNotConfigured(Role::Platform))?
            .deploy_func();
        let deployment = self
            .dispatch_as::<Arc<dyn Deployment>>(ctx, p.id, op, vec![Value::new(artifact)])
            .await?;
        let deployment = Arc::clone(&*deployment);
        self.record(Role::Platform, p.id, json!({ "deployment": deployment.id() }));
        Ok(deployment)
    }

    pub async fn release(
        &self,
        ctx: &Context,
        deployment: Arc<dyn Deployment>,
    ) -> Result<Arc<dyn Release>, CoreError> {
        let p = self.published(Role::Releaser)?;
        let op = p
            .component
            .as_release_manager()
            .ok_or(CoreError::RoleNotConfigured(Role::Releaser))?
            .release_func();
        let release = self
            .dispatch_as::<Arc<dyn Release>>(ctx, p.id, op, vec![Value::new(deployment)])
            .await?;
        let release = Arc::clone(&*release);
        self.record(Role::Releaser, p.id, json!({ "url": release.url() }));
        Ok(release)
    }

    /// 登録済みの teardown アクションを登録順に 1 回ずつ実行
    ///
    /// 失敗はログとレポートに残し、エラーとしては返さない。
    /// 2 回目の呼び出しでは実行するものが残っていない。
    pub async fn close(&mut self) -> TeardownReport {
        self.teardown.run(&self.span).await
    }

    /// 未実行の teardown アクションを引き渡す
    ///
    /// 初期化に失敗して App を破棄するときに使う。
    pub(super) fn take_teardown(&mut self) -> Teardown {
        let timeout = self.services.settings.teardown_timeout();
        std::mem::replace(&mut self.teardown, Teardown::new(timeout))
    }

    fn exec_platform(&self) -> Result<(ComponentId, &dyn ExecPlatform), CoreError> {
        let p = self.published(Role::Platform)?;
        let exec = p.component.as_exec().ok_or(CoreError::Unsupported {
            role: Role::Platform,
            capability: Capability::Exec,
        })?;
        Ok((p.id, exec))
    }

    fn config_platform(&self) -> Result<(ComponentId, &dyn ConfigPlatform), CoreError> {
        let p = self.published(Role::Platform)?;
        let config = p.component.as_config().ok_or(CoreError::Unsupported {
            role: Role::Platform,
            capability: Capability::Config,
        })?;
        Ok((p.id, config))
    }

    fn record(&self, role: Role, id: ComponentId, payload: serde_json::Value) {
        let subtype = self
            .components
            .get(&id)
            .map(|m| m.subtype.clone())
            .unwrap_or_default();
        self.history().record(role, subtype, payload);
    }
}
