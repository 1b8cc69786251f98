//! Factory port - subtype 名 → コンポーネントのコンストラクタ
//!
//! コンストラクタは実行時に名前で引くので、設定上の subtype と Rust の型は
//! 静的には結びつかない。返ってきた値の型はマネージャが検査する。

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::Span;

use crate::component::Component;
use crate::domain::{Context, CoreError, Role, Source};
use crate::dynamic::Func;
use crate::ports::ComponentDir;

/// プロセス外プラグインが持つ資源を解放する。実行は高々 1 回
pub type TeardownFn = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// プラグインプロセスに裏打ちされたコンポーネント
///
/// プラグインが提供するコンバータと、プラグインを停止するフックを持つ。
pub struct PluginInstance {
    pub component: Box<dyn Component>,
    pub converters: Vec<Func>,
    pub closer: TeardownFn,
}

impl PluginInstance {
    pub fn new(component: Box<dyn Component>) -> Self {
        Self {
            component,
            converters: Vec::new(),
            closer: Box::new(|| async { Ok(()) }.boxed()),
        }
    }

    pub fn with_converters(mut self, converters: Vec<Func>) -> Self {
        self.converters = converters;
        self
    }

    pub fn on_close<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.closer = Box::new(move || f().boxed());
        self
    }
}

/// コンストラクタの戻り値
///
/// プロセス内のコンストラクタは完成したコンポーネントを返し、
/// プラグインのものは拡張と一緒に返す。
pub enum ConstructorResult {
    Plain(Box<dyn Component>),
    PluginBacked(PluginInstance),
}

impl fmt::Debug for ConstructorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorResult::Plain(c) => f.debug_tuple("Plain").field(&c.type_name()).finish(),
            ConstructorResult::PluginBacked(p) => f
                .debug_struct("PluginBacked")
                .field("component", &p.component.type_name())
                .field("converters", &p.converters.len())
                .finish(),
        }
    }
}

/// ComponentFactory は 1 つの subtype のコンポーネントを構築する
///
/// 構築はプロセス起動やネットワーク I/O を伴いうるので `ctx` を監視すること。
#[async_trait]
pub trait ComponentFactory: Send + Sync {
    async fn construct(
        &self,
        ctx: &Context,
        source: &Source,
        span: &Span,
        dir: &ComponentDir,
    ) -> anyhow::Result<ConstructorResult>;
}

/// 同期クロージャを `ComponentFactory` に適合させる
pub struct FnFactory<F> {
    f: F,
}

impl<F> FnFactory<F>
where
    F: Fn(&Source, &ComponentDir) -> anyhow::Result<ConstructorResult> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ComponentFactory for FnFactory<F>
where
    F: Fn(&Source, &ComponentDir) -> anyhow::Result<ConstructorResult> + Send + Sync,
{
    async fn construct(
        &self,
        _ctx: &Context,
        source: &Source,
        _span: &Span,
        dir: &ComponentDir,
    ) -> anyhow::Result<ConstructorResult> {
        (self.f)(source, dir)
    }
}

/// 1 つのロールのファクトリ（subtype 名がキー）
///
/// Project の組み立て中に構築し、以降は読み取り専用。
#[derive(Clone)]
pub struct FactoryRegistry {
    role: Role,
    factories: HashMap<String, Arc<dyn ComponentFactory>>,
}

impl FactoryRegistry {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            factories: HashMap::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn ComponentFactory>,
    ) -> Result<(), CoreError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(CoreError::DuplicateFactory {
                role: self.role,
                name,
            });
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ComponentFactory>> {
        self.factories.get(name).cloned()
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}
