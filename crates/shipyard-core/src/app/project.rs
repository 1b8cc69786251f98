//! Project - ファクトリと共有コラボレータを保持し、App を生成

use std::collections::HashMap;
use std::fmt;

use tokio::sync::Mutex;
use tracing::{Span, info_span, warn};

use super::application::App;
use super::builder::ProjectBuilder;
use super::services::Services;
use super::teardown::{Teardown, TeardownReport};
use crate::domain::{AppConfig, Context, CoreError, Role};
use crate::dynamic::Func;
use crate::ports::FactoryRegistry;

pub struct Project {
    pub(super) factories: HashMap<Role, FactoryRegistry>,
    pub(super) converters: Vec<Func>,
    pub(super) services: Services,
    pub(super) span: Span,
    /// 初期化に失敗した App が残した teardown アクション
    pub(super) orphans: Mutex<Teardown>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("converters", &self.converters.len())
            .finish_non_exhaustive()
    }
}

impl Project {
    pub fn builder() -> ProjectBuilder {
        ProjectBuilder::new()
    }

    pub(super) fn new(
        factories: HashMap<Role, FactoryRegistry>,
        converters: Vec<Func>,
        services: Services,
    ) -> Self {
        let orphans = Teardown::new(services.settings.teardown_timeout());
        Self {
            factories,
            converters,
            services,
            span: info_span!("project"),
            orphans: Mutex::new(orphans),
        }
    }

    /// Project レベルのコンバータ。各 App はこのコピーから始まる
    pub fn converters(&self) -> &[Func] {
        &self.converters
    }

    pub fn factories(&self, role: Role) -> Option<&FactoryRegistry> {
        self.factories.get(&role)
    }

    /// App を生成し、設定されたロールをロール順に初期化
    ///
    /// 最初のエラーで初期化を打ち切る。失敗した App が登録済みのプラグイン資源は
    /// Project が引き取り、`close` で解放する。
    /// 同じ Project から複数の App を並行して初期化してよい。
    pub async fn app(&self, ctx: &Context, config: &AppConfig) -> Result<App, CoreError> {
        let dir = self.services.directories.app(&config.name).await?;
        let mut app = App::new(
            &config.name,
            dir,
            self.converters.clone(),
            self.services.clone(),
        );

        for role in Role::ALL {
            let empty;
            let factories = match self.factories.get(&role) {
                Some(f) => f,
                None => {
                    empty = FactoryRegistry::new(role);
                    &empty
                }
            };
            if let Err(e) = app
                .init_component(ctx, role, factories, config.component(role))
                .await
            {
                warn!(
                    parent: &self.span,
                    app = %config.name,
                    %role,
                    error = %e,
                    "app initialization failed"
                );
                self.orphans.lock().await.absorb(app.take_teardown());
                return Err(e);
            }
        }
        Ok(app)
    }

    /// 失敗した App が残した teardown アクションの数
    pub async fn pending_teardown(&self) -> usize {
        self.orphans.lock().await.len()
    }

    /// 初期化に失敗した App の資源を解放
    ///
    /// `app` が返した App は所有者が `App::close` で閉じる。
    pub async fn close(&self) -> TeardownReport {
        self.orphans.lock().await.run(&self.span).await
    }
}
