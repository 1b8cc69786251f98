//! コンポーネントインスタンスマネージャ
//!
//! # 初期化の順序
//! 1. subtype のファクトリを引く
//! 2. コンポーネントディレクトリを確保
//! 3. 構築（呼び出し側の Context と競争）
//! 4. プラグインのコンバータと closer を取り込む
//! 5. 新しい `ComponentId` でディレクトリを記録
//! 6. コンポーネントがロールを満たすか検査
//! 7. 設定本体を適用
//! 8. 公開: ロールのスロットを埋め、メタデータを記録
//!
//! 手順 6 と 7 は資源を確保した後に失敗しうる。ロールのスロットは手順 8 で
//! 初めて書かれるので、失敗したコンポーネントにロール経由で到達することはない。
//! その時点でプラグインの closer は teardown に積まれている。

use tracing::info;

use super::application::{App, ComponentMeta, Published};
use crate::domain::{ComponentConfig, Context, CoreError, Role};
use crate::ports::{ConstructorResult, FactoryRegistry};

impl App {
    /// `role` に設定されたコンポーネントを初期化
    ///
    /// `config` が無ければロールは未設定のままで、他には何もしない。
    pub async fn init_component(
        &mut self,
        ctx: &Context,
        role: Role,
        factories: &FactoryRegistry,
        config: Option<&ComponentConfig>,
    ) -> Result<(), CoreError> {
        let Some(config) = config else {
            return Ok(());
        };
        let span = self.role_span(role);

        let factory = factories
            .lookup(&config.kind)
            .ok_or_else(|| CoreError::UnknownType {
                role,
                name: config.kind.clone(),
            })?;

        let dir = self
            .services
            .directories
            .component(&self.dir, role, &config.kind)
            .await?;

        let constructed = tokio::select! {
            result = factory.construct(ctx, &self.source, &span, &dir) => result,
            _ = ctx.done() => return Err(CoreError::Cancelled),
        };
        let constructed = constructed.map_err(|source| CoreError::Construct {
            role,
            name: config.kind.clone(),
            source,
        })?;
        info!(parent: &span, subtype = %config.kind, "initialized component");

        let mut component = match constructed {
            ConstructorResult::Plain(component) => component,
            ConstructorResult::PluginBacked(plugin) => {
                let len = plugin.converters.len();
                self.converters.extend(plugin.converters);
                self.teardown.push(plugin.closer);
                info!(parent: &span, len, "registered component-specific converters");
                plugin.component
            }
        };

        let id = self.allocate_id();
        self.component_dirs.insert(id, dir);

        if !component.fills(role) {
            return Err(CoreError::ComponentTypeMismatch {
                role,
                expected: role.trait_name(),
                actual: component.type_name().to_string(),
            });
        }

        component
            .configure(&config.config)
            .map_err(|diagnostics| CoreError::Configure {
                role,
                name: config.kind.clone(),
                diagnostics,
            })?;

        *self.slot_mut(role) = Some(Published { id, component });
        self.components.insert(
            id,
            ComponentMeta {
                role,
                subtype: config.kind.clone(),
            },
        );
        Ok(())
    }
}
