use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{Span, info};
use tracing_subscriber::EnvFilter;

use shipyard_core::component::{
    Component, ConfigPlatform, Deployment, ExecPlatform, Platform, decode_config,
};
use shipyard_core::domain::{
    AppConfig, ConfigVar, Context, Diagnostics, ProjectSettings, Role, Source,
};
use shipyard_core::dynamic::{Func, FuncSpec, Operation, Value};
use shipyard_core::ports::{
    ComponentDir, ComponentFactory, ConstructorResult, PluginInstance, Ui,
};
use shipyard_core::Project;

const DEFAULT_APP: &str = r#"
{
  "name": "hello",
  "platform": { "type": "local", "config": { "shell": "sh" } }
}"#;

/// local platform が変数を保存するファイル
#[derive(Debug, Clone)]
struct StateFile(PathBuf);

impl StateFile {
    async fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.0).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, vars: &BTreeMap<String, String>) -> anyhow::Result<()> {
        tokio::fs::write(&self.0, serde_json::to_vec_pretty(vars)?).await?;
        Ok(())
    }
}

/// local プラグインが提供するコンバータ：コンポーネントディレクトリ → 状態ファイル
fn state_file_converter(span: Span) -> anyhow::Result<Func> {
    let func = FuncSpec::new("component_dir_to_state_file")
        .input::<ComponentDir>()
        .output::<StateFile>()
        .handler(|args| async move {
            let dir = args.get::<ComponentDir>()?;
            Ok(Value::new(StateFile(dir.path().join("vars.json"))))
        })
        .build(span)?;
    Ok(func)
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocalConfig {
    #[serde(default)]
    shell: Option<String>,
}

#[derive(Default)]
struct LocalPlatform {
    config: LocalConfig,
}

#[derive(Debug)]
struct LocalDeployment;

impl Deployment for LocalDeployment {
    fn id(&self) -> String {
        "local".to_string()
    }
}

impl Platform for LocalPlatform {
    fn deploy_func(&self) -> Operation {
        FuncSpec::new("deploy")
            .output::<Arc<dyn Deployment>>()
            .handler(|_| async {
                let deployment: Arc<dyn Deployment> = Arc::new(LocalDeployment);
                Ok(Value::new(deployment))
            })
            .into()
    }
}

impl ExecPlatform for LocalPlatform {
    fn exec_func(&self) -> Operation {
        let shell = self.config.shell.clone().unwrap_or_else(|| "sh".to_string());
        FuncSpec::new("exec")
            .input::<StateFile>()
            .input::<Arc<dyn Ui>>()
            .input::<Source>()
            .output::<()>()
            .handler(move |args| {
                let shell = shell.clone();
                async move {
                    let ui = args.get::<Arc<dyn Ui>>()?;
                    let source = args.get::<Source>()?;
                    let vars = args.get::<StateFile>()?.load().await?;
                    ui.output(&format!(
                        "exec {shell} in app {} with {} variable(s)",
                        source.app,
                        vars.len()
                    ));
                    Ok(Value::new(()))
                }
            })
            .into()
    }
}

impl ConfigPlatform for LocalPlatform {
    fn config_get_func(&self) -> Operation {
        FuncSpec::new("config_get")
            .input::<ConfigVar>()
            .input::<StateFile>()
            .output::<ConfigVar>()
            .handler(|args| async move {
                let var = args.get::<ConfigVar>()?;
                let vars = args.get::<StateFile>()?.load().await?;
                Ok(Value::new(ConfigVar {
                    name: var.name.clone(),
                    value: vars.get(&var.name).cloned(),
                }))
            })
            .into()
    }

    fn config_set_func(&self) -> Operation {
        FuncSpec::new("config_set")
            .input::<ConfigVar>()
            .input::<StateFile>()
            .output::<()>()
            .handler(|args| async move {
                let var = args.get::<ConfigVar>()?;
                let file = args.get::<StateFile>()?;
                let mut vars = file.load().await?;
                vars.insert(var.name.clone(), var.value.clone().unwrap_or_default());
                file.store(&vars).await?;
                Ok(Value::new(()))
            })
            .into()
    }
}

impl Component for LocalPlatform {
    fn configure(&mut self, body: &serde_json::Value) -> Result<(), Diagnostics> {
        self.config = decode_config(body)?;
        Ok(())
    }

    fn as_platform(&self) -> Option<&dyn Platform> {
        Some(self)
    }

    fn as_exec(&self) -> Option<&dyn ExecPlatform> {
        Some(self)
    }

    fn as_config(&self) -> Option<&dyn ConfigPlatform> {
        Some(self)
    }
}

/// プロセス外プラグインの代役：コンバータと停止フックを提供する
struct LocalFactory;

#[async_trait]
impl ComponentFactory for LocalFactory {
    async fn construct(
        &self,
        _ctx: &Context,
        source: &Source,
        span: &Span,
        dir: &ComponentDir,
    ) -> anyhow::Result<ConstructorResult> {
        info!(
            parent: span,
            app = %source.app,
            dir = %dir.path().display(),
            "starting local plugin"
        );
        let stop_span = span.clone();
        let plugin = PluginInstance::new(Box::new(LocalPlatform::default()))
            .with_converters(vec![state_file_converter(span.clone())?])
            .on_close(move || async move {
                info!(parent: &stop_span, "local plugin stopped");
                Ok(())
            });
        Ok(ConstructorResult::PluginBacked(plugin))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) App 設定を用意（第 1 引数のファイル、無ければ組み込みのサンプル）
    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading app config {path}"))?,
        None => DEFAULT_APP.to_string(),
    };
    let config = AppConfig::from_json_str(&raw)?;

    // (B) Project をワイヤリング
    let project = Project::builder()
        .settings(ProjectSettings::new(".shipyard"))
        .factory(Role::Platform, "local", Arc::new(LocalFactory))?
        .expect_types(Role::Platform, &["local"])
        .build()?;

    // (C) App を初期化
    let ctx = Context::background();
    let mut app = match project.app(&ctx, &config).await {
        Ok(app) => app,
        Err(e) => {
            project.close().await;
            return Err(e.into());
        }
    };

    // (D) 操作を実行（config_set / config_get / exec）
    let result = async {
        app.config_set(&ctx, "PORT", "8080").await?;
        let port = app.config_get(&ctx, "PORT").await?;
        app.ui()
            .output(&format!("{} = {}", port.name, port.value.as_deref().unwrap_or("")));
        app.exec(&ctx).await?;
        anyhow::Ok(())
    }
    .await;

    // (E) 操作が失敗しても teardown は必ず走らせる
    let report = app.close().await;
    if !report.is_clean() {
        tracing::warn!(failures = ?report.failures, "teardown finished with failures");
    }
    project.close().await;
    result
}
