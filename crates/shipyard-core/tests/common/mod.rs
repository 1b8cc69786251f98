//! 統合テストで共有するフェイク
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use shipyard_core::component::{
    Artifact, Builder, Component, ConfigPlatform, Deployment, ExecPlatform, Platform,
};
use shipyard_core::domain::{ConfigVar, ProjectSettings, Role};
use shipyard_core::dynamic::{Func, FuncSpec, Operation, Value};
use shipyard_core::impls::{BufferUi, TypeChainBuilder};
use shipyard_core::ports::{
    Chain, ChainBuilder, ComponentDir, ComponentFactory, ConstructorResult, FnFactory,
    PluginInstance,
};
use shipyard_core::{CoreError, ProjectBuilder};
use tracing::Span;

/// `TypeChainBuilder` を包み、呼び出しをすべて記録する
#[derive(Default)]
pub struct CountingChainBuilder {
    inner: TypeChainBuilder,
    calls: AtomicUsize,
    last: Mutex<Option<Observed>>,
}

#[derive(Debug, Clone)]
pub struct Observed {
    pub target: String,
    pub converters: Vec<String>,
    pub values: Vec<&'static str>,
}

impl CountingChainBuilder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Observed> {
        self.last.lock().unwrap().clone()
    }
}

impl ChainBuilder for CountingChainBuilder {
    fn build(
        &self,
        target: &Func,
        converters: &[Func],
        values: &[Value],
    ) -> Result<Box<dyn Chain>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(Observed {
            target: target.name().to_string(),
            converters: converters.iter().map(|c| c.name().to_string()).collect(),
            values: values.iter().map(Value::type_name).collect(),
        });
        self.inner.build(target, converters, values)
    }
}

/// プラグインのコンバータがコンポーネントディレクトリから生成する値
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint(pub String);

pub fn endpoint_converter() -> Func {
    FuncSpec::new("dir_to_endpoint")
        .input::<ComponentDir>()
        .output::<Endpoint>()
        .handler(|args| async move {
            let dir = args.get::<ComponentDir>()?;
            Ok(Value::new(Endpoint(format!("unix://{}", dir.subtype()))))
        })
        .build(Span::none())
        .unwrap()
}

pub fn noop_converter(name: &str) -> Func {
    FuncSpec::new(name)
        .input::<u16>()
        .output::<u32>()
        .handler(|args| async move { Ok(Value::new(u32::from(*args.get::<u16>()?))) })
        .build(Span::none())
        .unwrap()
}

#[derive(Debug)]
pub struct Image(pub String);

impl Artifact for Image {
    fn id(&self) -> String {
        self.0.clone()
    }
}

#[derive(Debug)]
pub struct Instance(pub String);

impl Deployment for Instance {
    fn id(&self) -> String {
        self.0.clone()
    }
}

/// deploy だけを持つ platform
pub struct DeployOnly;

impl Platform for DeployOnly {
    fn deploy_func(&self) -> Operation {
        deploy_spec().into()
    }
}

impl Component for DeployOnly {
    fn as_platform(&self) -> Option<&dyn Platform> {
        Some(self)
    }
}

fn deploy_spec() -> FuncSpec {
    FuncSpec::new("deploy")
        .input::<Arc<dyn Artifact>>()
        .output::<Arc<dyn Deployment>>()
        .handler(|args| async move {
            let artifact = args.get::<Arc<dyn Artifact>>()?;
            let deployment: Arc<dyn Deployment> =
                Arc::new(Instance(format!("{}-1", artifact.id())));
            Ok(Value::new(deployment))
        })
}

/// exec と config を持ち、変数をメモリに保持する platform
#[derive(Default)]
pub struct LocalPlatform {
    pub vars: Arc<Mutex<HashMap<String, String>>>,
    pub exec_seen: Arc<Mutex<Vec<String>>>,
}

impl Platform for LocalPlatform {
    fn deploy_func(&self) -> Operation {
        deploy_spec().into()
    }
}

impl ExecPlatform for LocalPlatform {
    fn exec_func(&self) -> Operation {
        let seen = Arc::clone(&self.exec_seen);
        FuncSpec::new("exec")
            .input::<Endpoint>()
            .output::<()>()
            .handler(move |args| {
                let seen = Arc::clone(&seen);
                async move {
                    let endpoint = args.get::<Endpoint>()?;
                    seen.lock().unwrap().push(endpoint.0.clone());
                    Ok(Value::new(()))
                }
            })
            .into()
    }
}

impl ConfigPlatform for LocalPlatform {
    fn config_get_func(&self) -> Operation {
        let vars = Arc::clone(&self.vars);
        FuncSpec::new("config_get")
            .input::<ConfigVar>()
            .output::<ConfigVar>()
            .handler(move |args| {
                let vars = Arc::clone(&vars);
                async move {
                    let var = args.get::<ConfigVar>()?;
                    let value = vars.lock().unwrap().get(&var.name).cloned();
                    Ok(Value::new(ConfigVar {
                        name: var.name.clone(),
                        value,
                    }))
                }
            })
            .into()
    }

    fn config_set_func(&self) -> Operation {
        let vars = Arc::clone(&self.vars);
        FuncSpec::new("config_set")
            .input::<ConfigVar>()
            .output::<()>()
            .handler(move |args| {
                let vars = Arc::clone(&vars);
                async move {
                    let var = args.get::<ConfigVar>()?;
                    let value = var.value.clone().unwrap_or_default();
                    vars.lock().unwrap().insert(var.name.clone(), value);
                    Ok(Value::new(()))
                }
            })
            .into()
    }
}

impl Component for LocalPlatform {
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

/// `Image` を生成する builder
pub struct Packer;

impl Builder for Packer {
    fn build_func(&self) -> Operation {
        FuncSpec::new("build")
            .input::<shipyard_core::domain::Source>()
            .output::<Arc<dyn Artifact>>()
            .handler(|args| async move {
                let source = args.get::<shipyard_core::domain::Source>()?;
                let image: Arc<dyn Artifact> = Arc::new(Image(format!("{}:latest", source.app)));
                Ok(Value::new(image))
            })
            .into()
    }
}

impl Component for Packer {
    fn as_builder(&self) -> Option<&dyn Builder> {
        Some(self)
    }
}

pub fn plain<C, F>(make: F) -> Arc<dyn ComponentFactory>
where
    C: Component,
    F: Fn() -> C + Send + Sync + 'static,
{
    Arc::new(FnFactory::new(move |_, _| {
        Ok(ConstructorResult::Plain(Box::new(make())))
    }))
}

/// `converters` を提供し、close の回数を数えるプラグイン型ファクトリ
pub fn plugin<C, F>(
    make: F,
    converters: fn() -> Vec<Func>,
    closes: Arc<AtomicUsize>,
) -> Arc<dyn ComponentFactory>
where
    C: Component,
    F: Fn() -> C + Send + Sync + 'static,
{
    Arc::new(FnFactory::new(move |_, _| {
        let closes = Arc::clone(&closes);
        Ok(ConstructorResult::PluginBacked(
            PluginInstance::new(Box::new(make()))
                .with_converters(converters())
                .on_close(move || async move {
                    closes.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        ))
    }))
}

/// `root` に書き込み、出力を捕捉する ProjectBuilder
pub fn project_builder(root: &std::path::Path) -> ProjectBuilder {
    ProjectBuilder::new()
        .settings(ProjectSettings::new(root))
        .ui(Arc::new(BufferUi::new()))
}

pub fn role_config(role: Role) -> &'static str {
    match role {
        Role::Builder => "pack",
        Role::Registry => "mirror",
        Role::Platform => "local",
        Role::Releaser => "dns",
    }
}
