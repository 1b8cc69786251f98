//! コンポーネントのライフサイクル：初期化、公開、teardown

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::rstest;
use shipyard_core::component::{Component, Platform};
use shipyard_core::domain::{
    AppConfig, ComponentConfig, Context, Diagnostics, ErrorKind, Role,
};
use shipyard_core::dynamic::Operation;
use shipyard_core::CoreError;

use common::*;

fn project_with_all_roles(root: &std::path::Path) -> shipyard_core::Project {
    project_builder(root)
        .factory(Role::Builder, "pack", plain(|| Packer))
        .unwrap()
        .factory(Role::Platform, "local", plain(LocalPlatform::default))
        .unwrap()
        .build()
        .unwrap()
}

#[rstest]
#[case(Role::Builder)]
#[case(Role::Registry)]
#[case(Role::Platform)]
#[case(Role::Releaser)]
#[tokio::test]
async fn unconfigured_role_stays_unset(#[case] role: Role) {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_with_all_roles(tmp.path());

    let app = project
        .app(&Context::background(), &AppConfig::new("web"))
        .await
        .unwrap();

    assert!(app.component(role).is_none());
    assert!(app.component_id(role).is_none());
    assert!(app.components().is_empty());
}

#[tokio::test]
async fn each_published_component_has_one_dir_and_one_meta() {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_with_all_roles(tmp.path());
    let config = AppConfig::new("web")
        .with_component(Role::Builder, ComponentConfig::new("pack"))
        .with_component(Role::Platform, ComponentConfig::new("local"));

    let app = project.app(&Context::background(), &config).await.unwrap();

    let published = app.components();
    assert_eq!(published.len(), 2);
    for role in [Role::Builder, Role::Platform] {
        let id = app.component_id(role).unwrap();
        let meta = app.component_meta(id).unwrap();
        assert_eq!(meta.role, role);
        assert_eq!(meta.subtype, role_config(role));
        let dir = app.component_dir(id).unwrap();
        assert_eq!(dir.role(), role);
        assert!(dir.path().is_dir());
    }
    assert_ne!(
        app.component_id(Role::Builder),
        app.component_id(Role::Platform)
    );
    assert!(app.builder().is_some());
    assert!(app.platform().is_some());
    assert!(app.registry().is_none());
}

#[rstest]
#[case(Role::Builder)]
#[case(Role::Registry)]
#[case(Role::Platform)]
#[case(Role::Releaser)]
#[tokio::test]
async fn unknown_subtype_is_rejected(#[case] role: Role) {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_with_all_roles(tmp.path());
    let config = AppConfig::new("web").with_component(role, ComponentConfig::new("nomad"));

    let err = project
        .app(&Context::background(), &config)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::UnknownType { role: r, ref name } if r == role && name == "nomad"
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("unknown type"));
}

struct Strict {
    configured: Arc<AtomicUsize>,
}

impl Component for Strict {
    fn configure(&mut self, _body: &serde_json::Value) -> Result<(), Diagnostics> {
        self.configured.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn type_mismatch_is_reported_before_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    let configured = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&configured);
    let project = project_builder(tmp.path())
        .factory(
            Role::Platform,
            "strict",
            plain(move || Strict {
                configured: Arc::clone(&c),
            }),
        )
        .unwrap()
        .build()
        .unwrap();
    let config =
        AppConfig::new("web").with_component(Role::Platform, ComponentConfig::new("strict"));

    let err = project
        .app(&Context::background(), &config)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    let msg = err.to_string();
    assert!(msg.contains("Strict"), "{msg}");
    assert!(msg.contains("dyn Platform"), "{msg}");
    assert_eq!(configured.load(Ordering::SeqCst), 0);
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterConfig {
    #[allow(dead_code)]
    namespace: String,
}

struct Cluster;

impl Platform for Cluster {
    fn deploy_func(&self) -> Operation {
        DeployOnly.deploy_func()
    }
}

impl Component for Cluster {
    fn configure(&mut self, body: &serde_json::Value) -> Result<(), Diagnostics> {
        shipyard_core::component::decode_config::<ClusterConfig>(body).map(|_| ())
    }

    fn as_platform(&self) -> Option<&dyn Platform> {
        Some(self)
    }
}

#[rstest]
#[case(serde_json::json!({}), "namespace")]
#[case(serde_json::json!({"namespace": "prod", "replicas": 3}), "replicas")]
#[tokio::test]
async fn configuration_errors_name_role_and_subtype(
    #[case] body: serde_json::Value,
    #[case] offending: &str,
) {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_builder(tmp.path())
        .factory(Role::Platform, "cluster", plain(|| Cluster))
        .unwrap()
        .build()
        .unwrap();
    let config = AppConfig::new("web").with_component(
        Role::Platform,
        ComponentConfig::new("cluster").with_config(body),
    );

    let err = project
        .app(&Context::background(), &config)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    let msg = err.to_string();
    assert!(msg.contains("platform"), "{msg}");
    assert!(msg.contains("\"cluster\""), "{msg}");
    assert!(msg.contains(offending), "{msg}");
}

#[tokio::test]
async fn plugin_converters_follow_project_converters() {
    let tmp = tempfile::tempdir().unwrap();
    let closes = Arc::new(AtomicUsize::new(0));
    let project = project_builder(tmp.path())
        .converter(noop_converter("project_a"))
        .converter(noop_converter("project_b"))
        .factory(
            Role::Platform,
            "local",
            plugin(
                LocalPlatform::default,
                || vec![endpoint_converter(), noop_converter("plugin_b")],
                Arc::clone(&closes),
            ),
        )
        .unwrap()
        .build()
        .unwrap();
    let config =
        AppConfig::new("web").with_component(Role::Platform, ComponentConfig::new("local"));

    let mut app = project.app(&Context::background(), &config).await.unwrap();

    let names: Vec<&str> = app.converters().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["project_a", "project_b", "dir_to_endpoint", "plugin_b"]
    );
    assert_eq!(app.pending_teardown(), 1);

    let report = app.close().await;
    assert_eq!(report.ran, 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn converter_pool_is_copied_per_app() {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_builder(tmp.path())
        .converter(noop_converter("shared"))
        .factory(
            Role::Platform,
            "local",
            plugin(
                LocalPlatform::default,
                || vec![endpoint_converter()],
                Arc::new(AtomicUsize::new(0)),
            ),
        )
        .unwrap()
        .build()
        .unwrap();

    let with_plugin = project
        .app(
            &Context::background(),
            &AppConfig::new("web").with_component(Role::Platform, ComponentConfig::new("local")),
        )
        .await
        .unwrap();
    let without = project
        .app(&Context::background(), &AppConfig::new("api"))
        .await
        .unwrap();

    assert_eq!(with_plugin.converters().len(), 2);
    assert_eq!(without.converters().len(), 1);
    assert_eq!(project.converters().len(), 1);
}

#[tokio::test]
async fn teardown_runs_each_action_once() {
    let tmp = tempfile::tempdir().unwrap();
    let closes = Arc::new(AtomicUsize::new(0));
    let project = project_builder(tmp.path())
        .factory(
            Role::Platform,
            "local",
            plugin(LocalPlatform::default, Vec::new, Arc::clone(&closes)),
        )
        .unwrap()
        .build()
        .unwrap();
    let config =
        AppConfig::new("web").with_component(Role::Platform, ComponentConfig::new("local"));
    let mut app = project.app(&Context::background(), &config).await.unwrap();

    let first = app.close().await;
    let second = app.close().await;

    assert_eq!(first.ran, 1);
    assert!(first.is_clean());
    assert_eq!(second.ran, 0);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_app_leaves_closers_to_the_project() {
    let tmp = tempfile::tempdir().unwrap();
    let closes = Arc::new(AtomicUsize::new(0));
    let project = project_builder(tmp.path())
        .factory(
            Role::Platform,
            "local",
            plugin(LocalPlatform::default, Vec::new, Arc::clone(&closes)),
        )
        .unwrap()
        .build()
        .unwrap();
    // platform は成功して closer を登録し、その後 releaser が失敗する
    let config = AppConfig::new("web")
        .with_component(Role::Platform, ComponentConfig::new("local"))
        .with_component(Role::Releaser, ComponentConfig::new("missing"));

    let err = project
        .app(&Context::background(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownType { role: Role::Releaser, .. }));
    assert_eq!(project.pending_teardown().await, 1);
    assert_eq!(closes.load(Ordering::SeqCst), 0);

    let report = project.close().await;
    assert_eq!(report.ran, 1);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(project.pending_teardown().await, 0);
}

#[tokio::test]
async fn app_config_from_json_drives_initialization() {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_with_all_roles(tmp.path());
    let config = AppConfig::from_json_str(
        r#"{ "name": "web", "build": { "type": "pack" }, "platform": { "type": "local" } }"#,
    )
    .unwrap();

    let app = project.app(&Context::background(), &config).await.unwrap();

    assert_eq!(app.name(), "web");
    assert_eq!(app.source().app, "web");
    assert!(app.dir().path().ends_with("app/web"));
    assert_eq!(app.components().len(), 2);
}

#[tokio::test]
async fn apps_initialize_concurrently_from_one_project() {
    let tmp = tempfile::tempdir().unwrap();
    let closes = Arc::new(AtomicUsize::new(0));
    let project = project_builder(tmp.path())
        .factory(
            Role::Platform,
            "local",
            plugin(LocalPlatform::default, Vec::new, Arc::clone(&closes)),
        )
        .unwrap()
        .build()
        .unwrap();
    let ctx = Context::background();
    let web = AppConfig::new("web").with_component(Role::Platform, ComponentConfig::new("local"));
    let broken = AppConfig::new("api")
        .with_component(Role::Platform, ComponentConfig::new("local"))
        .with_component(Role::Releaser, ComponentConfig::new("missing"));

    let (ok, failed) = tokio::join!(project.app(&ctx, &web), project.app(&ctx, &broken));

    let mut app = ok.unwrap();
    assert!(failed.is_err());
    assert_eq!(app.name(), "web");
    assert_eq!(app.pending_teardown(), 1);
    assert_eq!(project.pending_teardown().await, 1);

    app.close().await;
    project.close().await;
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn app_name_cannot_escape_the_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let project = project_with_all_roles(&tmp.path().join("data"));

    let err = project
        .app(&Context::background(), &AppConfig::new("../outside"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidAppConfig(_)), "{err}");
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!tmp.path().join("outside").exists());
}
