//! shipyard-core
//!
//! Shipyard（build / deploy / release プラットフォーム）のアプリ単位オーケストレーション層
//!
//! # モジュール構成
//! - **domain**: ロール、設定、Context、ID、エラー
//! - **dynamic**: 型消去された値と、引数が注入される関数
//! - **component**: builder / registry / platform / releaser が実装するトレイト
//! - **ports**: 外部依存の抽象化（ディレクトリ、ファクトリ、チェーン構築、履歴、時計、UI）
//! - **impls**: ports の同梱実装
//! - **app**: Project、App、コンポーネント初期化、動的ディスパッチ、teardown

pub mod app;
pub mod component;
pub mod domain;
pub mod dynamic;
pub mod impls;
pub mod ports;

pub use app::{App, Project, ProjectBuilder};
pub use domain::{CoreError, ErrorKind};
