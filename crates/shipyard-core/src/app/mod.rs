//! App - アプリケーション層
//!
//! ports を組み合わせてオーケストレーションの中核を構成
//!
//! # 主要コンポーネント
//! - **ProjectBuilder / Project**: ファクトリと共有コラボレータの保持、App の生成
//! - **App**: 1 つのアプリケーションとそのコンポーネント、ファサード操作
//! - **manager**: コンポーネントの初期化（`App::init_component`）
//! - **dispatch**: 動的ディスパッチ（`App::dispatch`）
//! - **HistoryClient**: App に紐づくライフサイクル履歴
//! - **Teardown**: プラグイン資源の順序付き・時間制限付きの後始末

pub mod application;
pub mod builder;
pub mod dispatch;
pub mod history;
pub mod manager;
pub mod project;
mod services;
pub mod teardown;

pub use self::application::{App, ComponentMeta};
pub use self::builder::ProjectBuilder;
pub use self::history::HistoryClient;
pub use self::project::Project;
pub use self::teardown::{Teardown, TeardownReport};
