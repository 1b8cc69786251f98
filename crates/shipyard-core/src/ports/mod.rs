//! Ports - コアが利用するコラボレータの抽象化
//!
//! 各トレイトが外部の関心事（保存領域、プラグイン構築、引数解決、履歴、端末出力）を
//! 隠すので、テストではフェイクでコアを動かせる。

pub mod clock;
pub mod directory;
pub mod factory;
pub mod history_store;
pub mod id_generator;
pub mod resolver;
pub mod ui;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::directory::{AppDir, ComponentDir, DirectoryProvider};
pub use self::factory::{
    ComponentFactory, ConstructorResult, FactoryRegistry, FnFactory, PluginInstance, TeardownFn,
};
pub use self::history_store::{HistoryEntry, HistoryStore};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::resolver::{Chain, ChainBuilder};
pub use self::ui::Ui;
