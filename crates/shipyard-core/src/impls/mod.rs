//! Impls - ports の同梱実装
//!
//! # 実装一覧
//! - **FsDirectoryProvider**: ローカルファイルシステム上のデータディレクトリ
//! - **TypeChainBuilder**: 型の完全一致による引数解決
//! - **InMemoryHistoryStore**: プロセス内メモリの履歴
//! - **ConsoleUi / BufferUi**: 標準出力と出力の捕捉

pub mod fs_directory;
pub mod inmem_history;
pub mod type_chain;
pub mod ui;

pub use self::fs_directory::FsDirectoryProvider;
pub use self::inmem_history::InMemoryHistoryStore;
pub use self::type_chain::TypeChainBuilder;
pub use self::ui::{BufferUi, ConsoleUi};
