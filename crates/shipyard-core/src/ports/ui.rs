//! Ui port - コンポーネントが利用者向けの文字列を書く出力先
//!
//! # 実装
//! - `ConsoleUi`: 標準出力
//! - `BufferUi`: 行を溜める（テスト用）

pub trait Ui: Send + Sync {
    fn output(&self, msg: &str);
}
