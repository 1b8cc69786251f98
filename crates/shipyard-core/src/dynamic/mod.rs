//! Dynamic - 実行時に型で解決される値と関数
//!
//! 2 つの層:
//! - **Value / ValueType**: `TypeId` を覚えた型消去済みの値
//! - **Func / FuncSpec / Operation**: 入力を型で宣言し、`ChainBuilder` から注入される関数

pub mod func;
pub mod value;

pub use self::func::{Args, Func, FuncSpec, Operation};
pub use self::value::{ResultType, Value, ValueType};
