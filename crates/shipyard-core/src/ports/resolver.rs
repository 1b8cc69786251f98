//! ChainBuilder port - 動的関数の引数解決
//!
//! 対象の `Func`、コンバータプール、値プールを受け取り、宣言された入力を
//! どう用意するかを決めて呼び出し可能な `Chain` を返す。コンバータの選び方は
//! 実装次第で、順序について唯一の約束は「同じ型ならプールで先の値が勝つ」こと。
//!
//! # 実装
//! - `TypeChainBuilder` (impls)

use async_trait::async_trait;

use crate::domain::CoreError;
use crate::dynamic::{Func, Value};

/// 解決済みの呼び出し計画
#[async_trait]
pub trait Chain: Send + Sync {
    /// 計画中のコンバータをすべて実行し、最後に対象を実行
    async fn call(&self) -> Result<Value, CoreError>;

    /// 人が読める計画（debug ログ専用）
    fn describe(&self) -> String;
}

pub trait ChainBuilder: Send + Sync {
    fn build(
        &self,
        target: &Func,
        converters: &[Func],
        values: &[Value],
    ) -> Result<Box<dyn Chain>, CoreError>;
}
