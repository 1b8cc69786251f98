//! 動的ディスパッチ - 引数を注入してコンポーネントの操作を呼ぶ
//!
//! # 値プールの順序
//! 呼び出し側の値が先、続いて環境値:
//! `Context`, `Span`, `Source`, `AppDir`, `ComponentDir`, `Arc<dyn Ui>`,
//! `HistoryClient`
//!
//! チェーン構築では先にある値が優先されるため、呼び出し側の値は
//! 同じ型の環境値を上書きする。

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use super::application::App;
use crate::domain::{ComponentId, Context, CoreError};
use crate::dynamic::{Operation, ResultType, Value};

impl App {
    /// `component` に代わって `op` を解決・実行
    ///
    /// `component` はこの App が初期化したものでなければならない。
    /// そうでなければ解決を始める前に `NoDirectory` で失敗する。
    /// `expected` を指定した場合、別の型の結果は `ResultTypeMismatch` になる。
    pub async fn dispatch(
        &self,
        ctx: &Context,
        expected: Option<ResultType>,
        component: ComponentId,
        op: impl Into<Operation>,
        values: Vec<Value>,
    ) -> Result<Value, CoreError> {
        let span = match self.components.get(&component) {
            Some(meta) => self.role_span(meta.role),
            None => self.span.clone(),
        };
        let func = op.into().into_func(&span)?;

        let dir = self
            .component_dirs
            .get(&component)
            .ok_or(CoreError::NoDirectory(component))?;

        let mut values = values;
        values.extend([
            Value::new(ctx.clone()),
            Value::new(span.clone()),
            Value::new(self.source.clone()),
            Value::new(self.dir.clone()),
            Value::new(dir.clone()),
            Value::new(Arc::clone(&self.ui)),
            Value::new(self.history()),
        ]);

        let chain = self
            .services
            .chain_builder
            .build(&func, &self.converters, &values)?;
        debug!(parent: &span, chain = %chain.describe(), "function chain");

        let result = tokio::select! {
            result = chain.call() => result?,
            _ = ctx.done() => return Err(CoreError::Cancelled),
        };

        match expected {
            Some(expected) if result.ty() != expected => Err(CoreError::ResultTypeMismatch {
                expected: expected.name().to_string(),
                actual: result.type_name().to_string(),
            }),
            _ => Ok(result),
        }
    }

    /// 結果の型 `T` を期待する `dispatch`。呼び出し側向けにダウンキャストする
    pub async fn dispatch_as<T: Any + Send + Sync>(
        &self,
        ctx: &Context,
        component: ComponentId,
        op: impl Into<Operation>,
        values: Vec<Value>,
    ) -> Result<Arc<T>, CoreError> {
        let expected = ResultType::of::<T>();
        let result = self
            .dispatch(ctx, Some(expected), component, op, values)
            .await?;
        result
            .downcast::<T>()
            .ok_or_else(|| CoreError::ResultTypeMismatch {
                expected: expected.name().to_string(),
                actual: result.type_name().to_string(),
            })
    }
}
