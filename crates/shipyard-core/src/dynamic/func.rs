//! Func - 引数が型で注入される操作とコンバータ
//!
//! `Func` は必要な型と生成する型を宣言する。位置引数は受け取らない。
//! チェーン構築が宣言された入力ごとに値（またはコンバータの連鎖）を見つけ、
//! 結果を `Args` として渡す。
//!
//! # 学習ポイント
//! - 型消去されたハンドラ（`Arc<dyn Fn>` + `BoxFuture`）
//! - Builder 風の宣言（`FuncSpec`）と検証済みの値（`Func`）の分離

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, Span};

use super::value::{Value, ValueType};
use crate::domain::CoreError;

type Handler = Arc<dyn Fn(Args) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// 検証済みの動的関数
///
/// ハンドラは共有されるので clone は軽い。
#[derive(Clone)]
pub struct Func {
    name: String,
    inputs: Vec<ValueType>,
    output: ValueType,
    handler: Handler,
    span: Span,
}

impl Func {
    /// `FuncSpec` を検証し、ログ出力に使う span を付ける
    ///
    /// 拒否する形:
    /// - 空の名前
    /// - 出力型またはハンドラの欠落
    /// - 同じ入力型の二重宣言（注入先が曖昧になる）
    pub fn from_spec(spec: FuncSpec, span: Span) -> Result<Self, CoreError> {
        let FuncSpec {
            name,
            inputs,
            output,
            handler,
        } = spec;

        if name.trim().is_empty() {
            return Err(CoreError::InvalidFunc("function name is empty".to_string()));
        }
        let output = output
            .ok_or_else(|| CoreError::InvalidFunc(format!("{name}: no output type declared")))?;
        let handler =
            handler.ok_or_else(|| CoreError::InvalidFunc(format!("{name}: no handler")))?;

        let mut seen = HashSet::new();
        for input in &inputs {
            if !seen.insert(*input) {
                return Err(CoreError::InvalidFunc(format!(
                    "{name}: input {input} declared more than once"
                )));
            }
        }

        Ok(Self {
            name,
            inputs,
            output,
            handler,
            span,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ValueType] {
        &self.inputs
    }

    pub fn output(&self) -> ValueType {
        self.output
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// ハンドラを呼ぶ。宣言された入力はすべて呼び出し側が `args` に用意する
    pub fn call(&self, args: Args) -> BoxFuture<'static, anyhow::Result<Value>> {
        (self.handler)(args).instrument(self.span.clone()).boxed()
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish()
    }
}

/// 未検証の `Func` の記述
///
/// ```ignore
/// let spec = FuncSpec::new("exec")
///     .input::<ComponentDir>()
///     .output::<ExecResult>()
///     .handler(|args| async move {
///         let dir = args.get::<ComponentDir>()?;
///         Ok(Value::new(ExecResult::ok()))
///     });
/// ```
pub struct FuncSpec {
    name: String,
    inputs: Vec<ValueType>,
    output: Option<ValueType>,
    handler: Option<Handler>,
}

impl FuncSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            output: None,
            handler: None,
        }
    }

    pub fn input<T: Any + Send + Sync>(mut self) -> Self {
        self.inputs.push(ValueType::of::<T>());
        self
    }

    pub fn output<T: Any + Send + Sync>(mut self) -> Self {
        self.output = Some(ValueType::of::<T>());
        self
    }

    pub fn handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |args| f(args).boxed()));
        self
    }

    /// `Func::from_spec(self, span)` の短縮形
    pub fn build(self, span: Span) -> Result<Func, CoreError> {
        Func::from_spec(self, span)
    }
}

/// 動的ディスパッチに渡す操作。検証済みの `Func` か、未検証の `FuncSpec`
pub enum Operation {
    Prepared(Func),
    Spec(FuncSpec),
}

impl Operation {
    /// `Func` に正規化する
    ///
    /// 検証済みならそのまま使い、`FuncSpec` は検証して `span` を付ける。
    pub fn into_func(self, span: &Span) -> Result<Func, CoreError> {
        match self {
            Operation::Prepared(func) => Ok(func),
            Operation::Spec(spec) => Func::from_spec(spec, span.clone()),
        }
    }
}

impl From<Func> for Operation {
    fn from(func: Func) -> Self {
        Operation::Prepared(func)
    }
}

impl From<FuncSpec> for Operation {
    fn from(spec: FuncSpec) -> Self {
        Operation::Spec(spec)
    }
}

/// 1 回の呼び出しで解決された引数（型がキー）
pub struct Args {
    func: String,
    values: HashMap<ValueType, Value>,
}

impl Args {
    pub fn new(func: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            func: func.into(),
            values: values.into_iter().map(|v| (v.ty(), v)).collect(),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Result<&T, CoreError> {
        self.values
            .get(&ValueType::of::<T>())
            .and_then(Value::downcast_ref::<T>)
            .ok_or_else(|| self.missing::<T>())
    }

    pub fn get_arc<T: Any + Send + Sync>(&self) -> Result<Arc<T>, CoreError> {
        self.values
            .get(&ValueType::of::<T>())
            .and_then(Value::downcast::<T>)
            .ok_or_else(|| self.missing::<T>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn missing<T: Any>(&self) -> CoreError {
        CoreError::MissingArgument {
            func: self.func.clone(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}
