//! TypeChainBuilder - resolves function inputs by exact type.
//!
//! # Resolution
//! For every input type of the target:
//! 1. the first value of that type in the pool (caller values come first)
//! 2. otherwise the first converter whose output is that type and whose own
//!    inputs resolve, recursively
//!
//! A type already being resolved further up is never resolved again
//! (cycle guard), and nesting stops at `max_depth` converters.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::CoreError;
use crate::dynamic::{Args, Func, Value, ValueType};
use crate::ports::{Chain, ChainBuilder};

const DEFAULT_MAX_DEPTH: usize = 8;

pub struct TypeChainBuilder {
    max_depth: usize,
}

impl TypeChainBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn resolve(
        &self,
        ty: ValueType,
        converters: &[Func],
        values: &[Value],
        stack: &mut Vec<ValueType>,
    ) -> Option<Input> {
        if let Some(value) = values.iter().find(|v| v.ty() == ty) {
            return Some(Input::Value(value.clone()));
        }
        if stack.contains(&ty) || stack.len() >= self.max_depth {
            return None;
        }

        stack.push(ty);
        let found = converters
            .iter()
            .filter(|c| c.output() == ty)
            .find_map(|c| {
                let inputs = c
                    .inputs()
                    .iter()
                    .map(|input| self.resolve(*input, converters, values, stack))
                    .collect::<Option<Vec<_>>>()?;
                Some(Input::Step(Box::new(Step {
                    func: c.clone(),
                    inputs,
                })))
            });
        stack.pop();
        found
    }
}

impl Default for TypeChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainBuilder for TypeChainBuilder {
    fn build(
        &self,
        target: &Func,
        converters: &[Func],
        values: &[Value],
    ) -> Result<Box<dyn Chain>, CoreError> {
        let mut stack = vec![target.output()];
        let mut inputs = Vec::with_capacity(target.inputs().len());
        for ty in target.inputs() {
            let input = self
                .resolve(*ty, converters, values, &mut stack)
                .ok_or_else(|| CoreError::Resolve {
                    func: target.name().to_string(),
                    type_name: ty.name().to_string(),
                })?;
            inputs.push(input);
        }

        Ok(Box::new(TypeChain {
            root: Step {
                func: target.clone(),
                inputs,
            },
        }))
    }
}

enum Input {
    Value(Value),
    Step(Box<Step>),
}

struct Step {
    func: Func,
    inputs: Vec<Input>,
}

impl Step {
    fn run(&self, is_root: bool) -> BoxFuture<'_, Result<Value, CoreError>> {
        async move {
            let mut values = Vec::with_capacity(self.inputs.len());
            for input in &self.inputs {
                match input {
                    Input::Value(v) => values.push(v.clone()),
                    Input::Step(step) => values.push(step.run(false).await?),
                }
            }

            let out = self
                .func
                .call(Args::new(self.func.name(), values))
                .await?;

            // converter outputs are keyed by type downstream
            if !is_root && out.ty() != self.func.output() {
                return Err(CoreError::ResultTypeMismatch {
                    expected: self.func.output().name().to_string(),
                    actual: out.type_name().to_string(),
                });
            }
            Ok(out)
        }
        .boxed()
    }

    fn describe(&self, out: &mut String) {
        out.push_str(self.func.name());
        out.push('(');
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match input {
                Input::Value(v) => out.push_str(v.type_name()),
                Input::Step(step) => step.describe(out),
            }
        }
        out.push(')');
    }
}

struct TypeChain {
    root: Step,
}

#[async_trait]
impl Chain for TypeChain {
    async fn call(&self) -> Result<Value, CoreError> {
        self.root.run(true).await
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        self.root.describe(&mut out);
        out
    }
}
