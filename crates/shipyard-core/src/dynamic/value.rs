//! Value - 動的呼び出しを流れる型消去済みの値

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// ValueType は実行時に Rust の型を識別する
///
/// 等価性とハッシュは `TypeId` だけを見る。名前は診断用に保持する。
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 動的呼び出しに呼び出し側が期待する結果の型
pub type ResultType = ValueType;

/// Value は共有された型消去済みの値
///
/// clone は参照カウントを増やすだけ。具象型は生成時に記録するので、
/// `Arc` 越しに型を推測する必要はない。
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    ty: ValueType,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            ty: ValueType::of::<T>(),
        }
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.ty.id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        let any: &(dyn Any + Send + Sync) = &*self.inner;
        any.downcast_ref::<T>()
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::downcast::<T>(Arc::clone(&self.inner)).ok()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("type", &self.ty).finish()
    }
}
