//! Domain identifiers (strongly-typed IDs).
//!
//! 2 種類の識別子を扱う:
//!
//! - [`Id<T>`]: ULID ベース。[`IdGenerator`](crate::ports::IdGenerator) が生成し、
//!   プロセス外に出るレコード（履歴エントリ）に使う。
//! - [`ComponentId`]: コンポーネントを記録するときに `App` が払い出すアリーナの添字。
//!   コンポーネントごとの付随テーブル（ディレクトリ、公開メタデータ）は
//!   ポインタ同一性ではなくこれをキーにする。
//!
//! ## Phantom Type パターン
//! `Id<T>` の `T` は実行時には使わないマーカー型で、
//! 種類の違う ID をコンパイル時に区別する。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は ULID ID の種類ごとのマーカートレイト
///
/// `Display` で使うプレフィックスを提供する。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリックな ULID ID
///
/// `T` はコンパイル時にのみ存在する（PhantomData）ので、種類の違う ID は混同できない。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// 履歴エントリ用のマーカー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum History {}

impl IdMarker for History {
    fn prefix() -> &'static str {
        "hist-"
    }
}

/// 記録されたライフサイクル結果 1 件の識別子
pub type HistoryId = Id<History>;

/// `App` 内のコンポーネントインスタンスを指すアリーナ識別子
///
/// 1 から昇順に払い出し、同じ App の中では再利用しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(u64);

impl ComponentId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component-{}", self.0)
    }
}
