// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Describing Rust types to the engine.
//!
//! [`Reflect`] maps a Rust type onto a [`Type`] descriptor and converts its
//! values to and from [`Value`]. Implementations for primitives, `String`,
//! `Vec`, arrays, `Option`, `Box` and the std maps ship with the crate;
//! user structs implement it by hand, usually through [`named_type`]:
//!
//! ```rust
//! use ferrojson_core::error::Error;
//! use ferrojson_core::reflect::{named_type, struct_fields, Reflect};
//! use ferrojson_core::types::{Field, Kind, Type, TypeBuilder};
//! use ferrojson_core::value::Value;
//! use ferrojson_core::json::Json;
//!
//! #[derive(Debug, PartialEq)]
//! struct Node {
//!     value: i64,
//!     next: Option<Box<Node>>,
//! }
//!
//! impl Reflect for Node {
//!     fn json_type() -> Type {
//!         named_type::<Node>(TypeBuilder::new("Node"), || {
//!             Kind::Struct(vec![
//!                 Field::new("Value", i64::json_type()),
//!                 Field::new("Next", Option::<Box<Node>>::json_type()),
//!             ])
//!         })
//!     }
//!
//!     fn to_value(&self) -> Value {
//!         Value::Struct(vec![self.value.to_value(), self.next.to_value()])
//!     }
//!
//!     fn from_value(value: Value) -> Result<Self, Error> {
//!         let [value, next] = struct_fields::<2>(value)?;
//!         Ok(Node {
//!             value: i64::from_value(value)?,
//!             next: Option::from_value(next)?,
//!         })
//!     }
//! }
//!
//! let json = Json::default();
//! let list = Node { value: 1, next: Some(Box::new(Node { value: 2, next: None })) };
//! let bytes = json.serialize(&list).unwrap();
//! assert_eq!(bytes, br#"{"Value":1,"Next":{"Value":2,"Next":null}}"#);
//! assert_eq!(json.deserialize::<Node>(&bytes).unwrap(), list);
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::LazyLock;

use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use tracing::warn;

use crate::codec::mismatch;
use crate::error::Error;
use crate::types::{Kind, Type, TypeBuilder};
use crate::value::Value;

pub trait Reflect: Sized + 'static {
    /// Descriptor of this type. Repeated calls return the same descriptor.
    fn json_type() -> Type;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, Error>;
}

static NAMED_TYPES: LazyLock<DashMap<TypeId, Type>> = LazyLock::new(DashMap::new);
static DEFINE_LOCK: LazyLock<ReentrantMutex<()>> = LazyLock::new(|| ReentrantMutex::new(()));

/// Returns the named descriptor registered for `T`, declaring and defining
/// it on first use.
///
/// `T` is registered before `define` runs, so a definition that refers back
/// to `T` gets the declared descriptor. Other threads wait until the
/// definition is complete.
pub fn named_type<T: 'static>(builder: TypeBuilder, define: impl FnOnce() -> Kind) -> Type {
    let key = TypeId::of::<T>();
    if let Some(ty) = NAMED_TYPES.get(&key).map(|t| t.value().clone()) {
        if ty.is_defined() {
            return ty;
        }
    }
    let _guard = DEFINE_LOCK.lock();
    if let Some(ty) = NAMED_TYPES.get(&key).map(|t| t.value().clone()) {
        return ty;
    }
    let ty = builder.declare();
    NAMED_TYPES.insert(key, ty.clone());
    if let Err(err) = ty.define(define()) {
        warn!(ty = %ty, error = %err, "type definition rejected");
    }
    ty
}

/// Splits a struct value into exactly `N` field values.
pub fn struct_fields<const N: usize>(value: Value) -> Result<[Value; N], Error> {
    match value {
        Value::Struct(fields) => {
            let len = fields.len();
            <[Value; N]>::try_from(fields).map_err(|_| {
                Error::invalid_value(format!("expect struct with {} fields, but found {}", N, len))
            })
        }
        other => Err(mismatch("struct", &other)),
    }
}

impl Reflect for bool {
    fn json_type() -> Type {
        Type::bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! impl_reflect_signed {
    ($($t:ty => $ty_fn:ident),* $(,)?) => {
        $(
            impl Reflect for $t {
                fn json_type() -> Type {
                    Type::$ty_fn()
                }

                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self, Error> {
                    match value {
                        Value::Int(v) => <$t>::try_from(v).map_err(|_| {
                            Error::invalid_value(format!("{} overflows {}", v, stringify!($t)))
                        }),
                        other => Err(mismatch(stringify!($t), &other)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_reflect_unsigned {
    ($($t:ty => $ty_fn:ident),* $(,)?) => {
        $(
            impl Reflect for $t {
                fn json_type() -> Type {
                    Type::$ty_fn()
                }

                fn to_value(&self) -> Value {
                    Value::Uint(*self as u64)
                }

                fn from_value(value: Value) -> Result<Self, Error> {
                    match value {
                        Value::Uint(v) => <$t>::try_from(v).map_err(|_| {
                            Error::invalid_value(format!("{} overflows {}", v, stringify!($t)))
                        }),
                        other => Err(mismatch(stringify!($t), &other)),
                    }
                }
            }
        )*
    };
}

impl_reflect_signed! {
    i8 => int8,
    i16 => int16,
    i32 => int32,
    i64 => int64,
    isize => int,
}

impl_reflect_unsigned! {
    u8 => uint8,
    u16 => uint16,
    u32 => uint32,
    u64 => uint64,
    usize => uint,
}

impl Reflect for f32 {
    fn json_type() -> Type {
        Type::float32()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl Reflect for f64 {
    fn json_type() -> Type {
        Type::float64()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl Reflect for String {
    fn json_type() -> Type {
        Type::string()
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch("string", &other)),
        }
    }
}

/// A nil slice reads back as an empty `Vec`.
impl<T: Reflect> Reflect for Vec<T> {
    fn json_type() -> Type {
        Type::slice(T::json_type())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn json_type() -> Type {
        Type::array(T::json_type(), N)
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        let items: Vec<T> = match value {
            Value::List(items) => items
                .into_iter()
                .map(T::from_value)
                .collect::<Result<_, _>>()?,
            other => return Err(mismatch("list", &other)),
        };
        let len = items.len();
        <[T; N]>::try_from(items).map_err(|_| {
            Error::invalid_value(format!("expect {} elements, but found {}", N, len))
        })
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn json_type() -> Type {
        Type::ptr(T::json_type())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => Value::ptr(v.to_value()),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            Value::Ptr(inner) => T::from_value(*inner).map(Some),
            other => Err(mismatch("pointer", &other)),
        }
    }
}

/// `Box<T>` is described exactly like `T`.
impl<T: Reflect> Reflect for Box<T> {
    fn json_type() -> Type {
        T::json_type()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        T::from_value(value).map(Box::new)
    }
}

impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
{
    fn json_type() -> Type {
        Type::map(K::json_type(), V::json_type())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(HashMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn json_type() -> Type {
        Type::map(K::json_type(), V::json_type())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

/// Untyped documents.
impl Reflect for Value {
    fn json_type() -> Type {
        Type::any()
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        Ok(value)
    }
}
