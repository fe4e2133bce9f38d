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

//! Dynamic values flowing through codecs.
//!
//! A [`Value`] is the storage location a codec reads from or writes into. Its
//! meaning always comes from the [`Type`] the codec was built for: a `Struct`
//! holds field values in declaration order, a `Ptr` is a non-nil indirection,
//! and `Null` is the zero value of every nilable shape.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::types::{Kind, Type};

/// Concrete content of an interface location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dynamic {
    pub ty: Type,
    pub value: Value,
}

#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Nil pointer, slice, map, interface or raw message.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Strings, and the literal text of arbitrary-precision numbers.
    String(String),
    /// Raw JSON bytes.
    Bytes(Vec<u8>),
    /// Slice or array elements.
    List(Vec<Value>),
    Map(HashMap<Value, Value>),
    /// Struct fields in declaration order.
    Struct(Vec<Value>),
    Ptr(Box<Value>),
    /// A non-nil interface holding a value of a concrete type.
    Dynamic(Box<Dynamic>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Ptr(a), Value::Ptr(b)) => a == b,
            (Value::Dynamic(a), Value::Dynamic(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Uint(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::List(v) | Value::Struct(v) => v.hash(state),
            // entry order is unspecified
            Value::Map(v) => v.len().hash(state),
            Value::Ptr(v) => v.hash(state),
            Value::Dynamic(v) => v.hash(state),
        }
    }
}

impl Value {
    /// The zero value of `ty`: what a freshly allocated location holds.
    pub fn zero(ty: &Type) -> Value {
        let kind = ty.kind();
        match kind {
            Kind::Bool => Value::Bool(false),
            k if k.is_signed_int() => Value::Int(0),
            k if k.is_unsigned_int() => Value::Uint(0),
            k if k.is_float() => Value::Float(0.0),
            Kind::String | Kind::Number => Value::String(String::new()),
            Kind::Struct(fields) => Value::Struct(fields.iter().map(|f| Value::zero(&f.ty)).collect()),
            Kind::Array(elem, len) => Value::List((0..*len).map(|_| Value::zero(elem)).collect()),
            _ => Value::Null,
        }
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn ptr(value: Value) -> Value {
        Value::Ptr(Box::new(value))
    }

    pub fn dynamic(ty: Type, value: Value) -> Value {
        Value::Dynamic(Box::new(Dynamic { ty, value }))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<Value, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Value]> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Target of a non-nil pointer.
    pub fn as_ptr(&self) -> Option<&Value> {
        match self {
            Value::Ptr(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dynamic(&self) -> Option<&Dynamic> {
        match self {
            Value::Dynamic(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
            Value::Ptr(_) => "pointer",
            Value::Dynamic(_) => "interface",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
