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

//! Codecs: per-type encoders and decoders.
//!
//! Every codec is immutable once built and shared behind an `Arc`, so one
//! instance serves any number of threads. Recursive types are wired through
//! placeholders that resolve to the finished codec of the type under
//! construction.

pub mod any;
pub mod array;
pub mod dynamic;
pub mod map;
pub mod marshaler;
pub mod native;
pub mod optional;
pub mod raw;
pub mod slice;
pub mod struct_;

use std::sync::{Arc, OnceLock, Weak};

use tracing::debug;

use crate::error::Error;
use crate::iter::{Iter, ValueType};
use crate::json::Json;
use crate::resolver::builder::{decoder_of_type, encoder_of_type};
use crate::resolver::context::BuildContext;
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

pub trait Encoder: Send + Sync {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error>;

    /// Whether `value` counts as empty for `omit_empty` fields.
    fn is_empty(&self, value: &Value) -> bool;

    /// Whether `value` reaches this field through a nil embedded pointer.
    fn is_embedded_ptr_nil(&self, _value: &Value) -> bool {
        false
    }
}

pub trait Decoder: Send + Sync {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error>;
}

pub type EncoderRef = Arc<dyn Encoder>;
pub type DecoderRef = Arc<dyn Decoder>;

/// Error for a value whose variant does not match the codec's type.
#[cold]
pub(crate) fn mismatch(expected: &str, value: &Value) -> Error {
    Error::invalid_value(format!(
        "expect {}, but found {}",
        expected,
        value.kind_name()
    ))
}

pub(crate) type EncoderCell = Arc<OnceLock<Weak<dyn Encoder>>>;
pub(crate) type DecoderCell = Arc<OnceLock<Weak<dyn Decoder>>>;

/// Stands in for the encoder of a type that is still being built.
///
/// The cell holds a weak reference so a recursive codec does not own
/// itself. If the finished codec is gone by the time the placeholder runs,
/// the type is built again in a fresh session and kept here.
pub struct PlaceholderEncoder {
    pub(crate) ty: Type,
    pub(crate) cell: EncoderCell,
    pub(crate) rebuilt: OnceLock<EncoderRef>,
}

impl PlaceholderEncoder {
    pub(crate) fn new(ty: Type, cell: EncoderCell) -> PlaceholderEncoder {
        PlaceholderEncoder {
            ty,
            cell,
            rebuilt: OnceLock::new(),
        }
    }

    fn target(&self, json: Option<&Json>) -> Result<EncoderRef, Error> {
        let weak = self
            .cell
            .get()
            .ok_or_else(|| Error::invariant("placeholder encoder used before its type was built"))?;
        if let Some(target) = weak.upgrade() {
            return Ok(target);
        }
        if let Some(target) = self.rebuilt.get() {
            return Ok(target.clone());
        }
        let json = json.ok_or_else(|| {
            Error::invariant(format!("encoder of {} was dropped", self.ty))
        })?;
        debug!(ty = %self.ty, "rebuilding encoder behind a dropped placeholder target");
        let built = encoder_of_type(&mut BuildContext::new(json), &self.ty);
        Ok(self.rebuilt.get_or_init(|| built).clone())
    }
}

impl Encoder for PlaceholderEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        self.target(Some(stream.cfg()))?.encode(value, stream)
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.target(None).map(|t| t.is_empty(value)).unwrap_or(false)
    }

    fn is_embedded_ptr_nil(&self, value: &Value) -> bool {
        self.target(None)
            .map(|t| t.is_embedded_ptr_nil(value))
            .unwrap_or(false)
    }
}

pub struct PlaceholderDecoder {
    pub(crate) ty: Type,
    pub(crate) cell: DecoderCell,
    pub(crate) rebuilt: OnceLock<DecoderRef>,
}

impl PlaceholderDecoder {
    pub(crate) fn new(ty: Type, cell: DecoderCell) -> PlaceholderDecoder {
        PlaceholderDecoder {
            ty,
            cell,
            rebuilt: OnceLock::new(),
        }
    }
}

impl Decoder for PlaceholderDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        let weak = self
            .cell
            .get()
            .ok_or_else(|| Error::invariant("placeholder decoder used before its type was built"))?;
        if let Some(target) = weak.upgrade() {
            return target.decode(slot, iter);
        }
        let target = match self.rebuilt.get() {
            Some(target) => target.clone(),
            None => {
                debug!(ty = %self.ty, "rebuilding decoder behind a dropped placeholder target");
                let built = decoder_of_type(&mut BuildContext::new(iter.cfg()), &self.ty);
                self.rebuilt.get_or_init(|| built).clone()
            }
        };
        target.decode(slot, iter)
    }
}

/// Encoder for a type that cannot be encoded. Nil locations still write `null`.
pub struct LazyErrorEncoder {
    pub err: Error,
}

impl Encoder for LazyErrorEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        if value.is_null() {
            stream.write_nil();
            return Ok(());
        }
        Err(self.err.clone())
    }

    fn is_empty(&self, _value: &Value) -> bool {
        false
    }
}

/// Decoder for a type that cannot be decoded. A `null` token is skipped.
pub struct LazyErrorDecoder {
    pub err: Error,
}

impl Decoder for LazyErrorDecoder {
    fn decode(&self, _slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.what_is_next() != ValueType::Nil {
            return Err(self.err.clone());
        }
        iter.skip()
    }
}

/// Root wrapper for pointer-like types.
///
/// Locations always hold the value itself, so the extra indirection taken
/// at the root is a plain delegation.
pub struct OnePtrEncoder {
    pub inner: EncoderRef,
}

impl Encoder for OnePtrEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        self.inner.encode(value, stream)
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.inner.is_empty(value)
    }

    fn is_embedded_ptr_nil(&self, value: &Value) -> bool {
        self.inner.is_embedded_ptr_nil(value)
    }
}

type EncodeFn = dyn Fn(&Value, &mut Stream<'_>) -> Result<(), Error> + Send + Sync;
type EmptyFn = dyn Fn(&Value) -> bool + Send + Sync;
type DecodeFn = dyn Fn(&mut Value, &mut Iter<'_, '_>) -> Result<(), Error> + Send + Sync;

/// Encoder built from closures, handy for registering overrides.
///
/// ```rust
/// use ferrojson_core::codec::FnEncoder;
/// use ferrojson_core::value::Value;
///
/// let upper = FnEncoder::new(|value: &Value, stream| {
///     stream.write_string(&value.as_str().unwrap_or_default().to_uppercase());
///     Ok(())
/// })
/// .with_is_empty(|value: &Value| value.as_str().map_or(true, str::is_empty));
/// # let _ = upper;
/// ```
pub struct FnEncoder {
    encode: Box<EncodeFn>,
    is_empty: Option<Box<EmptyFn>>,
}

impl FnEncoder {
    pub fn new<F>(encode: F) -> FnEncoder
    where
        F: Fn(&Value, &mut Stream<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        FnEncoder {
            encode: Box::new(encode),
            is_empty: None,
        }
    }

    pub fn with_is_empty<F>(mut self, is_empty: F) -> FnEncoder
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_empty = Some(Box::new(is_empty));
        self
    }
}

impl Encoder for FnEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        (self.encode)(value, stream)
    }

    fn is_empty(&self, value: &Value) -> bool {
        match &self.is_empty {
            Some(f) => f(value),
            None => false,
        }
    }
}

pub struct FnDecoder {
    decode: Box<DecodeFn>,
}

impl FnDecoder {
    pub fn new<F>(decode: F) -> FnDecoder
    where
        F: Fn(&mut Value, &mut Iter<'_, '_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        FnDecoder {
            decode: Box::new(decode),
        }
    }
}

impl Decoder for FnDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        (self.decode)(slot, iter)
    }
}
