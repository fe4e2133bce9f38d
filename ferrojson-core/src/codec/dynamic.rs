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

//! Interface codecs. The concrete type is only known per value, so these
//! look codecs up through the engine at run time.

use crate::codec::{mismatch, Decoder, Encoder};
use crate::error::Error;
use crate::iter::{Iter, ValueType};
use crate::stream::Stream;
use crate::types::{Capability, Kind};
use crate::value::{Dynamic, Value};

/// Encodes interface contents with the codec of their concrete type.
pub struct DynamicEncoder;

impl Encoder for DynamicEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Null => {
                stream.write_nil();
                Ok(())
            }
            Value::Dynamic(d) => {
                let json = stream.cfg();
                json.write_val(&d.value, &d.ty, stream)
            }
            other => Err(mismatch("interface", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// Decoder for the open interface.
///
/// An empty location receives the canonical value of the input. A location
/// holding a non-nil pointer is decoded through that pointer; any other
/// content is replaced.
pub struct EfaceDecoder;

impl Decoder for EfaceDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if let Value::Dynamic(d) = &mut *slot {
            if let Kind::Ptr(elem) = d.ty.kind() {
                if iter.what_is_next() == ValueType::Nil && !matches!(elem.kind(), Kind::Ptr(_)) {
                    iter.skip()?;
                    *slot = Value::Null;
                    return Ok(());
                }
                return decode_through_pointer(d, iter);
            }
        }
        *slot = iter.read_interface()?;
        Ok(())
    }
}

/// Decoder for an interface constrained by a capability.
///
/// `null` clears the location. Anything else needs the location to already
/// hold a pointer to a concrete value, which is decoded in place.
pub struct IfaceDecoder {
    pub capability: Capability,
}

impl Decoder for IfaceDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.read_nil()? {
            *slot = Value::Null;
            return Ok(());
        }
        let d = match slot {
            Value::Null => {
                return Err(Error::invariant(
                    "decode non empty interface: can not unmarshal into nil",
                ))
            }
            Value::Dynamic(d) => d,
            other => return Err(mismatch("interface", other)),
        };
        if !d.ty.satisfies(&self.capability) {
            return Err(Error::invariant(format!(
                "{} does not implement {}",
                d.ty,
                self.capability.name()
            )));
        }
        if !matches!(d.ty.kind(), Kind::Ptr(_)) {
            return Err(Error::invariant(format!(
                "decode: can only unmarshal into pointer, got {}",
                d.ty
            )));
        }
        if d.value.is_null() {
            return Err(Error::invariant(format!(
                "decode: can not read into nil pointer {}",
                d.ty
            )));
        }
        decode_through_pointer(d, iter)
    }
}

/// Decodes into the target of the pointer held by `d`, allocating it when nil.
fn decode_through_pointer(d: &mut Dynamic, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
    let elem = match d.ty.kind() {
        Kind::Ptr(elem) => elem.clone(),
        _ => return Err(mismatch("pointer", &d.value)),
    };
    let json = iter.cfg();
    match &mut d.value {
        Value::Ptr(inner) => json.read_val(inner, &elem, iter),
        Value::Null => {
            let mut fresh = Value::zero(&elem);
            let result = json.read_val(&mut fresh, &elem, iter);
            d.value = Value::ptr(fresh);
            result
        }
        other => Err(mismatch("pointer", other)),
    }
}
