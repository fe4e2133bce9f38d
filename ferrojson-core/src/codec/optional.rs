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

//! Pointer codecs.

use crate::codec::{mismatch, Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

/// Encoder for `*T`: `null` for nil, else the target.
pub struct OptionalEncoder {
    pub elem: EncoderRef,
}

impl Encoder for OptionalEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Null => {
                stream.write_nil();
                Ok(())
            }
            Value::Ptr(inner) => self.elem.encode(inner, stream),
            other => Err(mismatch("pointer", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// Decoder for `*T`. `null` sets the pointer to nil; anything else is
/// decoded into the existing target, or into a fresh one if nil.
pub struct OptionalDecoder {
    pub elem_ty: Type,
    pub elem: DecoderRef,
}

impl Decoder for OptionalDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.read_nil()? {
            *slot = Value::Null;
            return Ok(());
        }
        match slot {
            Value::Ptr(inner) => self.elem.decode(inner, iter),
            _ => {
                let mut fresh = Value::zero(&self.elem_ty);
                let result = self.elem.decode(&mut fresh, iter);
                *slot = Value::ptr(fresh);
                result
            }
        }
    }
}

/// Encoder reaching a flattened field through an embedded pointer.
pub struct DereferenceEncoder {
    pub elem: EncoderRef,
}

impl Encoder for DereferenceEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Null => {
                stream.write_nil();
                Ok(())
            }
            Value::Ptr(inner) => self.elem.encode(inner, stream),
            other => Err(mismatch("pointer", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Ptr(inner) => self.elem.is_empty(inner),
            _ => true,
        }
    }

    fn is_embedded_ptr_nil(&self, value: &Value) -> bool {
        match value {
            Value::Ptr(inner) => self.elem.is_embedded_ptr_nil(inner),
            _ => true,
        }
    }
}

/// Decoder reaching a flattened field through an embedded pointer,
/// allocating the embedded value on first use.
pub struct DereferenceDecoder {
    pub elem_ty: Type,
    pub elem: DecoderRef,
}

impl Decoder for DereferenceDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if slot.is_null() {
            *slot = Value::ptr(Value::zero(&self.elem_ty));
        }
        match slot {
            Value::Ptr(inner) => self.elem.decode(inner, iter),
            other => Err(mismatch("pointer", other)),
        }
    }
}
