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

//! Adapters for types with custom marshal contracts.

use crate::codec::{mismatch, Decoder, Encoder};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::{Kind, MarshalJsonFn, MarshalTextFn, Type, UnmarshalJsonFn, UnmarshalTextFn};
use crate::value::Value;

/// Emptiness of a value judged by the shape of its type alone.
pub(crate) fn is_empty_value(ty: &Type, value: &Value) -> bool {
    match (ty.kind(), value) {
        (_, Value::Null) => true,
        (Kind::Bool, Value::Bool(v)) => !*v,
        (_, Value::Int(v)) => *v == 0,
        (_, Value::Uint(v)) => *v == 0,
        (_, Value::Float(v)) => *v == 0.0,
        (_, Value::String(v)) => v.is_empty(),
        (_, Value::Bytes(v)) => v.is_empty(),
        (Kind::Struct(_), _) => false,
        (_, Value::List(v)) => v.is_empty(),
        (_, Value::Map(v)) => v.is_empty(),
        _ => false,
    }
}

fn marshal_failure(err: Error) -> Error {
    match err {
        Error::Marshal(_) => err,
        other => Error::marshal(other.to_string()),
    }
}

fn trim_newline(bytes: &mut Vec<u8>) {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
}

/// Resolves the receiver a contract is called on. `None` means a nil pointer.
fn receiver<'v>(pointer: bool, value: &'v Value) -> Result<Option<&'v Value>, Error> {
    if !pointer {
        return Ok(Some(value));
    }
    match value {
        Value::Null => Ok(None),
        Value::Ptr(inner) => Ok(Some(inner)),
        other => Err(mismatch("pointer", other)),
    }
}

/// Calls a type's JSON marshal contract and writes its output verbatim,
/// minus one trailing newline.
pub struct MarshalerEncoder {
    pub ty: Type,
    pub func: MarshalJsonFn,
    /// Whether locations hold a pointer to the receiver.
    pub pointer: bool,
}

impl Encoder for MarshalerEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let Some(target) = receiver(self.pointer, value)? else {
            stream.write_nil();
            return Ok(());
        };
        let mut bytes = (self.func)(target).map_err(marshal_failure)?;
        trim_newline(&mut bytes);
        stream.write_raw(&bytes);
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        is_empty_value(&self.ty, value)
    }
}

/// Encoder for an interface constrained to JSON marshalers: the contract is
/// looked up on the concrete type held by the interface.
pub struct DirectMarshalerEncoder;

impl Encoder for DirectMarshalerEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let dynamic = match value {
            Value::Null => {
                stream.write_nil();
                return Ok(());
            }
            Value::Dynamic(d) => d,
            other => return Err(mismatch("interface", other)),
        };
        let func = dynamic.ty.json_marshaler().ok_or_else(|| {
            Error::invariant(format!("{} does not implement Marshaler", dynamic.ty))
        })?;
        let pointer = matches!(dynamic.ty.kind(), Kind::Ptr(_));
        let Some(target) = receiver(pointer, &dynamic.value)? else {
            stream.write_nil();
            return Ok(());
        };
        let mut bytes = func(target).map_err(marshal_failure)?;
        trim_newline(&mut bytes);
        stream.write_raw(&bytes);
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// Calls a type's text marshal contract and writes the text as a JSON string.
pub struct TextMarshalerEncoder {
    pub ty: Type,
    pub func: MarshalTextFn,
    pub pointer: bool,
}

impl Encoder for TextMarshalerEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let Some(target) = receiver(self.pointer, value)? else {
            stream.write_nil();
            return Ok(());
        };
        let text = (self.func)(target).map_err(marshal_failure)?;
        stream.write_string(&text);
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        is_empty_value(&self.ty, value)
    }
}

pub struct DirectTextMarshalerEncoder;

impl Encoder for DirectTextMarshalerEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let dynamic = match value {
            Value::Null => {
                stream.write_nil();
                return Ok(());
            }
            Value::Dynamic(d) => d,
            other => return Err(mismatch("interface", other)),
        };
        let func = dynamic.ty.text_marshaler().ok_or_else(|| {
            Error::invariant(format!(
                "{} does not implement TextMarshaler",
                dynamic.ty
            ))
        })?;
        let pointer = matches!(dynamic.ty.kind(), Kind::Ptr(_));
        let Some(target) = receiver(pointer, &dynamic.value)? else {
            stream.write_nil();
            return Ok(());
        };
        let text = func(target).map_err(marshal_failure)?;
        stream.write_string(&text);
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// Hands the exact bytes of the next value to a JSON unmarshal contract.
pub struct UnmarshalerDecoder {
    pub func: UnmarshalJsonFn,
}

impl Decoder for UnmarshalerDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        let bytes = iter.skip_and_return_bytes()?;
        (self.func)(slot, bytes)
            .map_err(|e| Error::marshal(format!("unmarshal: {}", e)))
    }
}

/// Reads a JSON string and hands its text to a text unmarshal contract.
pub struct TextUnmarshalerDecoder {
    pub func: UnmarshalTextFn,
    /// Target type when locations hold a pointer that may need allocating.
    pub pointee: Option<Type>,
}

impl Decoder for TextUnmarshalerDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        let target = match &self.pointee {
            None => slot,
            Some(elem) => {
                if slot.is_null() {
                    *slot = Value::ptr(Value::zero(elem));
                }
                match slot {
                    Value::Ptr(inner) => inner.as_mut(),
                    other => return Err(mismatch("pointer", other)),
                }
            }
        };
        let text = iter.read_string()?;
        (self.func)(target, &text)
            .map_err(|e| Error::marshal(format!("unmarshal text: {}", e)))
    }
}
