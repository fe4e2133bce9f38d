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

//! Codecs for bool, numeric and string kinds.
//!
//! A `null` token leaves the location unchanged.

use std::sync::Arc;

use crate::codec::{mismatch, Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::Kind;
use crate::value::Value;

pub struct BoolCodec;

impl Encoder for BoolCodec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Bool(v) => {
                stream.write_bool(*v);
                Ok(())
            }
            other => Err(mismatch("bool", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        !matches!(value, Value::Bool(true))
    }
}

impl Decoder for BoolCodec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if !iter.read_nil()? {
            *slot = Value::Bool(iter.read_bool()?);
        }
        Ok(())
    }
}

macro_rules! signed_codecs {
    ($($name:ident => $t:ty),* $(,)?) => {
        paste::paste! {
            $(
                pub struct [<$name Codec>];

                impl Encoder for [<$name Codec>] {
                    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
                        match value {
                            Value::Int(v) => {
                                stream.write_int(*v);
                                Ok(())
                            }
                            other => Err(mismatch(stringify!([<$name:lower>]), other)),
                        }
                    }

                    fn is_empty(&self, value: &Value) -> bool {
                        matches!(value, Value::Int(0))
                    }
                }

                impl Decoder for [<$name Codec>] {
                    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
                        if iter.read_nil()? {
                            return Ok(());
                        }
                        let v = iter.read_i64()?;
                        if <$t>::try_from(v).is_err() {
                            return Err(Error::invalid_value(format!(
                                concat!("read", stringify!($name), ": {} overflows ", stringify!([<$name:lower>])),
                                v
                            )));
                        }
                        *slot = Value::Int(v);
                        Ok(())
                    }
                }
            )*
        }
    };
}

macro_rules! unsigned_codecs {
    ($($name:ident => $t:ty),* $(,)?) => {
        paste::paste! {
            $(
                pub struct [<$name Codec>];

                impl Encoder for [<$name Codec>] {
                    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
                        match value {
                            Value::Uint(v) => {
                                stream.write_uint(*v);
                                Ok(())
                            }
                            other => Err(mismatch(stringify!([<$name:lower>]), other)),
                        }
                    }

                    fn is_empty(&self, value: &Value) -> bool {
                        matches!(value, Value::Uint(0))
                    }
                }

                impl Decoder for [<$name Codec>] {
                    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
                        if iter.read_nil()? {
                            return Ok(());
                        }
                        let v = iter.read_u64()?;
                        if <$t>::try_from(v).is_err() {
                            return Err(Error::invalid_value(format!(
                                concat!("read", stringify!($name), ": {} overflows ", stringify!([<$name:lower>])),
                                v
                            )));
                        }
                        *slot = Value::Uint(v);
                        Ok(())
                    }
                }
            )*
        }
    };
}

signed_codecs! {
    Int8 => i8,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    Int => i64,
}

unsigned_codecs! {
    Uint8 => u8,
    Uint16 => u16,
    Uint32 => u32,
    Uint64 => u64,
    Uint => u64,
    Uintptr => u64,
}

pub struct Float32Codec;

impl Encoder for Float32Codec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Float(v) => stream.write_float32(*v as f32),
            other => Err(mismatch("float32", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Float(v) if *v == 0.0)
    }
}

impl Decoder for Float32Codec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.read_nil()? {
            return Ok(());
        }
        let v = iter.read_f64()?;
        if v.abs() > f32::MAX as f64 {
            return Err(Error::invalid_value(format!(
                "read_f32: {} overflows float32",
                v
            )));
        }
        *slot = Value::Float(v as f32 as f64);
        Ok(())
    }
}

pub struct Float64Codec;

impl Encoder for Float64Codec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Float(v) => stream.write_float64(*v),
            other => Err(mismatch("float64", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Float(v) if *v == 0.0)
    }
}

impl Decoder for Float64Codec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.read_nil()? {
            return Ok(());
        }
        let v = iter.read_f64()?;
        if v.is_infinite() {
            return Err(Error::invalid_value(format!("read_f64: {} overflows float64", v)));
        }
        *slot = Value::Float(v);
        Ok(())
    }
}

pub struct StringCodec;

impl Encoder for StringCodec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::String(v) => {
                stream.write_string(v);
                Ok(())
            }
            other => Err(mismatch("string", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::String(v) if v.is_empty())
    }
}

impl Decoder for StringCodec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if !iter.read_nil()? {
            *slot = Value::String(iter.read_string()?);
        }
        Ok(())
    }
}

/// Native encoder for a primitive kind.
pub fn native_encoder(kind: &Kind) -> Option<EncoderRef> {
    let codec: EncoderRef = match kind {
        Kind::Bool => Arc::new(BoolCodec),
        Kind::Int8 => Arc::new(Int8Codec),
        Kind::Int16 => Arc::new(Int16Codec),
        Kind::Int32 => Arc::new(Int32Codec),
        Kind::Int64 => Arc::new(Int64Codec),
        Kind::Int => Arc::new(IntCodec),
        Kind::Uint8 => Arc::new(Uint8Codec),
        Kind::Uint16 => Arc::new(Uint16Codec),
        Kind::Uint32 => Arc::new(Uint32Codec),
        Kind::Uint64 => Arc::new(Uint64Codec),
        Kind::Uint => Arc::new(UintCodec),
        Kind::Uintptr => Arc::new(UintptrCodec),
        Kind::Float32 => Arc::new(Float32Codec),
        Kind::Float64 => Arc::new(Float64Codec),
        Kind::String => Arc::new(StringCodec),
        _ => return None,
    };
    Some(codec)
}

/// Native decoder for a primitive kind.
pub fn native_decoder(kind: &Kind) -> Option<DecoderRef> {
    let codec: DecoderRef = match kind {
        Kind::Bool => Arc::new(BoolCodec),
        Kind::Int8 => Arc::new(Int8Codec),
        Kind::Int16 => Arc::new(Int16Codec),
        Kind::Int32 => Arc::new(Int32Codec),
        Kind::Int64 => Arc::new(Int64Codec),
        Kind::Int => Arc::new(IntCodec),
        Kind::Uint8 => Arc::new(Uint8Codec),
        Kind::Uint16 => Arc::new(Uint16Codec),
        Kind::Uint32 => Arc::new(Uint32Codec),
        Kind::Uint64 => Arc::new(Uint64Codec),
        Kind::Uint => Arc::new(UintCodec),
        Kind::Uintptr => Arc::new(UintptrCodec),
        Kind::Float32 => Arc::new(Float32Codec),
        Kind::Float64 => Arc::new(Float64Codec),
        Kind::String => Arc::new(StringCodec),
        _ => return None,
    };
    Some(codec)
}
