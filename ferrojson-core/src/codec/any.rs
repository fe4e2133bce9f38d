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

use crate::codec::map::write_sorted_entries;
use crate::codec::Decoder;
use crate::codec::Encoder;
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::value::Value;

/// Untyped JSON document.
///
/// Decodes into plain values: floats for numbers, lists and string-keyed
/// maps. Encoding walks any value tree; interface contents go through the
/// codec of their concrete type. Object keys follow `sort_map_keys` the
/// same way typed maps do.
pub struct AnyCodec;

impl Encoder for AnyCodec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Null => stream.write_nil(),
            Value::Bool(v) => stream.write_bool(*v),
            Value::Int(v) => stream.write_int(*v),
            Value::Uint(v) => stream.write_uint(*v),
            Value::Float(v) => stream.write_float64(*v)?,
            Value::String(v) => stream.write_string(v),
            Value::Bytes(v) if v.is_empty() => stream.write_nil(),
            Value::Bytes(v) => {
                check_document(stream, v)?;
                stream.write_raw(v);
            }
            Value::List(items) => {
                stream.write_array_start();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        stream.write_more();
                    }
                    self.encode(item, stream)?;
                }
                stream.write_array_end();
            }
            Value::Map(entries) if stream.cfg().config().is_sort_map_keys() => {
                write_sorted_entries(stream, entries, write_key, |v, scratch| {
                    self.encode(v, scratch)
                })?;
            }
            Value::Map(entries) => {
                stream.write_object_start();
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        stream.write_more();
                    }
                    write_key(k, stream)?;
                    stream.write_byte(b':');
                    self.encode(v, stream)?;
                }
                stream.write_object_end();
            }
            Value::Struct(_) => {
                return Err(Error::unsupported(
                    "struct value without a type can not be encoded",
                ))
            }
            Value::Ptr(inner) => self.encode(inner, stream)?,
            Value::Dynamic(d) => {
                let json = stream.cfg();
                json.write_val(&d.value, &d.ty, stream)?;
            }
        }
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}

/// Bytes in an untyped tree are pre-encoded JSON; they must hold exactly
/// one well-formed value to be copied into the output.
fn check_document(stream: &Stream<'_>, bytes: &[u8]) -> Result<(), Error> {
    let mut check = Iter::new(stream.cfg(), bytes);
    check
        .skip()
        .map_err(|e| Error::invalid_value(format!("invalid raw bytes in untyped value: {}", e)))?;
    if !check.is_at_end() {
        return Err(Error::invalid_value(
            "invalid raw bytes in untyped value: bytes left after the value",
        ));
    }
    Ok(())
}

fn write_key(key: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
    match key {
        Value::String(k) => stream.write_string(k),
        Value::Bool(_) | Value::Int(_) | Value::Uint(_) | Value::Float(_) => {
            stream.write_byte(b'"');
            AnyCodec.encode(key, stream)?;
            stream.write_byte(b'"');
        }
        other => {
            return Err(Error::unsupported(format!(
                "unsupported map key: {}",
                other.kind_name()
            )))
        }
    }
    Ok(())
}

impl Decoder for AnyCodec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        *slot = iter.read_any()?;
        Ok(())
    }
}
