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

use std::collections::HashMap;
use std::ops::Range;

use crate::codec::{mismatch, Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

/// Encoder for `map[K]V`, entries in map iteration order.
pub struct MapEncoder {
    pub ty: Type,
    pub key: EncoderRef,
    pub elem: EncoderRef,
}

fn entries_of<'v>(ty: &Type, value: &'v Value) -> Result<Option<&'v HashMap<Value, Value>>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::Map(entries) => Ok(Some(entries)),
        other => Err(mismatch("map", other).with_context(ty)),
    }
}

impl Encoder for MapEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let Some(entries) = entries_of(&self.ty, value)? else {
            stream.write_nil();
            return Ok(());
        };
        stream.write_object_start();
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                stream.write_more();
            }
            self.key
                .encode(k, stream)
                .map_err(|e| e.with_context(format_args!("in map key of type {}", self.ty)))?;
            stream.write_byte(b':');
            self.elem
                .encode(v, stream)
                .map_err(|e| e.with_context(format_args!("in map value of type {}", self.ty)))?;
        }
        stream.write_object_end();
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

/// Encoder for `map[K]V` with entries ordered by their encoded key text.
///
/// Each entry is rendered into a pooled scratch buffer first; the key text
/// is read back from there so the order matches what ends up in the output.
pub struct SortKeysMapEncoder {
    pub ty: Type,
    pub key: EncoderRef,
    pub elem: EncoderRef,
}

/// Writes `entries` as an object ordered by key text.
///
/// Entries are rendered into a pooled scratch buffer and copied out once
/// sorted. The buffer goes back to the pool on every exit, errors included.
pub(crate) fn write_sorted_entries<'v, I, K, V>(
    stream: &mut Stream<'_>,
    entries: I,
    encode_key: K,
    encode_value: V,
) -> Result<(), Error>
where
    I: IntoIterator<Item = (&'v Value, &'v Value)>,
    K: FnMut(&Value, &mut Stream<'_>) -> Result<(), Error>,
    V: FnMut(&Value, &mut Stream<'_>) -> Result<(), Error>,
{
    let json = stream.cfg();
    json.buffer_pool().borrow_mut(|buf| {
        let mut scratch = Stream::with_buffer(json, std::mem::take(buf));
        let result = render_entries(&mut scratch, entries, encode_key, encode_value).map(|rendered| {
            stream.write_object_start();
            for (i, (_, range)) in rendered.into_iter().enumerate() {
                if i > 0 {
                    stream.write_more();
                }
                stream.write_raw(&scratch.buffer()[range]);
            }
            stream.write_object_end();
        });
        *buf = scratch.into_inner();
        result
    })
}

/// Renders each entry as `key:value` into `scratch`, returning the decoded
/// key text and byte range of each, sorted by key.
fn render_entries<'v, I, K, V>(
    scratch: &mut Stream<'_>,
    entries: I,
    mut encode_key: K,
    mut encode_value: V,
) -> Result<Vec<(String, Range<usize>)>, Error>
where
    I: IntoIterator<Item = (&'v Value, &'v Value)>,
    K: FnMut(&Value, &mut Stream<'_>) -> Result<(), Error>,
    V: FnMut(&Value, &mut Stream<'_>) -> Result<(), Error>,
{
    let json = scratch.cfg();
    let mut rendered = Vec::new();
    for (k, v) in entries {
        let start = scratch.buffered();
        encode_key(k, scratch)?;
        let key_bytes = &scratch.buffer()[start..scratch.buffered()];
        let key_text = Iter::new(json, key_bytes)
            .read_string()
            .unwrap_or_else(|_| String::from_utf8_lossy(key_bytes).into_owned());
        scratch.write_byte(b':');
        encode_value(v, scratch)?;
        rendered.push((key_text, start..scratch.buffered()));
    }
    rendered.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rendered)
}

impl Encoder for SortKeysMapEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let Some(entries) = entries_of(&self.ty, value)? else {
            stream.write_nil();
            return Ok(());
        };
        write_sorted_entries(
            stream,
            entries,
            |k, scratch| match self.key.encode(k, scratch) {
                Err(err) if !err.is_eof() => {
                    Err(err.with_context(format_args!("in map key of type {}", self.ty)))
                }
                _ => Ok(()),
            },
            |v, scratch| match self.elem.encode(v, scratch) {
                Err(err) if !err.is_eof() => {
                    Err(err.with_context(format_args!("in map value of type {}", self.ty)))
                }
                _ => Ok(()),
            },
        )
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

/// Decoder for `map[K]V`.
///
/// `null` yields a nil map and `{}` an empty one. Entries merge into an
/// existing map; a repeated key keeps its last value.
pub struct MapDecoder {
    pub ty: Type,
    pub key_ty: Type,
    pub elem_ty: Type,
    pub key: DecoderRef,
    pub elem: DecoderRef,
}

impl MapDecoder {
    fn read_entries(
        &self,
        entries: &mut HashMap<Value, Value>,
        iter: &mut Iter<'_, '_>,
    ) -> Result<(), Error> {
        loop {
            let mut key = Value::zero(&self.key_ty);
            self.key
                .decode(&mut key, iter)
                .map_err(|e| e.with_context(format_args!("in map key of type {}", self.ty)))?;
            match iter.next_token() {
                b':' => {}
                c => return Err(iter.unexpected("read_map", "expect : after object field", c)),
            }
            let mut elem = Value::zero(&self.elem_ty);
            let result = self.elem.decode(&mut elem, iter);
            entries.insert(key, elem);
            result.map_err(|e| e.with_context(format_args!("in map value of type {}", self.ty)))?;
            match iter.next_token() {
                b',' => continue,
                b'}' => return Ok(()),
                c => return Err(iter.unexpected("read_map", "expect } or ,", c)),
            }
        }
    }
}

impl Decoder for MapDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match iter.next_token() {
            b'n' => {
                iter.unread_byte();
                iter.read_nil()?;
                *slot = Value::Null;
                return Ok(());
            }
            b'{' => {}
            c => return Err(iter.unexpected("read_map", "expect { or n", c)),
        }
        let mut entries = match std::mem::take(slot) {
            Value::Map(entries) => entries,
            _ => HashMap::new(),
        };
        iter.inc_depth()?;
        let result = if iter.next_token() == b'}' {
            Ok(())
        } else {
            iter.unread_byte();
            self.read_entries(&mut entries, iter)
        };
        *slot = Value::Map(entries);
        result?;
        iter.dec_depth();
        Ok(())
    }
}

/// Writes a numeric or boolean key as a quoted string.
pub struct NumericMapKeyEncoder {
    pub inner: EncoderRef,
}

impl Encoder for NumericMapKeyEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        stream.write_byte(b'"');
        self.inner.encode(value, stream)?;
        stream.write_byte(b'"');
        Ok(())
    }

    fn is_empty(&self, _value: &Value) -> bool {
        false
    }
}

/// Reads a numeric or boolean key from inside quotes.
pub struct NumericMapKeyDecoder {
    pub inner: DecoderRef,
}

impl Decoder for NumericMapKeyDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match iter.next_token() {
            b'"' => {}
            c => return Err(iter.unexpected("read_map", "expect \"", c)),
        }
        self.inner.decode(slot, iter)?;
        match iter.next_token() {
            b'"' => Ok(()),
            c => Err(iter.unexpected("read_map", "expect \"", c)),
        }
    }
}

/// Key encoder for interface-typed keys: resolved per key from its
/// concrete type.
pub struct DynamicMapKeyEncoder;

impl Encoder for DynamicMapKeyEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Dynamic(d) => {
                let encoder = stream.cfg().map_key_encoder_of(&d.ty);
                encoder.encode(&d.value, stream)
            }
            Value::Null => Err(Error::unsupported("nil map key")),
            other => Err(mismatch("interface", other)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.is_null()
    }
}
