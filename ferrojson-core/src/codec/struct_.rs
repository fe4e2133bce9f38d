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

//! Struct codecs. Field lists are resolved when the codec is built,
//! including fields promoted from embedded structs.

use std::collections::HashMap;

use crate::codec::{mismatch, Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

/// Selects one field of a struct value and hands it to `inner`.
pub struct FieldEncoder {
    pub index: usize,
    pub inner: EncoderRef,
}

impl FieldEncoder {
    fn field<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match value {
            Value::Struct(fields) => fields.get(self.index),
            _ => None,
        }
    }
}

impl Encoder for FieldEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match self.field(value) {
            Some(field) => self.inner.encode(field, stream),
            None => Err(mismatch(&format!("struct with field #{}", self.index), value)),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.field(value).is_some_and(|f| self.inner.is_empty(f))
    }

    fn is_embedded_ptr_nil(&self, value: &Value) -> bool {
        self.field(value)
            .is_some_and(|f| self.inner.is_embedded_ptr_nil(f))
    }
}

pub struct FieldDecoder {
    pub index: usize,
    pub inner: DecoderRef,
}

impl Decoder for FieldDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match slot {
            Value::Struct(fields) if self.index < fields.len() => {
                self.inner.decode(&mut fields[self.index], iter)
            }
            other => Err(mismatch(&format!("struct with field #{}", self.index), other)),
        }
    }
}

/// A field as it appears in JSON.
pub struct Binding {
    pub name: String,
    pub omit_empty: bool,
    pub encoder: EncoderRef,
}

pub struct StructEncoder {
    pub ty: Type,
    pub bindings: Vec<Binding>,
}

impl Encoder for StructEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        if !matches!(value, Value::Struct(_)) {
            return Err(mismatch("struct", value).with_context(&self.ty));
        }
        stream.write_object_start();
        let mut first = true;
        for binding in &self.bindings {
            if binding.encoder.is_embedded_ptr_nil(value) {
                continue;
            }
            if binding.omit_empty && binding.encoder.is_empty(value) {
                continue;
            }
            if !first {
                stream.write_more();
            }
            first = false;
            stream.write_object_field(&binding.name);
            binding
                .encoder
                .encode(value, stream)
                .map_err(|e| e.with_context(format_args!("{}.{}", self.ty, binding.name)))?;
        }
        stream.write_object_end();
        Ok(())
    }

    fn is_empty(&self, _value: &Value) -> bool {
        false
    }
}

/// Decoder for structs. Unknown fields are skipped; `null` leaves the
/// struct unchanged.
pub struct StructDecoder {
    pub ty: Type,
    pub fields: Vec<(String, DecoderRef)>,
    pub index: HashMap<String, usize>,
    pub case_sensitive: bool,
}

impl StructDecoder {
    pub fn new(ty: Type, fields: Vec<(String, DecoderRef)>, case_sensitive: bool) -> StructDecoder {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        StructDecoder {
            ty,
            fields,
            index,
            case_sensitive,
        }
    }

    fn lookup(&self, key: &str) -> Option<&DecoderRef> {
        if let Some(&i) = self.index.get(key) {
            return Some(&self.fields[i].1);
        }
        if self.case_sensitive {
            return None;
        }
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, decoder)| decoder)
    }

    fn read_fields(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        loop {
            let key = match iter.next_token() {
                b'"' => {
                    iter.unread_byte();
                    iter.read_string()?
                }
                c => return Err(iter.unexpected("read_object", "expect \" after {", c)),
            };
            match iter.next_token() {
                b':' => {}
                c => return Err(iter.unexpected("read_object", "expect : after object field", c)),
            }
            match self.lookup(&key) {
                Some(decoder) => decoder
                    .decode(slot, iter)
                    .map_err(|e| e.with_context(format_args!("{}.{}", self.ty, key)))?,
                None => iter.skip()?,
            }
            match iter.next_token() {
                b',' => continue,
                b'}' => return Ok(()),
                c => return Err(iter.unexpected("read_object", "expect } or ,", c)),
            }
        }
    }
}

impl Decoder for StructDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match iter.next_token() {
            b'n' => {
                iter.unread_byte();
                iter.read_nil()?;
                return Ok(());
            }
            b'{' => {}
            c => {
                return Err(iter
                    .unexpected("read_object", "expect { or n", c)
                    .with_context(&self.ty))
            }
        }
        if !matches!(slot, Value::Struct(_)) {
            *slot = Value::zero(&self.ty);
        }
        iter.inc_depth()?;
        if iter.next_token() != b'}' {
            iter.unread_byte();
            self.read_fields(slot, iter)?;
        }
        iter.dec_depth();
        Ok(())
    }
}
