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

use crate::codec::{mismatch, Decoder, DecoderRef, Encoder, EncoderRef};
use crate::error::Error;
use crate::iter::Iter;
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

/// Encoder for `[]T`. A nil slice writes `null`, an empty one `[]`.
pub struct SliceEncoder {
    pub ty: Type,
    pub elem: EncoderRef,
}

impl Encoder for SliceEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let items = match value {
            Value::Null => {
                stream.write_nil();
                return Ok(());
            }
            Value::List(items) => items,
            other => return Err(mismatch("slice", other).with_context(&self.ty)),
        };
        if items.is_empty() {
            stream.write_empty_array();
            return Ok(());
        }
        let mut eof = None;
        stream.write_array_start();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                stream.write_more();
            }
            if let Err(err) = self.elem.encode(item, stream) {
                if !err.is_eof() {
                    return Err(err.with_context(&self.ty));
                }
                eof.get_or_insert(err);
            }
        }
        stream.write_array_end();
        match eof {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Decoder for `[]T`.
///
/// `null` yields a nil slice and `[]` an empty non-nil one. Elements are
/// decoded into fresh zero values, in source order.
pub struct SliceDecoder {
    pub ty: Type,
    pub elem_ty: Type,
    pub elem: DecoderRef,
}

impl SliceDecoder {
    fn read_elements(&self, items: &mut Vec<Value>, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        loop {
            let mut item = Value::zero(&self.elem_ty);
            let result = self.elem.decode(&mut item, iter);
            items.push(item);
            result?;
            match iter.next_token() {
                b',' => continue,
                b']' => return Ok(()),
                c => return Err(iter.unexpected("decode slice", "expect ] or ,", c)),
            }
        }
    }

    fn decode_inner(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match iter.next_token() {
            b'n' => {
                iter.unread_byte();
                iter.read_nil()?;
                *slot = Value::Null;
                return Ok(());
            }
            b'[' => {}
            c => return Err(iter.unexpected("decode slice", "expect [ or n", c)),
        }
        iter.inc_depth()?;
        if iter.next_token() == b']' {
            *slot = Value::List(Vec::new());
            iter.dec_depth();
            return Ok(());
        }
        iter.unread_byte();
        let mut items = Vec::new();
        let result = self.read_elements(&mut items, iter);
        *slot = Value::List(items);
        result?;
        iter.dec_depth();
        Ok(())
    }
}

impl Decoder for SliceDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        self.decode_inner(slot, iter)
            .map_err(|e| e.with_context(&self.ty))
    }
}
