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

/// Encoder for `[N]T`.
pub struct ArrayEncoder {
    pub ty: Type,
    pub len: usize,
    pub elem: EncoderRef,
}

impl Encoder for ArrayEncoder {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let items = match value {
            Value::List(items) if items.len() == self.len => items,
            other => {
                return Err(mismatch(&format!("{} elements", self.len), other).with_context(&self.ty))
            }
        };
        if items.is_empty() {
            stream.write_empty_array();
            return Ok(());
        }
        stream.write_array_start();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                stream.write_more();
            }
            self.elem
                .encode(item, stream)
                .map_err(|e| e.with_context(&self.ty))?;
        }
        stream.write_array_end();
        Ok(())
    }

    fn is_empty(&self, _value: &Value) -> bool {
        self.len == 0
    }
}

/// Decoder for `[N]T`. Extra input elements are skipped and missing ones
/// are reset to zero. `null` leaves the array unchanged.
pub struct ArrayDecoder {
    pub ty: Type,
    pub len: usize,
    pub elem_ty: Type,
    pub elem: DecoderRef,
}

impl ArrayDecoder {
    fn decode_inner(&self, items: &mut Vec<Value>, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        iter.inc_depth()?;
        let mut count = 0;
        if iter.next_token() != b']' {
            iter.unread_byte();
            loop {
                if count < self.len {
                    self.elem.decode(&mut items[count], iter)?;
                } else {
                    iter.skip()?;
                }
                count += 1;
                match iter.next_token() {
                    b',' => continue,
                    b']' => break,
                    c => return Err(iter.unexpected("decode array", "expect ] or ,", c)),
                }
            }
        }
        for item in items.iter_mut().skip(count) {
            *item = Value::zero(&self.elem_ty);
        }
        iter.dec_depth();
        Ok(())
    }
}

impl Decoder for ArrayDecoder {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        match iter.next_token() {
            b'n' => {
                iter.unread_byte();
                iter.read_nil()?;
                return Ok(());
            }
            b'[' => {}
            c => return Err(iter.unexpected("decode array", "expect [ or n", c).with_context(&self.ty)),
        }
        let mut items = match std::mem::take(slot) {
            Value::List(items) if items.len() == self.len => items,
            _ => (0..self.len).map(|_| Value::zero(&self.elem_ty)).collect(),
        };
        let result = self.decode_inner(&mut items, iter);
        *slot = Value::List(items);
        result.map_err(|e| e.with_context(&self.ty))
    }
}
