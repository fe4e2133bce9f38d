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

use crate::codec::{mismatch, Decoder, Encoder};
use crate::error::Error;
use crate::iter::{Iter, ValueType};
use crate::stream::Stream;
use crate::value::Value;

/// Pre-encoded JSON, copied through verbatim.
///
/// Decoding `null` clears the payload; an empty payload encodes as `null`.
pub struct RawMessageCodec;

impl Encoder for RawMessageCodec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::Null => stream.write_nil(),
            Value::Bytes(bytes) if bytes.is_empty() => stream.write_nil(),
            Value::Bytes(bytes) => stream.write_raw(bytes),
            other => return Err(mismatch("raw message", other)),
        }
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bytes(bytes) => bytes.is_empty(),
            _ => false,
        }
    }
}

impl Decoder for RawMessageCodec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        if iter.read_nil()? {
            *slot = Value::Null;
            return Ok(());
        }
        *slot = Value::Bytes(iter.skip_and_return_bytes()?.to_vec());
        Ok(())
    }
}

/// Number kept as its literal text. Accepts a bare or a quoted literal.
pub struct NumberCodec;

impl Encoder for NumberCodec {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        let text = match value {
            Value::String(text) => text,
            other => return Err(mismatch("number", other)),
        };
        if text.is_empty() {
            stream.write_byte(b'0');
            return Ok(());
        }
        let json = stream.cfg();
        let mut check = Iter::new(json, text.as_bytes());
        let valid = check.read_number_literal().is_ok() && check.is_at_end();
        if !valid {
            return Err(Error::invalid_value(format!(
                "invalid number literal {:?}",
                text
            )));
        }
        stream.write_raw(text.as_bytes());
        Ok(())
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::String(text) if text.is_empty())
    }
}

impl Decoder for NumberCodec {
    fn decode(&self, slot: &mut Value, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        let text = match iter.what_is_next() {
            ValueType::String => iter.read_string()?,
            ValueType::Nil => {
                iter.read_nil()?;
                String::new()
            }
            _ => String::from_utf8_lossy(iter.read_number_literal()?).into_owned(),
        };
        *slot = Value::String(text);
        Ok(())
    }
}
