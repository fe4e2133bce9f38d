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

//! Output token writer.

use crate::error::Error;
use crate::json::Json;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Appends JSON tokens to an in-memory buffer.
///
/// A stream is tied to the [`Json`] that created it, so codecs reached through
/// an interface can look up further codecs with the same configuration.
pub struct Stream<'cfg> {
    cfg: &'cfg Json,
    buf: Vec<u8>,
}

impl<'cfg> Stream<'cfg> {
    pub fn new(cfg: &'cfg Json) -> Stream<'cfg> {
        Stream::with_buffer(cfg, Vec::with_capacity(64))
    }

    /// Writes after whatever `buf` already holds.
    pub fn with_buffer(cfg: &'cfg Json, buf: Vec<u8>) -> Stream<'cfg> {
        Stream { cfg, buf }
    }

    #[inline(always)]
    pub fn cfg(&self) -> &'cfg Json {
        self.cfg
    }

    #[inline(always)]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[inline(always)]
    pub fn write_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    #[inline(always)]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline(always)]
    pub fn write_nil(&mut self) {
        self.write_raw(b"null");
    }

    #[inline(always)]
    pub fn write_bool(&mut self, v: bool) {
        self.write_raw(if v { b"true" } else { b"false" });
    }

    pub fn write_int(&mut self, v: i64) {
        if v < 0 {
            self.buf.push(b'-');
        }
        self.write_digits(v.unsigned_abs());
    }

    pub fn write_uint(&mut self, v: u64) {
        self.write_digits(v);
    }

    fn write_digits(&mut self, mut v: u64) {
        let mut digits = [0u8; 20];
        let mut pos = digits.len();
        loop {
            pos -= 1;
            digits[pos] = b'0' + (v % 10) as u8;
            v /= 10;
            if v == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&digits[pos..]);
    }

    /// Shortest text that reads back as the same `f32`.
    pub fn write_float32(&mut self, v: f32) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::invalid_value(format!("unsupported value: {}", v)));
        }
        let abs = v.abs();
        let text = if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            format!("{:e}", v)
        } else {
            format!("{}", v)
        };
        self.write_raw(text.as_bytes());
        Ok(())
    }

    /// Shortest text that reads back as the same `f64`.
    pub fn write_float64(&mut self, v: f64) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::invalid_value(format!("unsupported value: {}", v)));
        }
        let abs = v.abs();
        let text = if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            format!("{:e}", v)
        } else {
            format!("{}", v)
        };
        self.write_raw(text.as_bytes());
        Ok(())
    }

    /// Writes a quoted string, escaping control characters and, when the
    /// config asks for it, `<`, `>` and `&`.
    pub fn write_string(&mut self, s: &str) {
        let escape_html = self.cfg.config().is_escape_html();
        self.buf.reserve(s.len() + 2);
        self.buf.push(b'"');
        let bytes = s.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let short: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x00..=0x1f => b"",
                b'<' | b'>' | b'&' if escape_html => b"",
                _ => continue,
            };
            self.buf.extend_from_slice(&bytes[start..i]);
            if short.is_empty() {
                self.buf
                    .extend_from_slice(&[b'\\', b'u', b'0', b'0', HEX[(b >> 4) as usize], HEX[(b & 0xf) as usize]]);
            } else {
                self.buf.extend_from_slice(short);
            }
            start = i + 1;
        }
        self.buf.extend_from_slice(&bytes[start..]);
        self.buf.push(b'"');
    }

    #[inline(always)]
    pub fn write_object_start(&mut self) {
        self.buf.push(b'{');
    }

    #[inline(always)]
    pub fn write_object_end(&mut self) {
        self.buf.push(b'}');
    }

    /// Writes `"name":`.
    pub fn write_object_field(&mut self, name: &str) {
        self.write_string(name);
        self.buf.push(b':');
    }

    #[inline(always)]
    pub fn write_empty_object(&mut self) {
        self.write_raw(b"{}");
    }

    #[inline(always)]
    pub fn write_array_start(&mut self) {
        self.buf.push(b'[');
    }

    #[inline(always)]
    pub fn write_array_end(&mut self) {
        self.buf.push(b']');
    }

    #[inline(always)]
    pub fn write_empty_array(&mut self) {
        self.write_raw(b"[]");
    }

    /// Separator between elements.
    #[inline(always)]
    pub fn write_more(&mut self) {
        self.buf.push(b',');
    }
}
