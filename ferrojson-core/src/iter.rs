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

//! Input token reader.

use std::collections::HashMap;

use crate::error::Error;
use crate::json::Json;
use crate::types::Type;
use crate::value::Value;

/// Classification of the next token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Invalid,
    String,
    Number,
    Nil,
    Bool,
    Array,
    Object,
}

/// Reads JSON tokens from a byte slice.
///
/// The iterator tracks nesting depth so the engine can bound recursion and
/// check that every codec left the nesting balanced.
pub struct Iter<'cfg, 'a> {
    cfg: &'cfg Json,
    buf: &'a [u8],
    head: usize,
    depth: u32,
    at_eof: bool,
}

impl<'cfg, 'a> Iter<'cfg, 'a> {
    pub fn new(cfg: &'cfg Json, buf: &'a [u8]) -> Iter<'cfg, 'a> {
        Iter {
            cfg,
            buf,
            head: 0,
            depth: 0,
            at_eof: false,
        }
    }

    #[inline(always)]
    pub fn cfg(&self) -> &'cfg Json {
        self.cfg
    }

    #[inline(always)]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline(always)]
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.cfg.config().max_depth() {
            return Err(Error::depth_exceed(format!(
                "max depth {} exceeded at byte {}",
                self.cfg.config().max_depth(),
                self.head
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\n' | b'\t' | b'\r') = self.buf.get(self.head) {
            self.head += 1;
        }
    }

    /// Returns the next non-whitespace byte and consumes it, or 0 at end of input.
    pub fn next_token(&mut self) -> u8 {
        self.skip_whitespace();
        match self.buf.get(self.head) {
            Some(&c) => {
                self.head += 1;
                self.at_eof = false;
                c
            }
            None => {
                self.at_eof = true;
                0
            }
        }
    }

    /// Steps back over the byte returned by the last [`next_token`](Self::next_token).
    /// Does nothing if that call hit the end of input.
    #[inline]
    pub fn unread_byte(&mut self) {
        if !self.at_eof {
            self.head = self.head.saturating_sub(1);
        }
    }

    pub fn what_is_next(&mut self) -> ValueType {
        self.skip_whitespace();
        match self.buf.get(self.head) {
            Some(b'"') => ValueType::String,
            Some(b'n') => ValueType::Nil,
            Some(b't' | b'f') => ValueType::Bool,
            Some(b'-' | b'0'..=b'9') => ValueType::Number,
            Some(b'[') => ValueType::Array,
            Some(b'{') => ValueType::Object,
            _ => ValueType::Invalid,
        }
    }

    /// Whether only whitespace remains.
    pub fn is_at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.head >= self.buf.len()
    }

    /// Builds a syntax error pointing at the current position, or the
    /// end-of-input sentinel when the input ran out.
    #[cold]
    pub fn report_error(&self, operation: &str, msg: &str) -> Error {
        if self.head >= self.buf.len() {
            return Error::eof(format!("{}: {}, unexpected end of input", operation, msg));
        }
        let from = self.head.saturating_sub(10);
        let to = (self.head + 10).min(self.buf.len());
        Error::syntax(format!(
            "{}: {}, error found in #{} byte of ...|{}|...",
            operation,
            msg,
            self.head,
            String::from_utf8_lossy(&self.buf[from..to])
        ))
    }

    /// Builds an error for an unexpected token `c` read by `next_token`.
    #[cold]
    pub fn unexpected(&self, operation: &str, expected: &str, c: u8) -> Error {
        if c == 0 {
            return self.report_error(operation, expected);
        }
        self.report_error(
            operation,
            &format!("{}, but found {}", expected, c as char),
        )
    }

    fn expect_literal(&mut self, rest: &[u8]) -> Result<(), Error> {
        if self.buf.len() < self.head + rest.len() {
            self.head = self.buf.len();
            return Err(self.report_error("readLiteral", "incomplete literal"));
        }
        if &self.buf[self.head..self.head + rest.len()] != rest {
            return Err(self.report_error("readLiteral", "invalid literal"));
        }
        self.head += rest.len();
        Ok(())
    }

    /// Consumes `null` and returns true, or leaves the input untouched.
    pub fn read_nil(&mut self) -> Result<bool, Error> {
        let c = self.next_token();
        if c == b'n' {
            self.expect_literal(b"ull")?;
            return Ok(true);
        }
        self.unread_byte();
        Ok(false)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.next_token() {
            b't' => {
                self.expect_literal(b"rue")?;
                Ok(true)
            }
            b'f' => {
                self.expect_literal(b"alse")?;
                Ok(false)
            }
            c => Err(self.unexpected("ReadBool", "expect t or f", c)),
        }
    }

    /// Returns the text of the next number literal.
    pub fn read_number_literal(&mut self) -> Result<&'a [u8], Error> {
        self.skip_whitespace();
        let start = self.head;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = self.buf.get(self.head) {
            self.head += 1;
        }
        let lit = &self.buf[start..self.head];
        if lit.is_empty() {
            let c = self.next_token();
            return Err(self.unexpected("read_number", "expect number", c));
        }
        if !is_valid_number(lit) {
            return Err(self.report_error(
                "read_number",
                &format!("invalid number {}", String::from_utf8_lossy(lit)),
            ));
        }
        Ok(lit)
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        let lit = self.read_number_literal()?;
        // literal is plain ASCII
        let text = std::str::from_utf8(lit).unwrap_or_default();
        text.parse::<i64>().map_err(|_| {
            if text.contains(['.', 'e', 'E']) {
                Error::invalid_value(format!("read_i64: can not decode float {} as int", text))
            } else {
                Error::invalid_value(format!("read_i64: {} overflows int64", text))
            }
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let lit = self.read_number_literal()?;
        let text = std::str::from_utf8(lit).unwrap_or_default();
        text.parse::<u64>().map_err(|_| {
            if text.contains(['.', 'e', 'E']) {
                Error::invalid_value(format!("read_u64: can not decode float {} as uint", text))
            } else {
                Error::invalid_value(format!("read_u64: {} overflows uint64", text))
            }
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let lit = self.read_number_literal()?;
        let text = std::str::from_utf8(lit).unwrap_or_default();
        text.parse::<f64>()
            .map_err(|_| Error::invalid_value(format!("read_f64: invalid number {}", text)))
    }

    /// Reads a quoted string. A `null` token reads as the empty string.
    pub fn read_string(&mut self) -> Result<String, Error> {
        match self.next_token() {
            b'"' => {}
            b'n' => {
                self.expect_literal(b"ull")?;
                return Ok(String::new());
            }
            c => return Err(self.unexpected("ReadString", "expects \" or n", c)),
        }
        let mut out: Vec<u8> = Vec::new();
        loop {
            let start = self.head;
            while let Some(&b) = self.buf.get(self.head) {
                if b == b'"' || b == b'\\' {
                    break;
                }
                self.head += 1;
            }
            out.extend_from_slice(&self.buf[start..self.head]);
            match self.buf.get(self.head) {
                Some(b'"') => {
                    self.head += 1;
                    break;
                }
                Some(b'\\') => {
                    self.head += 1;
                    self.read_escape(&mut out)?;
                }
                _ => return Err(self.report_error("ReadString", "incomplete string")),
            }
        }
        String::from_utf8(out).map_err(|_| self.report_error("ReadString", "invalid utf-8"))
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<(), Error> {
        let c = match self.buf.get(self.head) {
            Some(&c) => c,
            None => return Err(self.report_error("ReadString", "incomplete escape")),
        };
        self.head += 1;
        let unescaped = match c {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let mut code = self.read_hex4()? as u32;
                if (0xD800..0xDC00).contains(&code)
                    && self.buf.get(self.head..self.head + 2) == Some(b"\\u".as_slice())
                {
                    self.head += 2;
                    let low = self.read_hex4()? as u32;
                    if (0xDC00..0xE000).contains(&low) {
                        code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    } else {
                        push_char(out, char::REPLACEMENT_CHARACTER);
                        code = low;
                    }
                }
                push_char(out, char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                return Ok(());
            }
            other => {
                return Err(self.report_error(
                    "ReadString",
                    &format!("invalid escape char after \\: {}", other as char),
                ))
            }
        };
        out.push(unescaped);
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u16, Error> {
        let digits = match self.buf.get(self.head..self.head + 4) {
            Some(d) => d,
            None => return Err(self.report_error("ReadString", "incomplete unicode escape")),
        };
        let text = std::str::from_utf8(digits).unwrap_or_default();
        let code = u16::from_str_radix(text, 16)
            .map_err(|_| self.report_error("ReadString", "invalid unicode escape"))?;
        self.head += 4;
        Ok(code)
    }

    /// Skips the next value.
    ///
    /// Nesting is tracked on a heap stack of pending closing brackets, so
    /// deep input costs memory rather than native stack.
    pub fn skip(&mut self) -> Result<(), Error> {
        let mut open: Vec<u8> = Vec::new();
        loop {
            match self.next_token() {
                b'"' => self.skip_string_body()?,
                b'n' => self.expect_literal(b"ull")?,
                b't' => self.expect_literal(b"rue")?,
                b'f' => self.expect_literal(b"alse")?,
                b'-' | b'0'..=b'9' => {
                    self.unread_byte();
                    self.read_number_literal()?;
                }
                b'[' => {
                    self.inc_depth()?;
                    if self.next_token() == b']' {
                        self.dec_depth();
                    } else {
                        self.unread_byte();
                        open.push(b']');
                        continue;
                    }
                }
                b'{' => {
                    self.inc_depth()?;
                    if self.next_token() == b'}' {
                        self.dec_depth();
                    } else {
                        self.unread_byte();
                        open.push(b'}');
                        self.skip_object_key()?;
                        continue;
                    }
                }
                c => return Err(self.unexpected("skip", "expect any value", c)),
            }
            loop {
                let Some(&close) = open.last() else {
                    return Ok(());
                };
                match self.next_token() {
                    b',' => {
                        if close == b'}' {
                            self.skip_object_key()?;
                        }
                        break;
                    }
                    c if c == close => {
                        open.pop();
                        self.dec_depth();
                    }
                    c if close == b']' => return Err(self.unexpected("skip", "expect ] or ,", c)),
                    c => return Err(self.unexpected("skip", "expect } or ,", c)),
                }
            }
        }
    }

    fn skip_object_key(&mut self) -> Result<(), Error> {
        match self.next_token() {
            b'"' => self.skip_string_body()?,
            c => return Err(self.unexpected("skip", "expect \"", c)),
        }
        match self.next_token() {
            b':' => Ok(()),
            c => Err(self.unexpected("skip", "expect :", c)),
        }
    }

    fn skip_string_body(&mut self) -> Result<(), Error> {
        while let Some(&b) = self.buf.get(self.head) {
            self.head += 1;
            match b {
                b'"' => return Ok(()),
                b'\\' => self.head += 1,
                _ => {}
            }
        }
        self.head = self.buf.len();
        Err(self.report_error("skip", "incomplete string"))
    }

    /// Skips the next value and returns its exact bytes.
    pub fn skip_and_return_bytes(&mut self) -> Result<&'a [u8], Error> {
        self.skip_whitespace();
        let start = self.head;
        self.skip()?;
        Ok(&self.buf[start..self.head])
    }

    /// Reads the next value as an untyped document: numbers become floats,
    /// arrays lists and objects maps keyed by strings.
    pub fn read_any(&mut self) -> Result<Value, Error> {
        self.read_document(false)
    }

    /// Reads the next value the way an empty open interface receives it:
    /// `bool`, `float64` (or `Number`), `string`, `[]interface {}` or
    /// `map[string]interface {}`, each wrapped with its concrete type.
    pub fn read_interface(&mut self) -> Result<Value, Error> {
        self.read_document(true)
    }

    fn read_document(&mut self, typed: bool) -> Result<Value, Error> {
        let wrap = |ty: fn() -> Type, value: Value| {
            if typed {
                Value::dynamic(ty(), value)
            } else {
                value
            }
        };
        let list_type: fn() -> Type = || Type::slice(Type::interface());
        let map_type: fn() -> Type = || Type::map(Type::string(), Type::interface());
        let mut open: Vec<Container> = Vec::new();
        loop {
            let mut value = match self.what_is_next() {
                ValueType::Nil => {
                    self.read_nil()?;
                    Value::Null
                }
                ValueType::Bool => wrap(Type::bool, Value::Bool(self.read_bool()?)),
                ValueType::String => wrap(Type::string, Value::String(self.read_string()?)),
                ValueType::Number => {
                    if typed && self.cfg.config().is_use_number() {
                        let lit = self.read_number_literal()?;
                        let text = String::from_utf8_lossy(lit).into_owned();
                        wrap(Type::number, Value::String(text))
                    } else {
                        wrap(Type::float64, Value::Float(self.read_f64()?))
                    }
                }
                ValueType::Array => {
                    self.next_token();
                    self.inc_depth()?;
                    if self.next_token() == b']' {
                        self.dec_depth();
                        wrap(list_type, Value::List(Vec::new()))
                    } else {
                        self.unread_byte();
                        open.push(Container::List(Vec::new()));
                        continue;
                    }
                }
                ValueType::Object => {
                    self.next_token();
                    self.inc_depth()?;
                    if self.next_token() == b'}' {
                        self.dec_depth();
                        wrap(map_type, Value::Map(HashMap::new()))
                    } else {
                        self.unread_byte();
                        let key = self.read_object_key()?;
                        open.push(Container::Map(HashMap::new(), key));
                        continue;
                    }
                }
                ValueType::Invalid => {
                    let c = self.next_token();
                    return Err(self.unexpected("read_any", "expect any value", c));
                }
            };
            loop {
                let Some(container) = open.pop() else {
                    return Ok(value);
                };
                match container {
                    Container::List(mut items) => {
                        items.push(value);
                        match self.next_token() {
                            b',' => {
                                open.push(Container::List(items));
                                break;
                            }
                            b']' => {
                                self.dec_depth();
                                value = wrap(list_type, Value::List(items));
                            }
                            c => return Err(self.unexpected("read_any", "expect ] or ,", c)),
                        }
                    }
                    Container::Map(mut entries, key) => {
                        entries.insert(Value::String(key), value);
                        match self.next_token() {
                            b',' => {
                                let key = self.read_object_key()?;
                                open.push(Container::Map(entries, key));
                                break;
                            }
                            b'}' => {
                                self.dec_depth();
                                value = wrap(map_type, Value::Map(entries));
                            }
                            c => return Err(self.unexpected("read_any", "expect } or ,", c)),
                        }
                    }
                }
            }
        }
    }

    fn read_object_key(&mut self) -> Result<String, Error> {
        let key = match self.what_is_next() {
            ValueType::String => self.read_string()?,
            _ => {
                let c = self.next_token();
                return Err(self.unexpected("read_any", "expect \"", c));
            }
        };
        match self.next_token() {
            b':' => Ok(key),
            c => Err(self.unexpected("read_any", "expect :", c)),
        }
    }
}

/// A container of an untyped document still being read, with the key of
/// the entry awaiting its value for objects.
enum Container {
    List(Vec<Value>),
    Map(HashMap<Value, Value>, String),
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut utf8 = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
}

/// JSON number grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
fn is_valid_number(lit: &[u8]) -> bool {
    let mut i = 0;
    let n = lit.len();
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < n && lit[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > start
    };
    if i < n && lit[i] == b'-' {
        i += 1;
    }
    if i < n && lit[i] == b'0' {
        i += 1;
    } else if !digits(&mut i) {
        return false;
    }
    if i < n && lit[i] == b'.' {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if i < n && (lit[i] == b'e' || lit[i] == b'E') {
        i += 1;
        if i < n && (lit[i] == b'+' || lit[i] == b'-') {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == n
}
