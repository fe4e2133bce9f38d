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

//! # Ferrojson
//!
//! Reflection-driven JSON encoding and decoding. Describe a type once, as a
//! [`Type`] or through [`Reflect`], and the [`Json`] engine builds a codec for
//! it on first use, caches it, and reuses it from any thread.
//!
//! ## Key Features
//!
//! - **Per-type codecs**: built once per engine, shared afterwards
//! - **Recursive types**: linked lists, trees and self-referential maps
//! - **Absent versus empty**: `null` and `[]` / `{}` stay distinct both ways
//! - **Custom contracts**: JSON and text marshal routines on named types
//! - **Open and constrained interfaces**: values typed at run time
//! - **Extensions**: supply or decorate the codec of any type
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrojson::{Json, Type, Value};
//!
//! let json = Json::compatible();
//! let ty = Type::map(Type::string(), Type::int());
//! let value = Value::map([
//!     (Value::string("b"), Value::Int(2)),
//!     (Value::string("a"), Value::Int(1)),
//! ]);
//! assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"{"a":1,"b":2}"#);
//! ```
//!
//! ## Rust types
//!
//! Std types implement [`Reflect`] out of the box:
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use ferrojson::Json;
//!
//! let json = Json::default();
//! let mut scores = BTreeMap::new();
//! scores.insert(2u32, vec![Some(1.5f64), None]);
//! let bytes = json.serialize(&scores).unwrap();
//! assert_eq!(bytes, br#"{"2":[1.5,null]}"#);
//! let back: BTreeMap<u32, Vec<Option<f64>>> = json.deserialize(&bytes).unwrap();
//! assert_eq!(back, scores);
//! ```
//!
//! ## Custom marshal contracts
//!
//! ```rust
//! use ferrojson::{Json, Kind, Receiver, TypeBuilder, Value};
//!
//! let celsius = TypeBuilder::new("Celsius")
//!     .marshal_text(Receiver::Value, |v: &Value| Ok(format!("{}C", v.as_f64().unwrap_or(0.0))))
//!     .build(Kind::Float64);
//! let json = Json::default();
//! assert_eq!(json.marshal_to_string(&Value::Float(21.5), &celsius).unwrap(), r#""21.5C""#);
//! ```

pub use ferrojson_core::{
    codec, config, error, extension, iter, reflect, resolver, stream, types, value,
};
pub use ferrojson_core::{
    named_type, struct_fields, Capability, Config, Decoder, DecoderRef, Dynamic, Encoder,
    EncoderRef, Error, Extension, Field, FnDecoder, FnEncoder, Iter, Json, Kind, Receiver,
    Reflect, Stream, Type, TypeBuilder, TypeOverrides, Value, ValueType,
};
