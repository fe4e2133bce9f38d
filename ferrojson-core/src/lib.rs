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

//! # Ferrojson Core
//!
//! Core implementation of the ferrojson codec engine: a reflection-driven
//! JSON encoder and decoder that builds one codec per type, on demand, and
//! caches it for reuse.
//!
//! ## Architecture
//!
//! - **`json`**: the [`Json`] engine and its public API
//! - **`types`**: type descriptors the engine dispatches on
//! - **`value`**: dynamic values codecs read from and write into
//! - **`reflect`**: mapping Rust types onto descriptors and values
//! - **`codec`**: encoders and decoders per type shape
//! - **`resolver`**: codec construction, placeholders and the codec cache
//! - **`extension`**: hooks to supply or wrap codecs
//! - **`stream`** / **`iter`**: token writer and reader
//! - **`config`** / **`error`**: engine options and the error type
//!
//! ## Key Concepts
//!
//! ### Absent versus empty
//!
//! A nil slice or map encodes as `null` and an empty one as `[]` / `{}`;
//! decoding keeps the distinction.
//!
//! ### Recursive types
//!
//! While a codec is built, a type reached again through its own fields is
//! wired to a placeholder that resolves to the finished codec, so
//! self-referential types need no special handling.
//!
//! ### Deferred errors
//!
//! Types that cannot be represented in JSON (channels, functions, complex
//! numbers) still get a codec. It writes `null` for nil locations and only
//! fails when a real value reaches it.
//!
//! ## Usage
//!
//! ```rust
//! use ferrojson_core::{Json, Type, Value};
//!
//! let json = Json::default();
//! let ty = Type::slice(Type::ptr(Type::string()));
//! let value = Value::list([Value::ptr(Value::string("a")), Value::Null]);
//! assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"["a",null]"#);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod extension;
pub mod iter;
pub mod json;
pub mod reflect;
pub mod resolver;
pub mod stream;
pub mod types;
pub mod value;

pub use codec::{Decoder, DecoderRef, Encoder, EncoderRef, FnDecoder, FnEncoder};
pub use config::Config;
pub use error::Error;
pub use extension::{Extension, TypeOverrides};
pub use iter::{Iter, ValueType};
pub use json::Json;
pub use reflect::{named_type, struct_fields, Reflect};
pub use stream::Stream;
pub use types::{Capability, Field, Kind, Receiver, Type, TypeBuilder};
pub use value::{Dynamic, Value};
