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

//! Hooks for supplying or wrapping codecs.

use std::collections::HashMap;

use crate::codec::{DecoderRef, EncoderRef};
use crate::types::Type;

/// A recognizer consulted while codecs are built.
///
/// `create_*` hooks run before the built-in dispatch and win when they
/// return a codec; the result is used as is. `decorate_*` hooks see every
/// codec the engine builds itself and may wrap it.
///
/// ```rust
/// use std::sync::Arc;
/// use ferrojson_core::codec::{EncoderRef, FnEncoder};
/// use ferrojson_core::extension::Extension;
/// use ferrojson_core::json::Json;
/// use ferrojson_core::types::Type;
/// use ferrojson_core::value::Value;
///
/// struct Redact;
///
/// impl Extension for Redact {
///     fn create_encoder(&self, ty: &Type) -> Option<EncoderRef> {
///         (ty.name() == "Secret").then(|| {
///             Arc::new(FnEncoder::new(|_: &Value, stream| {
///                 stream.write_string("***");
///                 Ok(())
///             })) as EncoderRef
///         })
///     }
/// }
///
/// let mut json = Json::default();
/// json.register_extension(Redact);
/// ```
pub trait Extension: Send + Sync {
    fn create_encoder(&self, _ty: &Type) -> Option<EncoderRef> {
        None
    }

    fn create_decoder(&self, _ty: &Type) -> Option<DecoderRef> {
        None
    }

    fn create_map_key_encoder(&self, _ty: &Type) -> Option<EncoderRef> {
        None
    }

    fn create_map_key_decoder(&self, _ty: &Type) -> Option<DecoderRef> {
        None
    }

    fn decorate_encoder(&self, _ty: &Type, encoder: EncoderRef) -> EncoderRef {
        encoder
    }

    fn decorate_decoder(&self, _ty: &Type, decoder: DecoderRef) -> DecoderRef {
        decoder
    }
}

/// Codecs registered for individual types on one engine.
///
/// Consulted after the registered extensions for whole values, and before
/// them for map keys.
#[derive(Default, Clone)]
pub struct TypeOverrides {
    encoders: HashMap<Type, EncoderRef>,
    decoders: HashMap<Type, DecoderRef>,
    key_encoders: HashMap<Type, EncoderRef>,
    key_decoders: HashMap<Type, DecoderRef>,
}

impl TypeOverrides {
    pub fn set_encoder(&mut self, ty: Type, encoder: EncoderRef) {
        self.encoders.insert(ty, encoder);
    }

    pub fn set_decoder(&mut self, ty: Type, decoder: DecoderRef) {
        self.decoders.insert(ty, decoder);
    }

    pub fn set_map_key_encoder(&mut self, ty: Type, encoder: EncoderRef) {
        self.key_encoders.insert(ty, encoder);
    }

    pub fn set_map_key_decoder(&mut self, ty: Type, decoder: DecoderRef) {
        self.key_decoders.insert(ty, decoder);
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
            && self.decoders.is_empty()
            && self.key_encoders.is_empty()
            && self.key_decoders.is_empty()
    }
}

impl Extension for TypeOverrides {
    fn create_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.encoders.get(ty).cloned()
    }

    fn create_decoder(&self, ty: &Type) -> Option<DecoderRef> {
        self.decoders.get(ty).cloned()
    }

    fn create_map_key_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.key_encoders.get(ty).cloned()
    }

    fn create_map_key_decoder(&self, ty: &Type) -> Option<DecoderRef> {
        self.key_decoders.get(ty).cloned()
    }
}
