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

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::codec::{DecoderRef, EncoderRef, OnePtrEncoder};
use crate::config::Config;
use crate::error::Error;
use crate::extension::{Extension, TypeOverrides};
use crate::iter::Iter;
use crate::reflect::Reflect;
use crate::resolver::builder::{decoder_of_type, encoder_of_map_key, encoder_of_type};
use crate::resolver::pool::{buffer_pool, BufferPool};
use crate::resolver::{BuildContext, CodecCache, Direction};
use crate::stream::Stream;
use crate::types::Type;
use crate::value::Value;

/// The JSON codec engine.
///
/// `Json` builds one encoder and one decoder per type on first use and
/// caches them for its lifetime, so later calls for the same type skip all
/// reflection on the type description.
///
/// # Features
///
/// - **Recursive types**: self-referential structs, slices and maps resolve
///   through placeholders instead of recursing forever
/// - **Custom contracts**: JSON and text marshal routines declared on a type
///   take over its encoding and decoding
/// - **Extensions**: supply or wrap the codec of any type
/// - **Thread safety**: one engine can be shared across threads; codecs are
///   immutable once cached
///
/// # Examples
///
/// ```rust
/// use ferrojson_core::json::Json;
/// use ferrojson_core::types::Type;
/// use ferrojson_core::value::Value;
///
/// let json = Json::default();
/// let ty = Type::map(Type::string(), Type::slice(Type::int()));
/// let value = Value::map([(Value::string("a"), Value::list([Value::Int(1), Value::Int(2)]))]);
/// let bytes = json.marshal(&value, &ty).unwrap();
/// assert_eq!(bytes, br#"{"a":[1,2]}"#);
///
/// let mut back = Value::Null;
/// json.unmarshal(&bytes, &mut back, &ty).unwrap();
/// assert_eq!(back, value);
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use ferrojson_core::json::Json;
///
/// let json = Json::default().sort_map_keys(true).max_depth(64);
/// assert!(json.config().is_sort_map_keys());
/// ```
pub struct Json {
    config: Config,
    extensions: Vec<Arc<dyn Extension>>,
    overrides: TypeOverrides,
    cache: CodecCache,
    buffer_pool: BufferPool,
}

impl Default for Json {
    fn default() -> Self {
        Json::new(Config::default())
    }
}

impl Json {
    pub fn new(config: Config) -> Json {
        Json {
            config,
            extensions: Vec::new(),
            overrides: TypeOverrides::default(),
            cache: CodecCache::default(),
            buffer_pool: buffer_pool(),
        }
    }

    /// Behaves like the standard library encoder: sorted map keys and
    /// HTML-safe strings.
    pub fn compatible() -> Json {
        Json::new(Config {
            sort_map_keys: true,
            escape_html: true,
            ..Config::default()
        })
    }

    /// Unsorted maps and no HTML escaping.
    pub fn fastest() -> Json {
        Json::new(Config {
            sort_map_keys: false,
            escape_html: false,
            ..Config::default()
        })
    }

    /// Sets whether struct fields are matched case-sensitively on decode.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrojson_core::json::Json;
    ///
    /// let json = Json::default().case_sensitive(true);
    /// assert!(json.config().is_case_sensitive());
    /// ```
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.config.case_sensitive = case_sensitive;
        self.cache.clear();
        self
    }

    /// Sets whether map entries are written sorted by key.
    pub fn sort_map_keys(mut self, sort_map_keys: bool) -> Self {
        self.config.sort_map_keys = sort_map_keys;
        self.cache.clear();
        self
    }

    pub fn escape_html(mut self, escape_html: bool) -> Self {
        self.config.escape_html = escape_html;
        self
    }

    /// Sets whether numbers read into an open interface keep their literal text.
    pub fn use_number(mut self, use_number: bool) -> Self {
        self.config.use_number = use_number;
        self
    }

    /// Sets the maximum nesting depth accepted on decode.
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Arrays and objects nested deeper than this fail with
    ///   [`Error::DepthExceed`]. Defaults to
    ///   [`DEFAULT_MAX_DEPTH`](crate::config::DEFAULT_MAX_DEPTH) (128). Raising it
    ///   lets deeply nested typed values recurse further on the native stack.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CodecCache {
        &self.cache
    }

    /// Scratch buffers for codecs that render into a side buffer first.
    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    /// Registers an extension. Extensions are consulted in registration order.
    ///
    /// Codecs cached so far are dropped so the extension applies to every type.
    pub fn register_extension(&mut self, extension: impl Extension + 'static) {
        self.extensions.push(Arc::new(extension));
        self.cache.clear();
    }

    /// Uses `encoder` for every location of type `ty`.
    pub fn register_type_encoder(&mut self, ty: &Type, encoder: EncoderRef) {
        self.overrides.set_encoder(ty.clone(), encoder);
        self.cache.clear();
    }

    pub fn register_type_decoder(&mut self, ty: &Type, decoder: DecoderRef) {
        self.overrides.set_decoder(ty.clone(), decoder);
        self.cache.clear();
    }

    /// Uses `encoder` for map keys of type `ty`. It must write a JSON string.
    pub fn register_map_key_encoder(&mut self, ty: &Type, encoder: EncoderRef) {
        self.overrides.set_map_key_encoder(ty.clone(), encoder);
        self.cache.clear();
    }

    pub fn register_map_key_decoder(&mut self, ty: &Type, decoder: DecoderRef) {
        self.overrides.set_map_key_decoder(ty.clone(), decoder);
        self.cache.clear();
    }

    pub(crate) fn extension_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.extensions
            .iter()
            .find_map(|ext| ext.create_encoder(ty))
            .or_else(|| self.overrides.create_encoder(ty))
    }

    pub(crate) fn extension_decoder(&self, ty: &Type) -> Option<DecoderRef> {
        self.extensions
            .iter()
            .find_map(|ext| ext.create_decoder(ty))
            .or_else(|| self.overrides.create_decoder(ty))
    }

    pub(crate) fn extension_map_key_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.overrides
            .create_map_key_encoder(ty)
            .or_else(|| self.extensions.iter().find_map(|ext| ext.create_map_key_encoder(ty)))
    }

    pub(crate) fn extension_map_key_decoder(&self, ty: &Type) -> Option<DecoderRef> {
        self.overrides
            .create_map_key_decoder(ty)
            .or_else(|| self.extensions.iter().find_map(|ext| ext.create_map_key_decoder(ty)))
    }

    pub(crate) fn decorate_encoder(&self, ty: &Type, encoder: EncoderRef) -> EncoderRef {
        self.extensions
            .iter()
            .fold(encoder, |encoder, ext| ext.decorate_encoder(ty, encoder))
    }

    pub(crate) fn decorate_decoder(&self, ty: &Type, decoder: DecoderRef) -> DecoderRef {
        self.extensions
            .iter()
            .fold(decoder, |decoder, ext| ext.decorate_decoder(ty, decoder))
    }

    /// Returns the encoder for `ty`, building and caching it on first use.
    ///
    /// Pointer-like root types get wrapped so the root location is
    /// addressed the same way nested ones are.
    pub fn encoder_of(&self, ty: &Type) -> EncoderRef {
        if let Some(encoder) = self.cache.encoder(ty) {
            trace!(ty = %ty, "encoder cache hit");
            return encoder;
        }
        let start = Instant::now();
        let mut ctx = BuildContext::new(self);
        let mut encoder = encoder_of_type(&mut ctx, ty);
        if ty.likes_ptr() {
            encoder = Arc::new(OnePtrEncoder { inner: encoder });
        }
        debug!(ty = %ty, direction = ?Direction::Encode, elapsed = ?start.elapsed(), "built codec");
        self.cache.store_encoder(ty, encoder.clone());
        encoder
    }

    /// Returns the decoder for `ty`, building and caching it on first use.
    pub fn decoder_of(&self, ty: &Type) -> DecoderRef {
        if let Some(decoder) = self.cache.decoder(ty) {
            trace!(ty = %ty, "decoder cache hit");
            return decoder;
        }
        let start = Instant::now();
        let mut ctx = BuildContext::new(self);
        let decoder = decoder_of_type(&mut ctx, ty);
        debug!(ty = %ty, direction = ?Direction::Decode, elapsed = ?start.elapsed(), "built codec");
        self.cache.store_decoder(ty, decoder.clone());
        decoder
    }

    /// Map key encoder for `ty`, used when keys are only typed at run time.
    pub fn map_key_encoder_of(&self, ty: &Type) -> EncoderRef {
        if let Some(encoder) = self.cache.map_key_encoder(ty) {
            trace!(ty = %ty, "map key encoder cache hit");
            return encoder;
        }
        let start = Instant::now();
        let mut ctx = BuildContext::new(self);
        let encoder = encoder_of_map_key(&mut ctx, ty);
        debug!(ty = %ty, direction = ?Direction::MapKeyEncode, elapsed = ?start.elapsed(), "built codec");
        self.cache.store_map_key_encoder(ty, encoder.clone());
        encoder
    }

    /// Writes `value` of type `ty` to `stream`.
    pub fn write_val(&self, value: &Value, ty: &Type, stream: &mut Stream<'_>) -> Result<(), Error> {
        self.encoder_of(ty).encode(value, stream)
    }

    /// Reads the next value into `slot` as type `ty`.
    ///
    /// Fails if the decoder leaves the nesting depth unbalanced.
    pub fn read_val(&self, slot: &mut Value, ty: &Type, iter: &mut Iter<'_, '_>) -> Result<(), Error> {
        let depth = iter.depth();
        self.decoder_of(ty).decode(slot, iter)?;
        if iter.depth() != depth {
            return Err(Error::invariant(format!(
                "{}: unexpected mismatched nesting, depth {} after decoding at {}",
                ty,
                iter.depth(),
                depth
            )));
        }
        Ok(())
    }

    /// Encodes `value` as type `ty`.
    ///
    /// # Returns
    ///
    /// The JSON bytes, or the first error any codec reported.
    pub fn marshal(&self, value: &Value, ty: &Type) -> Result<Vec<u8>, Error> {
        let mut stream = Stream::new(self);
        self.write_val(value, ty, &mut stream)?;
        Ok(stream.into_inner())
    }

    pub fn marshal_to_string(&self, value: &Value, ty: &Type) -> Result<String, Error> {
        let bytes = self.marshal(value, ty)?;
        String::from_utf8(bytes).map_err(|e| Error::unknown(e.to_string()))
    }

    /// Decodes `data` into `slot` as type `ty`.
    ///
    /// `slot` is updated in place: pointers and maps already present are
    /// decoded into, not replaced. Anything but whitespace after the value
    /// is an error.
    pub fn unmarshal(&self, data: &[u8], slot: &mut Value, ty: &Type) -> Result<(), Error> {
        let mut iter = Iter::new(self, data);
        self.read_val(slot, ty, &mut iter)?;
        if !iter.is_at_end() {
            return Err(iter.report_error("unmarshal", "there are bytes left after unmarshal"));
        }
        Ok(())
    }

    /// Encodes a Rust value through its [`Reflect`] description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use ferrojson_core::json::Json;
    ///
    /// let json = Json::default().sort_map_keys(true);
    /// let scores = HashMap::from([("b".to_string(), 2u8), ("a".to_string(), 1u8)]);
    /// assert_eq!(json.serialize(&scores).unwrap(), br#"{"a":1,"b":2}"#);
    /// ```
    pub fn serialize<T: Reflect>(&self, value: &T) -> Result<Vec<u8>, Error> {
        self.marshal(&value.to_value(), &T::json_type())
    }

    /// Decodes into a fresh Rust value through its [`Reflect`] description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrojson_core::json::Json;
    ///
    /// let json = Json::default();
    /// let v: Vec<Option<i32>> = json.deserialize(b"[1, null, 3]").unwrap();
    /// assert_eq!(v, vec![Some(1), None, Some(3)]);
    /// ```
    pub fn deserialize<T: Reflect>(&self, data: &[u8]) -> Result<T, Error> {
        let ty = T::json_type();
        let mut slot = Value::zero(&ty);
        self.unmarshal(data, &mut slot, &ty)?;
        T::from_value(slot)
    }
}
