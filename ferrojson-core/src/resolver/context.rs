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

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::codec::{
    DecoderCell, DecoderRef, EncoderCell, EncoderRef, PlaceholderDecoder, PlaceholderEncoder,
};
use crate::config::Config;
use crate::json::Json;
use crate::types::Type;

/// State of one top-level codec build.
///
/// Holds the types currently under construction, so a type reached again
/// through its own fields resolves to a placeholder instead of recursing.
/// The context lives for a single build and is dropped afterwards.
pub struct BuildContext<'cfg> {
    json: &'cfg Json,
    prefix: String,
    encoders: HashMap<Type, EncoderCell>,
    decoders: HashMap<Type, DecoderCell>,
    finished_encoders: HashMap<Type, EncoderRef>,
    finished_decoders: HashMap<Type, DecoderRef>,
    embedding: Vec<Type>,
}

impl<'cfg> BuildContext<'cfg> {
    pub fn new(json: &'cfg Json) -> BuildContext<'cfg> {
        BuildContext {
            json,
            prefix: String::new(),
            encoders: HashMap::new(),
            decoders: HashMap::new(),
            finished_encoders: HashMap::new(),
            finished_decoders: HashMap::new(),
            embedding: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn json(&self) -> &'cfg Json {
        self.json
    }

    #[inline(always)]
    pub fn config(&self) -> &'cfg Config {
        self.json.config()
    }

    /// Breadcrumb of the location being built, empty at the root.
    #[inline(always)]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Runs `f` with `segment` appended to the breadcrumb.
    pub fn with_prefix<R>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let len = self.prefix.len();
        if !self.prefix.is_empty() {
            self.prefix.push(' ');
        }
        self.prefix.push_str(segment);
        let result = f(self);
        self.prefix.truncate(len);
        result
    }

    /// Encoder for a type already seen in this build: the finished codec if
    /// there is one, else a placeholder that resolves once it is.
    pub(crate) fn known_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        if let Some(done) = self.finished_encoders.get(ty) {
            return Some(done.clone());
        }
        let cell = self.encoders.get(ty)?;
        Some(Arc::new(PlaceholderEncoder::new(ty.clone(), cell.clone())))
    }

    pub(crate) fn begin_encoder(&mut self, ty: &Type) -> EncoderCell {
        let cell: EncoderCell = Arc::new(OnceLock::new());
        self.encoders.insert(ty.clone(), cell.clone());
        cell
    }

    pub(crate) fn known_decoder(&self, ty: &Type) -> Option<DecoderRef> {
        if let Some(done) = self.finished_decoders.get(ty) {
            return Some(done.clone());
        }
        let cell = self.decoders.get(ty)?;
        Some(Arc::new(PlaceholderDecoder::new(ty.clone(), cell.clone())))
    }

    /// Fills the placeholder cell of `ty` and keeps the codec alive for the
    /// rest of the build, even if the caller that asked for it drops it.
    pub(crate) fn finish_encoder(&mut self, ty: &Type, cell: &EncoderCell, encoder: &EncoderRef) {
        let _ = cell.set(Arc::downgrade(encoder));
        self.finished_encoders.insert(ty.clone(), encoder.clone());
    }

    pub(crate) fn begin_decoder(&mut self, ty: &Type) -> DecoderCell {
        let cell: DecoderCell = Arc::new(OnceLock::new());
        self.decoders.insert(ty.clone(), cell.clone());
        cell
    }

    pub(crate) fn finish_decoder(&mut self, ty: &Type, cell: &DecoderCell, decoder: &DecoderRef) {
        let _ = cell.set(Arc::downgrade(decoder));
        self.finished_decoders.insert(ty.clone(), decoder.clone());
    }

    /// Marks `ty` as being flattened into its parent; false if it already is.
    pub(crate) fn enter_embedded(&mut self, ty: &Type) -> bool {
        if self.embedding.contains(ty) {
            return false;
        }
        self.embedding.push(ty.clone());
        true
    }

    pub(crate) fn leave_embedded(&mut self) {
        self.embedding.pop();
    }
}
