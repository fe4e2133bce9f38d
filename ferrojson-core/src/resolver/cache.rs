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

use dashmap::DashMap;
use tracing::debug;

use crate::codec::{DecoderRef, EncoderRef};
use crate::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Encode,
    Decode,
    MapKeyEncode,
}

/// Process-wide codec cache of one engine, keyed by type and direction.
///
/// Lookups never block on a build. Two threads may build the same codec
/// at once; the last store wins and both results are equivalent.
#[derive(Default)]
pub struct CodecCache {
    encoders: DashMap<Type, EncoderRef>,
    decoders: DashMap<Type, DecoderRef>,
    key_encoders: DashMap<Type, EncoderRef>,
}

impl CodecCache {
    pub fn encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.encoders.get(ty).map(|e| e.value().clone())
    }

    pub fn decoder(&self, ty: &Type) -> Option<DecoderRef> {
        self.decoders.get(ty).map(|d| d.value().clone())
    }

    pub fn map_key_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        self.key_encoders.get(ty).map(|e| e.value().clone())
    }

    pub fn store_encoder(&self, ty: &Type, encoder: EncoderRef) {
        if self.encoders.insert(ty.clone(), encoder).is_some() {
            debug!(ty = %ty, direction = ?Direction::Encode, "replaced concurrently built codec");
        }
    }

    pub fn store_decoder(&self, ty: &Type, decoder: DecoderRef) {
        if self.decoders.insert(ty.clone(), decoder).is_some() {
            debug!(ty = %ty, direction = ?Direction::Decode, "replaced concurrently built codec");
        }
    }

    pub fn store_map_key_encoder(&self, ty: &Type, encoder: EncoderRef) {
        if self.key_encoders.insert(ty.clone(), encoder).is_some() {
            debug!(ty = %ty, direction = ?Direction::MapKeyEncode, "replaced concurrently built codec");
        }
    }

    pub fn len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Encode => self.encoders.len(),
            Direction::Decode => self.decoders.len(),
            Direction::MapKeyEncode => self.key_encoders.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty() && self.decoders.is_empty() && self.key_encoders.is_empty()
    }

    pub fn clear(&self) {
        self.encoders.clear();
        self.decoders.clear();
        self.key_encoders.clear();
    }
}
