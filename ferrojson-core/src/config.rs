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

/// Default nesting limit. Typed codecs descend one native call chain per
/// level, so the limit keeps deep input well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: u32 = 128;

/// Configuration for encoding and decoding.
///
/// This struct holds the options that change which codec gets built for a
/// type, so it is fixed once the owning [`Json`](crate::json::Json) starts
/// caching codecs. It is shared by the engine and the `Stream`/`Iter` pair
/// to keep both directions consistent.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether struct field names are matched case-sensitively on decode.
    pub case_sensitive: bool,
    /// Whether map entries are emitted sorted by their decoded key string.
    pub sort_map_keys: bool,
    /// Whether `<`, `>` and `&` are escaped inside strings.
    pub escape_html: bool,
    /// Whether numbers decoded into an open interface keep their literal text.
    pub use_number: bool,
    /// Maximum nesting depth of arrays and objects accepted on decode.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            case_sensitive: false,
            sort_map_keys: false,
            escape_html: false,
            use_number: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    #[inline(always)]
    pub fn is_sort_map_keys(&self) -> bool {
        self.sort_map_keys
    }

    #[inline(always)]
    pub fn is_escape_html(&self) -> bool {
        self.escape_html
    }

    #[inline(always)]
    pub fn is_use_number(&self) -> bool {
        self.use_number
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
