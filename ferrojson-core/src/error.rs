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

//! Error type shared by the codec engine, the stream and the iterator.
//!
//! Error constructors sit on the failure path of every codec, so they are
//! `#[cold]` and `#[track_caller]`; keep it that way when adding new ones.

use std::borrow::Cow;
use std::fmt::Display;

use thiserror::Error;

/// Set `FERROJSON_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("FERROJSON_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for encoding and decoding.
///
/// Always build errors through the constructor functions (`Error::syntax`,
/// `Error::unsupported`, ...) rather than the variants, so that
/// `FERROJSON_PANIC_ON_ERROR` can stop at the creation site:
///
/// ```bash
/// RUST_BACKTRACE=1 FERROJSON_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// ```rust
/// use ferrojson_core::error::Error;
///
/// let err = Error::unsupported("chan int is unsupported type");
/// assert!(!err.is_eof());
/// let err = err.with_context("[]chan int");
/// assert_eq!(err.to_string(), "[]chan int: chan int is unsupported type");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A type shape the engine cannot handle. Raised lazily, when a non-null
    /// value of that shape is actually processed.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    /// Malformed token sequence.
    #[error("{0}")]
    Syntax(Cow<'static, str>),

    /// Input ended in the middle of a value.
    #[error("{0}")]
    Eof(Cow<'static, str>),

    /// A custom marshal or unmarshal routine reported a failure.
    #[error("{0}")]
    Marshal(Cow<'static, str>),

    /// The engine or a caller broke a contract, e.g. decoding into an empty
    /// constrained interface slot or mismatched nesting.
    #[error("{0}")]
    Invariant(Cow<'static, str>),

    /// A value does not fit its declared type (overflow, wrong shape, NaN).
    #[error("{0}")]
    InvalidValue(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

macro_rules! impl_error_constructors {
    ($($(#[$meta:meta])* $fn_name:ident => $variant:ident),* $(,)?) => {
        impl Error {
            $(
                $(#[$meta])*
                #[inline(always)]
                #[cold]
                #[track_caller]
                pub fn $fn_name<S: Into<Cow<'static, str>>>(s: S) -> Self {
                    let err = Error::$variant(s.into());
                    if should_panic_on_error() {
                        panic!("FERROJSON_PANIC_ON_ERROR: {}", err);
                    }
                    err
                }
            )*
        }
    };
}

impl_error_constructors! {
    /// Creates a new [`Error::Unsupported`].
    unsupported => Unsupported,
    /// Creates a new [`Error::Syntax`].
    syntax => Syntax,
    /// Creates a new [`Error::Eof`], the end-of-input sentinel.
    eof => Eof,
    /// Creates a new [`Error::Marshal`].
    marshal => Marshal,
    /// Creates a new [`Error::Invariant`].
    invariant => Invariant,
    /// Creates a new [`Error::InvalidValue`].
    invalid_value => InvalidValue,
    /// Creates a new [`Error::DepthExceed`].
    depth_exceed => DepthExceed,
    /// Creates a new [`Error::Unknown`].
    unknown => Unknown,
}

impl Error {
    /// Returns true for the end-of-input sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof(_))
    }

    /// Prefixes the message with a breadcrumb such as a type name.
    ///
    /// The end-of-input sentinel is returned untouched so callers can keep
    /// recognizing it after it crossed several codecs.
    #[inline(never)]
    pub fn with_context<C: Display>(self, context: C) -> Error {
        fn prefix<C: Display>(context: C, msg: Cow<'static, str>) -> Cow<'static, str> {
            Cow::Owned(format!("{}: {}", context, msg))
        }
        match self {
            Error::Eof(_) => self,
            Error::Unsupported(m) => Error::Unsupported(prefix(context, m)),
            Error::Syntax(m) => Error::Syntax(prefix(context, m)),
            Error::Marshal(m) => Error::Marshal(prefix(context, m)),
            Error::Invariant(m) => Error::Invariant(prefix(context, m)),
            Error::InvalidValue(m) => Error::InvalidValue(prefix(context, m)),
            Error::DepthExceed(m) => Error::DepthExceed(prefix(context, m)),
            Error::Unknown(m) => Error::Unknown(prefix(context, m)),
        }
    }
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}
