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

//! Type-directed codec dispatch.
//!
//! For a type the builder tries, in order: codecs supplied by extensions,
//! a codec of the same type already under construction, then the built-in
//! recognizers (raw message, number, custom marshal contracts, untyped
//! documents, primitives) and finally the shape of the type. Unsupported
//! shapes get a codec that fails only when a non-null value reaches it.

use std::sync::Arc;

use tracing::debug;

use crate::codec::any::AnyCodec;
use crate::codec::array::{ArrayDecoder, ArrayEncoder};
use crate::codec::dynamic::{DynamicEncoder, EfaceDecoder, IfaceDecoder};
use crate::codec::map::{
    DynamicMapKeyEncoder, MapDecoder, MapEncoder, NumericMapKeyDecoder, NumericMapKeyEncoder,
    SortKeysMapEncoder,
};
use crate::codec::marshaler::{
    DirectMarshalerEncoder, DirectTextMarshalerEncoder, MarshalerEncoder, TextMarshalerEncoder,
    TextUnmarshalerDecoder, UnmarshalerDecoder,
};
use crate::codec::native::{native_decoder, native_encoder};
use crate::codec::optional::{
    DereferenceDecoder, DereferenceEncoder, OptionalDecoder, OptionalEncoder,
};
use crate::codec::raw::{NumberCodec, RawMessageCodec};
use crate::codec::slice::{SliceDecoder, SliceEncoder};
use crate::codec::struct_::{Binding, FieldDecoder, FieldEncoder, StructDecoder, StructEncoder};
use crate::codec::{
    DecoderRef, EncoderRef, LazyErrorDecoder, LazyErrorEncoder,
};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::types::{Capability, Field, Kind, Type};

fn unsupported(ctx: &BuildContext<'_>, ty: &Type, what: &str) -> Error {
    debug!(ty = %ty, prefix = ctx.prefix(), "deferring error for unsupported type");
    if ctx.prefix().is_empty() {
        Error::unsupported(format!("{} is {}", ty, what))
    } else {
        Error::unsupported(format!("{}: {} is {}", ctx.prefix(), ty, what))
    }
}

pub fn encoder_of_type(ctx: &mut BuildContext<'_>, ty: &Type) -> EncoderRef {
    if let Some(encoder) = ctx.json().extension_encoder(ty) {
        return encoder;
    }
    if let Some(encoder) = ctx.known_encoder(ty) {
        return encoder;
    }
    let cell = ctx.begin_encoder(ty);
    let encoder = create_encoder_of_type(ctx, ty);
    let encoder = ctx.json().decorate_encoder(ty, encoder);
    ctx.finish_encoder(ty, &cell, &encoder);
    encoder
}

pub fn decoder_of_type(ctx: &mut BuildContext<'_>, ty: &Type) -> DecoderRef {
    if let Some(decoder) = ctx.json().extension_decoder(ty) {
        return decoder;
    }
    if let Some(decoder) = ctx.known_decoder(ty) {
        return decoder;
    }
    let cell = ctx.begin_decoder(ty);
    let decoder = create_decoder_of_type(ctx, ty);
    let decoder = ctx.json().decorate_decoder(ty, decoder);
    ctx.finish_decoder(ty, &cell, &decoder);
    decoder
}

fn create_encoder_of_type(ctx: &mut BuildContext<'_>, ty: &Type) -> EncoderRef {
    match ty.kind() {
        Kind::RawMessage => return Arc::new(RawMessageCodec),
        Kind::Number => return Arc::new(NumberCodec),
        _ => {}
    }
    if let Some(encoder) = encoder_of_marshaler(ty) {
        return encoder;
    }
    if let Kind::Any = ty.kind() {
        return Arc::new(AnyCodec);
    }
    if let Some(encoder) = native_encoder(ty.kind()) {
        return encoder;
    }
    match ty.kind() {
        Kind::Interface(_) => Arc::new(DynamicEncoder),
        Kind::Struct(fields) => Arc::new(StructEncoder {
            ty: ty.clone(),
            bindings: struct_bindings(ctx, fields),
        }),
        Kind::Array(elem, len) => {
            let elem = ctx.with_prefix("[arrayElem]", |c| encoder_of_type(c, elem));
            Arc::new(ArrayEncoder {
                ty: ty.clone(),
                len: *len,
                elem,
            })
        }
        Kind::Slice(elem) => {
            let elem = ctx.with_prefix("[sliceElem]", |c| encoder_of_type(c, elem));
            Arc::new(SliceEncoder {
                ty: ty.clone(),
                elem,
            })
        }
        Kind::Map(key, elem) => {
            let key = ctx.with_prefix("[mapKey]", |c| encoder_of_map_key(c, key));
            let elem = ctx.with_prefix("[mapElem]", |c| encoder_of_type(c, elem));
            if ctx.config().is_sort_map_keys() {
                Arc::new(SortKeysMapEncoder {
                    ty: ty.clone(),
                    key,
                    elem,
                })
            } else {
                Arc::new(MapEncoder {
                    ty: ty.clone(),
                    key,
                    elem,
                })
            }
        }
        Kind::Ptr(elem) => Arc::new(OptionalEncoder {
            elem: encoder_of_type(ctx, elem),
        }),
        Kind::Undefined => Arc::new(LazyErrorEncoder {
            err: unsupported(ctx, ty, "declared but never defined"),
        }),
        _ => Arc::new(LazyErrorEncoder {
            err: unsupported(ctx, ty, "unsupported type"),
        }),
    }
}

fn create_decoder_of_type(ctx: &mut BuildContext<'_>, ty: &Type) -> DecoderRef {
    match ty.kind() {
        Kind::RawMessage => return Arc::new(RawMessageCodec),
        Kind::Number => return Arc::new(NumberCodec),
        _ => {}
    }
    if let Some(decoder) = decoder_of_unmarshaler(ty) {
        return decoder;
    }
    if let Kind::Any = ty.kind() {
        return Arc::new(AnyCodec);
    }
    if let Some(decoder) = native_decoder(ty.kind()) {
        return decoder;
    }
    match ty.kind() {
        Kind::Interface(None) => Arc::new(EfaceDecoder),
        Kind::Interface(Some(capability)) => Arc::new(IfaceDecoder {
            capability: capability.clone(),
        }),
        Kind::Struct(fields) => Arc::new(StructDecoder::new(
            ty.clone(),
            struct_field_decoders(ctx, fields),
            ctx.config().is_case_sensitive(),
        )),
        Kind::Array(elem, len) => {
            let decoder = ctx.with_prefix("[arrayElem]", |c| decoder_of_type(c, elem));
            Arc::new(ArrayDecoder {
                ty: ty.clone(),
                len: *len,
                elem_ty: elem.clone(),
                elem: decoder,
            })
        }
        Kind::Slice(elem) => {
            let decoder = ctx.with_prefix("[sliceElem]", |c| decoder_of_type(c, elem));
            Arc::new(SliceDecoder {
                ty: ty.clone(),
                elem_ty: elem.clone(),
                elem: decoder,
            })
        }
        Kind::Map(key, elem) => {
            let key_decoder = ctx.with_prefix("[mapKey]", |c| decoder_of_map_key(c, key));
            let elem_decoder = ctx.with_prefix("[mapElem]", |c| decoder_of_type(c, elem));
            Arc::new(MapDecoder {
                ty: ty.clone(),
                key_ty: key.clone(),
                elem_ty: elem.clone(),
                key: key_decoder,
                elem: elem_decoder,
            })
        }
        Kind::Ptr(elem) => Arc::new(OptionalDecoder {
            elem_ty: elem.clone(),
            elem: decoder_of_type(ctx, elem),
        }),
        Kind::Undefined => Arc::new(LazyErrorDecoder {
            err: unsupported(ctx, ty, "declared but never defined"),
        }),
        _ => Arc::new(LazyErrorDecoder {
            err: unsupported(ctx, ty, "unsupported type"),
        }),
    }
}

/// Marshal contracts, JSON before text. A contract only declared on the
/// pointer receiver is promoted to plain locations of the type.
fn encoder_of_marshaler(ty: &Type) -> Option<EncoderRef> {
    if let Kind::Interface(Some(capability)) = ty.kind() {
        if *capability == Capability::json_marshaler() {
            return Some(Arc::new(DirectMarshalerEncoder));
        }
        if *capability == Capability::text_marshaler() {
            return Some(Arc::new(DirectTextMarshalerEncoder));
        }
        return None;
    }
    let pointer = matches!(ty.kind(), Kind::Ptr(_));
    if let Some(func) = ty.json_marshaler() {
        return Some(Arc::new(MarshalerEncoder {
            ty: ty.clone(),
            func: func.clone(),
            pointer,
        }));
    }
    if let Some(func) = ty.ptr_json_marshaler() {
        return Some(Arc::new(MarshalerEncoder {
            ty: ty.clone(),
            func: func.clone(),
            pointer: false,
        }));
    }
    if let Some(func) = ty.text_marshaler() {
        return Some(Arc::new(TextMarshalerEncoder {
            ty: ty.clone(),
            func: func.clone(),
            pointer,
        }));
    }
    if let Some(func) = ty.ptr_text_marshaler() {
        return Some(Arc::new(TextMarshalerEncoder {
            ty: ty.clone(),
            func: func.clone(),
            pointer: false,
        }));
    }
    None
}

/// Unmarshal contracts are always reached through the location's address,
/// so only contracts of the type itself count here; `*T` goes through the
/// pointer codec first.
fn decoder_of_unmarshaler(ty: &Type) -> Option<DecoderRef> {
    if let Some(func) = ty.ptr_json_unmarshaler() {
        return Some(Arc::new(UnmarshalerDecoder { func: func.clone() }));
    }
    if let Some(func) = ty.ptr_text_unmarshaler() {
        return Some(Arc::new(TextUnmarshalerDecoder {
            func: func.clone(),
            pointee: None,
        }));
    }
    None
}

/// A struct flattened into its parent: the struct type and whether it is
/// reached through a pointer.
fn embedded_struct(field: &Field) -> Option<(Type, bool)> {
    if !field.embedded {
        return None;
    }
    match field.ty.kind() {
        Kind::Struct(_) => Some((field.ty.clone(), false)),
        Kind::Ptr(elem) if matches!(elem.kind(), Kind::Struct(_)) => Some((elem.clone(), true)),
        _ => None,
    }
}

/// Keeps, for each JSON name, the shallowest binding; among equally deep
/// ones the first declared.
fn resolve_names<T>(mut found: Vec<(usize, String, T)>) -> Vec<(String, T)> {
    let mut keep = vec![true; found.len()];
    for i in 0..found.len() {
        for j in 0..found.len() {
            if i != j && found[i].1 == found[j].1 {
                let (di, dj) = (found[i].0, found[j].0);
                if dj < di || (dj == di && j < i) {
                    keep[i] = false;
                }
            }
        }
    }
    let mut keep = keep.into_iter();
    found.retain(|_| keep.next().unwrap_or(false));
    found.into_iter().map(|(_, name, t)| (name, t)).collect()
}

fn collect_bindings(
    ctx: &mut BuildContext<'_>,
    fields: &[Field],
    depth: usize,
    out: &mut Vec<(usize, String, Binding)>,
) {
    for (index, field) in fields.iter().enumerate() {
        if let Some((embedded_ty, via_ptr)) = embedded_struct(field) {
            if ctx.enter_embedded(&embedded_ty) {
                let mut inner = Vec::new();
                if let Kind::Struct(inner_fields) = embedded_ty.kind() {
                    ctx.with_prefix(&field.name, |c| {
                        collect_bindings(c, inner_fields, depth + 1, &mut inner)
                    });
                }
                ctx.leave_embedded();
                for (d, name, binding) in inner {
                    let encoder = if via_ptr {
                        Arc::new(DereferenceEncoder {
                            elem: binding.encoder,
                        }) as EncoderRef
                    } else {
                        binding.encoder
                    };
                    out.push((
                        d,
                        name,
                        Binding {
                            name: binding.name,
                            omit_empty: binding.omit_empty,
                            encoder: Arc::new(FieldEncoder {
                                index,
                                inner: encoder,
                            }),
                        },
                    ));
                }
                continue;
            }
        }
        let encoder = ctx.with_prefix(&field.name, |c| encoder_of_type(c, &field.ty));
        out.push((
            depth,
            field.name.clone(),
            Binding {
                name: field.name.clone(),
                omit_empty: field.omit_empty,
                encoder: Arc::new(FieldEncoder {
                    index,
                    inner: encoder,
                }),
            },
        ));
    }
}

fn struct_bindings(ctx: &mut BuildContext<'_>, fields: &[Field]) -> Vec<Binding> {
    let mut found = Vec::new();
    collect_bindings(ctx, fields, 0, &mut found);
    resolve_names(found).into_iter().map(|(_, b)| b).collect()
}

fn collect_field_decoders(
    ctx: &mut BuildContext<'_>,
    fields: &[Field],
    depth: usize,
    out: &mut Vec<(usize, String, DecoderRef)>,
) {
    for (index, field) in fields.iter().enumerate() {
        if let Some((embedded_ty, via_ptr)) = embedded_struct(field) {
            if ctx.enter_embedded(&embedded_ty) {
                let mut inner = Vec::new();
                if let Kind::Struct(inner_fields) = embedded_ty.kind() {
                    ctx.with_prefix(&field.name, |c| {
                        collect_field_decoders(c, inner_fields, depth + 1, &mut inner)
                    });
                }
                ctx.leave_embedded();
                for (d, name, decoder) in inner {
                    let decoder = if via_ptr {
                        Arc::new(DereferenceDecoder {
                            elem_ty: embedded_ty.clone(),
                            elem: decoder,
                        }) as DecoderRef
                    } else {
                        decoder
                    };
                    out.push((
                        d,
                        name,
                        Arc::new(FieldDecoder {
                            index,
                            inner: decoder,
                        }),
                    ));
                }
                continue;
            }
        }
        let decoder = ctx.with_prefix(&field.name, |c| decoder_of_type(c, &field.ty));
        out.push((
            depth,
            field.name.clone(),
            Arc::new(FieldDecoder {
                index,
                inner: decoder,
            }),
        ));
    }
}

fn struct_field_decoders(
    ctx: &mut BuildContext<'_>,
    fields: &[Field],
) -> Vec<(String, DecoderRef)> {
    let mut found = Vec::new();
    collect_field_decoders(ctx, fields, 0, &mut found);
    resolve_names(found)
}

/// Encoder for map keys: text marshal contracts, strings, quoted numbers
/// and booleans, or per-key dispatch for interface keys.
pub fn encoder_of_map_key(ctx: &mut BuildContext<'_>, ty: &Type) -> EncoderRef {
    if let Some(encoder) = ctx.json().extension_map_key_encoder(ty) {
        return encoder;
    }
    if !matches!(ty.kind(), Kind::String) {
        if let Kind::Interface(Some(capability)) = ty.kind() {
            if *capability == Capability::text_marshaler() {
                return Arc::new(DirectTextMarshalerEncoder);
            }
        }
        if let Some(func) = ty.text_marshaler() {
            return Arc::new(TextMarshalerEncoder {
                ty: ty.clone(),
                func: func.clone(),
                pointer: matches!(ty.kind(), Kind::Ptr(_)),
            });
        }
    }
    match ty.kind() {
        Kind::String => encoder_of_type(ctx, &Type::string()),
        Kind::Interface(_) => Arc::new(DynamicMapKeyEncoder),
        kind if kind.is_primitive() => match Type::of_kind(kind) {
            Some(plain) => Arc::new(NumericMapKeyEncoder {
                inner: encoder_of_type(ctx, &plain),
            }),
            None => Arc::new(LazyErrorEncoder {
                err: unsupported(ctx, ty, "an unsupported map key type"),
            }),
        },
        _ => Arc::new(LazyErrorEncoder {
            err: unsupported(ctx, ty, "an unsupported map key type"),
        }),
    }
}

/// Decoder for map keys, the counterpart of [`encoder_of_map_key`].
pub fn decoder_of_map_key(ctx: &mut BuildContext<'_>, ty: &Type) -> DecoderRef {
    if let Some(decoder) = ctx.json().extension_map_key_decoder(ty) {
        return decoder;
    }
    if let Some(func) = ty.ptr_json_unmarshaler() {
        return Arc::new(UnmarshalerDecoder { func: func.clone() });
    }
    if let Some(func) = ty.json_unmarshaler() {
        return Arc::new(UnmarshalerDecoder { func: func.clone() });
    }
    if let Some(func) = ty.ptr_text_unmarshaler() {
        return Arc::new(TextUnmarshalerDecoder {
            func: func.clone(),
            pointee: None,
        });
    }
    if let (Some(func), Some(elem)) = (ty.text_unmarshaler(), ty.ptr_elem()) {
        return Arc::new(TextUnmarshalerDecoder {
            func: func.clone(),
            pointee: Some(elem.clone()),
        });
    }
    match ty.kind() {
        Kind::String => decoder_of_type(ctx, &Type::string()),
        kind if kind.is_primitive() => match Type::of_kind(kind) {
            Some(plain) => Arc::new(NumericMapKeyDecoder {
                inner: decoder_of_type(ctx, &plain),
            }),
            None => Arc::new(LazyErrorDecoder {
                err: unsupported(ctx, ty, "an unsupported map key type"),
            }),
        },
        _ => Arc::new(LazyErrorDecoder {
            err: unsupported(ctx, ty, "an unsupported map key type"),
        }),
    }
}
