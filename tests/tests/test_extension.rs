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

use ferrojson_core::codec::{DecoderRef, Encoder, EncoderRef, FnDecoder, FnEncoder};
use ferrojson_core::error::Error;
use ferrojson_core::extension::{Extension, TypeOverrides};
use ferrojson_core::resolver::Direction;
use ferrojson_core::stream::Stream;
use ferrojson_core::types::{Field, Kind, Type, TypeBuilder};
use ferrojson_core::value::Value;
use ferrojson_core::Json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Redact {
    secret: Type,
}

impl Extension for Redact {
    fn create_encoder(&self, ty: &Type) -> Option<EncoderRef> {
        (*ty == self.secret).then(|| {
            Arc::new(FnEncoder::new(|_: &Value, stream| {
                stream.write_string("***");
                Ok(())
            })) as EncoderRef
        })
    }
}

#[test]
fn test_extension_replaces_codec() {
    let secret = TypeBuilder::new("Secret").build(Kind::String);
    let user = Type::structure(vec![
        Field::new("Name", Type::string()),
        Field::new("Password", secret.clone()),
    ]);
    let mut json = Json::default();
    json.register_extension(Redact { secret });
    let value = Value::Struct(vec![Value::string("ann"), Value::string("hunter2")]);
    assert_eq!(
        json.marshal_to_string(&value, &user).unwrap(),
        r#"{"Name":"ann","Password":"***"}"#
    );
}

#[test]
fn test_first_extension_wins() {
    struct Fixed(&'static str);

    impl Extension for Fixed {
        fn create_encoder(&self, ty: &Type) -> Option<EncoderRef> {
            let text = self.0;
            (*ty == Type::bool()).then(|| {
                Arc::new(FnEncoder::new(move |_: &Value, stream| {
                    stream.write_string(text);
                    Ok(())
                })) as EncoderRef
            })
        }
    }

    let mut json = Json::default();
    json.register_extension(Fixed("first"));
    json.register_extension(Fixed("second"));
    assert_eq!(
        json.marshal_to_string(&Value::Bool(true), &Type::bool()).unwrap(),
        r#""first""#
    );
}

struct Upper {
    inner: EncoderRef,
}

impl Encoder for Upper {
    fn encode(&self, value: &Value, stream: &mut Stream<'_>) -> Result<(), Error> {
        match value {
            Value::String(s) => self.inner.encode(&Value::string(s.to_uppercase()), stream),
            other => self.inner.encode(other, stream),
        }
    }

    fn is_empty(&self, value: &Value) -> bool {
        self.inner.is_empty(value)
    }
}

struct Decorate {
    calls: Arc<AtomicUsize>,
}

impl Extension for Decorate {
    fn decorate_encoder(&self, ty: &Type, encoder: EncoderRef) -> EncoderRef {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *ty == Type::string() {
            Arc::new(Upper { inner: encoder })
        } else {
            encoder
        }
    }
}

#[test]
fn test_decorators_wrap_built_codecs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut json = Json::default();
    json.register_extension(Decorate {
        calls: Arc::clone(&calls),
    });
    let ty = Type::slice(Type::string());
    let value = Value::list(["a", "b"].map(Value::string));
    assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"["A","B"]"#);
    // the slice and its element type
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    json.marshal(&value, &ty).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_type_overrides() {
    let mut json = Json::default();
    json.register_type_decoder(
        &Type::bool(),
        Arc::new(FnDecoder::new(|slot: &mut Value, iter| {
            *slot = Value::Bool(iter.read_string()? == "yes");
            Ok(())
        })) as DecoderRef,
    );
    let ty = Type::slice(Type::bool());
    let mut slot = Value::Null;
    json.unmarshal(br#"["yes", "no"]"#, &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::list([Value::Bool(true), Value::Bool(false)]));

    // encoding is untouched
    assert_eq!(json.marshal_to_string(&slot, &ty).unwrap(), "[true,false]");
}

#[test]
fn test_registration_drops_cached_codecs() {
    let mut json = Json::default();
    let ty = Type::int();
    assert_eq!(json.marshal_to_string(&Value::Int(1), &ty).unwrap(), "1");
    assert_eq!(json.cache().len(Direction::Encode), 1);

    json.register_type_encoder(
        &ty,
        Arc::new(FnEncoder::new(|value: &Value, stream| {
            stream.write_string(&value.as_i64().unwrap_or_default().to_string());
            Ok(())
        })),
    );
    assert!(json.cache().is_empty());
    assert_eq!(json.marshal_to_string(&Value::Int(1), &ty).unwrap(), r#""1""#);
}

#[test]
fn test_map_key_overrides() {
    let mut json = Json::default();
    let point = Type::structure(vec![
        Field::new("X", Type::int()),
        Field::new("Y", Type::int()),
    ]);
    json.register_map_key_encoder(
        &point,
        Arc::new(FnEncoder::new(|value: &Value, stream| match value {
            Value::Struct(xy) => {
                let x = xy[0].as_i64().unwrap_or_default();
                let y = xy[1].as_i64().unwrap_or_default();
                stream.write_string(&format!("{},{}", x, y));
                Ok(())
            }
            _ => Err(Error::invalid_value("expect point")),
        })),
    );
    json.register_map_key_decoder(
        &point,
        Arc::new(FnDecoder::new(|slot: &mut Value, iter| {
            let text = iter.read_string()?;
            let (x, y) = text
                .split_once(',')
                .ok_or_else(|| Error::invalid_value("expect x,y"))?;
            let parse = |s: &str| {
                s.parse::<i64>()
                    .map_err(|e| Error::invalid_value(e.to_string()))
            };
            *slot = Value::Struct(vec![Value::Int(parse(x)?), Value::Int(parse(y)?)]);
            Ok(())
        })),
    );
    let ty = Type::map(point, Type::string());
    let value = Value::map([(
        Value::Struct(vec![Value::Int(1), Value::Int(2)]),
        Value::string("p"),
    )]);
    let bytes = json.marshal(&value, &ty).unwrap();
    assert_eq!(bytes, br#"{"1,2":"p"}"#);
    let mut back = Value::Null;
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_overrides_as_extension() {
    let mut overrides = TypeOverrides::default();
    overrides.set_encoder(
        Type::float64(),
        Arc::new(FnEncoder::new(|value: &Value, stream| {
            stream.write_raw(format!("{:.2}", value.as_f64().unwrap_or_default()).as_bytes());
            Ok(())
        })),
    );
    assert!(!overrides.is_empty());
    let mut json = Json::default();
    json.register_extension(overrides);
    assert_eq!(
        json.marshal_to_string(&Value::Float(1.0), &Type::float64())
            .unwrap(),
        "1.00"
    );
}
