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

use ferrojson_core::error::Error;
use ferrojson_core::types::{Capability, Field, Kind, Type, TypeBuilder};
use ferrojson_core::value::Value;
use ferrojson_core::Json;

#[test]
fn test_interface_encodes_concrete_value() {
    let json = Json::default();
    let ty = Type::interface();
    assert_eq!(json.marshal_to_string(&Value::Null, &ty).unwrap(), "null");
    let value = Value::dynamic(Type::slice(Type::int()), Value::list([Value::Int(1)]));
    assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), "[1]");
}

#[test]
fn test_empty_interface_gets_canonical_values() {
    let json = Json::default();
    let ty = Type::interface();
    let mut slot = Value::Null;
    json.unmarshal(br#"{"a": [1, "x", true, null]}"#, &mut slot, &ty)
        .unwrap();
    let list = Value::dynamic(
        Type::slice(Type::interface()),
        Value::list([
            Value::dynamic(Type::float64(), Value::Float(1.0)),
            Value::dynamic(Type::string(), Value::string("x")),
            Value::dynamic(Type::bool(), Value::Bool(true)),
            Value::Null,
        ]),
    );
    let expected = Value::dynamic(
        Type::map(Type::string(), Type::interface()),
        Value::map([(Value::string("a"), list)]),
    );
    assert_eq!(slot, expected);

    assert_eq!(
        json.marshal_to_string(&slot, &ty).unwrap(),
        r#"{"a":[1,"x",true,null]}"#
    );
}

#[test]
fn test_use_number_keeps_literal() {
    let json = Json::default().use_number(true);
    let ty = Type::interface();
    let mut slot = Value::Null;
    json.unmarshal(b"12.50", &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::dynamic(Type::number(), Value::string("12.50")));
    assert_eq!(json.marshal_to_string(&slot, &ty).unwrap(), "12.50");
}

#[test]
fn test_interface_holding_pointer_is_decoded_through_it() {
    let json = Json::default();
    let ty = Type::slice(Type::interface());
    let target = Type::ptr(Type::map(Type::string(), Type::int()));
    let mut slot = Value::list([Value::dynamic(target.clone(), Value::Null)]);
    json.unmarshal(br#"[{"n": 1}]"#, &mut slot, &ty).unwrap();
    // slice elements are fresh, so the pointer hint is not kept
    let Value::List(items) = &slot else {
        panic!("expected list, got {:?}", slot);
    };
    assert_eq!(
        items[0],
        Value::dynamic(
            Type::map(Type::string(), Type::interface()),
            Value::map([(
                Value::string("n"),
                Value::dynamic(Type::float64(), Value::Float(1.0))
            )])
        )
    );

    let mut slot = Value::dynamic(target.clone(), Value::Null);
    json.unmarshal(br#"{"n": 1}"#, &mut slot, &Type::interface())
        .unwrap();
    assert_eq!(
        slot,
        Value::dynamic(
            target,
            Value::ptr(Value::map([(Value::string("n"), Value::Int(1))]))
        )
    );
}

fn shapes() -> (Capability, Type) {
    let shape = Capability::new("Shape");
    let circle = TypeBuilder::new("Circle")
        .implements(shape.clone())
        .build(Kind::Struct(vec![Field::new("Radius", Type::float64())]));
    (shape, circle)
}

#[test]
fn test_constrained_interface_round_trip() {
    let json = Json::default();
    let (shape, circle) = shapes();
    let ty = Type::interface_of(shape);
    let ptr = Type::ptr(circle);
    let value = Value::dynamic(ptr.clone(), Value::ptr(Value::Struct(vec![Value::Float(1.0)])));
    assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"{"Radius":1}"#);

    let mut slot = value.clone();
    json.unmarshal(br#"{"Radius": 2.5}"#, &mut slot, &ty).unwrap();
    assert_eq!(
        slot,
        Value::dynamic(ptr, Value::ptr(Value::Struct(vec![Value::Float(2.5)])))
    );

    json.unmarshal(b"null", &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::Null);
}

#[test]
fn test_constrained_interface_needs_pointer_content() {
    let json = Json::default();
    let (shape, circle) = shapes();
    let ty = Type::interface_of(shape);

    let mut empty = Value::Null;
    let err = json.unmarshal(br#"{"Radius": 1}"#, &mut empty, &ty).unwrap_err();
    assert!(matches!(err, Error::Invariant(_)), "{:?}", err);

    let mut by_value = Value::dynamic(circle.clone(), Value::Struct(vec![Value::Float(0.0)]));
    let err = json
        .unmarshal(br#"{"Radius": 1}"#, &mut by_value, &ty)
        .unwrap_err();
    assert!(err.to_string().contains("can only unmarshal into pointer"), "{}", err);

    let mut nil_ptr = Value::dynamic(Type::ptr(circle), Value::Null);
    let err = json
        .unmarshal(br#"{"Radius": 1}"#, &mut nil_ptr, &ty)
        .unwrap_err();
    assert!(matches!(err, Error::Invariant(_)), "{:?}", err);
}

#[test]
fn test_interface_map_keys() {
    let json = Json::default().sort_map_keys(true);
    let ty = Type::map(Type::interface(), Type::int());
    let value = Value::map([
        (Value::dynamic(Type::int(), Value::Int(7)), Value::Int(1)),
        (Value::dynamic(Type::string(), Value::string("k")), Value::Int(2)),
    ]);
    assert_eq!(
        json.marshal_to_string(&value, &ty).unwrap(),
        r#"{"7":1,"k":2}"#
    );

    let nil_key = Value::map([(Value::Null, Value::Int(1))]);
    assert!(json.marshal(&nil_key, &ty).is_err());
}

#[test]
fn test_untyped_document() {
    let json = Json::default();
    let ty = Type::any();
    let mut slot = Value::Null;
    json.unmarshal(br#"{"a": [1, 2.5], "b": null}"#, &mut slot, &ty)
        .unwrap();
    assert_eq!(
        slot,
        Value::map([
            (
                Value::string("a"),
                Value::list([Value::Float(1.0), Value::Float(2.5)])
            ),
            (Value::string("b"), Value::Null),
        ])
    );
    let sorted = Json::default().sort_map_keys(true);
    let mut back = Value::Null;
    let bytes = sorted.marshal(&slot, &ty).unwrap();
    sorted.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, slot);
}
