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
use ferrojson_core::types::Type;
use ferrojson_core::value::Value;
use ferrojson_core::Json;
use std::collections::HashSet;

fn scores() -> Value {
    Value::map([
        (Value::string("b"), Value::Int(1)),
        (Value::string("a"), Value::Int(2)),
        (Value::string("c"), Value::Int(3)),
    ])
}

#[test]
fn test_sorted_keys() {
    let json = Json::default().sort_map_keys(true);
    let ty = Type::map(Type::string(), Type::int());
    assert_eq!(
        json.marshal_to_string(&scores(), &ty).unwrap(),
        r#"{"a":2,"b":1,"c":3}"#
    );
}

#[test]
fn test_unsorted_keys_appear_once() {
    let json = Json::default();
    let ty = Type::map(Type::string(), Type::int());
    let text = json.marshal_to_string(&scores(), &ty).unwrap();
    assert!(text.starts_with('{') && text.ends_with('}'));
    let entries: HashSet<&str> = text[1..text.len() - 1].split(',').collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries, HashSet::from([r#""a":2"#, r#""b":1"#, r#""c":3"#]));
}

#[test]
fn test_integer_keys_are_quoted() {
    let json = Json::default().sort_map_keys(true);
    let ty = Type::map(Type::int(), Type::string());
    let value = Value::map([
        (Value::Int(2), Value::string("y")),
        (Value::Int(1), Value::string("x")),
    ]);
    let bytes = json.marshal(&value, &ty).unwrap();
    assert_eq!(bytes, br#"{"1":"x","2":"y"}"#);

    let mut back = Value::Null;
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_unsigned_and_float_keys() {
    let json = Json::default();
    let ty = Type::map(Type::uint16(), Type::bool());
    let mut back = Value::Null;
    json.unmarshal(br#"{"65535": true}"#, &mut back, &ty).unwrap();
    assert_eq!(back, Value::map([(Value::Uint(65535), Value::Bool(true))]));

    let ty = Type::map(Type::float64(), Type::int());
    let value = Value::map([(Value::Float(1.5), Value::Int(1))]);
    assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"{"1.5":1}"#);
}

#[test]
fn test_duplicate_keys_last_wins() {
    let json = Json::default();
    let ty = Type::map(Type::string(), Type::int());
    let mut slot = Value::Null;
    json.unmarshal(br#"{"a":1,"a":2}"#, &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::map([(Value::string("a"), Value::Int(2))]));
}

#[test]
fn test_nil_and_empty_maps_stay_distinct() {
    let json = Json::default();
    let ty = Type::map(Type::string(), Type::int());
    assert_eq!(json.marshal_to_string(&Value::Null, &ty).unwrap(), "null");
    assert_eq!(json.marshal_to_string(&Value::map([]), &ty).unwrap(), "{}");

    let mut slot = Value::Null;
    json.unmarshal(b"{}", &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::map([]));
    json.unmarshal(b"null", &mut slot, &ty).unwrap();
    assert_eq!(slot, Value::Null);
}

#[test]
fn test_decode_merges_into_existing_map() {
    let json = Json::default();
    let ty = Type::map(Type::string(), Type::int());
    let mut slot = Value::map([(Value::string("keep"), Value::Int(1))]);
    json.unmarshal(br#"{"new": 2}"#, &mut slot, &ty).unwrap();
    assert_eq!(
        slot,
        Value::map([
            (Value::string("keep"), Value::Int(1)),
            (Value::string("new"), Value::Int(2)),
        ])
    );
}

#[test]
fn test_value_error_names_map_type() {
    let json = Json::default();
    let ty = Type::map(Type::string(), Type::int());
    let value = Value::map([(Value::string("a"), Value::string("not a number"))]);
    let err = json.marshal(&value, &ty).unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)), "{:?}", err);
    assert!(
        err.to_string().contains("in map value of type map[string]int"),
        "{}",
        err
    );
}

#[test]
fn test_unsupported_key_type() {
    let json = Json::default();
    let ty = Type::map(Type::slice(Type::int()), Type::int());
    assert_eq!(json.marshal_to_string(&Value::Null, &ty).unwrap(), "null");
    let value = Value::map([(Value::list([Value::Int(1)]), Value::Int(1))]);
    assert!(json.marshal(&value, &ty).is_err());
}

#[test]
fn test_map_of_slices_round_trip() {
    let json = Json::compatible();
    let ty = Type::map(Type::string(), Type::slice(Type::ptr(Type::int())));
    let value = Value::map([
        (
            Value::string("x"),
            Value::list([Value::ptr(Value::Int(1)), Value::Null]),
        ),
        (Value::string("y"), Value::Null),
    ]);
    let bytes = json.marshal(&value, &ty).unwrap();
    assert_eq!(bytes, br#"{"x":[1,null],"y":null}"#);
    let mut back = Value::Null;
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_sorted_keys_for_untyped_documents() {
    let json = Json::default().sort_map_keys(true);
    let input = br#"{"b":1,"a":2,"c":3,"d":{"y":4,"x":5},"e":5,"f":6}"#;
    let mut outputs = HashSet::new();
    for _ in 0..20 {
        let mut doc = Value::Null;
        json.unmarshal(input, &mut doc, &Type::any()).unwrap();
        outputs.insert(json.marshal_to_string(&doc, &Type::any()).unwrap());
    }
    assert_eq!(outputs.len(), 1);
    assert_eq!(
        outputs.into_iter().next().unwrap(),
        r#"{"a":2,"b":1,"c":3,"d":{"x":5,"y":4},"e":5,"f":6}"#
    );

    let mut doc = Value::Null;
    json.unmarshal(input, &mut doc, &Type::interface()).unwrap();
    assert_eq!(
        json.marshal_to_string(&doc, &Type::interface()).unwrap(),
        r#"{"a":2,"b":1,"c":3,"d":{"x":5,"y":4},"e":5,"f":6}"#
    );
}
