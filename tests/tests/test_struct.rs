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

use ferrojson_core::types::{Field, Kind, Type, TypeBuilder};
use ferrojson_core::value::Value;
use ferrojson_core::Json;

fn base() -> Type {
    TypeBuilder::new("Base").build(Kind::Struct(vec![
        Field::new("ID", Type::int()),
        Field::new("Name", Type::string()),
    ]))
}

fn user() -> Type {
    TypeBuilder::new("User").build(Kind::Struct(vec![
        Field::new("Base", base()).embedded(),
        Field::new("Name", Type::string()),
        Field::new("Age", Type::int()).omit_empty(),
        Field::new("Email", Type::ptr(Type::string())).omit_empty(),
    ]))
}

#[test]
fn test_declaration_order_and_omit_empty() {
    let json = Json::default();
    let ty = TypeBuilder::new("Point").build(Kind::Struct(vec![
        Field::new("Y", Type::int()),
        Field::new("X", Type::int()).omit_empty(),
        Field::new("Tags", Type::slice(Type::string())).omit_empty(),
    ]));
    let value = Value::Struct(vec![Value::Int(0), Value::Int(0), Value::list([])]);
    assert_eq!(json.marshal_to_string(&value, &ty).unwrap(), r#"{"Y":0}"#);

    let value = Value::Struct(vec![
        Value::Int(1),
        Value::Int(2),
        Value::list([Value::string("t")]),
    ]);
    assert_eq!(
        json.marshal_to_string(&value, &ty).unwrap(),
        r#"{"Y":1,"X":2,"Tags":["t"]}"#
    );
}

#[test]
fn test_embedded_struct_is_flattened() {
    let json = Json::default();
    let ty = user();
    let value = Value::Struct(vec![
        Value::Struct(vec![Value::Int(7), Value::string("shadowed")]),
        Value::string("ann"),
        Value::Int(30),
        Value::Null,
    ]);
    let bytes = json.marshal(&value, &ty).unwrap();
    assert_eq!(bytes, br#"{"ID":7,"Name":"ann","Age":30}"#);

    let mut back = Value::zero(&ty);
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(
        back,
        Value::Struct(vec![
            Value::Struct(vec![Value::Int(7), Value::string("")]),
            Value::string("ann"),
            Value::Int(30),
            Value::Null,
        ])
    );
}

#[test]
fn test_embedded_pointer() {
    let json = Json::default();
    let ty = TypeBuilder::new("Admin").build(Kind::Struct(vec![
        Field::new("Base", Type::ptr(base())).embedded(),
        Field::new("Level", Type::int()),
    ]));

    let nil_base = Value::Struct(vec![Value::Null, Value::Int(1)]);
    assert_eq!(json.marshal_to_string(&nil_base, &ty).unwrap(), r#"{"Level":1}"#);

    let with_base = Value::Struct(vec![
        Value::ptr(Value::Struct(vec![Value::Int(3), Value::string("root")])),
        Value::Int(9),
    ]);
    let bytes = json.marshal(&with_base, &ty).unwrap();
    assert_eq!(bytes, br#"{"ID":3,"Name":"root","Level":9}"#);

    let mut back = Value::zero(&ty);
    assert_eq!(back, Value::Struct(vec![Value::Null, Value::Int(0)]));
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, with_base);
}

#[test]
fn test_case_insensitive_by_default() {
    let json = Json::default();
    let ty = user();
    let mut slot = Value::zero(&ty);
    json.unmarshal(br#"{"name": "bob", "AGE": 4, "id": 2}"#, &mut slot, &ty)
        .unwrap();
    assert_eq!(
        slot,
        Value::Struct(vec![
            Value::Struct(vec![Value::Int(2), Value::string("")]),
            Value::string("bob"),
            Value::Int(4),
            Value::Null,
        ])
    );
}

#[test]
fn test_case_sensitive_matching() {
    let json = Json::default().case_sensitive(true);
    let ty = user();
    let mut slot = Value::zero(&ty);
    json.unmarshal(br#"{"name": "bob", "Name": "eve"}"#, &mut slot, &ty)
        .unwrap();
    assert_eq!(
        slot,
        Value::Struct(vec![
            Value::Struct(vec![Value::Int(0), Value::string("")]),
            Value::string("eve"),
            Value::Int(0),
            Value::Null,
        ])
    );
}

#[test]
fn test_unknown_fields_and_null() {
    let json = Json::default();
    let ty = user();
    let mut slot = Value::zero(&ty);
    json.unmarshal(
        br#"{"Extra": {"deep": [1, {"x": null}]}, "Email": "a@b.c"}"#,
        &mut slot,
        &ty,
    )
    .unwrap();
    let expected = Value::Struct(vec![
        Value::Struct(vec![Value::Int(0), Value::string("")]),
        Value::string(""),
        Value::Int(0),
        Value::ptr(Value::string("a@b.c")),
    ]);
    assert_eq!(slot, expected);

    json.unmarshal(b"null", &mut slot, &ty).unwrap();
    assert_eq!(slot, expected);
}

#[test]
fn test_field_errors_name_the_field() {
    let json = Json::default();
    let ty = user();
    let mut slot = Value::zero(&ty);
    let err = json
        .unmarshal(br#"{"Age": "old"}"#, &mut slot, &ty)
        .unwrap_err();
    assert!(err.to_string().starts_with("User.Age: "), "{}", err);

    let bad = Value::Struct(vec![
        Value::Struct(vec![Value::Int(0), Value::string("")]),
        Value::Int(1),
        Value::Int(0),
        Value::Null,
    ]);
    let err = json.marshal(&bad, &ty).unwrap_err();
    assert!(err.to_string().starts_with("User.Name: "), "{}", err);
}

#[test]
fn test_shadowed_promoted_field_type_is_reused_elsewhere() {
    let json = Json::default();
    let inner = TypeBuilder::new("Inner").build(Kind::Struct(vec![Field::new(
        "X",
        Type::slice(Type::int16()),
    )]));
    let shadowing = TypeBuilder::new("Shadowing").build(Kind::Struct(vec![
        Field::new("Inner", inner).embedded(),
        Field::new("X", Type::int()),
    ]));
    let ty = TypeBuilder::new("Outer").build(Kind::Struct(vec![
        Field::new("A", shadowing),
        Field::new("B", Type::slice(Type::int16())),
    ]));

    let value = Value::Struct(vec![
        Value::Struct(vec![
            Value::Struct(vec![Value::list([Value::Int(9)])]),
            Value::Int(1),
        ]),
        Value::list([Value::Int(5)]),
    ]);
    assert_eq!(
        json.marshal_to_string(&value, &ty).unwrap(),
        r#"{"A":{"X":1},"B":[5]}"#
    );

    let mut back = Value::zero(&ty);
    json.unmarshal(br#"{"A":{"X":1},"B":[5]}"#, &mut back, &ty).unwrap();
    assert_eq!(
        back,
        Value::Struct(vec![
            Value::Struct(vec![Value::Struct(vec![Value::Null]), Value::Int(1)]),
            Value::list([Value::Int(5)]),
        ])
    );
}
