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

use std::thread;

use ferrojson_core::config::DEFAULT_MAX_DEPTH;
use ferrojson_core::error::Error;
use ferrojson_core::types::{Field, Kind, Type, TypeBuilder};
use ferrojson_core::value::Value;
use ferrojson_core::Json;

fn node_type() -> Type {
    let node = TypeBuilder::new("Node").declare();
    node.define(Kind::Struct(vec![
        Field::new("Value", Type::int()),
        Field::new("Next", Type::ptr(node.clone())),
    ]))
    .unwrap();
    node
}

fn node(value: i64, next: Value) -> Value {
    Value::Struct(vec![Value::Int(value), next])
}

#[test]
fn test_linked_chain_round_trip() {
    let json = Json::default();
    let ty = node_type();
    let chain = node(1, Value::ptr(node(2, Value::ptr(node(3, Value::Null)))));
    let bytes = json.marshal(&chain, &ty).unwrap();
    assert_eq!(
        bytes,
        br#"{"Value":1,"Next":{"Value":2,"Next":{"Value":3,"Next":null}}}"#
    );
    let mut back = Value::zero(&ty);
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, chain);
}

#[test]
fn test_pointer_root_of_recursive_type() {
    let json = Json::default();
    let ty = Type::ptr(node_type());
    let chain = Value::ptr(node(1, Value::ptr(node(2, Value::Null))));
    let bytes = json.marshal(&chain, &ty).unwrap();
    let mut back = Value::Null;
    json.unmarshal(&bytes, &mut back, &ty).unwrap();
    assert_eq!(back, chain);
}

#[test]
fn test_tree_through_slices() {
    let json = Json::default();
    let tree = TypeBuilder::new("Tree").declare();
    tree.define(Kind::Struct(vec![
        Field::new("Name", Type::string()),
        Field::new("Children", Type::slice(tree.clone())).omit_empty(),
    ]))
    .unwrap();
    let leaf = |name: &str| Value::Struct(vec![Value::string(name), Value::Null]);
    let value = Value::Struct(vec![
        Value::string("root"),
        Value::list([leaf("a"), leaf("b")]),
    ]);
    let bytes = json.marshal(&value, &tree).unwrap();
    assert_eq!(
        bytes,
        br#"{"Name":"root","Children":[{"Name":"a"},{"Name":"b"}]}"#
    );
    let mut back = Value::zero(&tree);
    json.unmarshal(&bytes, &mut back, &tree).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_self_referential_map() {
    let json = Json::default().sort_map_keys(true);
    let nested = TypeBuilder::new("Nested").declare();
    nested
        .define(Kind::Map(Type::string(), nested.clone()))
        .unwrap();
    let value = Value::map([
        (Value::string("a"), Value::map([(Value::string("b"), Value::map([]))])),
        (Value::string("c"), Value::Null),
    ]);
    let bytes = json.marshal(&value, &nested).unwrap();
    assert_eq!(bytes, br#"{"a":{"b":{}},"c":null}"#);
    let mut back = Value::Null;
    json.unmarshal(&bytes, &mut back, &nested).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_mutually_recursive_types() {
    let json = Json::default();
    let person = TypeBuilder::new("Person").declare();
    let team = TypeBuilder::new("Team").declare();
    person
        .define(Kind::Struct(vec![
            Field::new("Name", Type::string()),
            Field::new("Team", Type::ptr(team.clone())),
        ]))
        .unwrap();
    team.define(Kind::Struct(vec![Field::new(
        "Members",
        Type::slice(person.clone()),
    )]))
    .unwrap();
    let value = Value::Struct(vec![
        Value::string("ann"),
        Value::ptr(Value::Struct(vec![Value::list([Value::Struct(vec![
            Value::string("bob"),
            Value::Null,
        ])])])),
    ]);
    let bytes = json.marshal(&value, &person).unwrap();
    assert_eq!(
        bytes,
        br#"{"Name":"ann","Team":{"Members":[{"Name":"bob","Team":null}]}}"#
    );
    let mut back = Value::zero(&person);
    json.unmarshal(&bytes, &mut back, &person).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_undefined_type_fails_on_use() {
    let json = Json::default();
    let ghost = TypeBuilder::new("Ghost").declare();
    let ty = Type::ptr(ghost);
    assert_eq!(json.marshal_to_string(&Value::Null, &ty).unwrap(), "null");
    let err = json.marshal(&Value::ptr(Value::Int(1)), &ty).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "{:?}", err);
    assert!(err.to_string().contains("declared but never defined"), "{}", err);
}

#[test]
fn test_deep_nesting_is_bounded() {
    let json = Json::default().max_depth(8);
    let nested = TypeBuilder::new("Deep").declare();
    nested.define(Kind::Slice(nested.clone())).unwrap();
    let input = format!("{}{}", "[".repeat(20), "]".repeat(20));
    let mut slot = Value::Null;
    let err = json.unmarshal(input.as_bytes(), &mut slot, &nested).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{:?}", err);

    let input = format!("{}{}", "[".repeat(4), "]".repeat(4));
    json.unmarshal(input.as_bytes(), &mut slot, &nested).unwrap();
}

fn nested_arrays(depth: u32) -> String {
    let depth = depth as usize;
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn test_default_depth_fits_a_small_thread_stack() {
    let handle = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let json = Json::default();
            let input = nested_arrays(DEFAULT_MAX_DEPTH);
            let mut slot = Value::Null;
            json.unmarshal(input.as_bytes(), &mut slot, &Type::interface())
                .unwrap();

            let nested = TypeBuilder::new("Deep").declare();
            nested.define(Kind::Slice(nested.clone())).unwrap();
            let mut slot = Value::Null;
            json.unmarshal(input.as_bytes(), &mut slot, &nested).unwrap();

            let input = nested_arrays(DEFAULT_MAX_DEPTH + 1);
            let mut slot = Value::Null;
            let err = json
                .unmarshal(input.as_bytes(), &mut slot, &Type::interface())
                .unwrap_err();
            assert!(matches!(err, Error::DepthExceed(_)), "{:?}", err);
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_untyped_documents_do_not_recurse() {
    let handle = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let json = Json::default().max_depth(200_000);
            let input = nested_arrays(100_000);
            let mut slot = Value::Null;
            json.unmarshal(input.as_bytes(), &mut slot, &Type::interface())
                .unwrap();
            // Dropping a value this deep recurses; only reading is under test.
            std::mem::forget(slot);

            let skipping = TypeBuilder::new("Empty").build(Kind::Struct(vec![]));
            let input = format!(r#"{{"deep":{}}}"#, nested_arrays(100_000));
            let mut slot = Value::zero(&skipping);
            json.unmarshal(input.as_bytes(), &mut slot, &skipping).unwrap();
            assert_eq!(slot, Value::Struct(vec![]));
        })
        .unwrap();
    handle.join().unwrap();
}
