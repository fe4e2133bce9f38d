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

use ferrojson_core::types::Type;
use ferrojson_core::value::Value;
use ferrojson_core::Json;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

proptest! {
    #[test]
    fn prop_list_round_trip(items in prop::collection::vec(prop::option::of(any::<i64>()), 0..32)) {
        let json = Json::default();
        let bytes = json.serialize(&items).unwrap();
        let back: Vec<Option<i64>> = json.deserialize(&bytes).unwrap();
        prop_assert_eq!(back, items);
    }

    #[test]
    fn prop_string_round_trip(s in any::<String>()) {
        for json in [Json::default(), Json::compatible()] {
            let bytes = json.serialize(&s).unwrap();
            let back: String = json.deserialize(&bytes).unwrap();
            prop_assert_eq!(&back, &s);
        }
    }

    #[test]
    fn prop_float_round_trip(v in -1e300f64..1e300f64, scale in -320i32..300) {
        let json = Json::default();
        let v = v * 10f64.powi(scale).min(1.0);
        let bytes = json.serialize(&v).unwrap();
        let back: f64 = json.deserialize(&bytes).unwrap();
        prop_assert_eq!(back.to_bits(), v.to_bits());
    }

    #[test]
    fn prop_map_round_trip(
        entries in prop::collection::hash_map(".{0,8}", prop::collection::vec(any::<u32>(), 0..4), 0..16),
        sort in any::<bool>(),
    ) {
        let json = Json::default().sort_map_keys(sort);
        let bytes = json.serialize(&entries).unwrap();
        let back: HashMap<String, Vec<u32>> = json.deserialize(&bytes).unwrap();
        prop_assert_eq!(back, entries);
    }

    #[test]
    fn prop_int_keyed_map_round_trip(entries in prop::collection::btree_map(any::<i32>(), any::<bool>(), 0..16)) {
        let json = Json::default().sort_map_keys(true);
        let bytes = json.serialize(&entries).unwrap();
        let back: BTreeMap<i32, bool> = json.deserialize(&bytes).unwrap();
        prop_assert_eq!(back, entries);
    }

    #[test]
    fn prop_untyped_documents_are_stable(items in prop::collection::vec(any::<i32>(), 0..8)) {
        let json = Json::default().sort_map_keys(true);
        let ty = Type::interface();
        let doc = Value::dynamic(
            Type::map(Type::string(), Type::slice(Type::int32())),
            Value::map([(
                Value::string("items"),
                Value::list(items.iter().map(|v| Value::Int(*v as i64))),
            )]),
        );
        let first = json.marshal(&doc, &ty).unwrap();
        let mut slot = Value::Null;
        json.unmarshal(&first, &mut slot, &ty).unwrap();
        let second = json.marshal(&slot, &ty).unwrap();
        prop_assert_eq!(first, second);
    }
}
