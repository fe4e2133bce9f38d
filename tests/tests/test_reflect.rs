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
use ferrojson_core::reflect::{named_type, struct_fields, Reflect};
use ferrojson_core::types::{Field, Kind, Receiver, Type, TypeBuilder};
use ferrojson_core::value::Value;
use ferrojson_core::Json;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Status {
    Active,
    Suspended,
}

impl Status {
    fn name(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Suspended => "suspended",
        }
    }

    fn parse(text: &str) -> Result<Status, Error> {
        match text {
            "active" => Ok(Status::Active),
            "suspended" => Ok(Status::Suspended),
            other => Err(Error::invalid_value(format!("unknown status {}", other))),
        }
    }
}

impl Reflect for Status {
    fn json_type() -> Type {
        let builder = TypeBuilder::new("Status")
            .marshal_text(Receiver::Value, |v: &Value| {
                let index = v.as_u64().unwrap_or_default();
                Ok(if index == 0 { "active" } else { "suspended" }.to_string())
            })
            .unmarshal_text(Receiver::Pointer, |slot: &mut Value, text: &str| {
                *slot = Status::parse(text)?.to_value();
                Ok(())
            });
        named_type::<Status>(builder, || Kind::Uint8)
    }

    fn to_value(&self) -> Value {
        Value::Uint(*self as u64)
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        match value.as_u64() {
            Some(0) => Ok(Status::Active),
            Some(1) => Ok(Status::Suspended),
            _ => Err(Error::invalid_value(format!("bad status {:?}", value))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: u64,
    owner: String,
    status: Status,
    limits: HashMap<String, i32>,
    history: Vec<f64>,
    parent: Option<Box<Account>>,
}

impl Reflect for Account {
    fn json_type() -> Type {
        named_type::<Account>(TypeBuilder::new("Account"), || {
            Kind::Struct(vec![
                Field::new("Id", u64::json_type()),
                Field::new("Owner", String::json_type()),
                Field::new("Status", Status::json_type()),
                Field::new("Limits", HashMap::<String, i32>::json_type()).omit_empty(),
                Field::new("History", Vec::<f64>::json_type()),
                Field::new("Parent", Option::<Box<Account>>::json_type()).omit_empty(),
            ])
        })
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            self.id.to_value(),
            self.owner.to_value(),
            self.status.to_value(),
            self.limits.to_value(),
            self.history.to_value(),
            self.parent.to_value(),
        ])
    }

    fn from_value(value: Value) -> Result<Self, Error> {
        let [id, owner, status, limits, history, parent] = struct_fields::<6>(value)?;
        Ok(Account {
            id: u64::from_value(id)?,
            owner: String::from_value(owner)?,
            status: Status::from_value(status)?,
            limits: HashMap::from_value(limits)?,
            history: Vec::from_value(history)?,
            parent: Option::from_value(parent)?,
        })
    }
}

fn account() -> Account {
    Account {
        id: 2,
        owner: "ann".to_string(),
        status: Status::Suspended,
        limits: HashMap::from([("daily".to_string(), 100)]),
        history: vec![1.5, -2.0],
        parent: Some(Box::new(Account {
            id: 1,
            owner: "root".to_string(),
            status: Status::Active,
            limits: HashMap::new(),
            history: vec![],
            parent: None,
        })),
    }
}

#[test]
fn test_descriptor_is_stable() {
    assert_eq!(Account::json_type(), Account::json_type());
    assert_eq!(Account::json_type().name(), "Account");
    assert_eq!(Vec::<Account>::json_type(), Type::slice(Account::json_type()));
}

#[test]
fn test_struct_round_trip() -> anyhow::Result<()> {
    let json = Json::default();
    let bytes = json.serialize(&account())?;
    assert_eq!(
        String::from_utf8(bytes.clone())?,
        r#"{"Id":2,"Owner":"ann","Status":"suspended","Limits":{"daily":100},"History":[1.5,-2],"Parent":{"Id":1,"Owner":"root","Status":"active","History":[]}}"#
    );
    let back: Account = json.deserialize(&bytes)?;
    assert_eq!(back, account());
    Ok(())
}

#[test]
fn test_text_contract_on_rust_enum() -> anyhow::Result<()> {
    let json = Json::default().sort_map_keys(true);
    let counts = BTreeMap::from([(Status::Suspended, 1u32), (Status::Active, 4)]);
    let bytes = json.serialize(&counts)?;
    assert_eq!(bytes, br#"{"active":4,"suspended":1}"#);
    let back: BTreeMap<Status, u32> = json.deserialize(&bytes)?;
    assert_eq!(back, counts);

    let err = json.deserialize::<Status>(br#""closed""#).unwrap_err();
    assert!(err.to_string().contains("unknown status closed"), "{}", err);
    Ok(())
}

#[test]
fn test_nil_collections_read_back_empty() -> anyhow::Result<()> {
    let json = Json::default();
    let v: Vec<String> = json.deserialize(b"null")?;
    assert!(v.is_empty());
    let m: HashMap<String, bool> = json.deserialize(b"null")?;
    assert!(m.is_empty());
    Ok(())
}

#[test]
fn test_integer_ranges() {
    let json = Json::default();
    assert_eq!(json.deserialize::<u8>(b"255").unwrap(), 255);
    assert!(matches!(
        json.deserialize::<u8>(b"256"),
        Err(Error::InvalidValue(_))
    ));
    assert!(json.deserialize::<i8>(b"-129").is_err());
    assert!(json.deserialize::<u32>(b"-1").is_err());
    assert_eq!(json.deserialize::<i64>(b"-9223372036854775808").unwrap(), i64::MIN);
    assert_eq!(json.deserialize::<u64>(b"18446744073709551615").unwrap(), u64::MAX);
}

#[test]
fn test_fixed_arrays_and_boxes() -> anyhow::Result<()> {
    let json = Json::default();
    let bytes = json.serialize(&[Box::new(1u16), Box::new(2)])?;
    assert_eq!(bytes, b"[1,2]");
    let back: [u16; 3] = json.deserialize(b"[7]")?;
    assert_eq!(back, [7, 0, 0]);
    Ok(())
}

#[test]
fn test_untyped_value() -> anyhow::Result<()> {
    let json = Json::default();
    let doc: Value = json.deserialize(br#"{"k": [true, "s"]}"#)?;
    assert_eq!(
        doc,
        Value::map([(
            Value::string("k"),
            Value::list([Value::Bool(true), Value::string("s")])
        )])
    );
    assert_eq!(json.serialize(&doc)?, br#"{"k":[true,"s"]}"#);
    Ok(())
}
