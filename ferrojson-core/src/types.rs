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

//! Type descriptors.
//!
//! A [`Type`] is the identity the codec engine dispatches and caches on. It is
//! an immutable, cheaply clonable handle: equality and hashing only look at a
//! process-unique id.
//!
//! Unnamed composites (`[]T`, `[N]T`, `map[K]V`, `*T`) are interned, so asking
//! for `Type::slice(Type::int())` twice yields the same descriptor. Named types
//! are built with [`TypeBuilder`] and are always distinct; they are the only
//! types that carry custom marshal contracts and capabilities.
//!
//! Self-referential types are declared first and defined afterwards:
//!
//! ```rust
//! use ferrojson_core::types::{Field, Kind, Type, TypeBuilder};
//!
//! let node = TypeBuilder::new("Node").declare();
//! node.define(Kind::Struct(vec![
//!     Field::new("Value", Type::int()),
//!     Field::new("Next", Type::ptr(node.clone())),
//! ]))
//! .unwrap();
//! assert!(node.is_defined());
//! assert_eq!(Type::ptr(node.clone()).name(), "*Node");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use dashmap::DashMap;

use crate::error::Error;
use crate::value::Value;

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

pub type MarshalJsonFn = Arc<dyn Fn(&Value) -> Result<Vec<u8>, Error> + Send + Sync>;
pub type UnmarshalJsonFn = Arc<dyn Fn(&mut Value, &[u8]) -> Result<(), Error> + Send + Sync>;
pub type MarshalTextFn = Arc<dyn Fn(&Value) -> Result<String, Error> + Send + Sync>;
pub type UnmarshalTextFn = Arc<dyn Fn(&mut Value, &str) -> Result<(), Error> + Send + Sync>;

/// Receiver a custom contract is declared on.
///
/// A value-receiver contract belongs to both `T` and `*T`; a pointer-receiver
/// contract only to `*T`, so using it on a `T` location promotes the receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    Value,
    Pointer,
}

#[derive(Clone)]
pub struct Method<F> {
    pub receiver: Receiver,
    pub func: F,
}

/// Custom marshal contracts of a named type.
#[derive(Clone, Default)]
pub struct Methods {
    pub marshal_json: Option<Method<MarshalJsonFn>>,
    pub unmarshal_json: Option<Method<UnmarshalJsonFn>>,
    pub marshal_text: Option<Method<MarshalTextFn>>,
    pub unmarshal_text: Option<Method<UnmarshalTextFn>>,
}

impl Methods {
    pub fn is_empty(&self) -> bool {
        self.marshal_json.is_none()
            && self.unmarshal_json.is_none()
            && self.marshal_text.is_none()
            && self.unmarshal_text.is_none()
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods")
            .field("marshal_json", &self.marshal_json.as_ref().map(|m| m.receiver))
            .field(
                "unmarshal_json",
                &self.unmarshal_json.as_ref().map(|m| m.receiver),
            )
            .field("marshal_text", &self.marshal_text.as_ref().map(|m| m.receiver))
            .field(
                "unmarshal_text",
                &self.unmarshal_text.as_ref().map(|m| m.receiver),
            )
            .finish()
    }
}

/// A named capability a constrained interface requires of its concrete values.
#[derive(Clone, Debug)]
pub struct Capability {
    id: u64,
    name: Arc<str>,
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Capability {
    pub fn new(name: impl AsRef<str>) -> Capability {
        Capability {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name.as_ref()),
        }
    }

    /// Satisfied by every type with a JSON marshal contract.
    pub fn json_marshaler() -> Capability {
        static CAP: LazyLock<Capability> = LazyLock::new(|| Capability::new("Marshaler"));
        CAP.clone()
    }

    /// Satisfied by every type with a text marshal contract.
    pub fn text_marshaler() -> Capability {
        static CAP: LazyLock<Capability> =
            LazyLock::new(|| Capability::new("TextMarshaler"));
        CAP.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A struct field. The JSON name is the field name.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub omit_empty: bool,
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Field {
        Field {
            name: name.into(),
            ty,
            omit_empty: false,
            embedded: false,
        }
    }

    pub fn omit_empty(mut self) -> Field {
        self.omit_empty = true;
        self
    }

    /// Flattens the fields of an embedded struct (or pointer to struct) into the parent.
    pub fn embedded(mut self) -> Field {
        self.embedded = true;
        self
    }
}

#[derive(Clone, Debug)]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint,
    Uintptr,
    Float32,
    Float64,
    String,
    /// Pre-encoded JSON passed through verbatim.
    RawMessage,
    /// Arbitrary-precision number kept as its literal text.
    Number,
    /// Untyped JSON document.
    Any,
    /// `None` accepts any concrete type; `Some` restricts to a capability.
    Interface(Option<Capability>),
    Struct(Vec<Field>),
    Array(Type, usize),
    Slice(Type),
    Map(Type, Type),
    Ptr(Type),
    Chan,
    Func,
    Complex64,
    Complex128,
    UnsafePointer,
    /// A declared type whose definition never arrived.
    Undefined,
}

static UNDEFINED_KIND: Kind = Kind::Undefined;

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Int => "int",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uint => "uint",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::RawMessage => "RawMessage",
            Kind::Number => "Number",
            Kind::Any => "any",
            Kind::Interface(_) => "interface",
            Kind::Struct(_) => "struct",
            Kind::Array(..) => "array",
            Kind::Slice(_) => "slice",
            Kind::Map(..) => "map",
            Kind::Ptr(_) => "ptr",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::UnsafePointer => "UnsafePointer",
            Kind::Undefined => "undefined",
        }
    }

    #[inline]
    pub fn is_signed_int(&self) -> bool {
        matches!(
            self,
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 | Kind::Int
        )
    }

    #[inline]
    pub fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Uint | Kind::Uintptr
        )
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    /// Bool, numeric and string kinds: the ones with a native codec.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Kind::Bool | Kind::String)
            || self.is_signed_int()
            || self.is_unsigned_int()
            || self.is_float()
    }
}

struct TypeInner {
    id: u64,
    name: String,
    named: bool,
    kind: OnceLock<Kind>,
    methods: Methods,
    capabilities: Vec<Capability>,
}

/// Stable identity plus shape classification of a type.
#[derive(Clone)]
pub struct Type(Arc<TypeInner>);

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({}#{})", self.0.name, self.0.id)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CompositeKey {
    Slice(u64),
    Array(u64, usize),
    Map(u64, u64),
    Ptr(u64),
    Interface(u64),
}

static COMPOSITES: LazyLock<DashMap<CompositeKey, Type>> = LazyLock::new(DashMap::new);

fn intern(key: CompositeKey, make: impl FnOnce() -> Type) -> Type {
    if let Some(ty) = COMPOSITES.get(&key) {
        return ty.value().clone();
    }
    COMPOSITES.entry(key).or_insert_with(make).value().clone()
}

macro_rules! builtin_types {
    ($($fn_name:ident => $kind:ident, $name:literal;)*) => {
        impl Type {
            $(
                pub fn $fn_name() -> Type {
                    static TYPE: LazyLock<Type> =
                        LazyLock::new(|| Type::new($name, false, Kind::$kind, Methods::default(), Vec::new()));
                    TYPE.clone()
                }
            )*
        }
    };
}

builtin_types! {
    bool => Bool, "bool";
    int8 => Int8, "int8";
    int16 => Int16, "int16";
    int32 => Int32, "int32";
    int64 => Int64, "int64";
    int => Int, "int";
    uint8 => Uint8, "uint8";
    uint16 => Uint16, "uint16";
    uint32 => Uint32, "uint32";
    uint64 => Uint64, "uint64";
    uint => Uint, "uint";
    uintptr => Uintptr, "uintptr";
    float32 => Float32, "float32";
    float64 => Float64, "float64";
    string => String, "string";
    raw_message => RawMessage, "RawMessage";
    number => Number, "Number";
    any => Any, "Any";
    chan => Chan, "chan";
    func => Func, "func";
    complex64 => Complex64, "complex64";
    complex128 => Complex128, "complex128";
    unsafe_pointer => UnsafePointer, "UnsafePointer";
}

impl Type {
    fn new(
        name: impl Into<String>,
        named: bool,
        kind: Kind,
        methods: Methods,
        capabilities: Vec<Capability>,
    ) -> Type {
        let cell = OnceLock::new();
        let _ = cell.set(kind);
        Type::from_cell(name.into(), named, cell, methods, capabilities)
    }

    fn from_cell(
        name: String,
        named: bool,
        kind: OnceLock<Kind>,
        methods: Methods,
        capabilities: Vec<Capability>,
    ) -> Type {
        Type(Arc::new(TypeInner {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            named,
            kind,
            methods,
            capabilities,
        }))
    }

    /// The open interface type, `interface {}`.
    pub fn interface() -> Type {
        static TYPE: LazyLock<Type> = LazyLock::new(|| {
            Type::new(
                "interface {}",
                false,
                Kind::Interface(None),
                Methods::default(),
                Vec::new(),
            )
        });
        TYPE.clone()
    }

    /// An interface restricted to values satisfying `capability`.
    pub fn interface_of(capability: Capability) -> Type {
        intern(CompositeKey::Interface(capability.id), || {
            Type::new(
                capability.name().to_string(),
                false,
                Kind::Interface(Some(capability.clone())),
                Methods::default(),
                Vec::new(),
            )
        })
    }

    pub fn slice(elem: Type) -> Type {
        intern(CompositeKey::Slice(elem.id()), || {
            Type::new(
                format!("[]{}", elem),
                false,
                Kind::Slice(elem.clone()),
                Methods::default(),
                Vec::new(),
            )
        })
    }

    pub fn array(elem: Type, len: usize) -> Type {
        intern(CompositeKey::Array(elem.id(), len), || {
            Type::new(
                format!("[{}]{}", len, elem),
                false,
                Kind::Array(elem.clone(), len),
                Methods::default(),
                Vec::new(),
            )
        })
    }

    pub fn map(key: Type, value: Type) -> Type {
        intern(CompositeKey::Map(key.id(), value.id()), || {
            Type::new(
                format!("map[{}]{}", key, value),
                false,
                Kind::Map(key.clone(), value.clone()),
                Methods::default(),
                Vec::new(),
            )
        })
    }

    pub fn ptr(elem: Type) -> Type {
        intern(CompositeKey::Ptr(elem.id()), || {
            Type::new(
                format!("*{}", elem),
                false,
                Kind::Ptr(elem.clone()),
                Methods::default(),
                Vec::new(),
            )
        })
    }

    /// An anonymous struct. Every call yields a distinct type.
    pub fn structure(fields: Vec<Field>) -> Type {
        let name = {
            let parts: Vec<String> = fields
                .iter()
                .map(|f| format!("{} {}", f.name, f.ty))
                .collect();
            format!("struct {{ {} }}", parts.join("; "))
        };
        Type::new(name, false, Kind::Struct(fields), Methods::default(), Vec::new())
    }

    /// The unaliased builtin type of a primitive kind, used for map keys.
    pub fn of_kind(kind: &Kind) -> Option<Type> {
        let ty = match kind {
            Kind::Bool => Type::bool(),
            Kind::Int8 => Type::int8(),
            Kind::Int16 => Type::int16(),
            Kind::Int32 => Type::int32(),
            Kind::Int64 => Type::int64(),
            Kind::Int => Type::int(),
            Kind::Uint8 => Type::uint8(),
            Kind::Uint16 => Type::uint16(),
            Kind::Uint32 => Type::uint32(),
            Kind::Uint64 => Type::uint64(),
            Kind::Uint => Type::uint(),
            Kind::Uintptr => Type::uintptr(),
            Kind::Float32 => Type::float32(),
            Kind::Float64 => Type::float64(),
            Kind::String => Type::string(),
            _ => return None,
        };
        Some(ty)
    }

    #[inline(always)]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline(always)]
    pub fn is_named(&self) -> bool {
        self.0.named
    }

    /// The shape of this type; [`Kind::Undefined`] for a declared type that was never defined.
    #[inline(always)]
    pub fn kind(&self) -> &Kind {
        self.0.kind.get().unwrap_or(&UNDEFINED_KIND)
    }

    #[inline(always)]
    pub fn is_defined(&self) -> bool {
        self.0.kind.get().is_some()
    }

    #[inline(always)]
    pub fn methods(&self) -> &Methods {
        &self.0.methods
    }

    /// Completes a type created with [`TypeBuilder::declare`].
    pub fn define(&self, kind: Kind) -> Result<(), Error> {
        crate::ensure!(
            !matches!(kind, Kind::Undefined),
            Error::invariant(format!("type {} can not be defined as undefined", self))
        );
        self.0.kind.set(kind).map_err(|_| {
            Error::invariant(format!("type {} is already defined", self))
        })
    }

    /// Element type of a pointer, or `None` for any other kind.
    pub fn ptr_elem(&self) -> Option<&Type> {
        match self.kind() {
            Kind::Ptr(elem) => Some(elem),
            _ => None,
        }
    }

    /// Whether the top-level value of this type is itself an indirection.
    pub fn likes_ptr(&self) -> bool {
        fn likes_ptr_at(ty: &Type, depth: usize) -> bool {
            if depth > 64 {
                return false;
            }
            match ty.kind() {
                Kind::Ptr(_) | Kind::Map(..) | Kind::Chan | Kind::Func => true,
                Kind::Struct(fields) => fields.len() == 1 && likes_ptr_at(&fields[0].ty, depth + 1),
                Kind::Array(elem, 1) => likes_ptr_at(elem, depth + 1),
                _ => false,
            }
        }
        likes_ptr_at(self, 0)
    }

    /// JSON marshal contract in the method set of this type: value receivers
    /// of `T`, or any receiver of the target when this is `*T`.
    pub fn json_marshaler(&self) -> Option<&MarshalJsonFn> {
        match self.kind() {
            Kind::Ptr(elem) => elem.methods().marshal_json.as_ref().map(|m| &m.func),
            _ => self
                .methods()
                .marshal_json
                .as_ref()
                .filter(|m| m.receiver == Receiver::Value)
                .map(|m| &m.func),
        }
    }

    /// JSON marshal contract in the method set of `*Self`.
    pub fn ptr_json_marshaler(&self) -> Option<&MarshalJsonFn> {
        self.methods().marshal_json.as_ref().map(|m| &m.func)
    }

    pub fn text_marshaler(&self) -> Option<&MarshalTextFn> {
        match self.kind() {
            Kind::Ptr(elem) => elem.methods().marshal_text.as_ref().map(|m| &m.func),
            _ => self
                .methods()
                .marshal_text
                .as_ref()
                .filter(|m| m.receiver == Receiver::Value)
                .map(|m| &m.func),
        }
    }

    pub fn ptr_text_marshaler(&self) -> Option<&MarshalTextFn> {
        self.methods().marshal_text.as_ref().map(|m| &m.func)
    }

    /// JSON unmarshal contract in the method set of `*Self`.
    pub fn ptr_json_unmarshaler(&self) -> Option<&UnmarshalJsonFn> {
        self.methods().unmarshal_json.as_ref().map(|m| &m.func)
    }

    pub fn ptr_text_unmarshaler(&self) -> Option<&UnmarshalTextFn> {
        self.methods().unmarshal_text.as_ref().map(|m| &m.func)
    }

    /// Text unmarshal contract in the method set of this type; only a `*T`
    /// whose target has the contract qualifies.
    pub fn text_unmarshaler(&self) -> Option<&UnmarshalTextFn> {
        match self.kind() {
            Kind::Ptr(elem) => elem.methods().unmarshal_text.as_ref().map(|m| &m.func),
            _ => self
                .methods()
                .unmarshal_text
                .as_ref()
                .filter(|m| m.receiver == Receiver::Value)
                .map(|m| &m.func),
        }
    }

    pub fn json_unmarshaler(&self) -> Option<&UnmarshalJsonFn> {
        match self.kind() {
            Kind::Ptr(elem) => elem.methods().unmarshal_json.as_ref().map(|m| &m.func),
            _ => self
                .methods()
                .unmarshal_json
                .as_ref()
                .filter(|m| m.receiver == Receiver::Value)
                .map(|m| &m.func),
        }
    }

    /// Whether values of this type may be stored in an interface constrained by `capability`.
    pub fn satisfies(&self, capability: &Capability) -> bool {
        if *capability == Capability::json_marshaler() {
            return self.json_marshaler().is_some();
        }
        if *capability == Capability::text_marshaler() {
            return self.text_marshaler().is_some();
        }
        let owner = self.ptr_elem().unwrap_or(self);
        owner.0.capabilities.contains(capability)
    }
}

/// Builder for named types.
///
/// ```rust
/// use ferrojson_core::types::{Kind, Receiver, TypeBuilder};
/// use ferrojson_core::value::Value;
///
/// let celsius = TypeBuilder::new("Celsius")
///     .marshal_text(Receiver::Value, |v: &Value| {
///         Ok(format!("{}C", v.as_f64().unwrap_or_default()))
///     })
///     .build(Kind::Float64);
/// assert!(celsius.text_marshaler().is_some());
/// ```
pub struct TypeBuilder {
    name: String,
    methods: Methods,
    capabilities: Vec<Capability>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            methods: Methods::default(),
            capabilities: Vec::new(),
        }
    }

    pub fn marshal_json<F>(mut self, receiver: Receiver, f: F) -> TypeBuilder
    where
        F: Fn(&Value) -> Result<Vec<u8>, Error> + Send + Sync + 'static,
    {
        self.methods.marshal_json = Some(Method {
            receiver,
            func: Arc::new(f),
        });
        self
    }

    pub fn unmarshal_json<F>(mut self, receiver: Receiver, f: F) -> TypeBuilder
    where
        F: Fn(&mut Value, &[u8]) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.methods.unmarshal_json = Some(Method {
            receiver,
            func: Arc::new(f),
        });
        self
    }

    pub fn marshal_text<F>(mut self, receiver: Receiver, f: F) -> TypeBuilder
    where
        F: Fn(&Value) -> Result<String, Error> + Send + Sync + 'static,
    {
        self.methods.marshal_text = Some(Method {
            receiver,
            func: Arc::new(f),
        });
        self
    }

    pub fn unmarshal_text<F>(mut self, receiver: Receiver, f: F) -> TypeBuilder
    where
        F: Fn(&mut Value, &str) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.methods.unmarshal_text = Some(Method {
            receiver,
            func: Arc::new(f),
        });
        self
    }

    pub fn implements(mut self, capability: Capability) -> TypeBuilder {
        self.capabilities.push(capability);
        self
    }

    pub fn build(self, kind: Kind) -> Type {
        Type::new(self.name, true, kind, self.methods, self.capabilities)
    }

    /// Creates the type without a shape; complete it with [`Type::define`].
    pub fn declare(self) -> Type {
        Type::from_cell(
            self.name,
            true,
            OnceLock::new(),
            self.methods,
            self.capabilities,
        )
    }
}
