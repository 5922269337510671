//! Dynamic values passed through accessors and method trampolines.
use crate::types::RuntimeType;
use std::{
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

pub mod layout;
pub mod object;
pub mod storage;

pub use object::ObjectRef;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Char(char),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(Arc<str>),
    Vector(VectorRef),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value; `None` for null.
    pub fn runtime_type(&self) -> Option<RuntimeType> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(_) => RuntimeType::Boolean,
            Value::Char(_) => RuntimeType::Char,
            Value::Int8(_) => RuntimeType::Int8,
            Value::UInt8(_) => RuntimeType::UInt8,
            Value::Int16(_) => RuntimeType::Int16,
            Value::UInt16(_) => RuntimeType::UInt16,
            Value::Int32(_) => RuntimeType::Int32,
            Value::UInt32(_) => RuntimeType::UInt32,
            Value::Int64(_) => RuntimeType::Int64,
            Value::UInt64(_) => RuntimeType::UInt64,
            Value::Float32(_) => RuntimeType::Float32,
            Value::Float64(_) => RuntimeType::Float64,
            Value::String(_) => RuntimeType::String,
            Value::Vector(v) => RuntimeType::vector(v.element().clone()),
            Value::Object(o) => o.runtime_type().clone(),
        })
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Vector(v) => write!(f, "{:?}", v),
            Value::Object(o) => write!(f, "{:?}", o),
        }
    }
}

pub struct Vector {
    pub element: RuntimeType,
    pub items: Vec<Value>,
}

/// Immutable, shared vector. Equality is identity, like objects.
#[derive(Clone)]
pub struct VectorRef(pub Arc<Vector>);

impl VectorRef {
    pub fn new(element: RuntimeType, items: Vec<Value>) -> Self {
        Self(Arc::new(Vector { element, items }))
    }

    pub fn element(&self) -> &RuntimeType {
        &self.0.element
    }

    pub fn items(&self) -> &[Value] {
        &self.0.items
    }
}

impl PartialEq for VectorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for VectorRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.0.element, self.0.items.len())
    }
}

/// Rust types with a fixed runtime type descriptor.
pub trait Reflect {
    fn runtime_type() -> RuntimeType;
}

/// Conversion out of a non-null [`Value`]; `None` when the value has another shape.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive_values {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $t {
                fn runtime_type() -> RuntimeType {
                    RuntimeType::$variant
                }
            }

            impl FromValue for $t {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }

            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

primitive_values! {
    bool => Boolean,
    char => Char,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
}

impl Reflect for String {
    fn runtime_type() -> RuntimeType {
        RuntimeType::String
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl Reflect for Arc<str> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::String
    }
}

impl FromValue for Arc<str> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::String(v)
    }
}

/// Any value boxes to `Object`.
impl Reflect for Value {
    fn runtime_type() -> RuntimeType {
        RuntimeType::Object
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn runtime_type() -> RuntimeType {
        RuntimeType::vector(T::runtime_type())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vector(v) => v.items().iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: Reflect + Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Vector(VectorRef::new(
            T::runtime_type(),
            v.into_iter().map(Into::into).collect(),
        ))
    }
}

impl From<VectorRef> for Value {
    fn from(v: VectorRef) -> Self {
        Value::Vector(v)
    }
}
