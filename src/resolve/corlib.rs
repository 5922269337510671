//! Built-in types present in every registry.
//!
//! Their methods are native trampolines, registered the same way user types
//! register theirs.
use crate::{
    error::{BoxError, MirrorError},
    resolve::TypeRegistry,
    types::{
        members::{FieldDefinition, MethodDefinition},
        RuntimeType, TypeDefinition,
    },
    value::{ObjectRef, Value, VectorRef},
};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

pub const OBJECT: &str = "core.Object";
pub const STRING: &str = "core.String";
pub const LIST: &str = "core.List";

pub(crate) fn definitions() -> Vec<TypeDefinition> {
    vec![object(), string(), list()]
}

fn object() -> TypeDefinition {
    TypeDefinition::class(OBJECT)
        .method(
            MethodDefinition::new("to_string", RuntimeType::String)
                .with_virtual()
                .body(object_to_string),
        )
        .method(
            MethodDefinition::new("hash_code", RuntimeType::Int32)
                .with_virtual()
                .body(object_hash_code),
        )
        .method(
            MethodDefinition::new("equals", RuntimeType::Boolean)
                .params([RuntimeType::Object])
                .with_virtual()
                .body(object_equals),
        )
}

fn string() -> TypeDefinition {
    TypeDefinition::class(STRING)
        .extends(RuntimeType::Object)
        .method(MethodDefinition::new("length", RuntimeType::Int32).body(string_length))
        .method(MethodDefinition::new("is_empty", RuntimeType::Boolean).body(string_is_empty))
}

fn list() -> TypeDefinition {
    TypeDefinition::class(LIST)
        .generic_parameters(["T"])
        .extends(RuntimeType::Object)
        .field(
            FieldDefinition::new("items", RuntimeType::vector(RuntimeType::parameter(0))).private(),
        )
        .method(MethodDefinition::new("size", RuntimeType::Int32).body(list_size))
        .method(
            MethodDefinition::new("get", RuntimeType::parameter(0))
                .params([RuntimeType::Int32])
                .body(list_get),
        )
}

fn receiver(this: Option<&Value>) -> Result<&Value, BoxError> {
    this.ok_or_else(|| "missing receiver".into())
}

fn object_to_string(this: Option<&Value>, _: &[Value]) -> Result<Value, BoxError> {
    Ok(Value::from(receiver(this)?.to_string()))
}

fn object_hash_code(this: Option<&Value>, _: &[Value]) -> Result<Value, BoxError> {
    let mut hasher = DefaultHasher::new();
    match receiver(this)? {
        Value::Object(o) => o.hash(&mut hasher),
        other => other.to_string().hash(&mut hasher),
    }
    Ok(Value::Int32(hasher.finish() as i32))
}

fn object_equals(this: Option<&Value>, args: &[Value]) -> Result<Value, BoxError> {
    Ok(Value::Boolean(args.first() == Some(receiver(this)?)))
}

fn string_of(this: Option<&Value>) -> Result<&str, BoxError> {
    receiver(this)?
        .as_str()
        .ok_or_else(|| "receiver is not a string".into())
}

fn string_length(this: Option<&Value>, _: &[Value]) -> Result<Value, BoxError> {
    Ok(Value::Int32(string_of(this)?.chars().count() as i32))
}

fn string_is_empty(this: Option<&Value>, _: &[Value]) -> Result<Value, BoxError> {
    Ok(Value::Boolean(string_of(this)?.is_empty()))
}

fn list_items(this: Option<&Value>) -> Result<VectorRef, BoxError> {
    let list = receiver(this)?
        .as_object()
        .ok_or("receiver is not a list")?;
    match list.field("items")? {
        Value::Vector(v) => Ok(v),
        Value::Null => Ok(VectorRef::new(RuntimeType::Object, vec![])),
        other => Err(format!("corrupt list storage: {}", other).into()),
    }
}

fn list_size(this: Option<&Value>, _: &[Value]) -> Result<Value, BoxError> {
    Ok(Value::Int32(list_items(this)?.items().len() as i32))
}

fn list_get(this: Option<&Value>, args: &[Value]) -> Result<Value, BoxError> {
    let items = list_items(this)?;
    let index = match args.first() {
        Some(Value::Int32(i)) => *i,
        _ => return Err("index must be an Int32".into()),
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| items.items().get(i))
        .cloned()
        .ok_or_else(|| {
            format!(
                "index {} out of bounds for length {}",
                index,
                items.items().len()
            )
            .into()
        })
}

/// Allocates a `core.List<element>` holding `items`.
pub fn new_list(
    registry: &'static TypeRegistry,
    element: RuntimeType,
    items: Vec<Value>,
) -> Result<ObjectRef, MirrorError> {
    let list = registry.new_object(&RuntimeType::generic(LIST, [element.clone()]))?;
    list.set_field("items", VectorRef::new(element, items))
        .map_err(|e| MirrorError::invocation(LIST, e))?;
    Ok(list)
}
