//! Handles for repeated access to resolved members.
//!
//! The free functions in this module are the low-level mechanism: they check
//! receivers, stored values and arguments against the metadata and fail with
//! an [`AccessError`]. The handles in [`field`] and [`method`] add the
//! instance requirement, optional result type checks, and wrap low-level
//! failures as [`MirrorError::InvocationFailure`].
use crate::{
    error::{AccessError, BoxError, MirrorError},
    resolve::TypeRegistry,
    types::{
        comparer::TypeComparer,
        members::{FieldDescription, MemberInfo, MethodDescription},
        RuntimeType, TypeDescription,
    },
    value::{FromValue, ObjectRef, Value},
};
use std::fmt::Debug;
use tracing::{trace, warn};

pub mod field;
pub mod method;

pub use field::{FieldAccessor, TypedFieldAccessor};
pub use method::{MethodInvoker, TypedMethodInvoker};

fn describe_value(value: Option<&Value>) -> String {
    match value.and_then(Value::runtime_type) {
        Some(t) => t.get_name(),
        None => "null".to_string(),
    }
}

/// Whether `value` may be stored in a slot, or passed as an argument, of
/// type `expected`. Checks the erased type only.
fn is_storable(registry: &TypeRegistry, expected: &RuntimeType, value: &Value) -> bool {
    match value {
        Value::Null => !expected.is_primitive(),
        _ => TypeComparer::new(registry).is_instance(value, expected),
    }
}

fn receiver_object<'v>(
    owner: TypeDescription,
    instance: Option<&'v Value>,
) -> Result<&'v ObjectRef, AccessError> {
    let comparer = TypeComparer::new(owner.registry);
    if let Some(value) = instance {
        if let Value::Object(object) = value {
            if comparer.is_instance(value, &owner.runtime_type()) {
                return Ok(object);
            }
        }
    }
    Err(AccessError::NotAnInstance {
        expected: owner.type_name().to_string(),
        actual: describe_value(instance),
    })
}

pub fn load_field(field: FieldDescription, instance: Option<&Value>) -> Result<Value, AccessError> {
    if field.is_static() {
        return field.parent.definition().statics.get(field.field.slot);
    }
    let object = receiver_object(field.parent, instance)?;
    object.0.storage.get(field.field.slot)
}

pub fn store_field(
    field: FieldDescription,
    instance: Option<&Value>,
    value: Value,
) -> Result<(), AccessError> {
    let declared = &field.field.field_type;
    if !is_storable(field.parent.registry, declared, &value) {
        return Err(AccessError::IncompatibleValue {
            expected: declared.erase().get_name(),
            actual: describe_value(Some(&value)),
        });
    }
    if field.is_static() {
        return field.parent.definition().statics.set(field.field.slot, value);
    }
    let object = receiver_object(field.parent, instance)?;
    object.0.storage.set(field.field.slot, value)
}

/// Calls `method`, dispatching virtual and interface methods on the
/// receiver's runtime class. Void methods produce `Value::Null`.
pub fn call_method(
    method: MethodDescription,
    receiver: Option<&Value>,
    args: &[Value],
) -> Result<Value, BoxError> {
    let registry = method.parent.registry;
    let definition = method.method;

    if definition.parameters.len() != args.len() {
        return Err(AccessError::ArgumentCount {
            expected: definition.parameters.len(),
            actual: args.len(),
        }
        .into());
    }
    for (index, (param, arg)) in definition.parameters.iter().zip(args).enumerate() {
        if !is_storable(registry, param, arg) {
            return Err(AccessError::ArgumentType {
                index,
                expected: param.erase().get_name(),
                actual: describe_value(Some(arg)),
            }
            .into());
        }
    }

    let target = if definition.static_member {
        method
    } else {
        let this = receiver.filter(|v| !v.is_null());
        let comparer = TypeComparer::new(registry);
        match this {
            Some(value) if comparer.is_instance(value, &method.parent.runtime_type()) => {}
            _ => {
                return Err(AccessError::NotAnInstance {
                    expected: method.parent.type_name().to_string(),
                    actual: describe_value(this),
                }
                .into())
            }
        }
        let runtime_class = this
            .and_then(Value::runtime_type)
            .and_then(|t| registry.describe(&t));
        match runtime_class {
            Some(class) if definition.virtual_member || method.parent.is_interface() => {
                registry.resolve_virtual_method(method, class)
            }
            _ => method,
        }
    };
    trace!(?method, ?target, "calling method");

    let body = target
        .method
        .body
        .as_ref()
        .ok_or_else(|| AccessError::AbstractMethod(format!("{:?}", target)))?;
    let this = if target.is_static() { None } else { receiver };
    let result = body(this, args)?;
    Ok(match target.method.return_type {
        RuntimeType::Void => Value::Null,
        _ => result,
    })
}

/// The receiver to use for `member`: `None` for static members, otherwise a
/// non-null instance.
fn require_instance<'v, M: MemberInfo + Debug>(
    member: &M,
    instance: Option<&'v Value>,
) -> Result<Option<&'v Value>, MirrorError> {
    if member.is_static() {
        return Ok(None);
    }
    match instance {
        Some(value) if !value.is_null() => Ok(Some(value)),
        _ => Err(MirrorError::MissingInstance {
            owner: member.parent().type_name().to_string(),
            member: format!("{:?}", member),
        }),
    }
}

/// Checks a value produced by a typed handle: null passes, anything else must
/// be an instance of the erased `expected` type and convert to `T`.
fn cast<T: FromValue>(
    registry: &TypeRegistry,
    expected: &RuntimeType,
    value: Value,
) -> Result<Option<T>, MirrorError> {
    if value.is_null() {
        return Ok(None);
    }
    let converted = if TypeComparer::new(registry).is_instance(&value, expected) {
        T::from_value(&value)
    } else {
        None
    };
    match converted {
        Some(v) => Ok(Some(v)),
        None => {
            warn!(%expected, %value, "typed handle produced a value of another type");
            Err(MirrorError::TypeMismatch {
                expected: expected.get_name(),
                value: format!("{} ({})", value, describe_value(Some(&value))),
            })
        }
    }
}

fn unexpected_null<M: Debug>(member: &M) -> MirrorError {
    MirrorError::UnexpectedNull {
        member: format!("{:?}", member),
    }
}
