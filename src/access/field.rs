use crate::{
    access::{cast, load_field, require_instance, store_field, unexpected_null},
    error::MirrorError,
    types::{members::FieldDescription, RuntimeType},
    value::{FromValue, Value},
};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// Reads and writes one resolved field.
///
/// Static fields ignore the instance argument. Instance fields need a
/// non-null receiver; `None` or `Value::Null` fails with
/// [`MirrorError::MissingInstance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldAccessor {
    field: FieldDescription,
}

impl FieldAccessor {
    pub fn new(field: FieldDescription) -> Self {
        Self { field }
    }

    /// An accessor whose reads are checked against `field_type`. Nothing is
    /// checked here; mismatches surface on `get`.
    pub fn typed<T: FromValue>(
        field: FieldDescription,
        field_type: RuntimeType,
    ) -> TypedFieldAccessor<T> {
        TypedFieldAccessor {
            inner: Self::new(field),
            field_type,
            _marker: PhantomData,
        }
    }

    pub fn description(&self) -> FieldDescription {
        self.field
    }

    pub fn get(&self, instance: Option<&Value>) -> Result<Value, MirrorError> {
        let instance = require_instance(&self.field, instance)?;
        load_field(self.field, instance)
            .map_err(|e| MirrorError::invocation(format!("{:?}", self.field), e))
    }

    /// Like [`get`](Self::get), but null is an error.
    pub fn require(&self, instance: Option<&Value>) -> Result<Value, MirrorError> {
        match self.get(instance)? {
            Value::Null => Err(unexpected_null(&self.field)),
            value => Ok(value),
        }
    }

    pub fn set(
        &self,
        instance: Option<&Value>,
        value: impl Into<Value>,
    ) -> Result<(), MirrorError> {
        let instance = require_instance(&self.field, instance)?;
        store_field(self.field, instance, value.into())
            .map_err(|e| MirrorError::invocation(format!("{:?}", self.field), e))
    }
}

pub struct TypedFieldAccessor<T> {
    inner: FieldAccessor,
    field_type: RuntimeType,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> TypedFieldAccessor<T> {
    pub fn description(&self) -> FieldDescription {
        self.inner.field
    }

    pub fn field_type(&self) -> &RuntimeType {
        &self.field_type
    }

    pub fn untyped(&self) -> FieldAccessor {
        self.inner
    }

    /// Reads the field; `Ok(None)` for null. A value that is not an instance
    /// of the field type fails with [`MirrorError::TypeMismatch`].
    pub fn get(&self, instance: Option<&Value>) -> Result<Option<T>, MirrorError> {
        let value = self.inner.get(instance)?;
        cast(self.inner.field.parent.registry, &self.field_type, value)
    }

    pub fn require(&self, instance: Option<&Value>) -> Result<T, MirrorError> {
        self.get(instance)?
            .ok_or_else(|| unexpected_null(&self.inner.field))
    }

    pub fn set(&self, instance: Option<&Value>, value: T) -> Result<(), MirrorError>
    where
        T: Into<Value>,
    {
        self.inner.set(instance, value)
    }
}

impl<T> Clone for TypedFieldAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner,
            field_type: self.field_type.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for TypedFieldAccessor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedFieldAccessor")
            .field("field", &self.inner.field)
            .field("field_type", &self.field_type)
            .finish()
    }
}
