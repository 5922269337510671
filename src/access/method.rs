use crate::{
    access::{call_method, cast, require_instance, unexpected_null},
    error::MirrorError,
    types::{members::MethodDescription, RuntimeType},
    value::{FromValue, Value},
};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// Invokes one resolved method. Receiver rules match [`FieldAccessor`](super::FieldAccessor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodInvoker {
    method: MethodDescription,
}

impl MethodInvoker {
    pub fn new(method: MethodDescription) -> Self {
        Self { method }
    }

    pub fn typed<T: FromValue>(
        method: MethodDescription,
        return_type: RuntimeType,
    ) -> TypedMethodInvoker<T> {
        TypedMethodInvoker {
            inner: Self::new(method),
            return_type,
            _marker: PhantomData,
        }
    }

    pub fn description(&self) -> MethodDescription {
        self.method
    }

    pub fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, MirrorError> {
        let receiver = require_instance(&self.method, receiver)?;
        call_method(self.method, receiver, args)
            .map_err(|e| MirrorError::invocation(format!("{:?}", self.method), e))
    }

    pub fn require(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, MirrorError> {
        match self.invoke(receiver, args)? {
            Value::Null => Err(unexpected_null(&self.method)),
            value => Ok(value),
        }
    }
}

pub struct TypedMethodInvoker<T> {
    inner: MethodInvoker,
    return_type: RuntimeType,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> TypedMethodInvoker<T> {
    pub fn description(&self) -> MethodDescription {
        self.inner.method
    }

    pub fn return_type(&self) -> &RuntimeType {
        &self.return_type
    }

    pub fn untyped(&self) -> MethodInvoker {
        self.inner
    }

    pub fn invoke(
        &self,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Result<Option<T>, MirrorError> {
        let value = self.inner.invoke(receiver, args)?;
        cast(self.inner.method.parent.registry, &self.return_type, value)
    }

    pub fn require(&self, receiver: Option<&Value>, args: &[Value]) -> Result<T, MirrorError> {
        self.invoke(receiver, args)?
            .ok_or_else(|| unexpected_null(&self.inner.method))
    }
}

impl<T> Clone for TypedMethodInvoker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner,
            return_type: self.return_type.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for TypedMethodInvoker<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedMethodInvoker")
            .field("method", &self.inner.method)
            .field("return_type", &self.return_type)
            .finish()
    }
}
