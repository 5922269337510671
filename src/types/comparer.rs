use crate::{resolve::TypeRegistry, types::RuntimeType, value::Value};

/// Equality and assignability over [`RuntimeType`]s of one registry.
pub struct TypeComparer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> TypeComparer<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn types_equal(&self, a: &RuntimeType, b: &RuntimeType) -> bool {
        a == b
    }

    pub fn type_slices_equal(&self, a: &[RuntimeType], b: &[RuntimeType]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.types_equal(a, b))
    }

    /// Whether a value of type `source` can be used where `target` is expected.
    ///
    /// Reference types are assignable to `Object`; primitives and `Void` are
    /// not. Named types are assignable to any of their supertypes; a raw
    /// target (no generic arguments) matches every instantiation of its
    /// definition. Vectors of reference types are covariant.
    pub fn is_assignable(&self, source: &RuntimeType, target: &RuntimeType) -> bool {
        if self.types_equal(source, target) {
            return true;
        }
        match (source, target) {
            (RuntimeType::Void, _) | (_, RuntimeType::Void) => false,
            (s, _) if s.is_primitive() => false,
            (_, RuntimeType::Object) => true,
            (RuntimeType::TypeParameter { .. }, _) | (_, RuntimeType::TypeParameter { .. }) => {
                false
            }
            (RuntimeType::Vector(s), RuntimeType::Vector(t)) => self.is_assignable(s, t),
            (_, RuntimeType::String)
            | (_, RuntimeType::Type(_))
            | (_, RuntimeType::Generic(_, _)) => {
                let raw = matches!(target, RuntimeType::Type(_));
                self.registry.supertypes(source).iter().any(|ancestor| {
                    ancestor == target || (raw && ancestor.erase() == *target)
                })
            }
            _ => false,
        }
    }

    /// Runtime instance check against the erasure of `target`. Primitive
    /// values are boxed, so every non-null value is an instance of `Object`
    /// and a `Char[]` is an instance of an erased `T[]`. `Null` is an
    /// instance of nothing; callers decide whether null is acceptable.
    pub fn is_instance(&self, value: &Value, target: &RuntimeType) -> bool {
        match value.runtime_type() {
            None => false,
            Some(actual) => self.is_boxed_assignable(&actual.erase(), &target.erase()),
        }
    }

    fn is_boxed_assignable(&self, actual: &RuntimeType, target: &RuntimeType) -> bool {
        match (actual, target) {
            (RuntimeType::Void, _) => false,
            (_, RuntimeType::Object) => true,
            (RuntimeType::Vector(a), RuntimeType::Vector(t)) => self.is_boxed_assignable(a, t),
            _ => self.is_assignable(actual, target),
        }
    }
}
