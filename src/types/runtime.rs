use crate::{resolve::corlib, value::Value};
use std::{
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

/// Fully-qualified, dot separated type name (e.g. `core.List`).
pub type TypeName = Arc<str>;

runtime_type_impls! {
    simple_types: {
        Boolean => "Boolean",
        Char => "Char",
        Int8 => "Int8",
        UInt8 => "UInt8",
        Int16 => "Int16",
        UInt16 => "UInt16",
        Int32 => "Int32",
        UInt32 => "UInt32",
        Int64 => "Int64",
        UInt64 => "UInt64",
        Float32 => "Float32",
        Float64 => "Float64",
        Object => "Object",
        String => "String",
    },
    complex_types: {
        Void,
        Type(TypeName),
        Generic(TypeName, Vec<RuntimeType>),
        Vector(Box<RuntimeType>),
        TypeParameter {
            index: u16,
        },
    },
    get_name: {
        Void => "Void".to_string(),
        Type(name) => name.to_string(),
        Generic(name, args) => format!(
            "{}<{}>",
            name,
            args.iter().map(|a| a.get_name()).collect::<Vec<_>>().join(", ")
        ),
        Vector(t) => format!("{}[]", t.get_name()),
        TypeParameter { index } => format!("!{}", index),
    },
    erase: {
        Void => Void,
        Type(name) | Generic(name, _) => Type(name.clone()),
        Vector(t) => Vector(Box::new(t.erase())),
        TypeParameter { .. } => Object,
    }
}

impl RuntimeType {
    /// A non-generic (or raw) named type. The core object and string types
    /// map to their dedicated variants.
    pub fn named(name: impl AsRef<str>) -> Self {
        match name.as_ref() {
            corlib::OBJECT => RuntimeType::Object,
            corlib::STRING => RuntimeType::String,
            name => RuntimeType::Type(Arc::from(name)),
        }
    }

    pub fn generic(name: impl AsRef<str>, args: impl IntoIterator<Item = RuntimeType>) -> Self {
        RuntimeType::Generic(Arc::from(name.as_ref()), args.into_iter().collect())
    }

    pub fn vector(element: RuntimeType) -> Self {
        RuntimeType::Vector(Box::new(element))
    }

    pub fn parameter(index: u16) -> Self {
        RuntimeType::TypeParameter { index }
    }

    /// Built-in value types, which cannot hold null.
    pub fn is_primitive(&self) -> bool {
        self.is_simple() && !matches!(self, RuntimeType::Object | RuntimeType::String)
    }

    pub fn is_type_parameter(&self) -> bool {
        matches!(self, RuntimeType::TypeParameter { .. })
    }

    pub fn contains_type_parameter(&self) -> bool {
        match self {
            RuntimeType::TypeParameter { .. } => true,
            RuntimeType::Generic(_, args) => args.iter().any(|a| a.contains_type_parameter()),
            RuntimeType::Vector(t) => t.contains_type_parameter(),
            _ => false,
        }
    }

    /// Name of the registry definition backing this type, if it has one.
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            RuntimeType::Object => Some(corlib::OBJECT),
            RuntimeType::String => Some(corlib::STRING),
            RuntimeType::Type(name) | RuntimeType::Generic(name, _) => Some(&**name),
            _ => None,
        }
    }

    pub fn generic_arguments(&self) -> &[RuntimeType] {
        match self {
            RuntimeType::Generic(_, args) => args,
            _ => &[],
        }
    }

    /// The value a freshly allocated slot of this type holds.
    pub fn default_value(&self) -> Value {
        match self {
            RuntimeType::Boolean => Value::Boolean(false),
            RuntimeType::Char => Value::Char('\0'),
            RuntimeType::Int8 => Value::Int8(0),
            RuntimeType::UInt8 => Value::UInt8(0),
            RuntimeType::Int16 => Value::Int16(0),
            RuntimeType::UInt16 => Value::UInt16(0),
            RuntimeType::Int32 => Value::Int32(0),
            RuntimeType::UInt32 => Value::UInt32(0),
            RuntimeType::Int64 => Value::Int64(0),
            RuntimeType::UInt64 => Value::UInt64(0),
            RuntimeType::Float32 => Value::Float32(0.0),
            RuntimeType::Float64 => Value::Float64(0.0),
            _ => Value::Null,
        }
    }
}

impl Debug for RuntimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

impl Display for RuntimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_arguments_are_part_of_identity() {
        let chars = RuntimeType::generic(corlib::LIST, [RuntimeType::Char]);
        let strings = RuntimeType::generic(corlib::LIST, [RuntimeType::String]);
        assert_ne!(chars, strings);
        assert_ne!(chars, RuntimeType::named(corlib::LIST));
        assert_eq!(chars.erase(), strings.erase());
        assert_eq!(chars.erase(), RuntimeType::named(corlib::LIST));
    }

    #[test]
    fn names() {
        let ty = RuntimeType::vector(RuntimeType::generic("app.Pair", [
            RuntimeType::Int32,
            RuntimeType::parameter(0),
        ]));
        assert_eq!(ty.get_name(), "app.Pair<Int32, !0>[]");
        assert_eq!(ty.erase().get_name(), "app.Pair[]");
        assert!(ty.contains_type_parameter());
        assert!(!ty.is_type_parameter());
    }

    #[test]
    fn type_parameters_erase_to_object() {
        assert_eq!(RuntimeType::parameter(1).erase(), RuntimeType::Object);
        assert!(RuntimeType::Int64.is_simple());
        assert!(!RuntimeType::Void.is_simple());
    }
}
