use crate::types::runtime::RuntimeType;
use std::fmt::{Debug, Formatter};

/// Binds the type parameters of a generic definition to concrete arguments.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct GenericLookup {
    pub type_generics: Vec<RuntimeType>,
}

impl GenericLookup {
    pub fn new(type_generics: Vec<RuntimeType>) -> Self {
        Self { type_generics }
    }

    /// Lookup for an instantiation such as `core.List<Char>`. Raw and
    /// non-generic types produce an empty lookup.
    pub fn for_type(ty: &RuntimeType) -> Self {
        Self::new(ty.generic_arguments().to_vec())
    }

    /// Substitutes every type parameter in `t`. Parameters without a binding
    /// (raw instantiations) erase to `Object`.
    pub fn make_concrete(&self, t: &RuntimeType) -> RuntimeType {
        match t {
            RuntimeType::TypeParameter { index } => self
                .type_generics
                .get(*index as usize)
                .cloned()
                .unwrap_or(RuntimeType::Object),
            RuntimeType::Generic(name, args) => RuntimeType::Generic(
                name.clone(),
                args.iter().map(|a| self.make_concrete(a)).collect(),
            ),
            RuntimeType::Vector(element) => {
                RuntimeType::Vector(Box::new(self.make_concrete(element)))
            }
            other => other.clone(),
        }
    }
}

impl Debug for GenericLookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        struct GenericIndexFormatter(usize);
        impl Debug for GenericIndexFormatter {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "T{}", self.0)
            }
        }

        f.debug_map()
            .entries(
                self.type_generics
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (GenericIndexFormatter(i), t)),
            )
            .finish()
    }
}
