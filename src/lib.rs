//! # mirror-rs
//!
//! Resolves a single field or method of a registered type from incomplete
//! information (its value type, optionally a parameter list and a handful of
//! candidate names) and hands back a handle for repeated access.
//!
//! Types are described up front in a [`TypeRegistry`](resolve::TypeRegistry):
//! every definition lists its fields and methods, and every method carries a
//! native trampoline that performs the actual call.
//!
//! ```ignore
//! let registry = RegistryBuilder::new().define(person_definition()).build()?;
//! let person = registry.get_class("app.Person")?;
//! let title = fuzzy_field(person, RuntimeType::String)
//!     .names(["title", "heading"])
//!     .find()?;
//! let value = title.get(Some(&instance))?;
//! ```
//!
//! ## Modules
//!
//! - [`types`]: type descriptors, definitions, and member handles.
//! - [`resolve`]: the registry, name lookups, and built-in types.
//! - [`fuzzy`]: the member catalog and the field and method resolvers.
//! - [`access`]: accessors and invokers for resolved members.
//! - [`value`]: the dynamic value model.
//! - [`utils::sync`]: compute-once caches.
pub mod access;
pub mod error;
pub mod fuzzy;
pub mod resolve;
pub mod types;
pub mod utils;
pub mod value;

pub use access::{FieldAccessor, MethodInvoker, TypedFieldAccessor, TypedMethodInvoker};
pub use error::{AccessError, MirrorError};
pub use fuzzy::{FuzzyField, FuzzyMethod, MemberCatalog, TypedFuzzyField, TypedFuzzyMethod};
pub use resolve::{RegistryBuilder, TypeRegistry};
pub use types::{RuntimeType, TypeDefinition, TypeDescription};
pub use utils::sync::{Memoized, SingletonCache};
pub use value::{FromValue, ObjectRef, Reflect, Value};

pub fn fuzzy_field(owner: TypeDescription, field_type: RuntimeType) -> FuzzyField {
    FuzzyField::new(owner, field_type)
}

/// Field query whose type comes from `T`.
pub fn typed_fuzzy_field<T: Reflect + FromValue>(owner: TypeDescription) -> TypedFuzzyField<T> {
    TypedFuzzyField::new(owner, T::runtime_type())
}

/// Field query for types `T` cannot describe by itself, such as generic
/// instantiations read back as [`ObjectRef`].
pub fn typed_fuzzy_field_of<T: FromValue>(
    owner: TypeDescription,
    field_type: RuntimeType,
) -> TypedFuzzyField<T> {
    TypedFuzzyField::new(owner, field_type)
}

pub fn fuzzy_method(owner: TypeDescription, return_type: RuntimeType) -> FuzzyMethod {
    FuzzyMethod::new(owner, return_type)
}

pub fn typed_fuzzy_method<T: Reflect + FromValue>(owner: TypeDescription) -> TypedFuzzyMethod<T> {
    TypedFuzzyMethod::new(owner, T::runtime_type())
}

pub fn typed_fuzzy_method_of<T: FromValue>(
    owner: TypeDescription,
    return_type: RuntimeType,
) -> TypedFuzzyMethod<T> {
    TypedFuzzyMethod::new(owner, return_type)
}
