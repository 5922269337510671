//! Runtime representation of modelled types, fields, and methods.
//!
//! ## Core Types
//!
//! - **[`RuntimeType`]**: Describes a type, including generic arguments.
//! - **[`TypeDescription`]**: A handle to a type definition inside a [`TypeRegistry`].
//! - **[`FieldDescription`](members::FieldDescription)** and
//!   **[`MethodDescription`](members::MethodDescription)**: Handles to member definitions.
//! - **[`TypeComparer`](comparer::TypeComparer)**: Handles type equality and assignability.
use crate::{
    resolve::{corlib, TypeRegistry},
    types::members::{FieldDefinition, FieldDescription, MethodDefinition, MethodDescription},
    value::{layout::FieldLayoutManager, storage::FieldStorage},
};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

#[macro_use]
mod macros;

pub mod comparer;
pub mod generics;
pub mod members;
pub mod runtime;

pub use runtime::{RuntimeType, TypeName};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    Protected,
    Internal,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Metadata row for one type. Built with the consuming setters below and
/// frozen once handed to [`RegistryBuilder::build`](crate::resolve::RegistryBuilder::build).
pub struct TypeDefinition {
    pub name: TypeName,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub generic_parameters: Vec<String>,
    pub extends: Option<RuntimeType>,
    pub implements: Vec<RuntimeType>,
    pub fields: Vec<FieldDefinition>,
    pub methods: Vec<MethodDefinition>,
    pub(crate) instance_layout: FieldLayoutManager,
    pub(crate) statics: FieldStorage,
}

impl TypeDefinition {
    fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: Arc::from(name),
            kind,
            accessibility: Accessibility::Public,
            generic_parameters: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            instance_layout: FieldLayoutManager::default(),
            statics: FieldStorage::default(),
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn generic_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_parameters = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn extends(mut self, parent: RuntimeType) -> Self {
        self.extends = Some(parent);
        self
    }

    pub fn implements(mut self, interface: RuntimeType) -> Self {
        self.implements.push(interface);
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

impl Debug for TypeDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("generic_parameters", &self.generic_parameters)
            .field("extends", &self.extends)
            .field("implements", &self.implements)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Handle to a type registered in a [`TypeRegistry`]. Cheap to copy; the
/// registry lives for the rest of the process.
#[derive(Clone, Copy)]
pub struct TypeDescription {
    pub registry: &'static TypeRegistry,
    pub index: usize,
}

impl TypeDescription {
    pub fn definition(&self) -> &'static TypeDefinition {
        self.registry.definition(self.index)
    }

    pub fn type_name(&self) -> &'static str {
        &self.definition().name
    }

    pub fn is_interface(&self) -> bool {
        self.definition().is_interface()
    }

    pub fn is_object(&self) -> bool {
        self.type_name() == corlib::OBJECT
    }

    /// The type as seen from inside its own definition: generic definitions
    /// are instantiated over their own type parameters.
    pub fn runtime_type(&self) -> RuntimeType {
        let definition = self.definition();
        match &*definition.name {
            corlib::OBJECT => RuntimeType::Object,
            corlib::STRING => RuntimeType::String,
            _ if definition.generic_parameters.is_empty() => {
                RuntimeType::Type(definition.name.clone())
            }
            _ => RuntimeType::Generic(
                definition.name.clone(),
                (0..definition.generic_parameters.len() as u16)
                    .map(RuntimeType::parameter)
                    .collect(),
            ),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDescription> + 'static {
        let parent = *self;
        self.definition()
            .fields
            .iter()
            .map(move |field| FieldDescription { parent, field })
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDescription> + 'static {
        let parent = *self;
        self.definition()
            .methods
            .iter()
            .map(move |method| MethodDescription { parent, method })
    }
}

impl Debug for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.index == other.index
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.registry as *const TypeRegistry).hash(state);
        self.index.hash(state);
    }
}
