use crate::{
    error::BoxError,
    types::{Accessibility, RuntimeType, TypeDescription},
    value::Value,
};
use enum_dispatch::enum_dispatch;
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Type-erased call trampoline stored in a method definition. Receives the
/// receiver (`None` for static methods) and the already validated arguments.
pub type MethodBody =
    Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value, BoxError> + Send + Sync>;

pub struct FieldDefinition {
    pub name: String,
    pub field_type: RuntimeType,
    pub accessibility: Accessibility,
    pub static_member: bool,
    pub synthetic: bool,
    /// Storage slot, assigned when the registry is built.
    pub(crate) slot: usize,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: RuntimeType) -> Self {
        Self {
            name: name.into(),
            field_type,
            accessibility: Accessibility::Public,
            static_member: false,
            synthetic: false,
            slot: 0,
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn private(self) -> Self {
        self.with_accessibility(Accessibility::Private)
    }

    pub fn with_static(mut self) -> Self {
        self.static_member = true;
        self
    }

    pub fn with_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Position in instance storage, or in the owner's static storage.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl Debug for FieldDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.static_member {
            write!(f, "static ")?;
        }
        write!(f, "{} {}", self.field_type, self.name)
    }
}

pub struct MethodDefinition {
    pub name: String,
    pub return_type: RuntimeType,
    pub parameters: Vec<RuntimeType>,
    pub accessibility: Accessibility,
    pub static_member: bool,
    pub virtual_member: bool,
    pub synthetic: bool,
    pub bridge: bool,
    pub body: Option<MethodBody>,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>, return_type: RuntimeType) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: vec![],
            accessibility: Accessibility::Public,
            static_member: false,
            virtual_member: false,
            synthetic: false,
            bridge: false,
            body: None,
        }
    }

    pub fn params(mut self, parameters: impl IntoIterator<Item = RuntimeType>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn private(self) -> Self {
        self.with_accessibility(Accessibility::Private)
    }

    pub fn with_static(mut self) -> Self {
        self.static_member = true;
        self
    }

    pub fn with_virtual(mut self) -> Self {
        self.virtual_member = true;
        self
    }

    pub fn with_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn with_bridge(mut self) -> Self {
        self.bridge = true;
        self.synthetic = true;
        self
    }

    /// Same name and exactly the same parameter list.
    pub fn same_signature(&self, other: &MethodDefinition) -> bool {
        self.name == other.name && self.parameters == other.parameters
    }
}

impl Debug for MethodDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.static_member {
            write!(f, "static ")?;
        }
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            self.parameters
                .iter()
                .map(|p| p.get_name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Common view over fields and methods used by the member catalog.
#[enum_dispatch]
pub trait MemberInfo {
    fn name(&self) -> &'static str;
    fn parent(&self) -> TypeDescription;
    fn accessibility(&self) -> Accessibility;
    fn is_static(&self) -> bool;
    fn is_synthetic(&self) -> bool;

    fn is_public(&self) -> bool {
        self.accessibility() == Accessibility::Public
    }
}

#[derive(Clone, Copy)]
pub struct FieldDescription {
    pub parent: TypeDescription,
    pub field: &'static FieldDefinition,
}

impl MemberInfo for FieldDescription {
    fn name(&self) -> &'static str {
        &self.field.name
    }

    fn parent(&self) -> TypeDescription {
        self.parent
    }

    fn accessibility(&self) -> Accessibility {
        self.field.accessibility
    }

    fn is_static(&self) -> bool {
        self.field.static_member
    }

    fn is_synthetic(&self) -> bool {
        self.field.synthetic
    }
}

impl Debug for FieldDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.field.static_member {
            write!(f, "static ")?;
        }

        write!(
            f,
            "{} {}::{}",
            self.field.field_type,
            self.parent.type_name(),
            self.field.name
        )
    }
}

impl PartialEq for FieldDescription {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.field, other.field)
    }
}

impl Eq for FieldDescription {}

impl Hash for FieldDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.field as *const FieldDefinition).hash(state);
    }
}

#[derive(Clone, Copy)]
pub struct MethodDescription {
    pub parent: TypeDescription,
    pub method: &'static MethodDefinition,
}

impl MemberInfo for MethodDescription {
    fn name(&self) -> &'static str {
        &self.method.name
    }

    fn parent(&self) -> TypeDescription {
        self.parent
    }

    fn accessibility(&self) -> Accessibility {
        self.method.accessibility
    }

    fn is_static(&self) -> bool {
        self.method.static_member
    }

    fn is_synthetic(&self) -> bool {
        self.method.synthetic || self.method.bridge
    }
}

impl Debug for MethodDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.method.static_member {
            write!(f, "static ")?;
        }
        write!(
            f,
            "{} {}::{}({})",
            self.method.return_type,
            self.parent.type_name(),
            self.method.name,
            self.method
                .parameters
                .iter()
                .map(|p| p.get_name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl PartialEq for MethodDescription {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.method, other.method)
    }
}

impl Eq for MethodDescription {}

impl Hash for MethodDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.method as *const MethodDefinition).hash(state);
    }
}

#[enum_dispatch(MemberInfo)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberDescription {
    FieldDescription,
    MethodDescription,
}
