use crate::{
    error::AccessError,
    types::{RuntimeType, TypeDescription},
    value::{storage::FieldStorage, Value},
};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

pub struct Object {
    pub description: TypeDescription,
    /// Instantiated type, e.g. `core.List<Char>` where `description` is `core.List`.
    pub runtime_type: RuntimeType,
    pub storage: FieldStorage,
}

/// Shared reference to a heap object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(pub Arc<Object>);

impl ObjectRef {
    pub fn new(description: TypeDescription, runtime_type: RuntimeType) -> Self {
        let storage = FieldStorage::new(&description.definition().instance_layout);
        Self(Arc::new(Object {
            description,
            runtime_type,
            storage,
        }))
    }

    pub fn description(&self) -> TypeDescription {
        self.0.description
    }

    pub fn runtime_type(&self) -> &RuntimeType {
        &self.0.runtime_type
    }

    pub fn as_ptr(&self) -> *const Object {
        Arc::as_ptr(&self.0)
    }

    /// Reads the most derived field called `name`, bypassing member resolution.
    pub fn field(&self, name: &str) -> Result<Value, AccessError> {
        let slot = self.slot_of(name)?;
        self.0.storage.get(slot)
    }

    /// Writes the most derived field called `name` without a type check.
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let slot = self.slot_of(name)?;
        self.0.storage.set(slot, value.into())
    }

    fn slot_of(&self, name: &str) -> Result<usize, AccessError> {
        self.0
            .description
            .definition()
            .instance_layout
            .get(name)
            .map(|l| l.position)
            .ok_or_else(|| AccessError::UnknownField {
                owner: self.0.runtime_type.get_name(),
                field: name.to_string(),
            })
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ptr().hash(state);
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:#x}", self.0.runtime_type, self.as_ptr() as usize)
    }
}
