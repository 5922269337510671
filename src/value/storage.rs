use crate::{
    error::AccessError,
    types::RuntimeType,
    utils::sync::RwLock,
    value::{layout::FieldLayoutManager, Value},
};
use std::fmt::{Debug, Formatter};

/// Slot-indexed field values of one object, or the static fields of one type.
#[derive(Default)]
pub struct FieldStorage {
    slots: RwLock<Vec<Value>>,
}

impl FieldStorage {
    pub fn new(layout: &FieldLayoutManager) -> Self {
        Self {
            slots: RwLock::new(layout.slots.iter().map(RuntimeType::default_value).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, slot: usize) -> Result<Value, AccessError> {
        self.slots
            .read()
            .get(slot)
            .cloned()
            .ok_or_else(|| Self::missing_slot(slot))
    }

    pub fn set(&self, slot: usize, value: Value) -> Result<(), AccessError> {
        match self.slots.write().get_mut(slot) {
            Some(s) => {
                *s = value;
                Ok(())
            }
            None => Err(Self::missing_slot(slot)),
        }
    }

    fn missing_slot(slot: usize) -> AccessError {
        AccessError::UnknownField {
            owner: "storage".to_string(),
            field: format!("#{}", slot),
        }
    }
}

impl Debug for FieldStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.slots.read().iter()).finish()
    }
}
