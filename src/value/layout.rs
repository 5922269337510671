use crate::types::RuntimeType;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldLayout {
    pub position: usize,
    pub field_type: RuntimeType,
}

/// Slot assignment for the instance or static fields of one type.
///
/// Instance layouts start with the full layout of the superclass, so a field
/// keeps its position in every subclass. When a subclass redeclares a field
/// name, `fields` maps the name to the most derived declaration while the
/// hidden slot stays in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldLayoutManager {
    pub fields: HashMap<String, FieldLayout>,
    pub slots: Vec<RuntimeType>,
}

impl FieldLayoutManager {
    pub fn extending(parent: &FieldLayoutManager) -> Self {
        parent.clone()
    }

    /// Appends a field and returns its slot.
    pub fn push(&mut self, name: &str, field_type: RuntimeType) -> usize {
        let position = self.slots.len();
        self.slots.push(field_type.clone());
        self.fields.insert(
            name.to_string(),
            FieldLayout {
                position,
                field_type,
            },
        );
        position
    }

    pub fn get(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.get(name)
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subclass_layout_keeps_parent_prefix() {
        let mut base = FieldLayoutManager::default();
        assert_eq!(base.push("name", RuntimeType::String), 0);
        assert_eq!(base.push("age", RuntimeType::Int32), 1);

        let mut derived = FieldLayoutManager::extending(&base);
        assert_eq!(derived.push("name", RuntimeType::Object), 2);
        assert_eq!(derived.size(), 3);
        assert_eq!(derived.get("age").map(|l| l.position), Some(1));
        assert_eq!(derived.get("name").map(|l| l.position), Some(2));
        assert_eq!(derived.slots[0], RuntimeType::String);
    }
}
