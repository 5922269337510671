use crate::types::{
    members::{FieldDescription, MemberDescription, MemberInfo, MethodDescription},
    TypeDescription,
};
use std::collections::HashSet;
use tracing::trace;

/// The members visible on a type for resolution purposes.
///
/// Declared members of every accessibility come first, in declaration order,
/// followed by the public members of each ancestor in breadth-first order.
/// Synthetic members and bridge methods never appear. An inherited method is
/// hidden by a public method with the same name and parameters that was
/// already collected from a more derived type.
#[derive(Clone, Copy, Debug)]
pub struct MemberCatalog {
    owner: TypeDescription,
}

impl MemberCatalog {
    pub fn new(owner: TypeDescription) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> TypeDescription {
        self.owner
    }

    fn ancestors(&self) -> Vec<TypeDescription> {
        self.owner.registry.ancestors(self.owner)
    }

    pub fn fields(&self) -> Vec<FieldDescription> {
        let mut seen = HashSet::new();
        let inherited = self
            .ancestors()
            .into_iter()
            .flat_map(|a| a.fields())
            .filter(|f| f.is_public());
        let fields: Vec<_> = self
            .owner
            .fields()
            .chain(inherited)
            .filter(|f| !f.is_synthetic() && seen.insert(*f))
            .collect();
        trace!(owner = ?self.owner, count = fields.len(), "catalogued fields");
        fields
    }

    pub fn methods(&self) -> Vec<MethodDescription> {
        let mut methods: Vec<MethodDescription> =
            self.owner.methods().filter(|m| !m.is_synthetic()).collect();

        for ancestor in self.ancestors() {
            for method in ancestor.methods() {
                if method.is_synthetic() || !method.is_public() {
                    continue;
                }
                let hidden = methods.iter().any(|collected| {
                    *collected == method
                        || (collected.is_public() && collected.method.same_signature(method.method))
                });
                if !hidden {
                    methods.push(method);
                }
            }
        }
        trace!(owner = ?self.owner, count = methods.len(), "catalogued methods");
        methods
    }

    /// Fields followed by methods.
    pub fn members(&self) -> Vec<MemberDescription> {
        self.fields()
            .into_iter()
            .map(MemberDescription::from)
            .chain(self.methods().into_iter().map(MemberDescription::from))
            .collect()
    }

    /// Only the owner's own non-synthetic members.
    pub fn declared(&self) -> Vec<MemberDescription> {
        self.owner
            .fields()
            .map(MemberDescription::from)
            .chain(self.owner.methods().map(MemberDescription::from))
            .filter(|m| !m.is_synthetic())
            .collect()
    }
}
