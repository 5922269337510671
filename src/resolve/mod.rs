//! The type-metadata registry.
//!
//! A [`RegistryBuilder`] collects [`TypeDefinition`]s, validates every type
//! reference, assigns field slots and leaks the result, so that
//! [`TypeDescription`]s and member descriptions can be plain `Copy` handles
//! for the rest of the process.
use crate::{
    error::MirrorError,
    types::{
        generics::GenericLookup, members::MethodDescription, RuntimeType, TypeDefinition,
        TypeDescription, TypeName,
    },
    utils::{sync::Memoized, DebugStr},
    value::{layout::FieldLayoutManager, storage::FieldStorage, ObjectRef},
};
use dashmap::DashMap;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt::{Debug, Formatter},
};
use tracing::{debug, trace};

pub mod corlib;

pub struct TypeRegistry {
    types: Vec<TypeDefinition>,
    by_name: HashMap<TypeName, usize>,
    vmt_cache: DashMap<(MethodDescription, TypeDescription), MethodDescription>,
}

fn build_core() -> Result<&'static TypeRegistry, MirrorError> {
    RegistryBuilder::new().build()
}

static CORE: Memoized<&'static TypeRegistry, MirrorError> = Memoized::new(build_core);

impl TypeRegistry {
    /// Process-wide registry holding only the built-in types.
    pub fn core() -> Result<&'static TypeRegistry, MirrorError> {
        CORE.get().copied()
    }

    pub fn definition(&self, index: usize) -> &TypeDefinition {
        &self.types[index]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&'static self) -> impl Iterator<Item = TypeDescription> {
        (0..self.types.len()).map(move |index| TypeDescription {
            registry: self,
            index,
        })
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn maybe_get_class(&'static self, name: &str) -> Option<TypeDescription> {
        self.index_of(name).map(|index| TypeDescription {
            registry: self,
            index,
        })
    }

    pub fn get_class(&'static self, name: &str) -> Result<TypeDescription, MirrorError> {
        self.maybe_get_class(name)
            .ok_or_else(|| MirrorError::TypeNotFound {
                names: vec![name.to_string()],
            })
    }

    /// First of `names` that resolves, in the order given.
    pub fn maybe_find_class<I, S>(&'static self, names: I) -> Option<TypeDescription>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .find_map(|name| self.maybe_get_class(name.as_ref()))
    }

    pub fn find_class<I, S>(&'static self, names: I) -> Result<TypeDescription, MirrorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        match self.maybe_find_class(&names) {
            Some(description) => Ok(description),
            None => {
                trace!(?names, "no candidate type name resolved");
                Err(MirrorError::TypeNotFound { names })
            }
        }
    }

    /// The definition backing `ty`, if it is a registered class or interface.
    pub fn describe(&'static self, ty: &RuntimeType) -> Option<TypeDescription> {
        ty.definition_name().and_then(|name| self.maybe_get_class(name))
    }

    /// `ty` followed by all of its supertypes, breadth first: the superclass,
    /// then implemented interfaces, with generic arguments substituted.
    pub fn supertypes(&self, ty: &RuntimeType) -> Vec<RuntimeType> {
        let mut seen = vec![ty.clone()];
        let mut queue = VecDeque::from([ty.clone()]);
        while let Some(current) = queue.pop_front() {
            let Some(index) = current.definition_name().and_then(|n| self.index_of(n)) else {
                continue;
            };
            let definition = &self.types[index];
            let lookup = GenericLookup::for_type(&current);
            for parent in definition.extends.iter().chain(&definition.implements) {
                let parent = lookup.make_concrete(parent);
                if !seen.contains(&parent) {
                    seen.push(parent.clone());
                    queue.push_back(parent);
                }
            }
        }
        seen
    }

    /// Every type `description` inherits from, breadth first, without itself.
    pub fn ancestors(&'static self, description: TypeDescription) -> Vec<TypeDescription> {
        let mut seen = HashSet::from([description.index]);
        let mut ancestors = vec![];
        let mut queue = VecDeque::from([description.index]);
        while let Some(current) = queue.pop_front() {
            let definition = &self.types[current];
            for parent in definition.extends.iter().chain(&definition.implements) {
                let Some(index) = parent.definition_name().and_then(|n| self.index_of(n)) else {
                    continue;
                };
                if seen.insert(index) {
                    ancestors.push(TypeDescription {
                        registry: self,
                        index,
                    });
                    queue.push_back(index);
                }
            }
        }
        ancestors
    }

    /// Allocates an instance of a class with every field at its default value.
    pub fn new_object(&'static self, ty: &RuntimeType) -> Result<ObjectRef, MirrorError> {
        if ty.contains_type_parameter() {
            return Err(MirrorError::InvalidUsage(format!(
                "cannot instantiate open type {}",
                ty
            )));
        }
        let description = self
            .describe(ty)
            .ok_or_else(|| MirrorError::TypeNotFound {
                names: vec![ty.get_name()],
            })?;
        if description.is_interface() || *ty == RuntimeType::String {
            return Err(MirrorError::InvalidUsage(format!(
                "cannot instantiate {}",
                ty
            )));
        }
        let arity = description.definition().generic_parameters.len();
        let supplied = ty.generic_arguments().len();
        if supplied != 0 && supplied != arity {
            return Err(MirrorError::InvalidUsage(format!(
                "{} expects {} generic arguments",
                description.type_name(),
                arity
            )));
        }
        Ok(ObjectRef::new(description, ty.clone()))
    }

    /// The implementation of `base` that runs for receivers of class `this_type`.
    pub fn resolve_virtual_method(
        &'static self,
        base: MethodDescription,
        this_type: TypeDescription,
    ) -> MethodDescription {
        let cache_key = (base, this_type);
        if let Some(cached) = self.vmt_cache.get(&cache_key) {
            return *cached;
        }

        let resolved = std::iter::once(this_type)
            .chain(self.ancestors(this_type))
            .find_map(|parent| {
                parent.methods().find(|m| {
                    !m.method.static_member
                        && m.method.body.is_some()
                        && m.method.same_signature(base.method)
                })
            })
            .unwrap_or(base);
        trace!(?base, ?this_type, ?resolved, "resolved virtual method");
        self.vmt_cache.insert(cache_key, resolved);
        resolved
    }
}

impl Debug for TypeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field(
                "types",
                &self
                    .types
                    .iter()
                    .map(|t| DebugStr(t.name.to_string()))
                    .collect::<Vec<_>>(),
            )
            .field("vmt_cache_size", &self.vmt_cache.len())
            .finish()
    }
}

/// Collects type definitions; starts out with the [`corlib`] types.
pub struct RegistryBuilder {
    types: Vec<TypeDefinition>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            types: corlib::definitions(),
        }
    }

    pub fn define(mut self, definition: TypeDefinition) -> Self {
        self.types.push(definition);
        self
    }

    pub fn build(self) -> Result<&'static TypeRegistry, MirrorError> {
        let mut types = self.types;

        let mut by_name = HashMap::new();
        for (index, t) in types.iter().enumerate() {
            if by_name.insert(t.name.clone(), index).is_some() {
                return Err(invalid(format!("duplicate type {}", t.name)));
            }
        }

        for t in types.iter_mut() {
            if !t.is_interface() && t.extends.is_none() && &*t.name != corlib::OBJECT {
                t.extends = Some(RuntimeType::Object);
            }
        }

        let validator = Validator {
            types: &types,
            by_name: &by_name,
        };
        for t in &types {
            validator.check_definition(t)?;
        }
        validator.check_cycles()?;

        let mut done = vec![false; types.len()];
        for index in 0..types.len() {
            assign_slots(index, &mut types, &by_name, &mut done);
        }

        let registry = TypeRegistry {
            types,
            by_name,
            vmt_cache: DashMap::new(),
        };
        debug!(types = registry.types.len(), "built type registry");
        Ok(Box::leak(Box::new(registry)))
    }
}

fn invalid(message: String) -> MirrorError {
    MirrorError::InvalidDefinition(message)
}

struct Validator<'a> {
    types: &'a [TypeDefinition],
    by_name: &'a HashMap<TypeName, usize>,
}

impl Validator<'_> {
    fn lookup(&self, ty: &RuntimeType) -> Option<&TypeDefinition> {
        ty.definition_name()
            .and_then(|n| self.by_name.get(n))
            .map(|&i| &self.types[i])
    }

    fn check_reference(
        &self,
        owner: &TypeDefinition,
        ty: &RuntimeType,
        allow_void: bool,
    ) -> Result<(), MirrorError> {
        match ty {
            RuntimeType::Void if !allow_void => Err(invalid(format!(
                "{}: Void is only valid as a return type",
                owner.name
            ))),
            RuntimeType::Type(name) if &**name == corlib::OBJECT || &**name == corlib::STRING => {
                Err(invalid(format!(
                    "{}: refer to {} through its dedicated variant",
                    owner.name, name
                )))
            }
            RuntimeType::Type(name) if !self.by_name.contains_key(name) => {
                Err(invalid(format!("{}: unknown type {}", owner.name, name)))
            }
            RuntimeType::Generic(name, args) => {
                let definition = self.lookup(ty).ok_or_else(|| {
                    invalid(format!("{}: unknown type {}", owner.name, name))
                })?;
                if definition.generic_parameters.len() != args.len() {
                    return Err(invalid(format!(
                        "{}: {} expects {} generic arguments, found {}",
                        owner.name,
                        name,
                        definition.generic_parameters.len(),
                        args.len()
                    )));
                }
                args.iter()
                    .try_for_each(|arg| self.check_reference(owner, arg, false))
            }
            RuntimeType::Vector(element) => self.check_reference(owner, element, false),
            RuntimeType::TypeParameter { index }
                if *index as usize >= owner.generic_parameters.len() =>
            {
                Err(invalid(format!(
                    "{}: type parameter !{} is out of range",
                    owner.name, index
                )))
            }
            _ => Ok(()),
        }
    }

    fn check_definition(&self, t: &TypeDefinition) -> Result<(), MirrorError> {
        if let Some(parent) = &t.extends {
            if t.is_interface() {
                return Err(invalid(format!(
                    "interface {} cannot extend {}; use implements",
                    t.name, parent
                )));
            }
            self.check_reference(t, parent, false)?;
            match self.lookup(parent) {
                Some(p) if p.is_interface() => {
                    return Err(invalid(format!(
                        "{} cannot extend interface {}",
                        t.name, parent
                    )))
                }
                Some(_) if *parent == RuntimeType::String => {
                    return Err(invalid(format!("{} cannot extend {}", t.name, parent)))
                }
                Some(_) => {}
                None => {
                    return Err(invalid(format!(
                        "{} must extend a class, found {}",
                        t.name, parent
                    )))
                }
            }
        }

        for interface in &t.implements {
            self.check_reference(t, interface, false)?;
            if !self.lookup(interface).is_some_and(TypeDefinition::is_interface) {
                return Err(invalid(format!(
                    "{} cannot implement non-interface {}",
                    t.name, interface
                )));
            }
        }

        let mut field_names = HashSet::new();
        for field in &t.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(invalid(format!(
                    "{} declares field {} twice",
                    t.name, field.name
                )));
            }
            if t.is_interface() && !field.static_member {
                return Err(invalid(format!(
                    "interface {} cannot declare instance field {}",
                    t.name, field.name
                )));
            }
            self.check_reference(t, &field.field_type, false)?;
        }

        for method in &t.methods {
            self.check_reference(t, &method.return_type, true)?;
            for p in &method.parameters {
                self.check_reference(t, p, false)?;
            }
        }

        Ok(())
    }

    fn check_cycles(&self) -> Result<(), MirrorError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            Pending,
            Active,
            Done,
        }

        fn visit(
            validator: &Validator,
            index: usize,
            state: &mut [Visit],
        ) -> Result<(), MirrorError> {
            match state[index] {
                Visit::Done => return Ok(()),
                Visit::Active => {
                    return Err(invalid(format!(
                        "inheritance cycle through {}",
                        validator.types[index].name
                    )))
                }
                Visit::Pending => {}
            }
            state[index] = Visit::Active;
            let t = &validator.types[index];
            for parent in t.extends.iter().chain(&t.implements) {
                if let Some(&next) = parent.definition_name().and_then(|n| validator.by_name.get(n))
                {
                    visit(validator, next, state)?;
                }
            }
            state[index] = Visit::Done;
            Ok(())
        }

        let mut state = vec![Visit::Pending; self.types.len()];
        (0..self.types.len()).try_for_each(|i| visit(self, i, &mut state))
    }
}

/// Lays out instance fields after the superclass's and numbers static fields
/// per type. Parents are laid out first.
fn assign_slots(
    index: usize,
    types: &mut [TypeDefinition],
    by_name: &HashMap<TypeName, usize>,
    done: &mut [bool],
) {
    if done[index] {
        return;
    }
    done[index] = true;

    let parent = types[index]
        .extends
        .as_ref()
        .and_then(|p| p.definition_name())
        .and_then(|n| by_name.get(n))
        .copied();
    let mut instance = match parent {
        Some(p) => {
            assign_slots(p, types, by_name, done);
            FieldLayoutManager::extending(&types[p].instance_layout)
        }
        None => FieldLayoutManager::default(),
    };
    let mut statics = FieldLayoutManager::default();

    let definition = &mut types[index];
    for field in &mut definition.fields {
        let layout = if field.static_member {
            &mut statics
        } else {
            &mut instance
        };
        field.slot = layout.push(&field.name, field.field_type.clone());
    }
    definition.statics = FieldStorage::new(&statics);
    definition.instance_layout = instance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::members::FieldDefinition;

    fn expect_invalid(definition: TypeDefinition) -> String {
        match RegistryBuilder::new().define(definition).build() {
            Err(MirrorError::InvalidDefinition(message)) => message,
            other => panic!("expected InvalidDefinition, got {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_definitions() {
        expect_invalid(TypeDefinition::class("app.A").extends(RuntimeType::named("app.Missing")));
        expect_invalid(
            TypeDefinition::class("app.A").extends(RuntimeType::generic(corlib::LIST, Vec::new())),
        );
        expect_invalid(
            TypeDefinition::class("app.A")
                .field(FieldDefinition::new("x", RuntimeType::parameter(0))),
        );
        expect_invalid(
            TypeDefinition::interface("app.I")
                .field(FieldDefinition::new("x", RuntimeType::Int32)),
        );
        expect_invalid(TypeDefinition::class(corlib::LIST));
        expect_invalid(TypeDefinition::class("app.A").implements(RuntimeType::String));
    }

    #[test]
    fn rejects_inheritance_cycles() {
        let result = RegistryBuilder::new()
            .define(TypeDefinition::class("app.A").extends(RuntimeType::named("app.B")))
            .define(TypeDefinition::class("app.B").extends(RuntimeType::named("app.A")))
            .build();
        assert!(matches!(result, Err(MirrorError::InvalidDefinition(_))));
    }

    #[test]
    fn subclass_fields_follow_superclass_fields() {
        let registry = RegistryBuilder::new()
            .define(
                TypeDefinition::class("app.Base")
                    .field(FieldDefinition::new("id", RuntimeType::Int64))
                    .field(FieldDefinition::new("count", RuntimeType::Int32).with_static()),
            )
            .define(
                TypeDefinition::class("app.Derived")
                    .extends(RuntimeType::named("app.Base"))
                    .field(FieldDefinition::new("label", RuntimeType::String)),
            )
            .build()
            .unwrap();

        let derived = registry.get_class("app.Derived").unwrap();
        let label = derived.fields().next().unwrap();
        assert_eq!(label.field.slot, 1);
        assert_eq!(derived.definition().instance_layout.size(), 2);

        let base = registry.get_class("app.Base").unwrap();
        assert_eq!(base.definition().statics.len(), 1);
        assert_eq!(
            registry
                .ancestors(derived)
                .iter()
                .map(|t| t.type_name())
                .collect::<Vec<_>>(),
            vec!["app.Base", corlib::OBJECT]
        );
    }

    #[test]
    fn core_registry_is_shared() {
        let a = TypeRegistry::core().unwrap();
        let b = TypeRegistry::core().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(a.get_class(corlib::LIST).is_ok());
    }
}
