use crate::{
    access::field::{FieldAccessor, TypedFieldAccessor},
    error::MirrorError,
    fuzzy::{check_query_type, fmt_names, select_by_name, MemberCatalog},
    types::{members::FieldDescription, RuntimeType, TypeDescription},
    value::FromValue,
};
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use tracing::{debug, trace};

/// Finds a field by its declared type, using names only to break ties.
///
/// Declared types must match exactly, generic arguments included, unless the
/// query is switched to [`erased`](FuzzyField::erased) matching.
#[derive(Clone, Debug)]
pub struct FuzzyField {
    owner: TypeDescription,
    field_type: RuntimeType,
    names: Vec<String>,
    erased: bool,
}

impl FuzzyField {
    pub fn new(owner: TypeDescription, field_type: RuntimeType) -> Self {
        Self {
            owner,
            field_type,
            names: vec![],
            erased: false,
        }
    }

    pub fn owner(&self) -> TypeDescription {
        self.owner
    }

    pub fn field_type(&self) -> &RuntimeType {
        &self.field_type
    }

    /// Adds candidate names. May be called repeatedly.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Compare declared types after erasure, so `core.List<Char>` fields
    /// match a `core.List` query.
    pub fn erased(mut self) -> Self {
        self.erased = true;
        self
    }

    fn matches(&self, declared: &RuntimeType) -> bool {
        if self.erased {
            declared.erase() == self.field_type.erase()
        } else {
            *declared == self.field_type
        }
    }

    pub fn find_description(&self) -> Result<FieldDescription, MirrorError> {
        check_query_type(self, &self.field_type)?;

        let candidates: Vec<_> = MemberCatalog::new(self.owner)
            .fields()
            .into_iter()
            .filter(|f| self.matches(&f.field.field_type))
            .collect();
        trace!(query = %self, ?candidates, "field candidates");

        let resolved = match candidates.as_slice() {
            [] => {
                return Err(MirrorError::NotFound {
                    query: self.to_string(),
                })
            }
            [only] => *only,
            _ => select_by_name(self, &candidates, &self.names)?,
        };
        debug!(query = %self, field = ?resolved, "resolved field");
        Ok(resolved)
    }

    pub fn find(self) -> Result<FieldAccessor, MirrorError> {
        self.find_description().map(FieldAccessor::new)
    }
}

impl Display for FuzzyField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "field of type {}", self.field_type)?;
        if self.erased {
            write!(f, " (erased)")?;
        }
        write!(f, " in {}", self.owner.type_name())?;
        fmt_names(f, &self.names)
    }
}

/// A [`FuzzyField`] whose accessor checks values against its field type.
pub struct TypedFuzzyField<T> {
    query: FuzzyField,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> TypedFuzzyField<T> {
    pub fn new(owner: TypeDescription, field_type: RuntimeType) -> Self {
        Self {
            query: FuzzyField::new(owner, field_type),
            _marker: PhantomData,
        }
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query = self.query.names(names);
        self
    }

    pub fn erased(mut self) -> Self {
        self.query = self.query.erased();
        self
    }

    pub fn find_description(&self) -> Result<FieldDescription, MirrorError> {
        self.query.find_description()
    }

    pub fn find(self) -> Result<TypedFieldAccessor<T>, MirrorError> {
        let field = self.query.find_description()?;
        Ok(FieldAccessor::typed(field, self.query.field_type))
    }
}

impl<T> Display for TypedFuzzyField<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "typed {}", self.query)
    }
}
