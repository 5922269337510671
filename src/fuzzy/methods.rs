use crate::{
    access::method::{MethodInvoker, TypedMethodInvoker},
    error::MirrorError,
    fuzzy::{check_query_type, fmt_names, select_by_name, MemberCatalog},
    types::{comparer::TypeComparer, members::MethodDescription, RuntimeType, TypeDescription},
    value::FromValue,
};
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use tracing::{debug, trace};

/// Finds a method by return type and exact parameter list.
///
/// Methods declared on `core.Object` are never candidates. Matching methods
/// fall into an exact tier (same return type) and an assignable tier (return
/// type assignable to the requested one). A lone candidate in one tier with
/// the other tier empty wins outright; every other combination is settled by
/// name over both tiers, in catalog order.
#[derive(Clone, Debug)]
pub struct FuzzyMethod {
    owner: TypeDescription,
    return_type: RuntimeType,
    params: Option<Vec<RuntimeType>>,
    names: Vec<String>,
    usage_error: Option<MirrorError>,
}

impl FuzzyMethod {
    pub fn new(owner: TypeDescription, return_type: RuntimeType) -> Self {
        Self {
            owner,
            return_type,
            params: None,
            names: vec![],
            usage_error: None,
        }
    }

    pub fn owner(&self) -> TypeDescription {
        self.owner
    }

    pub fn return_type(&self) -> &RuntimeType {
        &self.return_type
    }

    /// Sets the exact parameter list; without it the method must take no
    /// parameters. Setting it a second time makes `find` fail with
    /// [`MirrorError::InvalidUsage`].
    pub fn params(mut self, params: impl IntoIterator<Item = RuntimeType>) -> Self {
        if self.params.is_none() {
            self.params = Some(params.into_iter().collect());
        } else if self.usage_error.is_none() {
            let message = format!("parameters of {} were already set", self);
            self.usage_error = Some(MirrorError::InvalidUsage(message));
        }
        self
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

    pub fn find_description(&self) -> Result<MethodDescription, MirrorError> {
        if let Some(e) = &self.usage_error {
            return Err(e.clone());
        }
        check_query_type(self, &self.return_type)?;

        let params = self.params.as_deref().unwrap_or(&[]);
        let comparer = TypeComparer::new(self.owner.registry);
        let mut exact = vec![];
        let mut assignable = vec![];
        for method in MemberCatalog::new(self.owner).methods() {
            if method.parent.is_object()
                || !comparer.type_slices_equal(&method.method.parameters, params)
            {
                continue;
            }
            let returns = &method.method.return_type;
            if comparer.types_equal(returns, &self.return_type) {
                exact.push(method);
            } else if comparer.is_assignable(returns, &self.return_type) {
                assignable.push(method);
            }
        }
        trace!(query = %self, ?exact, ?assignable, "method candidates");

        let resolved = match (exact.len(), assignable.len()) {
            (0, 0) => {
                return Err(MirrorError::NotFound {
                    query: self.to_string(),
                })
            }
            (1, 0) => exact[0],
            (0, 1) => assignable[0],
            _ => {
                exact.extend(assignable);
                select_by_name(self, &exact, &self.names)?
            }
        };
        debug!(query = %self, method = ?resolved, "resolved method");
        Ok(resolved)
    }

    pub fn find(self) -> Result<MethodInvoker, MirrorError> {
        self.find_description().map(MethodInvoker::new)
    }
}

impl Display for FuzzyMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "method returning {} in {}",
            self.return_type,
            self.owner.type_name()
        )?;
        if let Some(params) = &self.params {
            write!(
                f,
                " taking ({})",
                params
                    .iter()
                    .map(|p| p.get_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
        fmt_names(f, &self.names)
    }
}

/// A [`FuzzyMethod`] whose invoker checks results against its return type.
pub struct TypedFuzzyMethod<T> {
    query: FuzzyMethod,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> TypedFuzzyMethod<T> {
    pub fn new(owner: TypeDescription, return_type: RuntimeType) -> Self {
        Self {
            query: FuzzyMethod::new(owner, return_type),
            _marker: PhantomData,
        }
    }

    pub fn params(mut self, params: impl IntoIterator<Item = RuntimeType>) -> Self {
        self.query = self.query.params(params);
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query = self.query.names(names);
        self
    }

    pub fn find_description(&self) -> Result<MethodDescription, MirrorError> {
        self.query.find_description()
    }

    pub fn find(self) -> Result<TypedMethodInvoker<T>, MirrorError> {
        let method = self.query.find_description()?;
        Ok(MethodInvoker::typed(method, self.query.return_type))
    }
}

impl<T> Display for TypedFuzzyMethod<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "typed {}", self.query)
    }
}
