//! Fuzzy member resolution.
//!
//! A query names an owner type and the value type of the wanted member, plus
//! optionally a parameter list (methods) and candidate names. Resolution
//! enumerates the owner's [`MemberCatalog`], narrows the candidates
//! structurally and falls back to the names only when more than one
//! candidate is left.
use crate::{
    error::MirrorError,
    types::{members::MemberInfo, RuntimeType},
};
use std::fmt::{Debug, Display};

pub mod catalog;
pub mod fields;
pub mod methods;

pub use catalog::MemberCatalog;
pub use fields::{FuzzyField, TypedFuzzyField};
pub use methods::{FuzzyMethod, TypedFuzzyMethod};

/// Queries must name a concrete type; a bare type parameter matches nothing
/// meaningful.
fn check_query_type(query: &dyn Display, ty: &RuntimeType) -> Result<(), MirrorError> {
    if ty.is_type_parameter() {
        return Err(MirrorError::InvalidUsage(format!(
            "{} uses the unbound type parameter {}",
            query, ty
        )));
    }
    Ok(())
}

/// Breaks a tie between several structural matches. Candidates are tried in
/// catalog order and each one against every name, so the outcome does not
/// depend on the order the names were supplied in.
fn select_by_name<M>(
    query: &dyn Display,
    candidates: &[M],
    names: &[String],
) -> Result<M, MirrorError>
where
    M: MemberInfo + Copy + Debug,
{
    let describe = || -> Vec<String> { candidates.iter().map(|c| format!("{:?}", c)).collect() };
    if names.is_empty() {
        return Err(MirrorError::Ambiguous {
            query: query.to_string(),
            candidates: describe(),
        });
    }
    candidates
        .iter()
        .find(|c| names.iter().any(|n| n == c.name()))
        .copied()
        .ok_or_else(|| MirrorError::NoNameMatch {
            query: query.to_string(),
            candidates: describe(),
            names: names.to_vec(),
        })
}

fn fmt_names(f: &mut std::fmt::Formatter<'_>, names: &[String]) -> std::fmt::Result {
    if names.is_empty() {
        return Ok(());
    }
    write!(f, " named any of {:?}", names)
}
