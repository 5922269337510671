use std::{error::Error, sync::Arc};
use thiserror::Error;

/// Boxed failure returned by a method body trampoline.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error, Clone)]
pub enum MirrorError {
    #[error("Could not find a member with {query}")]
    NotFound { query: String },
    #[error("Found multiple members that match {query}: [{}]. Try adding a member name.", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
    #[error("Found multiple members that match {query}, but none match any of the names {names:?}: [{}]", .candidates.join(", "))]
    NoNameMatch {
        query: String,
        candidates: Vec<String>,
        names: Vec<String>,
    },
    #[error("Must pass an instance of {owner} for non-static member {member}")]
    MissingInstance { owner: String, member: String },
    #[error("{value} is not an instance of {expected}")]
    TypeMismatch { expected: String, value: String },
    #[error("{member} produced null")]
    UnexpectedNull { member: String },
    #[error("Could not access {member}: {source}")]
    InvocationFailure {
        member: String,
        #[source]
        source: Arc<dyn Error + Send + Sync>,
    },
    #[error("None of {names:?} could be matched to a type")]
    TypeNotFound { names: Vec<String> },
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
    #[error("Invalid type definition: {0}")]
    InvalidDefinition(String),
}

impl MirrorError {
    pub(crate) fn invocation(member: impl ToString, source: impl Into<BoxError>) -> Self {
        let source: BoxError = source.into();
        Self::InvocationFailure {
            member: member.to_string(),
            source: Arc::from(source),
        }
    }

    /// The failure wrapped by an `InvocationFailure`.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Self::InvocationFailure { source, .. } => Some(&**source),
            _ => None,
        }
    }

    /// Whether adding disambiguating names to the same query could make it succeed.
    pub fn is_retryable_with_names(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }
}

/// Failures raised by the low-level storage and call mechanism. Accessors
/// surface these as the cause of [`MirrorError::InvocationFailure`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    #[error("{actual} is not an instance of {expected}")]
    NotAnInstance { expected: String, actual: String },
    #[error("Cannot store {actual} into a slot of type {expected}")]
    IncompatibleValue { expected: String, actual: String },
    #[error("Expected {expected} arguments, received {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Argument {index} must be {expected}, received {actual}")]
    ArgumentType {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("No implementation of abstract method {0}")]
    AbstractMethod(String),
    #[error("{owner} has no field named {field}")]
    UnknownField { owner: String, field: String },
}
