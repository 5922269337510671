//! Utility types used throughout the crate.
use std::fmt::{Debug, Formatter};

pub mod sync;

/// Debug-prints a preformatted string without quotes.
pub struct DebugStr(pub String);

impl Debug for DebugStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
