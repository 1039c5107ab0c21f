//! Invariant reporting
//!
//! Each component exposes `check_*` functions that inspect its state and
//! return a list of violations (empty if every invariant holds). Tests and
//! hosts use them to assert that no sequence of operations corrupted state.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::Serialize;

/// An invariant violation with details
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

impl InvariantViolation {
    /// Create a violation record.
    pub fn new(invariant: &'static str, description: impl Into<String>) -> Self {
        Self {
            invariant,
            description: description.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.invariant, self.description)
    }
}

/// Collect the names of violated invariants, deduplicated, in first-seen order.
pub fn violated_invariants(violations: &[InvariantViolation]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for v in violations {
        if !names.contains(&v.invariant) {
            names.push(v.invariant);
        }
    }
    names
}
