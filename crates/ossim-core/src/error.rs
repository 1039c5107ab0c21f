//! Error types shared by every simulation component.
//!
//! Nothing here is fatal. Every error is a plain value the caller can inspect
//! and recover from by adjusting its input and calling again.

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Result alias used throughout the engine.
pub type SimResult<T> = Result<T, SimError>;

/// Malformed parameters rejected before any state is touched.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum InputError {
    /// A required name or identifier was empty
    EmptyField(&'static str),
    /// Burst time must be strictly positive
    NonPositiveBurst {
        /// Offending process
        pid: String,
    },
    /// Round Robin quantum must be strictly positive
    NonPositiveQuantum,
    /// Identifier already registered
    DuplicateId(String),
    /// Cylinder (request or head) outside `[0, disk_size)`
    CylinderOutOfRange {
        /// Requested cylinder
        cylinder: u64,
        /// Number of cylinders on the disk
        disk_size: u64,
    },
    /// Latest arrival plus total burst does not fit the clock
    TimelineOverflow,
    /// Zero-sized allocation request
    ZeroSize,
    /// Memory or disk geometry that cannot be simulated
    InvalidGeometry(String),
    /// Graph node referenced before it was added
    UnknownNode(String),
    /// Graph node exists but has the wrong kind for this edge
    KindMismatch {
        /// Node name
        name: String,
        /// Kind the operation required
        expected: &'static str,
    },
    /// Lifecycle transition not allowed from the current state
    IllegalTransition {
        /// Process identifier
        pid: String,
        /// Current state
        from: &'static str,
        /// Requested state
        to: &'static str,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::EmptyField(field) => write!(f, "{} must not be empty", field),
            InputError::NonPositiveBurst { pid } => {
                write!(f, "burst time of {} must be positive", pid)
            }
            InputError::NonPositiveQuantum => write!(f, "time quantum must be positive"),
            InputError::DuplicateId(id) => write!(f, "{} is already registered", id),
            InputError::CylinderOutOfRange {
                cylinder,
                disk_size,
            } => write!(
                f,
                "cylinder {} outside disk range [0, {})",
                cylinder, disk_size
            ),
            InputError::TimelineOverflow => {
                write!(f, "arrival and burst times overflow the simulation clock")
            }
            InputError::ZeroSize => write!(f, "allocation size must be positive"),
            InputError::InvalidGeometry(msg) => write!(f, "invalid geometry: {}", msg),
            InputError::UnknownNode(name) => write!(f, "unknown node {}", name),
            InputError::KindMismatch { name, expected } => {
                write!(f, "{} is not a {}", name, expected)
            }
            InputError::IllegalTransition { pid, from, to } => {
                write!(f, "{} cannot move from {} to {}", pid, from, to)
            }
        }
    }
}

/// Why an allocation could not be satisfied.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Exhaustion {
    /// Not enough free frames for the requested pages
    InsufficientFrames {
        /// Frames the request needs
        needed: usize,
        /// Frames currently free
        available: usize,
    },
    /// No single free block can hold the segment
    ExternalFragmentation {
        /// Requested segment size (KB)
        requested: u64,
        /// Largest contiguous free block (KB)
        largest_free: u64,
        /// Sum of all free blocks (KB)
        total_free: u64,
    },
}

impl fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhaustion::InsufficientFrames { needed, available } => write!(
                f,
                "not enough free frames: need {}, {} available",
                needed, available
            ),
            Exhaustion::ExternalFragmentation {
                requested,
                largest_free,
                total_free,
            } => write!(
                f,
                "no contiguous block of {} KB (largest free {} KB, total free {} KB)",
                requested, largest_free, total_free
            ),
        }
    }
}

/// Errors from engine operations.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum SimError {
    /// Malformed parameters
    InvalidInput(InputError),
    /// Allocation could not be satisfied
    ResourceExhausted(Exhaustion),
    /// Operation referenced something absent; nothing was changed
    NotFound(String),
}

impl SimError {
    /// Create a not-found error with a description of what was missing.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an empty-field input error.
    pub fn empty(field: &'static str) -> Self {
        Self::InvalidInput(InputError::EmptyField(field))
    }

    /// Check if this is a benign "nothing to do" result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SimError::NotFound(_))
    }

    /// Check if the caller supplied malformed parameters.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SimError::InvalidInput(_))
    }

    /// Check if an allocation ran out of space.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, SimError::ResourceExhausted(_))
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            SimError::ResourceExhausted(e) => write!(f, "Resource exhausted: {}", e),
            SimError::NotFound(what) => write!(f, "Not found: {}", what),
        }
    }
}

impl core::error::Error for SimError {}

impl From<InputError> for SimError {
    fn from(e: InputError) -> Self {
        SimError::InvalidInput(e)
    }
}

impl From<Exhaustion> for SimError {
    fn from(e: Exhaustion) -> Self {
        SimError::ResourceExhausted(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_construction() {
        let err = SimError::not_found("process P9");
        match err {
            SimError::NotFound(msg) => assert_eq!(msg, "process P9"),
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_from_conversions() {
        let err: SimError = InputError::NonPositiveQuantum.into();
        assert!(err.is_invalid_input());

        let err: SimError = Exhaustion::InsufficientFrames {
            needed: 4,
            available: 1,
        }
        .into();
        assert!(err.is_resource_exhausted());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = SimError::from(InputError::CylinderOutOfRange {
            cylinder: 250,
            disk_size: 200,
        });
        assert_eq!(
            err.to_string(),
            "Invalid input: cylinder 250 outside disk range [0, 200)"
        );

        let err = SimError::from(Exhaustion::ExternalFragmentation {
            requested: 300,
            largest_free: 200,
            total_free: 400,
        });
        assert_eq!(
            err.to_string(),
            "Resource exhausted: no contiguous block of 300 KB (largest free 200 KB, total free 400 KB)"
        );

        assert_eq!(SimError::empty("pid").to_string(), "Invalid input: pid must not be empty");
    }
}
