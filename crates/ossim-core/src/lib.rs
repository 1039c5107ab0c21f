//! OS Simulator Core - shared vocabulary for the simulation engine
//!
//! Every component crate (`ossim-cpu`, `ossim-disk`, `ossim-memory`,
//! `ossim-deadlock`, `ossim-process`) reports failures through [`SimError`]
//! and inspects its own state through [`InvariantViolation`] lists. Nothing
//! else is shared: the components never exchange data.
//!
//! # Module Organization
//!
//! - `error` - Error taxonomy (`InvalidInput`, `ResourceExhausted`, `NotFound`)
//! - `invariants` - Invariant violation records

#![no_std]
extern crate alloc;

pub mod error;
pub mod invariants;

pub use error::{Exhaustion, InputError, SimError, SimResult};
pub use invariants::{violated_invariants, InvariantViolation};
