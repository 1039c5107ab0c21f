//! Resource allocation graph and deadlock handling
//!
//! Single-instance resources only. A request edge points from a process to
//! the resource it waits for; an allocation edge points from a resource to
//! the process holding it. Under that model a cycle is both necessary and
//! sufficient for deadlock.
//!
//! ```text
//!   P1 ──request──▶ R1 ──allocation──▶ P2
//!   ▲                                   │
//!   └──allocation── R2 ◀──request───────┘
//! ```
//!
//! # Module Organization
//!
//! - `types` - Nodes, edges, cycles
//! - `graph` - `ResourceAllocationGraph` and cycle detection
//! - `resolution` - Explanation, fix suggestions, fix application

#![no_std]
extern crate alloc;

pub mod graph;
pub mod resolution;
pub mod types;

pub use graph::ResourceAllocationGraph;
pub use resolution::{explain, AppliedFix, CoffmanCondition, Fix};
pub use types::{Cycle, DeadlockState, Edge, EdgeKind, Node, NodeId, NodeKind};
