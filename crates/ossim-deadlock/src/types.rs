//! Resource allocation graph types
//!
//! Node kinds are explicit tags. Names carry no meaning to the engine, so
//! a process may be called `R1` without being mistaken for a resource.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Index of a node in the graph's node arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A process that requests and holds resources
    Process,
    /// A single-instance resource
    Resource,
}

impl NodeKind {
    /// Lowercase name, for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Process => "process",
            NodeKind::Resource => "resource",
        }
    }
}

/// A named, typed graph node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Arena index
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Process or resource
    pub kind: NodeKind,
}

impl Node {
    /// Whether this node is a process.
    pub fn is_process(&self) -> bool {
        self.kind == NodeKind::Process
    }

    /// Whether this node is a resource.
    pub fn is_resource(&self) -> bool {
        self.kind == NodeKind::Resource
    }
}

/// Edge class, fixed by the endpoint kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Process waits for resource (process → resource)
    Request,
    /// Resource is held by process (resource → process)
    Allocation,
}

/// A directed edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Tail
    pub from: NodeId,
    /// Head
    pub to: NodeId,
    /// Request or allocation
    pub kind: EdgeKind,
}

impl Edge {
    /// Whether the edge has `node` at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

/// Logical state of the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlockState {
    /// No cycle
    Safe,
    /// At least one cycle
    Deadlocked,
}

/// A cycle found in the graph, in traversal order.
///
/// The last node has an edge back to the first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Nodes on the cycle
    pub path: Vec<Node>,
}

impl Cycle {
    /// Node names in traversal order.
    pub fn names(&self) -> Vec<&str> {
        self.path.iter().map(|n| n.name.as_str()).collect()
    }

    /// Number of nodes on the cycle.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether the cycle has no nodes.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether a node with this name is on the cycle.
    pub fn contains(&self, name: &str) -> bool {
        self.path.iter().any(|n| n.name == name)
    }

    /// Process nodes on the cycle, in traversal order.
    pub fn processes(&self) -> impl Iterator<Item = &Node> {
        self.path.iter().filter(|n| n.is_process())
    }

    /// Resource nodes on the cycle, in traversal order.
    pub fn resources(&self) -> impl Iterator<Item = &Node> {
        self.path.iter().filter(|n| n.is_resource())
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(" → ")?;
            }
            f.write_str(&node.name)?;
        }
        Ok(())
    }
}
