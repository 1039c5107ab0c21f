//! Resource allocation graph
//!
//! Nodes live in an arena indexed by [`NodeId`] in insertion order. Edges are
//! kept in insertion order as well, which gives `undo` its stack discipline
//! and makes cycle detection reproducible: roots are tried in node insertion
//! order and successors in edge insertion order.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use log::debug;

use ossim_core::{InputError, SimError, SimResult};

use crate::types::{Cycle, DeadlockState, Edge, EdgeKind, Node, NodeId, NodeKind};

/// DFS colouring
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// One DFS stack frame: a node and the next successor to try
struct Frame {
    node: NodeId,
    cursor: usize,
}

/// Directed graph of processes and resources.
#[derive(Clone, Debug, Default)]
pub struct ResourceAllocationGraph {
    nodes: Vec<Node>,
    index: BTreeMap<String, NodeId>,
    edges: Vec<Edge>,
}

impl ResourceAllocationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Add a process node, or return the existing one with this name.
    pub fn add_process(&mut self, name: &str) -> SimResult<NodeId> {
        self.add_node(name, NodeKind::Process)
    }

    /// Add a resource node, or return the existing one with this name.
    pub fn add_resource(&mut self, name: &str) -> SimResult<NodeId> {
        self.add_node(name, NodeKind::Resource)
    }

    fn add_node(&mut self, name: &str, kind: NodeKind) -> SimResult<NodeId> {
        if name.is_empty() {
            return Err(SimError::empty("node name"));
        }
        if let Some(&id) = self.index.get(name) {
            if self.nodes[id.index()].kind != kind {
                return Err(InputError::KindMismatch {
                    name: String::from(name),
                    expected: kind.as_str(),
                }
                .into());
            }
            return Ok(id);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: String::from(name),
            kind,
        });
        self.index.insert(String::from(name), id);
        debug!("rag: added {} {}", kind.as_str(), name);
        Ok(id)
    }

    /// Resolve a name to a node of the required kind.
    pub(crate) fn lookup(&self, name: &str, kind: NodeKind) -> SimResult<NodeId> {
        let id = self
            .index
            .get(name)
            .copied()
            .ok_or_else(|| InputError::UnknownNode(String::from(name)))?;
        if self.nodes[id.index()].kind != kind {
            return Err(InputError::KindMismatch {
                name: String::from(name),
                expected: kind.as_str(),
            }
            .into());
        }
        Ok(id)
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Node by name.
    pub fn node_named(&self, name: &str) -> Option<&Node> {
        self.index.get(name).and_then(|&id| self.node(id))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Name of a node that is known to exist.
    pub(crate) fn name_of(&self, id: NodeId) -> &str {
        self.nodes
            .get(id.index())
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Record that `process` is waiting for `resource`.
    pub fn add_request(&mut self, process: &str, resource: &str) -> SimResult<()> {
        let from = self.lookup(process, NodeKind::Process)?;
        let to = self.lookup(resource, NodeKind::Resource)?;
        self.push_edge(from, to, EdgeKind::Request);
        Ok(())
    }

    /// Record that `resource` is held by `process`.
    pub fn add_allocation(&mut self, resource: &str, process: &str) -> SimResult<()> {
        let from = self.lookup(resource, NodeKind::Resource)?;
        let to = self.lookup(process, NodeKind::Process)?;
        self.push_edge(from, to, EdgeKind::Allocation);
        Ok(())
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        debug!(
            "rag: {:?} {} -> {}",
            kind,
            self.name_of(from),
            self.name_of(to)
        );
        self.edges.push(Edge { from, to, kind });
    }

    /// Remove the most recently added edge.
    pub fn undo(&mut self) -> SimResult<Edge> {
        self.edges
            .pop()
            .ok_or_else(|| SimError::not_found("no edge to undo"))
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges as `(from, to)` name pairs, in insertion order.
    pub fn edge_names(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (self.name_of(e.from), self.name_of(e.to)))
            .collect()
    }

    /// Whether an edge `from → to` exists.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => self.edges.iter().any(|e| e.from == f && e.to == t),
            _ => false,
        }
    }

    /// Remove every edge matching `pred`, returning how many were removed.
    pub(crate) fn remove_edges_where(&mut self, pred: impl Fn(&Edge) -> bool) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !pred(e));
        before - self.edges.len()
    }

    /// Current holder of each resource; the latest allocation edge wins.
    pub(crate) fn owners(&self) -> BTreeMap<NodeId, NodeId> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Allocation)
            .map(|e| (e.from, e.to))
            .collect()
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Find a cycle, if any.
    ///
    /// Depth-first search with an explicit stack. Roots are taken in node
    /// insertion order, successors in edge insertion order. The first edge
    /// that reaches a node still on the active path closes the cycle, which
    /// is returned as the path from that node to the current one.
    pub fn find_cycle(&self) -> Option<Cycle> {
        let mut adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for e in &self.edges {
            adjacency[e.from.index()].push(e.to);
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut frames: Vec<Frame> = Vec::new();

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnPath;
            frames.push(Frame {
                node: NodeId(root),
                cursor: 0,
            });

            while let Some(frame) = frames.last_mut() {
                let node = frame.node;
                let Some(&next) = adjacency[node.index()].get(frame.cursor) else {
                    marks[node.index()] = Mark::Done;
                    frames.pop();
                    continue;
                };
                frame.cursor += 1;

                match marks[next.index()] {
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnPath;
                        frames.push(Frame {
                            node: next,
                            cursor: 0,
                        });
                    }
                    Mark::OnPath => {
                        let start = frames.iter().position(|f| f.node == next)?;
                        let path = frames[start..]
                            .iter()
                            .map(|f| self.nodes[f.node.index()].clone())
                            .collect();
                        let cycle = Cycle { path };
                        debug!("rag: cycle {}", cycle);
                        return Some(cycle);
                    }
                    Mark::Done => {}
                }
            }
        }

        None
    }

    /// Whether the graph currently contains a cycle.
    pub fn state(&self) -> DeadlockState {
        match self.find_cycle() {
            Some(_) => DeadlockState::Deadlocked,
            None => DeadlockState::Safe,
        }
    }
}
