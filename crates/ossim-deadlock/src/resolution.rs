//! Deadlock explanation and resolution
//!
//! Suggestions are derived from a detected cycle and the current allocation
//! edges. Applying them performs exactly one graph edit per call.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use ossim_core::{SimError, SimResult};

use crate::graph::ResourceAllocationGraph;
use crate::types::{Cycle, EdgeKind, NodeKind};

/// The four necessary conditions for deadlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoffmanCondition {
    /// A resource has at most one holder
    MutualExclusion,
    /// Holders wait for more resources
    HoldAndWait,
    /// Only the holder can give a resource up
    NoPreemption,
    /// The wait-for relation has a cycle
    CircularWait,
}

impl CoffmanCondition {
    /// All conditions, in textbook order.
    pub const ALL: [CoffmanCondition; 4] = [
        CoffmanCondition::MutualExclusion,
        CoffmanCondition::HoldAndWait,
        CoffmanCondition::NoPreemption,
        CoffmanCondition::CircularWait,
    ];

    /// Short name.
    pub fn title(self) -> &'static str {
        match self {
            CoffmanCondition::MutualExclusion => "Mutual Exclusion",
            CoffmanCondition::HoldAndWait => "Hold and Wait",
            CoffmanCondition::NoPreemption => "No Preemption",
            CoffmanCondition::CircularWait => "Circular Wait",
        }
    }

    /// One-sentence statement of the condition.
    pub fn description(self) -> &'static str {
        match self {
            CoffmanCondition::MutualExclusion => {
                "Resources can only be held by one process at a time."
            }
            CoffmanCondition::HoldAndWait => "Processes hold resources while waiting for others.",
            CoffmanCondition::NoPreemption => "Resources cannot be forcibly taken away.",
            CoffmanCondition::CircularWait => "A cycle exists in the RAG.",
        }
    }
}

impl fmt::Display for CoffmanCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.description())
    }
}

/// Human-readable account of a deadlock.
pub fn explain(cycle: &Cycle) -> String {
    let mut text = format!("A circular wait was detected:\n{}\n\nDeadlock Conditions:", cycle);
    for (i, condition) in CoffmanCondition::ALL.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, condition));
    }
    text
}

/// A suggested way to break a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fix {
    /// The resource has a holder; ask it to let go
    ReleaseResource {
        /// Resource on the cycle
        resource: String,
        /// Process holding it
        owner: String,
    },
    /// The resource has no recorded holder
    PreemptResource {
        /// Resource on the cycle
        resource: String,
    },
    /// Terminate a process on the cycle
    KillProcess {
        /// Victim
        process: String,
    },
    /// Generic advice; not directly actionable
    RemoveCycleEdge,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fix::ReleaseResource { resource, owner } => {
                write!(f, "Ask {} to release {}", owner, resource)
            }
            Fix::PreemptResource { resource } => write!(f, "Preempt resource {}", resource),
            Fix::KillProcess { process } => write!(f, "Kill process {} to break the cycle", process),
            Fix::RemoveCycleEdge => {
                write!(f, "Remove any one of the edges in the cycle to break circular wait")
            }
        }
    }
}

/// What `apply_fix` actually did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppliedFix {
    /// Every edge touching the process was removed
    KilledProcess {
        /// Victim
        process: String,
        /// Edges dropped
        removed_edges: usize,
    },
    /// The allocation edge(s) `resource → owner` were removed
    ReleasedResource {
        /// Released resource
        resource: String,
        /// Former holder
        owner: String,
        /// Edges dropped
        removed_edges: usize,
    },
    /// No suggestion was actionable; the most recent edge was popped
    RemovedLastEdge {
        /// Tail of the popped edge
        from: String,
        /// Head of the popped edge
        to: String,
    },
}

impl ResourceAllocationGraph {
    /// Suggest fixes for `cycle`, most targeted first.
    ///
    /// One entry per resource on the cycle (release if it has a holder,
    /// otherwise preempt), then killing the last process on the cycle, then
    /// the generic edge-removal advice.
    pub fn suggest_fixes(&self, cycle: &Cycle) -> Vec<Fix> {
        let owners = self.owners();
        let mut fixes: Vec<Fix> = cycle
            .resources()
            .map(|r| match owners.get(&r.id) {
                Some(&owner) => Fix::ReleaseResource {
                    resource: r.name.clone(),
                    owner: String::from(self.name_of(owner)),
                },
                None => Fix::PreemptResource {
                    resource: r.name.clone(),
                },
            })
            .collect();

        if let Some(victim) = cycle.processes().last() {
            fixes.push(Fix::KillProcess {
                process: victim.name.clone(),
            });
        }
        fixes.push(Fix::RemoveCycleEdge);
        fixes
    }

    /// Apply the first actionable fix, or pop the most recent edge.
    ///
    /// Kill and release fixes are actionable when they name known nodes of
    /// the right kind and would remove at least one edge. Preempt and the
    /// generic advice never are. Exactly one edit happens per call.
    pub fn apply_fix(&mut self, fixes: &[Fix]) -> SimResult<AppliedFix> {
        for fix in fixes {
            match fix {
                Fix::KillProcess { process } => {
                    let Ok(pid) = self.lookup(process, NodeKind::Process) else {
                        debug!("rag: skipping stale fix: {}", fix);
                        continue;
                    };
                    let removed_edges = self.remove_edges_where(|e| e.touches(pid));
                    if removed_edges > 0 {
                        info!("rag: killed {}, removed {} edges", process, removed_edges);
                        return Ok(AppliedFix::KilledProcess {
                            process: process.clone(),
                            removed_edges,
                        });
                    }
                }
                Fix::ReleaseResource { resource, owner } => {
                    let (Ok(rid), Ok(pid)) = (
                        self.lookup(resource, NodeKind::Resource),
                        self.lookup(owner, NodeKind::Process),
                    ) else {
                        debug!("rag: skipping stale fix: {}", fix);
                        continue;
                    };
                    let removed_edges = self.remove_edges_where(|e| {
                        e.kind == EdgeKind::Allocation && e.from == rid && e.to == pid
                    });
                    if removed_edges > 0 {
                        info!("rag: {} released {}", owner, resource);
                        return Ok(AppliedFix::ReleasedResource {
                            resource: resource.clone(),
                            owner: owner.clone(),
                            removed_edges,
                        });
                    }
                }
                Fix::PreemptResource { .. } | Fix::RemoveCycleEdge => {}
            }
        }

        let edge = self.undo().map_err(|_| SimError::not_found("no edge to remove"))?;
        let from = String::from(self.name_of(edge.from));
        let to = String::from(self.name_of(edge.to));
        warn!("rag: no actionable fix, removed last edge {} -> {}", from, to);
        Ok(AppliedFix::RemovedLastEdge { from, to })
    }
}
