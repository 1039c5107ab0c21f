//! OS concepts simulation engine
//!
//! Pure computation behind an educational OS simulator. Each component is an
//! independent, deterministic state machine; a presentation layer drives them
//! through plain method calls and renders the returned values.
//!
//! ```text
//!  Session
//!  ├── CpuScheduler              FCFS / SJF / Priority / Round Robin
//!  ├── DiskScheduler             FCFS / SSTF / SCAN
//!  ├── MemoryManager             paging + segmentation
//!  ├── ResourceAllocationGraph   cycle detection, explanation, fixes
//!  └── ProcessTable              New → Ready → Running → Waiting → Terminated
//! ```
//!
//! Components never talk to each other. A session is single-threaded and
//! owns everything it touches, so hosts create one per simulation.

#![no_std]
extern crate alloc;

use alloc::vec::Vec;
use log::info;
use serde::{Deserialize, Serialize};

pub use ossim_core::{
    violated_invariants, Exhaustion, InputError, InvariantViolation, SimError, SimResult,
};
pub use ossim_cpu::{
    check_schedule, schedule as schedule_cpu, CpuScheduler, Process, Schedule, SchedulingPolicy,
    Slice, TimingResult,
};
pub use ossim_deadlock::{
    explain, AppliedFix, CoffmanCondition, Cycle, DeadlockState, Edge, EdgeKind, Fix, Node,
    NodeId, NodeKind, ResourceAllocationGraph,
};
pub use ossim_disk::{
    schedule as schedule_disk, Direction, DiskConfig, DiskPolicy, DiskScheduler, SeekPlan,
    DEFAULT_DISK_SIZE,
};
pub use ossim_memory::{
    check_all_invariants as check_memory, FitPolicy, FreeBlock, FreedMemory, MemoryConfig,
    MemoryManager, PagingSnapshot, Segment, SegmentationSnapshot, DEFAULT_FRAME_KB,
    DEFAULT_TOTAL_KB, MAX_FRAMES,
};
pub use ossim_process::{check_table, ProcessEntry, ProcessState, ProcessTable};

/// Geometry for a new session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Memory size and frame size
    pub memory: MemoryConfig,
    /// Number of cylinders
    pub disk: DiskConfig,
}

/// One simulation: an independent instance of every component.
#[derive(Clone, Debug)]
pub struct Session {
    cpu: CpuScheduler,
    disk: DiskScheduler,
    memory: MemoryManager,
    rag: ResourceAllocationGraph,
    processes: ProcessTable,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            cpu: CpuScheduler::new(),
            disk: DiskScheduler::new(DiskConfig::default()),
            memory: MemoryManager::default(),
            rag: ResourceAllocationGraph::new(),
            processes: ProcessTable::new(),
        }
    }
}

impl Session {
    /// Create a session with the given geometry.
    pub fn new(config: SessionConfig) -> SimResult<Self> {
        if config.disk.disk_size == 0 {
            return Err(InputError::InvalidGeometry("disk has no cylinders".into()).into());
        }
        Ok(Self {
            disk: DiskScheduler::new(config.disk),
            memory: MemoryManager::new(config.memory)?,
            ..Self::default()
        })
    }

    /// CPU scheduler
    pub fn cpu(&self) -> &CpuScheduler {
        &self.cpu
    }

    /// CPU scheduler, for submitting processes
    pub fn cpu_mut(&mut self) -> &mut CpuScheduler {
        &mut self.cpu
    }

    /// Disk scheduler
    pub fn disk(&self) -> &DiskScheduler {
        &self.disk
    }

    /// Memory manager
    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    /// Memory manager, for allocating and freeing
    pub fn memory_mut(&mut self) -> &mut MemoryManager {
        &mut self.memory
    }

    /// Resource allocation graph
    pub fn rag(&self) -> &ResourceAllocationGraph {
        &self.rag
    }

    /// Resource allocation graph, for editing and applying fixes
    pub fn rag_mut(&mut self) -> &mut ResourceAllocationGraph {
        &mut self.rag
    }

    /// Process lifecycle table
    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    /// Process lifecycle table, for driving transitions
    pub fn processes_mut(&mut self) -> &mut ProcessTable {
        &mut self.processes
    }

    /// Geometry in use.
    pub fn config(&self) -> SessionConfig {
        SessionConfig {
            memory: self.memory.config(),
            disk: self.disk.config(),
        }
    }

    /// Clear every component, keeping the geometry.
    pub fn reset(&mut self) {
        self.cpu.clear();
        self.memory.reset();
        self.rag.clear();
        self.processes.reset();
        info!("session reset");
    }

    /// Check the invariants of every stateful component.
    ///
    /// Returns a list of violations (empty if all invariants hold).
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = check_memory(&self.memory);
        violations.extend(check_table(&self.processes));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let session = Session::default();
        assert_eq!(session.config().memory.total_kb, DEFAULT_TOTAL_KB);
        assert_eq!(session.config().disk.disk_size, DEFAULT_DISK_SIZE);
        assert!(session.check_invariants().is_empty());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let config = SessionConfig {
            disk: DiskConfig { disk_size: 0 },
            ..SessionConfig::default()
        };
        assert!(Session::new(config).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_reset_clears_components() {
        let mut session = Session::default();
        session.cpu_mut().add_process("P1", 0, 5, 0).unwrap();
        session.memory_mut().allocate_paging("A", 45).unwrap();
        session.rag_mut().add_process("P1").unwrap();
        session.processes_mut().create("P1").unwrap();

        session.reset();
        assert!(session.cpu().is_empty());
        assert!(session.memory().resident_processes().is_empty());
        assert!(session.rag().nodes().is_empty());
        assert!(session.processes().is_empty());
    }
}
