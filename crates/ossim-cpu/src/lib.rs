//! CPU scheduling simulation
//!
//! Given a process set, produces an execution timeline (Gantt chart) and
//! per-process timing under one of four policies:
//!
//! - **FCFS**: arrival order, run to completion
//! - **SJF**: shortest burst among arrived processes, non-preemptive
//! - **Priority**: lowest priority value among arrived processes, non-preemptive
//! - **Round Robin**: FIFO ready queue with a fixed quantum
//!
//! Every run is deterministic: ties are broken by arrival and then by
//! submission order, and in Round Robin processes arriving during a slice
//! enter the ready queue ahead of the process that slice preempted.
//!
//! # Module Organization
//!
//! - `types` - Process descriptors, slices, timing results, schedules
//! - `policy` - The four scheduling algorithms
//! - `scheduler` - `CpuScheduler` and the validating `schedule` entry point
//! - `invariants` - Schedule invariant checker

#![no_std]
extern crate alloc;

pub mod invariants;
mod policy;
pub mod scheduler;
pub mod types;

pub use invariants::check_schedule;
pub use scheduler::{schedule, CpuScheduler};
pub use types::{Process, Schedule, SchedulingPolicy, Slice, TimingResult};
