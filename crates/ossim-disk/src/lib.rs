//! Disk head scheduling simulation
//!
//! Given a pending request queue and the head position, produces the order
//! in which cylinders are visited and the total head movement:
//!
//! - **FCFS**: submission order
//! - **SSTF**: nearest pending request, ties to the lower cylinder
//! - **SCAN**: sweep to the disk boundary, then reverse; the bounce always counts
//!
//! # Module Organization
//!
//! - `types` - Policies, direction, geometry and the resulting `SeekPlan`
//! - `scheduler` - The algorithms and the `DiskScheduler` wrapper

#![no_std]
extern crate alloc;

pub mod scheduler;
pub mod types;

pub use scheduler::{schedule, DiskScheduler};
pub use types::{DiskConfig, DiskPolicy, Direction, SeekPlan, DEFAULT_DISK_SIZE};
