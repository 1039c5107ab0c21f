//! Disk scheduling types

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Default number of cylinders.
pub const DEFAULT_DISK_SIZE: u64 = 200;

/// Sweep direction for SCAN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward cylinder 0
    Left,
    /// Toward the last cylinder
    #[default]
    Right,
}

/// Disk scheduling policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskPolicy {
    /// Submission order
    Fcfs,
    /// Shortest seek time first
    Sstf,
    /// Elevator sweep to the boundary, then reverse
    Scan {
        /// Initial sweep direction
        direction: Direction,
    },
}

impl DiskPolicy {
    /// SCAN sweeping in the default direction.
    pub fn scan() -> Self {
        DiskPolicy::Scan {
            direction: Direction::default(),
        }
    }
}

impl fmt::Display for DiskPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskPolicy::Fcfs => f.write_str("FCFS"),
            DiskPolicy::Sstf => f.write_str("SSTF"),
            DiskPolicy::Scan { direction } => write!(f, "SCAN ({:?})", direction),
        }
    }
}

/// Disk geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskConfig {
    /// Number of cylinders; valid cylinders are `[0, disk_size)`
    pub disk_size: u64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            disk_size: DEFAULT_DISK_SIZE,
        }
    }
}

/// Visiting order of the head and the distance it travelled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekPlan {
    /// Cylinders in visiting order, starting with the initial head position
    pub sequence: Vec<u64>,
    /// Sum of absolute distances between consecutive positions
    pub total_head_movement: u64,
}

impl SeekPlan {
    pub(crate) fn starting_at(head: u64) -> Self {
        Self {
            sequence: alloc::vec![head],
            total_head_movement: 0,
        }
    }

    /// Move the head to `cylinder`, accumulating the distance.
    pub(crate) fn visit(&mut self, cylinder: u64) {
        let current = self.head();
        self.total_head_movement += current.abs_diff(cylinder);
        self.sequence.push(cylinder);
    }

    /// Current head position.
    pub fn head(&self) -> u64 {
        self.sequence.last().copied().unwrap_or_default()
    }

    /// Individual seek distances between consecutive positions.
    pub fn seek_distances(&self) -> Vec<u64> {
        self.sequence
            .windows(2)
            .map(|w| w[0].abs_diff(w[1]))
            .collect()
    }

    /// Mean seek distance per head move (0 if the head never moved).
    pub fn average_seek_length(&self) -> f64 {
        let moves = self.sequence.len().saturating_sub(1);
        if moves == 0 {
            return 0.0;
        }
        self.total_head_movement as f64 / moves as f64
    }
}
