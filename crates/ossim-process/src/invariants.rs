//! Process table invariants
//!
//! # Invariants
//!
//! 1. **Single Runner**: at most one process is Running, and it is the one
//!    the table reports as running
//! 2. **Queue Membership**: a process is in the ready queue iff it is Ready,
//!    and in the waiting list iff it is Waiting, exactly once

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use ossim_core::InvariantViolation;

use crate::table::ProcessTable;
use crate::types::ProcessState;

/// Check every process table invariant.
pub fn check_table(table: &ProcessTable) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let runners: Vec<&str> = table
        .processes()
        .filter(|p| p.state == ProcessState::Running)
        .map(|p| p.pid.as_str())
        .collect();
    let consistent = match (runners.as_slice(), table.running()) {
        ([], None) => true,
        ([only], Some(running)) => *only == running,
        _ => false,
    };
    if !consistent {
        violations.push(InvariantViolation::new(
            "single_runner",
            format!("running {:?} but Running states {:?}", table.running(), runners),
        ));
    }

    check_queue(&mut violations, table, &table.ready_queue(), ProcessState::Ready);
    check_queue(&mut violations, table, &table.waiting(), ProcessState::Waiting);

    violations
}

fn check_queue(
    violations: &mut Vec<InvariantViolation>,
    table: &ProcessTable,
    queue: &[&str],
    state: ProcessState,
) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for &pid in queue {
        *seen.entry(pid).or_insert(0) += 1;
    }

    for entry in table.processes() {
        let count = seen.remove(entry.pid.as_str()).unwrap_or(0);
        let expected = usize::from(entry.state == state);
        if count != expected {
            violations.push(InvariantViolation::new(
                "queue_membership",
                format!(
                    "{} is {} but appears {} times in the {} queue",
                    entry.pid, entry.state, count, state
                ),
            ));
        }
    }

    for pid in seen.keys() {
        violations.push(InvariantViolation::new(
            "queue_membership",
            format!("unknown process {} in the {} queue", pid, state),
        ));
    }
}
