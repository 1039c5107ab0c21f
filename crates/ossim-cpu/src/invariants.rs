//! Schedule invariants
//!
//! # Invariants
//!
//! 1. **Slice Shape**: every slice has `end > start`
//! 2. **No Overlap**: slices are in time order and never overlap
//! 3. **Burst Conservation**: a process's slice durations sum to its burst
//! 4. **Causality**: no slice starts before its process arrives
//! 5. **Result Coverage**: exactly one timing result per process
//! 6. **Timing Identities**: turnaround = completion - arrival, waiting = turnaround - burst,
//!    and completion equals the end of the process's last slice

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use ossim_core::InvariantViolation;

use crate::types::{Process, Schedule};

/// Check every schedule invariant against the process set that produced it.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_schedule(processes: &[Process], schedule: &Schedule) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    violations.extend(check_slices(schedule));
    violations.extend(check_process_coverage(processes, schedule));
    violations
}

/// Invariants 1 and 2
fn check_slices(schedule: &Schedule) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut prev_end = 0u64;

    for (i, slice) in schedule.timeline.iter().enumerate() {
        if slice.end <= slice.start {
            violations.push(InvariantViolation::new(
                "slice_shape",
                format!("slice {} of {} is empty ({}..{})", i, slice.pid, slice.start, slice.end),
            ));
        }
        if i > 0 && slice.start < prev_end {
            violations.push(InvariantViolation::new(
                "no_overlap",
                format!(
                    "slice {} of {} starts at {} before previous end {}",
                    i, slice.pid, slice.start, prev_end
                ),
            ));
        }
        prev_end = slice.end;
    }

    violations
}

/// Invariants 3 to 6
fn check_process_coverage(processes: &[Process], schedule: &Schedule) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let mut ran: BTreeMap<&str, u64> = BTreeMap::new();
    let mut last_end: BTreeMap<&str, u64> = BTreeMap::new();
    for slice in &schedule.timeline {
        *ran.entry(slice.pid.as_str()).or_insert(0) += slice.duration();
        last_end.insert(slice.pid.as_str(), slice.end);
    }

    for p in processes {
        let pid = p.pid.as_str();

        let total = ran.get(pid).copied().unwrap_or(0);
        if total != p.burst {
            violations.push(InvariantViolation::new(
                "burst_conservation",
                format!("{} ran {} units, burst is {}", pid, total, p.burst),
            ));
        }

        if let Some(early) = schedule.slices_of(pid).find(|s| s.start < p.arrival) {
            violations.push(InvariantViolation::new(
                "causality",
                format!("{} runs at {} before arriving at {}", pid, early.start, p.arrival),
            ));
        }

        let mut matching = schedule.results.iter().filter(|r| r.pid == pid);
        let result = match (matching.next(), matching.next()) {
            (Some(r), None) => r,
            (None, _) => {
                violations.push(InvariantViolation::new(
                    "result_coverage",
                    format!("{} has no timing result", pid),
                ));
                continue;
            }
            (Some(_), Some(_)) => {
                violations.push(InvariantViolation::new(
                    "result_coverage",
                    format!("{} has more than one timing result", pid),
                ));
                continue;
            }
        };

        let identities_hold = result.completion_time >= p.arrival
            && result.turnaround_time == result.completion_time - p.arrival
            && result.turnaround_time >= p.burst
            && result.waiting_time == result.turnaround_time - p.burst
            && last_end.get(pid) == Some(&result.completion_time);
        if !identities_hold {
            violations.push(InvariantViolation::new(
                "timing_identities",
                format!(
                    "{}: completion {}, turnaround {}, waiting {} inconsistent",
                    pid, result.completion_time, result.turnaround_time, result.waiting_time
                ),
            ));
        }
    }

    if schedule.results.len() > processes.len() {
        violations.push(InvariantViolation::new(
            "result_coverage",
            format!(
                "{} results for {} processes",
                schedule.results.len(),
                processes.len()
            ),
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::schedule;
    use crate::types::{SchedulingPolicy, Slice};
    use alloc::string::String;
    use alloc::vec;
    use ossim_core::violated_invariants;

    fn workload() -> Vec<Process> {
        vec![
            Process::new("P1", 0, 6).with_priority(2),
            Process::new("P2", 1, 8).with_priority(1),
            Process::new("P3", 2, 7).with_priority(3),
            Process::new("P4", 3, 3).with_priority(0),
            Process::new("P5", 20, 2).with_priority(1),
        ]
    }

    #[test]
    fn test_invariants_hold_for_every_policy() {
        let ps = workload();
        for policy in [
            SchedulingPolicy::Fcfs,
            SchedulingPolicy::Sjf,
            SchedulingPolicy::Priority,
            SchedulingPolicy::RoundRobin { quantum: 1 },
            SchedulingPolicy::RoundRobin { quantum: 4 },
        ] {
            let s = schedule(&ps, policy).unwrap();
            let violations = check_schedule(&ps, &s);
            assert!(violations.is_empty(), "{}: {:?}", policy, violations);
        }
    }

    #[test]
    fn test_detects_overlap_and_lost_burst() {
        let ps = vec![Process::new("A", 0, 3), Process::new("B", 0, 2)];
        let mut s = schedule(&ps, SchedulingPolicy::Fcfs).unwrap();
        s.timeline[1] = Slice {
            pid: String::from("B"),
            start: 2,
            end: 3,
        };

        let names = violated_invariants(&check_schedule(&ps, &s));
        assert!(names.contains(&"no_overlap"));
        assert!(names.contains(&"burst_conservation"));
    }

    #[test]
    fn test_detects_missing_result() {
        let ps = vec![Process::new("A", 0, 3)];
        let mut s = schedule(&ps, SchedulingPolicy::Sjf).unwrap();
        s.results.clear();
        assert_eq!(violated_invariants(&check_schedule(&ps, &s)), vec!["result_coverage"]);
    }
}
