//! Scheduling policies
//!
//! Each policy is a pure function from a validated process list to a
//! [`Schedule`]. Processes are referred to by their submission index, which
//! is also the final tie-break everywhere so output is fully deterministic.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;
use log::debug;

use crate::types::{Process, Schedule, SchedulingPolicy, Slice, TimingResult};

/// Submission indices sorted by arrival; equal arrivals keep submission order.
fn arrival_order(processes: &[Process]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..processes.len()).collect();
    // sort_by_key is stable
    order.sort_by_key(|&idx| processes[idx].arrival);
    order
}

fn slice_of(process: &Process, start: u64, end: u64) -> Slice {
    Slice {
        pid: process.pid.clone(),
        start,
        end,
    }
}

// ============================================================================
// FCFS
// ============================================================================

pub(crate) fn fcfs(processes: &[Process]) -> Schedule {
    let mut timeline = Vec::with_capacity(processes.len());
    let mut results = Vec::with_capacity(processes.len());
    let mut clock = 0u64;

    for idx in arrival_order(processes) {
        let p = &processes[idx];
        let start = clock.max(p.arrival);
        let end = start + p.burst;
        debug!("fcfs: dispatch {} at {} until {}", p.pid, start, end);

        timeline.push(slice_of(p, start, end));
        results.push(TimingResult::new(p, start, end));
        clock = end;
    }

    Schedule {
        policy: SchedulingPolicy::Fcfs,
        timeline,
        results,
    }
}

// ============================================================================
// Non-preemptive selection (SJF, Priority)
// ============================================================================

pub(crate) fn sjf(processes: &[Process]) -> Schedule {
    non_preemptive(processes, SchedulingPolicy::Sjf, |p| i128::from(p.burst))
}

pub(crate) fn priority(processes: &[Process]) -> Schedule {
    non_preemptive(processes, SchedulingPolicy::Priority, |p| i128::from(p.priority))
}

/// At each decision point pick the arrived process with the smallest key,
/// breaking ties by earliest arrival and then submission order. The chosen
/// process runs to completion.
fn non_preemptive(
    processes: &[Process],
    policy: SchedulingPolicy,
    key: impl Fn(&Process) -> i128,
) -> Schedule {
    let mut pending: Vec<usize> = (0..processes.len()).collect();
    let mut timeline = Vec::with_capacity(processes.len());
    let mut results = Vec::with_capacity(processes.len());
    let mut clock = 0u64;

    while !pending.is_empty() {
        let chosen = pending
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, idx)| processes[idx].arrival <= clock)
            .min_by_key(|&(_, idx)| (key(&processes[idx]), processes[idx].arrival, idx))
            .map(|(pos, _)| pos);

        let pos = match chosen {
            Some(pos) => pos,
            None => {
                // CPU idles until the next arrival
                let next_arrival = pending.iter().map(|&idx| processes[idx].arrival).min();
                clock = next_arrival.unwrap_or(clock);
                debug!("{}: idle until {}", policy.name(), clock);
                continue;
            }
        };

        let p = &processes[pending.remove(pos)];
        let start = clock;
        let end = start + p.burst;
        debug!("{}: dispatch {} at {} until {}", policy.name(), p.pid, start, end);

        timeline.push(slice_of(p, start, end));
        results.push(TimingResult::new(p, start, end));
        clock = end;
    }

    Schedule {
        policy,
        timeline,
        results,
    }
}

// ============================================================================
// Round Robin
// ============================================================================

/// Round Robin over a FIFO ready queue.
///
/// After each slice, processes that arrived during it are enqueued before
/// the preempted process goes back to the tail.
pub(crate) fn round_robin(processes: &[Process], quantum: u64) -> Schedule {
    let order = arrival_order(processes);
    let mut remaining: Vec<u64> = processes.iter().map(|p| p.burst).collect();
    let mut first_start: Vec<Option<u64>> = vec![None; processes.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut next_arrival = 0usize;
    let mut timeline = Vec::new();
    let mut results = Vec::with_capacity(processes.len());
    let mut clock = 0u64;

    let admit = |clock: u64, next_arrival: &mut usize, queue: &mut VecDeque<usize>| {
        while *next_arrival < order.len() && processes[order[*next_arrival]].arrival <= clock {
            queue.push_back(order[*next_arrival]);
            *next_arrival += 1;
        }
    };

    loop {
        admit(clock, &mut next_arrival, &mut queue);

        let idx = match queue.pop_front() {
            Some(idx) => idx,
            None if next_arrival < order.len() => {
                clock = processes[order[next_arrival]].arrival;
                debug!("rr: idle until {}", clock);
                continue;
            }
            None => break,
        };

        let p = &processes[idx];
        let run = quantum.min(remaining[idx]);
        let start = clock;
        let first = *first_start[idx].get_or_insert(start);
        clock += run;
        remaining[idx] -= run;
        debug!("rr: {} runs {}..{} ({} left)", p.pid, start, clock, remaining[idx]);
        timeline.push(slice_of(p, start, clock));

        // New arrivals take precedence over the preempted process
        admit(clock, &mut next_arrival, &mut queue);

        if remaining[idx] > 0 {
            queue.push_back(idx);
        } else {
            results.push(TimingResult::new(p, first, clock));
        }
    }

    Schedule {
        policy: SchedulingPolicy::RoundRobin { quantum },
        timeline,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procs(rows: &[(&str, u64, u64, i64)]) -> Vec<Process> {
        rows.iter()
            .map(|&(pid, arrival, burst, prio)| Process::new(pid, arrival, burst).with_priority(prio))
            .collect()
    }

    fn gantt(schedule: &Schedule) -> Vec<(&str, u64, u64)> {
        schedule
            .timeline
            .iter()
            .map(|s| (s.pid.as_str(), s.start, s.end))
            .collect()
    }

    // ========================================================================
    // FCFS
    // ========================================================================

    #[test]
    fn test_fcfs_textbook_example() {
        let ps = procs(&[("P1", 0, 5, 0), ("P2", 1, 3, 0), ("P3", 2, 8, 0)]);
        let s = fcfs(&ps);

        assert_eq!(gantt(&s), vec![("P1", 0, 5), ("P2", 5, 8), ("P3", 8, 16)]);
        assert_eq!(s.result_for("P1").unwrap().waiting_time, 0);
        assert_eq!(s.result_for("P2").unwrap().waiting_time, 4);
        assert_eq!(s.result_for("P3").unwrap().waiting_time, 6);
        assert_eq!(s.result_for("P3").unwrap().turnaround_time, 14);
    }

    #[test]
    fn test_fcfs_sorts_by_arrival_stably() {
        let ps = procs(&[("B", 3, 1, 0), ("A", 0, 2, 0), ("C", 3, 1, 0)]);
        let s = fcfs(&ps);
        assert_eq!(gantt(&s), vec![("A", 0, 2), ("B", 3, 4), ("C", 4, 5)]);
    }

    #[test]
    fn test_fcfs_idle_gap() {
        let ps = procs(&[("A", 2, 2, 0), ("B", 10, 1, 0)]);
        let s = fcfs(&ps);
        assert_eq!(gantt(&s), vec![("A", 2, 4), ("B", 10, 11)]);
        assert_eq!(s.idle_time(), 6);
    }

    // ========================================================================
    // SJF / Priority
    // ========================================================================

    #[test]
    fn test_sjf_no_preemption() {
        // P2 arrives while P1 runs; P1 is not preempted
        let ps = procs(&[("P1", 0, 7, 0), ("P2", 2, 4, 0), ("P3", 4, 1, 0), ("P4", 5, 4, 0)]);
        let s = sjf(&ps);
        assert_eq!(
            gantt(&s),
            vec![("P1", 0, 7), ("P3", 7, 8), ("P2", 8, 12), ("P4", 12, 16)]
        );
    }

    #[test]
    fn test_sjf_tie_breaks_by_arrival_then_submission() {
        let ps = procs(&[("X", 0, 5, 0), ("B", 2, 3, 0), ("A", 1, 3, 0), ("C", 2, 3, 0)]);
        let s = sjf(&ps);
        let order: Vec<&str> = s.timeline.iter().map(|sl| sl.pid.as_str()).collect();
        assert_eq!(order, vec!["X", "A", "B", "C"]);
    }

    #[test]
    fn test_sjf_advances_to_next_arrival() {
        let ps = procs(&[("late", 5, 2, 0)]);
        let s = sjf(&ps);
        assert_eq!(gantt(&s), vec![("late", 5, 7)]);
        assert_eq!(s.result_for("late").unwrap().waiting_time, 0);
    }

    #[test]
    fn test_priority_lower_value_wins() {
        let ps = procs(&[("P1", 0, 4, 3), ("P2", 1, 2, 1), ("P3", 1, 3, -2), ("P4", 2, 1, 1)]);
        let s = priority(&ps);
        assert_eq!(
            gantt(&s),
            vec![("P1", 0, 4), ("P3", 4, 7), ("P2", 7, 9), ("P4", 9, 10)]
        );
    }

    // ========================================================================
    // Round Robin
    // ========================================================================

    #[test]
    fn test_round_robin_basic() {
        let ps = procs(&[("P1", 0, 5, 0), ("P2", 1, 3, 0), ("P3", 2, 1, 0)]);
        let s = round_robin(&ps, 2);
        assert_eq!(
            gantt(&s),
            vec![
                ("P1", 0, 2),
                ("P2", 2, 4),
                ("P3", 4, 5),
                ("P1", 5, 7),
                ("P2", 7, 8),
                ("P1", 8, 9),
            ]
        );
        let done: Vec<&str> = s.results.iter().map(|r| r.pid.as_str()).collect();
        assert_eq!(done, vec!["P3", "P2", "P1"]);
        assert_eq!(s.result_for("P1").unwrap().waiting_time, 4);
        assert_eq!(s.result_for("P2").unwrap().response_time, 1);
    }

    #[test]
    fn test_round_robin_arrival_before_requeue() {
        // B arrives exactly when A's first slice ends: B must run before A again
        let ps = procs(&[("A", 0, 4, 0), ("B", 2, 2, 0)]);
        let s = round_robin(&ps, 2);
        assert_eq!(gantt(&s), vec![("A", 0, 2), ("B", 2, 4), ("A", 4, 6)]);
    }

    #[test]
    fn test_round_robin_idle_then_arrival() {
        let ps = procs(&[("A", 0, 1, 0), ("B", 4, 3, 0)]);
        let s = round_robin(&ps, 2);
        assert_eq!(gantt(&s), vec![("A", 0, 1), ("B", 4, 6), ("B", 6, 7)]);
        assert_eq!(s.result_for("B").unwrap().turnaround_time, 3);
    }
}
