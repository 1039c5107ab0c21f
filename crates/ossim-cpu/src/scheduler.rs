//! CPU scheduler front end
//!
//! [`CpuScheduler`] collects process descriptors and runs any policy over a
//! private copy of them. [`schedule`] does the same for a caller-owned slice.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use log::info;

use ossim_core::{InputError, SimError, SimResult};

use crate::policy;
use crate::types::{Process, Schedule, SchedulingPolicy};

/// Validate a process set and a policy before running.
///
/// No policy lets the clock pass the latest arrival plus the total burst,
/// so checking that bound once keeps every later addition in range.
fn validate(processes: &[Process], policy: SchedulingPolicy) -> SimResult<()> {
    if let SchedulingPolicy::RoundRobin { quantum: 0 } = policy {
        return Err(InputError::NonPositiveQuantum.into());
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut total_burst = 0u64;
    let mut latest_arrival = 0u64;
    for p in processes {
        if p.pid.is_empty() {
            return Err(SimError::empty("pid"));
        }
        if p.burst == 0 {
            return Err(InputError::NonPositiveBurst { pid: p.pid.clone() }.into());
        }
        if !seen.insert(p.pid.as_str()) {
            return Err(InputError::DuplicateId(p.pid.clone()).into());
        }
        total_burst = total_burst
            .checked_add(p.burst)
            .ok_or(InputError::TimelineOverflow)?;
        latest_arrival = latest_arrival.max(p.arrival);
    }
    latest_arrival
        .checked_add(total_burst)
        .ok_or(InputError::TimelineOverflow)?;
    Ok(())
}

/// Run one scheduling policy over a process set.
///
/// Fails with `InvalidInput` for a zero Round Robin quantum, a zero burst,
/// an empty or repeated pid, or times that would overflow the clock. The
/// input is never modified.
pub fn schedule(processes: &[Process], policy: SchedulingPolicy) -> SimResult<Schedule> {
    validate(processes, policy)?;

    let schedule = match policy {
        SchedulingPolicy::Fcfs => policy::fcfs(processes),
        SchedulingPolicy::Sjf => policy::sjf(processes),
        SchedulingPolicy::Priority => policy::priority(processes),
        SchedulingPolicy::RoundRobin { quantum } => policy::round_robin(processes, quantum),
    };

    info!(
        "{}: {} processes, {} slices, avg wait {:.2}, avg turnaround {:.2}",
        policy,
        processes.len(),
        schedule.timeline.len(),
        schedule.average_waiting_time(),
        schedule.average_turnaround_time()
    );
    Ok(schedule)
}

/// Process set plus the operations a presentation layer drives.
#[derive(Clone, Debug, Default)]
pub struct CpuScheduler {
    processes: Vec<Process>,
}

impl CpuScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a process.
    ///
    /// Rejects an empty pid, a zero burst and a pid that is already submitted.
    pub fn add_process(
        &mut self,
        pid: impl Into<String>,
        arrival: u64,
        burst: u64,
        priority: i64,
    ) -> SimResult<()> {
        let process = Process::new(pid, arrival, burst).with_priority(priority);
        self.submit(process)
    }

    /// Submit a prepared descriptor.
    pub fn submit(&mut self, process: Process) -> SimResult<()> {
        if process.pid.is_empty() {
            return Err(SimError::empty("pid"));
        }
        if process.burst == 0 {
            return Err(InputError::NonPositiveBurst { pid: process.pid }.into());
        }
        if self.processes.iter().any(|p| p.pid == process.pid) {
            return Err(InputError::DuplicateId(process.pid).into());
        }
        self.processes.push(process);
        Ok(())
    }

    /// Submitted processes in submission order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Number of submitted processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether no process has been submitted.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Drop every submitted process.
    pub fn clear(&mut self) {
        self.processes.clear();
    }

    /// Run a policy over the submitted processes.
    pub fn run(&self, policy: SchedulingPolicy) -> SimResult<Schedule> {
        schedule(&self.processes, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_process_rejects_bad_input() {
        let mut cpu = CpuScheduler::new();
        assert!(cpu.add_process("", 0, 3, 0).unwrap_err().is_invalid_input());
        assert_eq!(
            cpu.add_process("P1", 0, 0, 0),
            Err(SimError::InvalidInput(InputError::NonPositiveBurst {
                pid: String::from("P1")
            }))
        );

        cpu.add_process("P1", 0, 3, 0).unwrap();
        assert_eq!(
            cpu.add_process("P1", 4, 2, 0),
            Err(SimError::InvalidInput(InputError::DuplicateId(String::from("P1"))))
        );
        assert_eq!(cpu.len(), 1);
    }

    #[test]
    fn test_run_rejects_zero_quantum() {
        let mut cpu = CpuScheduler::new();
        cpu.add_process("P1", 0, 3, 0).unwrap();
        assert_eq!(
            cpu.run(SchedulingPolicy::RoundRobin { quantum: 0 }),
            Err(SimError::InvalidInput(InputError::NonPositiveQuantum))
        );
    }

    #[test]
    fn test_schedule_validates_caller_slice() {
        let ps = [Process::new("ok", 0, 2), Process::new("bad", 1, 0)];
        assert!(schedule(&ps, SchedulingPolicy::Fcfs).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_schedule_rejects_duplicate_pids() {
        let ps = [Process::new("P1", 0, 2), Process::new("P1", 1, 3)];
        assert_eq!(
            schedule(&ps, SchedulingPolicy::Sjf),
            Err(SimError::InvalidInput(InputError::DuplicateId(String::from("P1"))))
        );
    }

    #[test]
    fn test_schedule_rejects_clock_overflow() {
        let late = [Process::new("A", u64::MAX - 2, 5)];
        let heavy = [Process::new("A", 0, u64::MAX), Process::new("B", 0, 1)];
        for policy in [
            SchedulingPolicy::Fcfs,
            SchedulingPolicy::Sjf,
            SchedulingPolicy::Priority,
            SchedulingPolicy::RoundRobin { quantum: 4 },
        ] {
            for ps in [&late[..], &heavy[..]] {
                assert_eq!(
                    schedule(ps, policy),
                    Err(SimError::InvalidInput(InputError::TimelineOverflow))
                );
            }
        }

        // Right at the edge still runs, and the summary metrics stay finite
        let half = u64::MAX / 2;
        let wide = [Process::new("A", 0, half), Process::new("B", 0, half)];
        let s = schedule(&wide, SchedulingPolicy::Fcfs).unwrap();
        assert!(s.average_turnaround_time() > half as f64);

        let edge = [Process::new("A", u64::MAX - 5, 5)];
        let s = schedule(&edge, SchedulingPolicy::Fcfs).unwrap();
        assert_eq!(s.timeline[0].end, u64::MAX);
        assert_eq!(s.result_for("A").unwrap().turnaround_time, 5);
    }

    #[test]
    fn test_run_does_not_consume_processes() {
        let mut cpu = CpuScheduler::new();
        cpu.add_process("P1", 0, 5, 2).unwrap();
        cpu.add_process("P2", 1, 3, 1).unwrap();

        let first = cpu.run(SchedulingPolicy::Priority).unwrap();
        let second = cpu.run(SchedulingPolicy::Priority).unwrap();
        assert_eq!(first, second);
        assert_eq!(cpu.processes().len(), 2);
    }

    #[test]
    fn test_empty_run_is_empty_schedule() {
        let cpu = CpuScheduler::new();
        let s = cpu.run(SchedulingPolicy::RoundRobin { quantum: 3 }).unwrap();
        assert!(s.timeline.is_empty());
        assert!(s.results.is_empty());
    }
}
