//! CPU scheduling types
//!
//! Pure data: process descriptors going in, Gantt slices and timing
//! results coming out.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Process descriptor submitted to a scheduling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Process identifier
    pub pid: String,
    /// Time the process becomes ready
    pub arrival: u64,
    /// Total CPU time required (strictly positive)
    pub burst: u64,
    /// Scheduling priority, lower value = higher priority
    #[serde(default)]
    pub priority: i64,
}

impl Process {
    /// Create a process with the default priority (0).
    pub fn new(pid: impl Into<String>, arrival: u64, burst: u64) -> Self {
        Self {
            pid: pid.into(),
            arrival,
            burst,
            priority: 0,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// Scheduling policy for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    /// First come, first served
    Fcfs,
    /// Shortest job first (non-preemptive)
    Sjf,
    /// Priority (non-preemptive, lower value first)
    Priority,
    /// Round Robin with a fixed time quantum
    RoundRobin {
        /// Maximum slice length
        quantum: u64,
    },
}

impl SchedulingPolicy {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            SchedulingPolicy::Fcfs => "FCFS",
            SchedulingPolicy::Sjf => "SJF",
            SchedulingPolicy::Priority => "Priority",
            SchedulingPolicy::RoundRobin { .. } => "Round Robin",
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingPolicy::RoundRobin { quantum } => write!(f, "Round Robin (q={})", quantum),
            other => f.write_str(other.name()),
        }
    }
}

/// One contiguous stretch of CPU time given to a process (Gantt slice).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Process that ran
    pub pid: String,
    /// Start time (inclusive)
    pub start: u64,
    /// End time (exclusive), always greater than `start`
    pub end: u64,
}

impl Slice {
    /// Length of the slice.
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Per-process timing, computed once the process has fully completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingResult {
    /// Process identifier
    pub pid: String,
    /// Arrival time
    pub arrival: u64,
    /// Burst time
    pub burst: u64,
    /// Time the final slice ended
    pub completion_time: u64,
    /// First dispatch minus arrival
    pub response_time: u64,
    /// Turnaround minus burst
    pub waiting_time: u64,
    /// Completion minus arrival
    pub turnaround_time: u64,
}

impl TimingResult {
    pub(crate) fn new(process: &Process, first_start: u64, completion_time: u64) -> Self {
        let turnaround_time = completion_time - process.arrival;
        Self {
            pid: process.pid.clone(),
            arrival: process.arrival,
            burst: process.burst,
            completion_time,
            response_time: first_start - process.arrival,
            waiting_time: turnaround_time - process.burst,
            turnaround_time,
        }
    }
}

/// Output of a scheduling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Policy that produced this schedule
    pub policy: SchedulingPolicy,
    /// Gantt chart in execution order
    pub timeline: Vec<Slice>,
    /// Timing results in completion order
    pub results: Vec<TimingResult>,
}

impl Schedule {
    /// Look up the timing result of one process.
    pub fn result_for(&self, pid: &str) -> Option<&TimingResult> {
        self.results.iter().find(|r| r.pid == pid)
    }

    /// All slices belonging to one process, in execution order.
    pub fn slices_of<'a>(&'a self, pid: &'a str) -> impl Iterator<Item = &'a Slice> + 'a {
        self.timeline.iter().filter(move |s| s.pid == pid)
    }

    /// Mean waiting time (0 for an empty schedule).
    pub fn average_waiting_time(&self) -> f64 {
        self.mean(|r| r.waiting_time)
    }

    /// Mean turnaround time (0 for an empty schedule).
    pub fn average_turnaround_time(&self) -> f64 {
        self.mean(|r| r.turnaround_time)
    }

    /// Mean response time (0 for an empty schedule).
    pub fn average_response_time(&self) -> f64 {
        self.mean(|r| r.response_time)
    }

    /// Time from the first slice start to the last slice end.
    pub fn makespan(&self) -> u64 {
        match (self.timeline.first(), self.timeline.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0,
        }
    }

    /// Total time the CPU spent running processes.
    pub fn busy_time(&self) -> u64 {
        self.timeline.iter().map(Slice::duration).sum()
    }

    /// Gaps inside the makespan where no process was ready.
    pub fn idle_time(&self) -> u64 {
        self.makespan() - self.busy_time()
    }

    /// Fraction of the makespan spent busy, in `[0, 1]`.
    pub fn cpu_utilization(&self) -> f64 {
        let makespan = self.makespan();
        if makespan == 0 {
            return 0.0;
        }
        self.busy_time() as f64 / makespan as f64
    }

    fn mean(&self, field: impl Fn(&TimingResult) -> u64) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        // Summed as f64: per-process times fit u64, their total may not
        let total: f64 = self.results.iter().map(|r| field(r) as f64).sum();
        total / self.results.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn slice(pid: &str, start: u64, end: u64) -> Slice {
        Slice {
            pid: pid.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_timing_result_identities() {
        let p = Process::new("P2", 1, 3);
        let r = TimingResult::new(&p, 5, 8);
        assert_eq!(r.turnaround_time, 7);
        assert_eq!(r.waiting_time, 4);
        assert_eq!(r.response_time, 4);
        assert_eq!(r.completion_time, 8);
    }

    #[test]
    fn test_schedule_metrics_with_idle_gap() {
        let a = Process::new("A", 0, 2);
        let b = Process::new("B", 4, 2);
        let schedule = Schedule {
            policy: SchedulingPolicy::Fcfs,
            timeline: vec![slice("A", 0, 2), slice("B", 4, 6)],
            results: vec![TimingResult::new(&a, 0, 2), TimingResult::new(&b, 4, 6)],
        };

        assert_eq!(schedule.makespan(), 6);
        assert_eq!(schedule.busy_time(), 4);
        assert_eq!(schedule.idle_time(), 2);
        assert!((schedule.cpu_utilization() - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(schedule.average_waiting_time(), 0.0);
        assert_eq!(schedule.average_turnaround_time(), 2.0);
    }

    #[test]
    fn test_empty_schedule_metrics() {
        let schedule = Schedule {
            policy: SchedulingPolicy::Sjf,
            timeline: vec![],
            results: vec![],
        };
        assert_eq!(schedule.makespan(), 0);
        assert_eq!(schedule.cpu_utilization(), 0.0);
        assert_eq!(schedule.average_waiting_time(), 0.0);
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(SchedulingPolicy::Fcfs.to_string(), "FCFS");
        assert_eq!(
            SchedulingPolicy::RoundRobin { quantum: 4 }.to_string(),
            "Round Robin (q=4)"
        );
    }
}
