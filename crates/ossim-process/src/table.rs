//! Process table: the five-state lifecycle driven one event at a time
//!
//! At most one process runs. The ready queue and the waiting list are both
//! FIFO, so `dispatch` and `wakeup` always act on the oldest entry.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, info};

use ossim_core::{InputError, SimError, SimResult};

use crate::types::{ProcessEntry, ProcessState};

/// Every known process plus the scheduler queues.
#[derive(Clone, Debug, Default)]
pub struct ProcessTable {
    processes: BTreeMap<String, ProcessEntry>,
    ready: VecDeque<String>,
    waiting: VecDeque<String>,
    running: Option<String>,
}

impl ProcessTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process in the New state.
    pub fn create(&mut self, pid: &str) -> SimResult<()> {
        if pid.is_empty() {
            return Err(SimError::empty("pid"));
        }
        if self.processes.contains_key(pid) {
            return Err(InputError::DuplicateId(String::from(pid)).into());
        }
        self.processes.insert(
            String::from(pid),
            ProcessEntry {
                pid: String::from(pid),
                state: ProcessState::New,
            },
        );
        debug!("process: created {}", pid);
        Ok(())
    }

    /// New → Ready, appending to the ready queue.
    pub fn admit(&mut self, pid: &str) -> SimResult<()> {
        self.transition(pid, ProcessState::Ready)?;
        self.ready.push_back(String::from(pid));
        Ok(())
    }

    /// Ready → Running for the head of the ready queue.
    ///
    /// Refused while another process holds the CPU.
    pub fn dispatch(&mut self) -> SimResult<String> {
        let head = self
            .ready
            .front()
            .cloned()
            .ok_or_else(|| SimError::not_found("ready queue is empty"))?;
        if self.running.is_some() {
            return Err(InputError::IllegalTransition {
                pid: head,
                from: ProcessState::Ready.as_str(),
                to: ProcessState::Running.as_str(),
            }
            .into());
        }
        self.transition(&head, ProcessState::Running)?;
        self.ready.pop_front();
        self.running = Some(head.clone());
        Ok(head)
    }

    /// Running → Waiting.
    pub fn block(&mut self) -> SimResult<String> {
        let pid = self.take_running()?;
        self.transition(&pid, ProcessState::Waiting)?;
        self.running = None;
        self.waiting.push_back(pid.clone());
        Ok(pid)
    }

    /// Oldest Waiting → Ready.
    pub fn wakeup(&mut self) -> SimResult<String> {
        let pid = self
            .waiting
            .front()
            .cloned()
            .ok_or_else(|| SimError::not_found("no waiting process"))?;
        self.transition(&pid, ProcessState::Ready)?;
        self.waiting.pop_front();
        self.ready.push_back(pid.clone());
        Ok(pid)
    }

    /// Running → Terminated.
    pub fn terminate(&mut self) -> SimResult<String> {
        let pid = self.take_running()?;
        self.transition(&pid, ProcessState::Terminated)?;
        self.running = None;
        info!("process: {} terminated", pid);
        Ok(pid)
    }

    fn take_running(&self) -> SimResult<String> {
        self.running
            .clone()
            .ok_or_else(|| SimError::not_found("no running process"))
    }

    fn transition(&mut self, pid: &str, to: ProcessState) -> SimResult<()> {
        let entry = self
            .processes
            .get_mut(pid)
            .ok_or_else(|| SimError::not_found(format!("process {}", pid)))?;
        if !entry.state.can_move_to(to) {
            return Err(InputError::IllegalTransition {
                pid: String::from(pid),
                from: entry.state.as_str(),
                to: to.as_str(),
            }
            .into());
        }
        debug!("process: {} {} -> {}", pid, entry.state, to);
        entry.state = to;
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current state of a process.
    pub fn state_of(&self, pid: &str) -> SimResult<ProcessState> {
        self.processes
            .get(pid)
            .map(|p| p.state)
            .ok_or_else(|| SimError::not_found(format!("process {}", pid)))
    }

    /// Ready queue, head first.
    pub fn ready_queue(&self) -> Vec<&str> {
        self.ready.iter().map(String::as_str).collect()
    }

    /// Waiting list, oldest first.
    pub fn waiting(&self) -> Vec<&str> {
        self.waiting.iter().map(String::as_str).collect()
    }

    /// Process on the CPU, if any.
    pub fn running(&self) -> Option<&str> {
        self.running.as_deref()
    }

    /// All processes, ordered by pid.
    pub fn processes(&self) -> impl Iterator<Item = &ProcessEntry> {
        self.processes.values()
    }

    /// Number of known processes, terminated ones included.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether no process was ever created since the last reset.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Forget every process.
    pub fn reset(&mut self) {
        self.processes.clear();
        self.ready.clear();
        self.waiting.clear();
        self.running = None;
    }
}
