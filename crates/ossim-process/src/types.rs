//! Process lifecycle types

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// Created, not yet admitted
    New,
    /// In the ready queue
    Ready,
    /// On the CPU
    Running,
    /// Blocked on an event
    Waiting,
    /// Finished
    Terminated,
}

impl ProcessState {
    /// State name, for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::New => "New",
            ProcessState::Ready => "Ready",
            ProcessState::Running => "Running",
            ProcessState::Waiting => "Waiting",
            ProcessState::Terminated => "Terminated",
        }
    }

    /// Whether the five-state model allows moving from `self` to `to`.
    pub fn can_move_to(self, to: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, to),
            (New, Ready)
                | (Ready, Running)
                | (Running, Waiting)
                | (Running, Terminated)
                | (Waiting, Ready)
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process control block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    /// Process identifier
    pub pid: String,
    /// Current state
    pub state: ProcessState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use ProcessState::*;
        assert!(New.can_move_to(Ready));
        assert!(Ready.can_move_to(Running));
        assert!(Running.can_move_to(Waiting));
        assert!(Running.can_move_to(Terminated));
        assert!(Waiting.can_move_to(Ready));

        assert!(!New.can_move_to(Running));
        assert!(!Waiting.can_move_to(Running));
        assert!(!Terminated.can_move_to(Ready));
        assert!(!Ready.can_move_to(Ready));
    }
}
