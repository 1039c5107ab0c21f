//! Process lifecycle state machine
//!
//! ```text
//!  New ──admit──▶ Ready ──dispatch──▶ Running ──terminate──▶ Terminated
//!                   ▲                   │
//!                   └──wakeup── Waiting ◀┘ block
//! ```
//!
//! # Module Organization
//!
//! - `types` - `ProcessState`, `ProcessEntry`
//! - `table` - `ProcessTable` with the ready queue and waiting list
//! - `invariants` - Queue/state agreement checks

#![no_std]
extern crate alloc;

pub mod invariants;
pub mod table;
pub mod types;

pub use invariants::check_table;
pub use table::ProcessTable;
pub use types::{ProcessEntry, ProcessState};
