//! Memory allocation simulation
//!
//! Two independent allocation models over the same configured memory:
//!
//! - **Paging**: fixed-size frames handed out lowest index first, tracked by a
//!   frame table (owner per frame) and a page table (frames per process)
//! - **Segmentation**: variable-size segments placed by first, best or worst
//!   fit into a coalesced, start-ordered free-block list
//!
//! ```text
//!  MemoryManager
//!  ├── FrameTable    frames[i] = owner | free      page_table[p] = [i, ...]
//!  └── SegmentTable  segments (sorted by start)   free_blocks (coalesced)
//! ```
//!
//! Internal state is only reachable through the manager; inspection goes
//! through owned snapshots or read-only views.
//!
//! # Module Organization
//!
//! - `config` - Memory and frame sizes
//! - `paging` - Frame table and page table
//! - `segmentation` - Segment list, free-block list, fit policies
//! - `manager` - `MemoryManager` owning both models
//! - `invariants` - Frame/page table agreement, partition and coalescing checks

#![no_std]
extern crate alloc;

pub mod config;
pub mod invariants;
pub mod manager;
pub mod paging;
pub mod segmentation;

pub use config::{MemoryConfig, DEFAULT_FRAME_KB, DEFAULT_TOTAL_KB, MAX_FRAMES};
pub use invariants::check_all_invariants;
pub use manager::{FreedMemory, MemoryManager};
pub use paging::{FrameTable, PagingSnapshot};
pub use segmentation::{FitPolicy, FreeBlock, Segment, SegmentTable, SegmentationSnapshot};
