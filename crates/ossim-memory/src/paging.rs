//! Paging: fixed-size frames and a per-process page table
//!
//! The frame table is the source of truth for ownership; the page table is
//! an index over it. Both are only mutated together, so the union of all
//! page-table lists always equals the set of occupied frames.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use ossim_core::{Exhaustion, InputError, SimError, SimResult};

/// Owned copy of the paging state for inspection and rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSnapshot {
    /// Owner of each frame, `None` if free
    pub frames: Vec<Option<String>>,
    /// Process name to the frames it owns, in allocation order
    pub page_table: BTreeMap<String, Vec<usize>>,
    /// Number of frames
    pub num_frames: usize,
    /// Frame size (KB)
    pub frame_kb: u64,
    /// Number of free frames
    pub free_frames: usize,
}

/// Frame table plus page table.
#[derive(Clone, Debug)]
pub struct FrameTable {
    frame_kb: u64,
    frames: Vec<Option<String>>,
    page_table: BTreeMap<String, Vec<usize>>,
    /// KB each process asked for, for internal fragmentation
    requested_kb: BTreeMap<String, u64>,
}

impl FrameTable {
    /// Create a table of `num_frames` empty frames of `frame_kb` each.
    pub fn new(num_frames: usize, frame_kb: u64) -> Self {
        Self {
            frame_kb,
            frames: alloc::vec![None; num_frames],
            page_table: BTreeMap::new(),
            requested_kb: BTreeMap::new(),
        }
    }

    /// Allocate `ceil(size_kb / frame_kb)` frames for `process`.
    ///
    /// Frames are taken lowest index first. A process that already holds
    /// frames gets the new ones appended to its page-table entry.
    pub fn allocate(&mut self, process: &str, size_kb: u64) -> SimResult<Vec<usize>> {
        if process.is_empty() {
            return Err(SimError::empty("process"));
        }
        if size_kb == 0 {
            return Err(InputError::ZeroSize.into());
        }

        let needed = size_kb.div_ceil(self.frame_kb) as usize;
        let available = self.free_frames();
        if available < needed {
            warn!(
                "paging: {} needs {} frames, only {} free",
                process, needed, available
            );
            return Err(Exhaustion::InsufficientFrames { needed, available }.into());
        }

        let allocated: Vec<usize> = self
            .frames
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(idx, _)| idx)
            .take(needed)
            .collect();

        for &idx in &allocated {
            self.frames[idx] = Some(String::from(process));
        }
        self.page_table
            .entry(String::from(process))
            .or_default()
            .extend_from_slice(&allocated);
        *self.requested_kb.entry(String::from(process)).or_insert(0) += size_kb;

        debug!("paging: {} -> frames {:?}", process, allocated);
        Ok(allocated)
    }

    /// Release every frame owned by `process`, returning the freed indices.
    ///
    /// Normally driven by the page table. If the page table has no entry but
    /// frames are still tagged with the process, they are found by scanning
    /// and the page table is rebuilt from the frame contents. An unknown
    /// process is `NotFound` and changes nothing.
    pub fn free(&mut self, process: &str) -> SimResult<Vec<usize>> {
        if let Some(indices) = self.page_table.remove(process) {
            self.requested_kb.remove(process);
            let mut freed = Vec::with_capacity(indices.len());
            for idx in indices {
                if let Some(slot) = self.frames.get_mut(idx) {
                    if slot.as_deref() == Some(process) {
                        *slot = None;
                        freed.push(idx);
                    }
                }
            }
            debug!("paging: freed {} frames of {}", freed.len(), process);
            return Ok(freed);
        }

        let freed: Vec<usize> = self
            .frames
            .iter_mut()
            .enumerate()
            .filter(|(_, owner)| owner.as_deref() == Some(process))
            .map(|(idx, owner)| {
                *owner = None;
                idx
            })
            .collect();

        if freed.is_empty() {
            return Err(SimError::not_found(alloc::format!(
                "no frames owned by {}",
                process
            )));
        }

        warn!(
            "paging: page table had no entry for {}, freed {} frames by scan",
            process,
            freed.len()
        );
        self.requested_kb.remove(process);
        self.rebuild_page_table();
        Ok(freed)
    }

    /// Reconstruct the page table from frame ownership.
    pub fn rebuild_page_table(&mut self) {
        let mut page_table: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, owner) in self.frames.iter().enumerate() {
            if let Some(owner) = owner {
                page_table.entry(owner.clone()).or_default().push(idx);
            }
        }
        self.requested_kb.retain(|p, _| page_table.contains_key(p));
        self.page_table = page_table;
    }

    /// Free every frame.
    pub fn reset(&mut self) {
        self.frames.iter_mut().for_each(|f| *f = None);
        self.page_table.clear();
        self.requested_kb.clear();
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Frame size (KB)
    pub fn frame_kb(&self) -> u64 {
        self.frame_kb
    }

    /// Number of frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of free frames
    pub fn free_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_none()).count()
    }

    /// Owner of each frame
    pub fn frames(&self) -> &[Option<String>] {
        &self.frames
    }

    /// Page table
    pub fn page_table(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.page_table
    }

    /// Frames owned by one process
    pub fn frames_of(&self, process: &str) -> Option<&[usize]> {
        self.page_table.get(process).map(Vec::as_slice)
    }

    /// Owner of one frame
    pub fn owner_of(&self, frame: usize) -> Option<&str> {
        self.frames.get(frame).and_then(|f| f.as_deref())
    }

    /// Allocated-but-unrequested space in a process's last frame(s).
    ///
    /// For entries rebuilt from frame contents the original request is
    /// unknown and the whole allocation is treated as requested.
    pub fn internal_fragmentation_kb(&self, process: &str) -> Option<u64> {
        let frames = self.page_table.get(process)?;
        let allocated = frames.len() as u64 * self.frame_kb;
        let requested = self.requested_kb.get(process).copied().unwrap_or(allocated);
        Some(allocated.saturating_sub(requested))
    }

    /// Internal fragmentation summed over every resident process.
    pub fn total_internal_fragmentation_kb(&self) -> u64 {
        self.page_table
            .keys()
            .filter_map(|p| self.internal_fragmentation_kb(p))
            .sum()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            frames: self.frames.clone(),
            page_table: self.page_table.clone(),
            num_frames: self.num_frames(),
            frame_kb: self.frame_kb,
            free_frames: self.free_frames(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_allocate_lowest_frames_first() {
        let mut table = FrameTable::new(50, 20);
        assert_eq!(table.allocate("A", 45).unwrap(), vec![0, 1, 2]);
        assert_eq!(table.allocate("B", 20).unwrap(), vec![3]);
        assert_eq!(table.free_frames(), 46);
        assert_eq!(table.owner_of(2), Some("A"));
        assert_eq!(table.internal_fragmentation_kb("A"), Some(15));
        assert_eq!(table.internal_fragmentation_kb("B"), Some(0));
    }

    #[test]
    fn test_allocate_insufficient_frames() {
        let mut table = FrameTable::new(50, 20);
        table.allocate("A", 45).unwrap();
        let err = table.allocate("B", 1000).unwrap_err();
        assert_eq!(
            err,
            SimError::ResourceExhausted(Exhaustion::InsufficientFrames {
                needed: 50,
                available: 47
            })
        );
        // Failed allocation leaves state untouched
        assert_eq!(table.free_frames(), 47);
        assert!(table.frames_of("B").is_none());
    }

    #[test]
    fn test_free_reuses_holes() {
        let mut table = FrameTable::new(10, 10);
        table.allocate("A", 20).unwrap();
        table.allocate("B", 30).unwrap();
        assert_eq!(table.free("A").unwrap(), vec![0, 1]);
        assert_eq!(table.allocate("C", 30).unwrap(), vec![0, 1, 5]);
    }

    #[test]
    fn test_second_allocation_extends_entry() {
        let mut table = FrameTable::new(10, 10);
        table.allocate("A", 10).unwrap();
        table.allocate("B", 10).unwrap();
        table.allocate("A", 15).unwrap();
        assert_eq!(table.frames_of("A"), Some(&[0, 2, 3][..]));
        assert_eq!(table.internal_fragmentation_kb("A"), Some(5));
        assert_eq!(table.free("A").unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn test_free_unknown_process() {
        let mut table = FrameTable::new(10, 10);
        assert!(table.free("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn test_free_falls_back_to_scan() {
        let mut table = FrameTable::new(10, 10);
        table.allocate("A", 20).unwrap();
        table.allocate("B", 10).unwrap();

        // Lose the page-table entry while the frames stay tagged
        table.page_table.remove("A");

        assert_eq!(table.free("A").unwrap(), vec![0, 1]);
        assert_eq!(table.free_frames(), 9);
        assert_eq!(table.frames_of("B"), Some(&[2][..]));
        assert_eq!(table.page_table().len(), 1);
    }

    #[test]
    fn test_rebuild_page_table_from_frames() {
        let mut table = FrameTable::new(4, 10);
        table.frames[1] = Some(String::from("X"));
        table.frames[3] = Some(String::from("X"));
        table.rebuild_page_table();
        assert_eq!(table.frames_of("X"), Some(&[1, 3][..]));
        assert_eq!(table.internal_fragmentation_kb("X"), Some(0));
    }

    #[test]
    fn test_invariant_checker_detects_lost_entry() {
        use crate::invariants::check_paging;

        let mut table = FrameTable::new(4, 10);
        table.allocate("A", 20).unwrap();
        assert!(check_paging(&table).is_empty());

        table.page_table.remove("A");
        assert_eq!(check_paging(&table).len(), 2);

        table.rebuild_page_table();
        assert!(check_paging(&table).is_empty());
    }

    #[test]
    fn test_rejects_bad_requests() {
        let mut table = FrameTable::new(4, 10);
        assert!(table.allocate("", 10).unwrap_err().is_invalid_input());
        assert!(table.allocate("A", 0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut table = FrameTable::new(4, 10);
        table.allocate("A", 10).unwrap();
        let snap = table.snapshot();
        table.reset();

        assert_eq!(snap.frames[0].as_deref(), Some("A"));
        assert_eq!(snap.free_frames, 3);
        assert_eq!(table.free_frames(), 4);
        assert!(table.page_table().is_empty());
    }
}
