//! Memory manager owning both allocation models
//!
//! Paging and segmentation are independent: a process can hold frames,
//! segments, or both, and neither model sees the other's allocations. They
//! only share the configured memory size and `reset`.

use alloc::string::String;
use alloc::vec::Vec;
use log::info;
use serde::{Deserialize, Serialize};

use ossim_core::{SimError, SimResult};

use crate::config::MemoryConfig;
use crate::paging::{FrameTable, PagingSnapshot};
use crate::segmentation::{FitPolicy, Segment, SegmentTable, SegmentationSnapshot};

/// What `free_process` released from each model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreedMemory {
    /// Frames released from the paging model
    pub frames: Vec<usize>,
    /// Segments released from the segmentation model
    pub segments: Vec<Segment>,
}

/// Paging and segmentation state for one simulation session.
#[derive(Clone, Debug)]
pub struct MemoryManager {
    config: MemoryConfig,
    paging: FrameTable,
    segmentation: SegmentTable,
}

impl Default for MemoryManager {
    fn default() -> Self {
        let config = MemoryConfig::default();
        Self::with_valid_config(config)
    }
}

impl MemoryManager {
    /// Create a manager for the given geometry.
    pub fn new(config: MemoryConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: MemoryConfig) -> Self {
        Self {
            config,
            paging: FrameTable::new(config.num_frames(), config.frame_kb),
            segmentation: SegmentTable::new(config.total_kb),
        }
    }

    /// Geometry in use.
    pub fn config(&self) -> MemoryConfig {
        self.config
    }

    // ========================================================================
    // Paging
    // ========================================================================

    /// Allocate frames for `process`; returns the frame indices.
    pub fn allocate_paging(&mut self, process: &str, size_kb: u64) -> SimResult<Vec<usize>> {
        self.paging.allocate(process, size_kb)
    }

    /// Free every frame of `process`; returns the freed indices.
    pub fn free_paging(&mut self, process: &str) -> SimResult<Vec<usize>> {
        self.paging.free(process)
    }

    /// Owned copy of the paging state.
    pub fn get_paging_state(&self) -> PagingSnapshot {
        self.paging.snapshot()
    }

    /// Read-only view of the frame table.
    pub fn paging(&self) -> &FrameTable {
        &self.paging
    }

    // ========================================================================
    // Segmentation
    // ========================================================================

    /// Place a segment for `process` using `policy`.
    pub fn allocate_segment(
        &mut self,
        process: &str,
        size_kb: u64,
        policy: FitPolicy,
    ) -> SimResult<Segment> {
        self.segmentation.allocate(process, size_kb, policy)
    }

    /// Free every segment of `process`; returns the removed segments.
    pub fn free_segments_of(&mut self, process: &str) -> SimResult<Vec<Segment>> {
        self.segmentation.free_process(process)
    }

    /// Owned copy of the segmentation state.
    pub fn get_segmentation_state(&self) -> SegmentationSnapshot {
        self.segmentation.snapshot()
    }

    /// Read-only view of the segment table.
    pub fn segmentation(&self) -> &SegmentTable {
        &self.segmentation
    }

    // ========================================================================
    // Both models
    // ========================================================================

    /// Free `process` in both models.
    ///
    /// `NotFound` only if the process held nothing in either model.
    pub fn free_process(&mut self, process: &str) -> SimResult<FreedMemory> {
        let frames = self.paging.free(process);
        let segments = self.segmentation.free_process(process);

        match (frames, segments) {
            (Err(_), Err(_)) => Err(SimError::not_found(alloc::format!(
                "no memory allocated to {}",
                process
            ))),
            (frames, segments) => Ok(FreedMemory {
                frames: frames.unwrap_or_default(),
                segments: segments.unwrap_or_default(),
            }),
        }
    }

    /// Names of every process holding frames or segments, sorted.
    pub fn resident_processes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.paging.page_table().keys().cloned().collect();
        for seg in self.segmentation.segments() {
            if !names.contains(&seg.process) {
                names.push(seg.process.clone());
            }
        }
        names.sort();
        names
    }

    /// Restore both models to their initial empty state.
    pub fn reset(&mut self) {
        self.paging.reset();
        self.segmentation.reset();
        info!(
            "memory reset: {} frames of {} KB, {} KB free",
            self.config.num_frames(),
            self.config.frame_kb,
            self.config.total_kb
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_paging_scenario() {
        let mut mm = MemoryManager::new(MemoryConfig::new(1000, 20).unwrap()).unwrap();
        assert_eq!(mm.get_paging_state().num_frames, 50);

        assert_eq!(mm.allocate_paging("A", 45).unwrap(), vec![0, 1, 2]);
        assert!(mm.allocate_paging("B", 1000).unwrap_err().is_resource_exhausted());
    }

    #[test]
    fn test_models_are_independent() {
        let mut mm = MemoryManager::default();
        mm.allocate_paging("A", 100).unwrap();
        mm.allocate_segment("A", 100, FitPolicy::First).unwrap();

        mm.free_paging("A").unwrap();
        assert_eq!(mm.get_segmentation_state().segments.len(), 1);
        assert!(mm.free_paging("A").unwrap_err().is_not_found());
    }

    #[test]
    fn test_free_process_both_models() {
        let mut mm = MemoryManager::default();
        mm.allocate_paging("A", 25).unwrap();
        mm.allocate_segment("A", 40, FitPolicy::Best).unwrap();
        mm.allocate_segment("B", 40, FitPolicy::Best).unwrap();

        let freed = mm.free_process("A").unwrap();
        assert_eq!(freed.frames, vec![0, 1, 2]);
        assert_eq!(freed.segments.len(), 1);
        assert_eq!(mm.resident_processes(), vec![String::from("B")]);

        assert!(mm.free_process("A").unwrap_err().is_not_found());
    }

    #[test]
    fn test_free_process_one_model_only() {
        let mut mm = MemoryManager::default();
        mm.allocate_segment("S", 10, FitPolicy::First).unwrap();
        let freed = mm.free_process("S").unwrap();
        assert!(freed.frames.is_empty());
        assert_eq!(freed.segments[0].seg_id, "S_S1");
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut mm = MemoryManager::default();
        mm.allocate_paging("A", 500).unwrap();
        mm.allocate_segment("B", 300, FitPolicy::Worst).unwrap();
        mm.reset();

        let paging = mm.get_paging_state();
        assert_eq!(paging.free_frames, paging.num_frames);
        assert!(paging.page_table.is_empty());

        let seg = mm.get_segmentation_state();
        assert!(seg.segments.is_empty());
        assert_eq!(seg.free_blocks.len(), 1);
        assert_eq!(seg.free_blocks[0].size_kb, 1000);
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad = MemoryConfig {
            total_kb: 10,
            frame_kb: 0,
        };
        assert!(MemoryManager::new(bad).unwrap_err().is_invalid_input());
    }
}
