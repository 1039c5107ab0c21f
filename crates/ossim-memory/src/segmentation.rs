//! Segmentation: variable-size segments placed by first, best or worst fit
//!
//! Segments and free blocks together partition `[0, total_kb)`. Free blocks
//! are kept sorted by start and are coalesced before every placement and
//! after every free, so no two free blocks are ever contiguous once a call
//! returns.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use ossim_core::{Exhaustion, InputError, SimError, SimResult};

/// Placement policy for a new segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitPolicy {
    /// Lowest-addressed block that fits
    #[default]
    First,
    /// Smallest block that fits
    Best,
    /// Largest block that fits
    Worst,
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitPolicy::First => f.write_str("first-fit"),
            FitPolicy::Best => f.write_str("best-fit"),
            FitPolicy::Worst => f.write_str("worst-fit"),
        }
    }
}

/// A placed segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Owning process
    pub process: String,
    /// `{process}_S{n}`
    pub seg_id: String,
    /// First KB of the segment
    pub start_kb: u64,
    /// Length (KB)
    pub size_kb: u64,
}

impl Segment {
    /// One past the last KB of the segment.
    pub fn end_kb(&self) -> u64 {
        self.start_kb + self.size_kb
    }
}

/// A gap between segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBlock {
    /// First free KB
    pub start_kb: u64,
    /// Length (KB)
    pub size_kb: u64,
}

impl FreeBlock {
    /// One past the last KB of the block.
    pub fn end_kb(&self) -> u64 {
        self.start_kb + self.size_kb
    }
}

/// Owned copy of the segmentation state for inspection and rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationSnapshot {
    /// Segments sorted by start
    pub segments: Vec<Segment>,
    /// Free blocks sorted by start
    pub free_blocks: Vec<FreeBlock>,
    /// Total memory (KB)
    pub total_kb: u64,
}

/// Segment list plus free-block list.
#[derive(Clone, Debug)]
pub struct SegmentTable {
    total_kb: u64,
    segments: Vec<Segment>,
    free_blocks: Vec<FreeBlock>,
    /// Segments ever placed per process; only `reset` lowers it
    issued: BTreeMap<String, usize>,
}

impl SegmentTable {
    /// Create an empty table covering `[0, total_kb)`.
    pub fn new(total_kb: u64) -> Self {
        Self {
            total_kb,
            segments: Vec::new(),
            free_blocks: alloc::vec![FreeBlock {
                start_kb: 0,
                size_kb: total_kb,
            }],
            issued: BTreeMap::new(),
        }
    }

    /// Place a segment of `size_kb` for `process`.
    ///
    /// The segment id is `{process}_S{n}`, where `n` counts every segment the
    /// process has been given since the last reset, so freed ids never come
    /// back. Fails with `ExternalFragmentation` when no single free block is
    /// large enough, even if the free blocks together would be.
    pub fn allocate(&mut self, process: &str, size_kb: u64, policy: FitPolicy) -> SimResult<Segment> {
        if process.is_empty() {
            return Err(SimError::empty("process"));
        }
        if size_kb == 0 {
            return Err(InputError::ZeroSize.into());
        }

        self.coalesce();

        let Some(slot) = self.select_block(size_kb, policy) else {
            let err = Exhaustion::ExternalFragmentation {
                requested: size_kb,
                largest_free: self.largest_free_block_kb(),
                total_free: self.total_free_kb(),
            };
            warn!("segmentation: {} for {}: {}", policy, process, err);
            return Err(err.into());
        };

        let block = self.free_blocks[slot];
        if block.size_kb > size_kb {
            self.free_blocks[slot] = FreeBlock {
                start_kb: block.start_kb + size_kb,
                size_kb: block.size_kb - size_kb,
            };
        } else {
            self.free_blocks.remove(slot);
        }

        let issued = self.issued.entry(String::from(process)).or_insert(0);
        *issued += 1;
        let segment = Segment {
            process: String::from(process),
            seg_id: format!("{}_S{}", process, issued),
            start_kb: block.start_kb,
            size_kb,
        };
        debug!(
            "segmentation: {} placed {} at {}..{}",
            policy,
            segment.seg_id,
            segment.start_kb,
            segment.end_kb()
        );

        self.segments.push(segment.clone());
        self.segments.sort_by_key(|s| s.start_kb);
        Ok(segment)
    }

    /// Index of the free block chosen by `policy`, if any block fits.
    fn select_block(&self, size_kb: u64, policy: FitPolicy) -> Option<usize> {
        let mut fitting = self
            .free_blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.size_kb >= size_kb);

        match policy {
            FitPolicy::First => fitting.next().map(|(idx, _)| idx),
            // Strict comparisons keep the first block on ties
            FitPolicy::Best => fitting
                .fold(None, |best: Option<(usize, &FreeBlock)>, cand| match best {
                    Some((_, b)) if b.size_kb <= cand.1.size_kb => best,
                    _ => Some(cand),
                })
                .map(|(idx, _)| idx),
            FitPolicy::Worst => fitting
                .fold(None, |worst: Option<(usize, &FreeBlock)>, cand| match worst {
                    Some((_, b)) if b.size_kb >= cand.1.size_kb => worst,
                    _ => Some(cand),
                })
                .map(|(idx, _)| idx),
        }
    }

    /// Remove every segment of `process` and return its space.
    pub fn free_process(&mut self, process: &str) -> SimResult<Vec<Segment>> {
        let (removed, kept): (Vec<Segment>, Vec<Segment>) = core::mem::take(&mut self.segments)
            .into_iter()
            .partition(|s| s.process == process);
        self.segments = kept;

        if removed.is_empty() {
            return Err(SimError::not_found(format!("no segments owned by {}", process)));
        }

        self.free_blocks.extend(removed.iter().map(|s| FreeBlock {
            start_kb: s.start_kb,
            size_kb: s.size_kb,
        }));
        self.coalesce();
        debug!("segmentation: freed {} segments of {}", removed.len(), process);
        Ok(removed)
    }

    /// Sort free blocks by start and merge contiguous ones.
    pub fn coalesce(&mut self) {
        self.free_blocks.sort_by_key(|b| b.start_kb);
        let mut merged: Vec<FreeBlock> = Vec::with_capacity(self.free_blocks.len());
        for block in self.free_blocks.drain(..) {
            match merged.last_mut() {
                Some(last) if last.end_kb() == block.start_kb => last.size_kb += block.size_kb,
                _ => merged.push(block),
            }
        }
        self.free_blocks = merged;
    }

    /// Drop every segment and restore one free block over all memory.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.issued.clear();
        self.free_blocks.clear();
        self.free_blocks.push(FreeBlock {
            start_kb: 0,
            size_kb: self.total_kb,
        });
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Total memory (KB)
    pub fn total_kb(&self) -> u64 {
        self.total_kb
    }

    /// Segments sorted by start
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Free blocks sorted by start
    pub fn free_blocks(&self) -> &[FreeBlock] {
        &self.free_blocks
    }

    /// Segments owned by one process
    pub fn segments_of<'a>(&'a self, process: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.process == process)
    }

    /// Sum of free space (KB)
    pub fn total_free_kb(&self) -> u64 {
        self.free_blocks.iter().map(|b| b.size_kb).sum()
    }

    /// Size of the largest free block (KB)
    pub fn largest_free_block_kb(&self) -> u64 {
        self.free_blocks.iter().map(|b| b.size_kb).max().unwrap_or(0)
    }

    /// `1 - largest / total` over free space; 0 when free space is one block or none.
    pub fn external_fragmentation(&self) -> f64 {
        let total = self.total_free_kb();
        if total == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_block_kb() as f64 / total as f64
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> SegmentationSnapshot {
        SegmentationSnapshot {
            segments: self.segments.clone(),
            free_blocks: self.free_blocks.clone(),
            total_kb: self.total_kb,
        }
    }
}
