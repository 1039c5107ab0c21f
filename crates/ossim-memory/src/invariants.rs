//! Memory invariants
//!
//! # Invariants
//!
//! 1. **Frame Ownership**: every frame listed for a process is owned by it
//! 2. **Page Table Coverage**: every occupied frame is listed exactly once,
//!    under its owner
//! 3. **Exact Partition**: segments and free blocks tile `[0, total_kb)`
//!    with no gap and no overlap
//! 4. **Coalesced Free List**: no two free blocks are contiguous
//! 5. **Sorted Segments**: segments are ordered by start

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use ossim_core::InvariantViolation;

use crate::manager::MemoryManager;
use crate::paging::FrameTable;
use crate::segmentation::SegmentTable;

/// Check all memory invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(manager: &MemoryManager) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    violations.extend(check_paging(manager.paging()));
    violations.extend(check_segmentation(manager.segmentation()));
    violations
}

/// Invariants 1 and 2
pub fn check_paging(table: &FrameTable) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut listed: BTreeMap<usize, &str> = BTreeMap::new();

    for (process, frames) in table.page_table() {
        for &idx in frames {
            match table.owner_of(idx) {
                Some(owner) if owner == process.as_str() => {}
                other => violations.push(InvariantViolation::new(
                    "frame_ownership",
                    format!("frame {} listed for {} but owned by {:?}", idx, process, other),
                )),
            }
            if let Some(prev) = listed.insert(idx, process.as_str()) {
                violations.push(InvariantViolation::new(
                    "page_table_coverage",
                    format!("frame {} listed for both {} and {}", idx, prev, process),
                ));
            }
        }
    }

    for (idx, owner) in table.frames().iter().enumerate() {
        if let Some(owner) = owner {
            if !listed.contains_key(&idx) {
                violations.push(InvariantViolation::new(
                    "page_table_coverage",
                    format!("frame {} owned by {} is missing from the page table", idx, owner),
                ));
            }
        }
    }

    violations
}

/// Invariants 3 to 5
pub fn check_segmentation(table: &SegmentTable) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let segments = table.segments();
    if segments.windows(2).any(|w| w[0].start_kb > w[1].start_kb) {
        violations.push(InvariantViolation::new(
            "sorted_segments",
            "segments are not ordered by start",
        ));
    }

    for pair in table.free_blocks().windows(2) {
        if pair[0].end_kb() == pair[1].start_kb {
            violations.push(InvariantViolation::new(
                "coalesced_free_list",
                format!(
                    "free blocks at {} and {} are contiguous",
                    pair[0].start_kb, pair[1].start_kb
                ),
            ));
        }
    }

    // (start, end, label) for every region, walked in address order
    let mut regions: Vec<(u64, u64, bool)> = segments
        .iter()
        .map(|s| (s.start_kb, s.end_kb(), true))
        .chain(table.free_blocks().iter().map(|b| (b.start_kb, b.end_kb(), false)))
        .collect();
    regions.sort_unstable();

    let mut cursor = 0u64;
    for (start, end, is_segment) in regions {
        let kind = if is_segment { "segment" } else { "free block" };
        if end <= start {
            violations.push(InvariantViolation::new(
                "exact_partition",
                format!("empty {} at {}", kind, start),
            ));
        }
        if start > cursor {
            violations.push(InvariantViolation::new(
                "exact_partition",
                format!("gap {}..{} is neither free nor allocated", cursor, start),
            ));
        } else if start < cursor {
            violations.push(InvariantViolation::new(
                "exact_partition",
                format!("{} at {} overlaps region ending at {}", kind, start, cursor),
            ));
        }
        cursor = cursor.max(end);
    }
    if cursor != table.total_kb() {
        violations.push(InvariantViolation::new(
            "exact_partition",
            format!("regions end at {} but memory is {} KB", cursor, table.total_kb()),
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;
    use crate::segmentation::FitPolicy;

    #[test]
    fn test_invariants_hold_for_new_manager() {
        let mm = MemoryManager::default();
        assert!(check_all_invariants(&mm).is_empty());
    }

    #[test]
    fn test_invariants_hold_after_mixed_operations() {
        let mut mm = MemoryManager::new(MemoryConfig::new(600, 25).unwrap()).unwrap();
        mm.allocate_paging("A", 60).unwrap();
        mm.allocate_paging("B", 110).unwrap();
        mm.allocate_segment("A", 120, FitPolicy::First).unwrap();
        mm.allocate_segment("B", 80, FitPolicy::Best).unwrap();
        mm.allocate_segment("C", 200, FitPolicy::Worst).unwrap();
        mm.free_paging("A").unwrap();
        mm.free_segments_of("B").unwrap();
        mm.allocate_segment("D", 50, FitPolicy::Best).unwrap();
        mm.free_segments_of("A").unwrap();

        let violations = check_all_invariants(&mm);
        assert!(violations.is_empty(), "{:?}", violations);
    }
}
