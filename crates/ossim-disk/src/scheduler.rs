//! Disk head scheduling algorithms

use alloc::vec::Vec;
use log::{debug, info};

use ossim_core::{InputError, SimResult};

use crate::types::{DiskConfig, DiskPolicy, Direction, SeekPlan};

fn check_cylinder(cylinder: u64, disk_size: u64) -> SimResult<()> {
    if cylinder >= disk_size {
        return Err(InputError::CylinderOutOfRange {
            cylinder,
            disk_size,
        }
        .into());
    }
    Ok(())
}

/// Compute the visiting order and total head movement for a request queue.
///
/// The returned sequence always starts with `head`. Fails with
/// `InvalidInput` if `disk_size` is zero or the head or any request lies
/// outside `[0, disk_size)`.
pub fn schedule(
    requests: &[u64],
    head: u64,
    policy: DiskPolicy,
    disk_size: u64,
) -> SimResult<SeekPlan> {
    if disk_size == 0 {
        return Err(InputError::InvalidGeometry("disk has no cylinders".into()).into());
    }
    check_cylinder(head, disk_size)?;
    for &r in requests {
        check_cylinder(r, disk_size)?;
    }

    let plan = match policy {
        DiskPolicy::Fcfs => fcfs(requests, head),
        DiskPolicy::Sstf => sstf(requests, head),
        DiskPolicy::Scan { direction } => scan(requests, head, direction, disk_size),
    };

    info!(
        "{}: {} requests from {}, total head movement {}",
        policy,
        requests.len(),
        head,
        plan.total_head_movement
    );
    Ok(plan)
}

fn fcfs(requests: &[u64], head: u64) -> SeekPlan {
    let mut plan = SeekPlan::starting_at(head);
    for &r in requests {
        plan.visit(r);
    }
    plan
}

/// Nearest pending request first; equal distances go to the lower cylinder.
fn sstf(requests: &[u64], head: u64) -> SeekPlan {
    let mut plan = SeekPlan::starting_at(head);
    let mut pending: Vec<u64> = requests.to_vec();

    while !pending.is_empty() {
        let current = plan.head();
        let nearest = pending
            .iter()
            .enumerate()
            .min_by_key(|&(_, &c)| (current.abs_diff(c), c))
            .map(|(pos, _)| pos);
        let Some(pos) = nearest else { break };

        let cylinder = pending.swap_remove(pos);
        debug!("sstf: {} -> {}", current, cylinder);
        plan.visit(cylinder);
    }
    plan
}

/// Sweep toward `direction`, touch the boundary, then sweep back.
fn scan(requests: &[u64], head: u64, direction: Direction, disk_size: u64) -> SeekPlan {
    let mut left: Vec<u64> = requests.iter().copied().filter(|&r| r < head).collect();
    let mut right: Vec<u64> = requests.iter().copied().filter(|&r| r >= head).collect();
    left.sort_unstable();
    right.sort_unstable();

    let mut plan = SeekPlan::starting_at(head);
    match direction {
        Direction::Right => {
            right.iter().for_each(|&r| plan.visit(r));
            debug!("scan: bounce at {}", disk_size - 1);
            plan.visit(disk_size - 1);
            left.iter().rev().for_each(|&r| plan.visit(r));
        }
        Direction::Left => {
            left.iter().rev().for_each(|&r| plan.visit(r));
            debug!("scan: bounce at 0");
            plan.visit(0);
            right.iter().for_each(|&r| plan.visit(r));
        }
    }
    plan
}

/// Disk scheduler bound to a fixed geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskScheduler {
    config: DiskConfig,
}

impl DiskScheduler {
    /// Create a scheduler for the given geometry.
    pub fn new(config: DiskConfig) -> Self {
        Self { config }
    }

    /// Geometry in use.
    pub fn config(&self) -> DiskConfig {
        self.config
    }

    /// Schedule a request queue starting from `head`.
    pub fn run(&self, requests: &[u64], head: u64, policy: DiskPolicy) -> SimResult<SeekPlan> {
        schedule(requests, head, policy, self.config.disk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use ossim_core::SimError;

    const QUEUE: [u64; 8] = [98, 183, 37, 122, 14, 124, 65, 67];

    #[test]
    fn test_fcfs_textbook_queue() {
        let plan = schedule(&QUEUE, 53, DiskPolicy::Fcfs, 200).unwrap();
        assert_eq!(plan.sequence, vec![53, 98, 183, 37, 122, 14, 124, 65, 67]);
        assert_eq!(plan.total_head_movement, 640);
    }

    #[test]
    fn test_sstf_textbook_queue() {
        let plan = schedule(&QUEUE, 53, DiskPolicy::Sstf, 200).unwrap();
        assert_eq!(plan.sequence, vec![53, 65, 67, 37, 14, 98, 122, 124, 183]);
        assert_eq!(plan.total_head_movement, 236);
    }

    #[test]
    fn test_sstf_tie_goes_to_lower_cylinder() {
        let plan = schedule(&[60, 40], 50, DiskPolicy::Sstf, 200).unwrap();
        assert_eq!(plan.sequence, vec![50, 40, 60]);
        assert_eq!(plan.total_head_movement, 30);
    }

    #[test]
    fn test_sstf_visits_duplicates() {
        let plan = schedule(&[70, 70, 10], 50, DiskPolicy::Sstf, 200).unwrap();
        assert_eq!(plan.sequence, vec![50, 70, 70, 10]);
    }

    #[test]
    fn test_scan_right_bounces_at_far_boundary() {
        let policy = DiskPolicy::Scan {
            direction: Direction::Right,
        };
        let plan = schedule(&QUEUE, 53, policy, 200).unwrap();
        assert_eq!(
            plan.sequence,
            vec![53, 65, 67, 98, 122, 124, 183, 199, 37, 14]
        );
        assert_eq!(plan.total_head_movement, (199 - 53) + (199 - 14));
    }

    #[test]
    fn test_scan_left_bounces_at_zero() {
        let policy = DiskPolicy::Scan {
            direction: Direction::Left,
        };
        let plan = schedule(&QUEUE, 53, policy, 200).unwrap();
        assert_eq!(
            plan.sequence,
            vec![53, 37, 14, 0, 65, 67, 98, 122, 124, 183]
        );
        assert_eq!(plan.total_head_movement, 53 + 183);
    }

    #[test]
    fn test_scan_bounce_counts_with_empty_far_side() {
        let policy = DiskPolicy::Scan {
            direction: Direction::Right,
        };
        let plan = schedule(&[10, 20], 50, policy, 100).unwrap();
        assert_eq!(plan.sequence, vec![50, 99, 20, 10]);
        assert_eq!(plan.total_head_movement, 49 + 89);

        let empty = schedule(&[], 50, policy, 100).unwrap();
        assert_eq!(empty.sequence, vec![50, 99]);
        assert_eq!(empty.total_head_movement, 49);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = schedule(&[10, 200], 50, DiskPolicy::Fcfs, 200).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidInput(InputError::CylinderOutOfRange {
                cylinder: 200,
                disk_size: 200
            })
        );
        assert!(schedule(&[10], 250, DiskPolicy::Fcfs, 200).is_err());
        assert!(schedule(&[], 0, DiskPolicy::Fcfs, 0).is_err());
    }

    #[test]
    fn test_scheduler_uses_configured_geometry() {
        let disk = DiskScheduler::new(DiskConfig { disk_size: 500 });
        let plan = disk.run(&[450], 10, DiskPolicy::scan()).unwrap();
        assert_eq!(plan.sequence, vec![10, 450, 499]);
        assert!(DiskScheduler::default().run(&[450], 10, DiskPolicy::Fcfs).is_err());
    }
}
