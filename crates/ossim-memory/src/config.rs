//! Memory geometry

use alloc::format;
use serde::{Deserialize, Serialize};

use ossim_core::{InputError, SimResult};

/// Default physical memory size (KB)
pub const DEFAULT_TOTAL_KB: u64 = 1000;

/// Default frame size (KB)
pub const DEFAULT_FRAME_KB: u64 = 10;

/// Largest frame table a geometry may ask for
pub const MAX_FRAMES: usize = 1 << 20;

/// Size of simulated memory and of each paging frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Total memory (KB)
    pub total_kb: u64,
    /// Frame size for paging (KB)
    pub frame_kb: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            total_kb: DEFAULT_TOTAL_KB,
            frame_kb: DEFAULT_FRAME_KB,
        }
    }
}

impl MemoryConfig {
    /// Create a config, rejecting geometry that cannot hold a single frame.
    pub fn new(total_kb: u64, frame_kb: u64) -> SimResult<Self> {
        let config = Self { total_kb, frame_kb };
        config.validate()?;
        Ok(config)
    }

    /// Check the geometry.
    pub fn validate(&self) -> SimResult<()> {
        if self.total_kb == 0 {
            return Err(InputError::InvalidGeometry("total memory must be positive".into()).into());
        }
        if self.frame_kb == 0 {
            return Err(InputError::InvalidGeometry("frame size must be positive".into()).into());
        }
        if self.frame_kb > self.total_kb {
            return Err(InputError::InvalidGeometry(format!(
                "frame of {} KB larger than memory of {} KB",
                self.frame_kb, self.total_kb
            ))
            .into());
        }
        let frames = self.total_kb / self.frame_kb;
        if usize::try_from(frames).map_or(true, |n| n > MAX_FRAMES) {
            return Err(InputError::InvalidGeometry(format!(
                "{} frames exceed the limit of {}",
                frames, MAX_FRAMES
            ))
            .into());
        }
        Ok(())
    }

    /// Number of whole frames; any remainder past the last frame is not paged.
    ///
    /// Saturates at [`MAX_FRAMES`] for a geometry that failed validation.
    pub fn num_frames(&self) -> usize {
        self.total_kb
            .checked_div(self.frame_kb)
            .and_then(|n| usize::try_from(n).ok())
            .map_or(MAX_FRAMES, |n| n.min(MAX_FRAMES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let config = MemoryConfig::default();
        assert_eq!(config.num_frames(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(MemoryConfig::new(0, 10).unwrap_err().is_invalid_input());
        assert!(MemoryConfig::new(100, 0).unwrap_err().is_invalid_input());
        assert!(MemoryConfig::new(10, 20).unwrap_err().is_invalid_input());
        assert_eq!(MemoryConfig::new(1000, 20).unwrap().num_frames(), 50);
        assert_eq!(MemoryConfig::new(105, 10).unwrap().num_frames(), 10);
    }

    #[test]
    fn test_rejects_oversized_frame_table() {
        let err = MemoryConfig::new(u64::MAX, 1).unwrap_err();
        assert!(err.is_invalid_input());

        let limit = MAX_FRAMES as u64;
        assert_eq!(MemoryConfig::new(limit, 1).unwrap().num_frames(), MAX_FRAMES);
        assert!(MemoryConfig::new(limit + 1, 1).unwrap_err().is_invalid_input());
        assert!(MemoryConfig::new(u64::MAX, u64::MAX / 2).is_ok());
    }
}
