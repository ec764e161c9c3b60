//! Capacity partitioning across segments

use crate::errors::{CacheError, Result, MIN_CAPACITY};

/// Per-segment capacities that always sum to the total capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCapacity {
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
}

impl SegmentCapacity {
    /// Split `capacity` into thirds. A remainder of one goes to cold; a
    /// remainder of two goes to hot and cold.
    pub fn split(capacity: usize) -> Result<Self> {
        if capacity < MIN_CAPACITY {
            return Err(CacheError::InvalidCapacity {
                capacity,
                minimum: MIN_CAPACITY,
            });
        }

        let third = capacity / 3;
        let (mut hot, warm, mut cold) = (third, third, third);

        match capacity % 3 {
            1 => cold += 1,
            2 => {
                hot += 1;
                cold += 1;
            }
            _ => {}
        }

        Ok(Self { hot, warm, cold })
    }

    pub fn total(&self) -> usize {
        self.hot + self.warm + self.cold
    }
}
