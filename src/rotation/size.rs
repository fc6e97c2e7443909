//! Size-triggered rotation

use chrono::{DateTime, Local};

use super::{RotationPolicy, RotationState};

/// Rotate once appending the next record would reach `max_bytes`.
#[derive(Debug, Clone)]
pub struct SizePolicy {
    max_bytes: u64,
}

impl SizePolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl RotationPolicy for SizePolicy {
    fn should_rotate(&self, state: &RotationState, incoming: usize, _now: DateTime<Local>) -> bool {
        // An empty file is never rotated, otherwise a single oversized
        // record would rotate forever.
        self.max_bytes > 0 && state.size > 0 && state.size + incoming as u64 >= self.max_bytes
    }
}
