use std::ops::Range;

use crate::error::{PipelineError, Result};

/// A contiguous run of record indices destined for one ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Position of this chunk in the plan
    pub index: usize,
    /// First record index (inclusive)
    pub start: usize,
    /// Last record index (exclusive)
    pub end: usize,
}

impl ChunkSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Number of chunks needed for `total` records at `capacity` per chunk
pub fn chunk_count(total: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    total.div_ceil(capacity)
}

/// Partition `[0, total)` into spans of `capacity` records:
/// - every span but the last holds exactly `capacity` records
/// - the last holds the remainder, or `capacity` when it divides evenly
/// - spans are returned in index order and never overlap
pub fn plan_chunks(total: usize, capacity: usize) -> Result<Vec<ChunkSpan>> {
    if total == 0 {
        return Err(PipelineError::InvalidInput(
            "cannot plan chunks for an empty dataset".to_string(),
        ));
    }
    if capacity == 0 {
        return Err(PipelineError::InvalidInput(
            "chunk capacity must be greater than 0".to_string(),
        ));
    }

    let spans = (0..chunk_count(total, capacity))
        .map(|index| {
            let start = index * capacity;
            ChunkSpan {
                index,
                start,
                end: (start + capacity).min(total),
            }
        })
        .collect();

    Ok(spans)
}
