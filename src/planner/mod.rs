mod span;


pub use span::{ChunkSpan, chunk_count, plan_chunks};

/// Records packed per ciphertext at the default ring dimension (2^14 / 2)
pub const DEFAULT_CHUNK_CAPACITY: usize = 8_192;
