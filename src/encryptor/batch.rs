// batch.rs - ordered ciphertexts produced by the encryption pipeline
use crate::planner::ChunkSpan;

/// How records were laid out across ciphertext slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Scalar records packed slot by slot, one chunk per `capacity` records
    Packed { records: usize },
    /// One ciphertext per feature-vector record, `dim` slots populated
    PerRecord { dim: usize },
}

/// One ciphertext and the record span it was packed from
#[derive(Debug, Clone)]
pub struct EncryptedChunk<C> {
    span: ChunkSpan,
    ciphertext: C,
}

impl<C> EncryptedChunk<C> {
    pub(crate) fn new(span: ChunkSpan, ciphertext: C) -> Self {
        Self { span, ciphertext }
    }

    pub fn index(&self) -> usize {
        self.span.index
    }

    pub fn span(&self) -> ChunkSpan {
        self.span
    }

    pub fn ciphertext(&self) -> &C {
        &self.ciphertext
    }
}

/// Immutable, index-ordered sequence of encrypted chunks.
///
/// Only [`EncryptionPipeline`](super::EncryptionPipeline) builds these, so
/// every ciphertext inside is fresh (depth 0).
#[derive(Debug, Clone)]
pub struct EncryptedBatch<C> {
    layout: Layout,
    chunks: Vec<EncryptedChunk<C>>,
}

impl<C> EncryptedBatch<C> {
    pub(crate) fn new(layout: Layout, chunks: Vec<EncryptedChunk<C>>) -> Self {
        Self { layout, chunks }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn chunks(&self) -> &[EncryptedChunk<C>] {
        &self.chunks
    }

    pub fn ciphertexts(&self) -> impl Iterator<Item = &C> {
        self.chunks.iter().map(|c| &c.ciphertext)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of plaintext records the batch encrypts
    pub fn record_count(&self) -> usize {
        match self.layout {
            Layout::Packed { records } => records,
            Layout::PerRecord { .. } => self.chunks.len(),
        }
    }
}
