// packer.rs - packs plaintext records into slots and encrypts them in order
use tracing::{debug, info};

use crate::backend::{CryptoContext, HeBackend};
use crate::encryptor::{EncryptedBatch, EncryptedChunk, Layout};
use crate::error::{PipelineError, Result};
use crate::planner::{ChunkSpan, plan_chunks};

pub struct EncryptionPipeline<'a, B: HeBackend> {
    ctx: &'a CryptoContext<B>,
}

impl<'a, B: HeBackend> EncryptionPipeline<'a, B> {
    pub fn new(ctx: &'a CryptoContext<B>) -> Self {
        Self { ctx }
    }

    /// Pack scalar records into `slot_capacity`-sized chunks, one ciphertext each.
    pub fn encrypt_scalars(&self, values: &[f64]) -> Result<EncryptedBatch<B::Ciphertext>> {
        let capacity = self.ctx.slot_capacity();
        let spans = plan_chunks(values.len(), capacity)?;

        info!(
            records = values.len(),
            chunks = spans.len(),
            capacity,
            "encrypting packed chunks"
        );

        let mut chunks = Vec::with_capacity(spans.len());
        for span in spans {
            let ciphertext = self.encrypt_slots(&values[span.range()])?;
            debug!(chunk = span.index, len = span.len(), "chunk encrypted");
            chunks.push(EncryptedChunk::new(span, ciphertext));
        }

        Ok(EncryptedBatch::new(
            Layout::Packed {
                records: values.len(),
            },
            chunks,
        ))
    }

    /// Encrypt each feature vector into its own ciphertext.
    ///
    /// All points must share one dimension, and that dimension must fit the
    /// slot capacity.
    pub fn encrypt_points(&self, points: &[Vec<f64>]) -> Result<EncryptedBatch<B::Ciphertext>> {
        let dim = match points.first() {
            Some(p) => p.len(),
            None => {
                return Err(PipelineError::InvalidInput(
                    "cannot encrypt an empty dataset".to_string(),
                ));
            }
        };
        if dim == 0 {
            return Err(PipelineError::InvalidInput(
                "points must have at least one feature".to_string(),
            ));
        }
        if let Some(i) = points.iter().position(|p| p.len() != dim) {
            return Err(PipelineError::InvalidInput(format!(
                "point {} has {} features, expected {}",
                i,
                points[i].len(),
                dim
            )));
        }

        info!(points = points.len(), dim, "encrypting points");

        let mut chunks = Vec::with_capacity(points.len());
        for (index, point) in points.iter().enumerate() {
            let ciphertext = self.encrypt_slots(point)?;
            let span = ChunkSpan {
                index,
                start: index,
                end: index + 1,
            };
            chunks.push(EncryptedChunk::new(span, ciphertext));
        }

        Ok(EncryptedBatch::new(Layout::PerRecord { dim }, chunks))
    }

    fn encrypt_slots(&self, values: &[f64]) -> Result<B::Ciphertext> {
        let capacity = self.ctx.slot_capacity();
        if values.len() > capacity {
            return Err(PipelineError::Encoding {
                values: values.len(),
                capacity,
            });
        }

        let backend = self.ctx.backend();
        let plaintext = backend.pack(values)?;
        Ok(backend.encrypt(self.ctx.public_key(), &plaintext)?)
    }
}
