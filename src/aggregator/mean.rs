use tracing::{debug, info};

use crate::aggregator::fold_add;
use crate::backend::{CryptoContext, HeBackend};
use crate::decoder::ResultDecoder;
use crate::depth::{DepthBudget, MEAN_DEPTH};
use crate::encryptor::{EncryptedBatch, Layout};
use crate::error::{PipelineError, Result, Stage};

/// Encrypted sum and mean over a batch, without decrypting any partial sum.
pub struct AggregationEngine<'a, B: HeBackend> {
    ctx: &'a CryptoContext<B>,
}

impl<'a, B: HeBackend> AggregationEngine<'a, B> {
    /// Fails up front when the context cannot afford [`MEAN_DEPTH`].
    pub fn new(ctx: &'a CryptoContext<B>) -> Result<Self> {
        DepthBudget::of(ctx).check(Stage::Aggregate, MEAN_DEPTH)?;
        Ok(Self { ctx })
    }

    /// Homomorphic total of the batch.
    ///
    /// Packed batches are additionally rotation-summed so the grand total
    /// sits in slot 0; per-record batches keep one total per feature slot.
    pub fn encrypted_sum(&self, batch: &EncryptedBatch<B::Ciphertext>) -> Result<B::Ciphertext> {
        let backend = self.ctx.backend();
        let total = fold_add(backend, batch.ciphertexts())?.ok_or_else(|| {
            PipelineError::InvalidInput("cannot aggregate an empty ciphertext sequence".to_string())
        })?;
        debug!(chunks = batch.len(), "chunks folded");

        match batch.layout() {
            Layout::Packed { .. } => Ok(backend.sum_slots(
                self.ctx.eval_key(),
                &total,
                self.ctx.slot_capacity(),
            )?),
            Layout::PerRecord { .. } => Ok(total),
        }
    }

    /// Encrypted arithmetic mean: the folded total times the packed `1/N`.
    /// Consumes exactly one depth unit.
    pub fn encrypted_mean(&self, batch: &EncryptedBatch<B::Ciphertext>) -> Result<B::Ciphertext> {
        let total = self.encrypted_sum(batch)?;
        let count = batch.record_count();
        let inv = 1.0 / count as f64;

        let backend = self.ctx.backend();
        let scale = backend.pack(&vec![inv; Self::width(batch)])?;
        Ok(backend.mult_plain(&total, &scale)?)
    }

    /// Decrypted mean, truncated to the populated slots: one value for packed
    /// scalars, one per feature for per-record batches.
    pub fn mean(&self, batch: &EncryptedBatch<B::Ciphertext>) -> Result<Vec<f64>> {
        let encrypted = self.encrypted_mean(batch)?;
        let mean = ResultDecoder::new(self.ctx).decode(&encrypted, Self::width(batch))?;

        info!(records = batch.record_count(), width = mean.len(), "mean computed");
        Ok(mean)
    }

    fn width(batch: &EncryptedBatch<B::Ciphertext>) -> usize {
        match batch.layout() {
            Layout::Packed { .. } => 1,
            Layout::PerRecord { dim } => dim,
        }
    }
}
