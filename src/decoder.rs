use tracing::debug;

use crate::backend::{CryptoContext, HeBackend};
use crate::error::{PipelineError, Result};

/// Decrypts final ciphertexts for the key holder.
pub struct ResultDecoder<'a, B: HeBackend> {
    ctx: &'a CryptoContext<B>,
}

impl<'a, B: HeBackend> ResultDecoder<'a, B> {
    pub fn new(ctx: &'a CryptoContext<B>) -> Self {
        Self { ctx }
    }

    /// Decrypt and keep the first `len` slot values. Slots the backend left
    /// unpopulated read as zero.
    pub fn decode(&self, ciphertext: &B::Ciphertext, len: usize) -> Result<Vec<f64>> {
        let capacity = self.ctx.slot_capacity();
        if len > capacity {
            return Err(PipelineError::Encoding {
                values: len,
                capacity,
            });
        }

        let backend = self.ctx.backend();
        let plaintext = backend.decrypt(self.ctx.secret_key(), ciphertext)?;
        let mut values = backend.unpack(&plaintext);
        values.resize(len, 0.0);

        debug!(len, "result decoded");
        Ok(values)
    }

    pub fn decode_scalar(&self, ciphertext: &B::Ciphertext) -> Result<f64> {
        Ok(self.decode(ciphertext, 1)?[0])
    }
}
