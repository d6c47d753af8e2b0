use crate::aggregator::fold_add;
use crate::backend::{CryptoContext, HeBackend};
use crate::error::{PipelineError, Result};

/// Encrypted mean of the member ciphertexts: fold-add, then times `1/n`.
pub(crate) fn compute_centroid<B: HeBackend>(
    ctx: &CryptoContext<B>,
    members: &[&B::Ciphertext],
    dim: usize,
) -> Result<B::Ciphertext> {
    let backend = ctx.backend();
    let total = fold_add(backend, members.iter().copied())?.ok_or_else(|| {
        PipelineError::InvalidInput("cannot average an empty cluster".to_string())
    })?;

    let scale = backend.pack(&vec![1.0 / members.len() as f64; dim])?;
    Ok(backend.mult_plain(&total, &scale)?)
}
