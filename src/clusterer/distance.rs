use tracing::trace;

use crate::backend::{CryptoContext, HeBackend};
use crate::error::Result;

/// Encrypted `sum((point - centroid)^2)` over the first `dim` slots, in slot 0
pub(crate) fn squared_distance<B: HeBackend>(
    ctx: &CryptoContext<B>,
    point: &B::Ciphertext,
    centroid: &B::Ciphertext,
    dim: usize,
) -> Result<B::Ciphertext> {
    let backend = ctx.backend();
    let diff = backend.sub(point, centroid)?;
    let squared = backend.mult(ctx.eval_key(), &diff, &diff)?;
    Ok(backend.sum_slots(ctx.eval_key(), &squared, dim)?)
}

/// Index of the smallest encrypted distance; ties keep the lower index.
///
/// Each pairwise comparison indicator is decrypted to pick a branch. The
/// distances stay encrypted, but the winning label becomes known to the
/// computing party.
pub(crate) fn nearest<B: HeBackend>(
    ctx: &CryptoContext<B>,
    distances: &[B::Ciphertext],
) -> Result<usize> {
    let backend = ctx.backend();
    let mut best = 0;

    for candidate in 1..distances.len() {
        let indicator = backend.compare(ctx.eval_key(), &distances[candidate], &distances[best])?;
        let plain = backend.decrypt(ctx.secret_key(), &indicator)?;
        let strictly_closer = backend.unpack(&plain).first().copied().unwrap_or(0.0) > 0.5;

        trace!(candidate, best, strictly_closer, "distance compared");
        if strictly_closer {
            best = candidate;
        }
    }

    Ok(best)
}
