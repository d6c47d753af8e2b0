//! Static multiplicative-depth accounting.
//!
//! Each stage declares the depth it consumes on fresh (depth 0) ciphertexts.
//! Stages check their declaration against the context when they are built,
//! so an undersized context fails before any record is encrypted.

use tracing::debug;

use crate::backend::{CryptoContext, CryptoError, HeBackend};
use crate::error::{PipelineError, Result, Stage};

/// Fold-add followed by one scalar multiplication by `1/N`.
pub const MEAN_DEPTH: usize = 1;

/// A centroid is always a mean (seeded or updated), or a fresh encryption.
pub const CENTROID_DEPTH: usize = MEAN_DEPTH;

/// `(point - centroid)^2`: one ciphertext-ciphertext multiplication.
pub const DISTANCE_DEPTH: usize = 1;

/// Depth a clustering round reaches at its deepest point, the comparison of
/// two squared distances.
pub fn clustering_depth(compare_depth: usize) -> usize {
    CENTROID_DEPTH + DISTANCE_DEPTH + compare_depth
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthBudget {
    available: usize,
}

impl DepthBudget {
    pub fn new(available: usize) -> Self {
        Self { available }
    }

    pub fn of<B: HeBackend>(ctx: &CryptoContext<B>) -> Self {
        Self::new(ctx.max_depth())
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn check(&self, stage: Stage, required: usize) -> Result<()> {
        if required > self.available {
            return Err(PipelineError::CryptoOperation(CryptoError::DepthExhausted {
                required,
                available: self.available,
            }));
        }

        debug!(%stage, required, available = self.available, "depth budget ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_accepts_exact_fit() {
        let budget = DepthBudget::new(3);
        assert!(budget.check(Stage::Cluster, clustering_depth(1)).is_ok());
        assert!(budget.check(Stage::Aggregate, MEAN_DEPTH).is_ok());
    }

    #[test]
    fn test_budget_rejects_overrun() {
        let budget = DepthBudget::new(2);
        let err = budget.check(Stage::Cluster, clustering_depth(1)).unwrap_err();
        assert_eq!(err.kind(), "CryptoOperationError");
        assert!(err.to_string().contains("needs depth 3"));
    }

    #[test]
    fn test_zero_depth_context_cannot_average() {
        assert!(DepthBudget::new(0).check(Stage::Aggregate, MEAN_DEPTH).is_err());
    }
}
