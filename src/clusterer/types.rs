use std::sync::Arc;

use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Encrypted cluster mean.
///
/// Centroids are replaced, never mutated: an update round builds a new
/// `Centroid`, and a cluster left without members keeps sharing the previous
/// round's ciphertext.
#[derive(Debug)]
pub struct Centroid<C> {
    id: usize,
    version: usize,
    ciphertext: Arc<C>,
}

impl<C> Clone for Centroid<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            version: self.version,
            ciphertext: Arc::clone(&self.ciphertext),
        }
    }
}

impl<C> Centroid<C> {
    pub(crate) fn seed(id: usize, ciphertext: C) -> Self {
        Self {
            id,
            version: 0,
            ciphertext: Arc::new(ciphertext),
        }
    }

    pub(crate) fn replace(&self, ciphertext: C) -> Self {
        Self {
            id: self.id,
            version: self.version + 1,
            ciphertext: Arc::new(ciphertext),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of updates that replaced this centroid since seeding
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn ciphertext(&self) -> &C {
        &self.ciphertext
    }

    /// True when both handles point at the same ciphertext
    pub fn shares_ciphertext(&self, other: &Centroid<C>) -> bool {
        Arc::ptr_eq(&self.ciphertext, &other.ciphertext)
    }
}

/// Point index -> cluster index for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    k: usize,
}

impl ClusterAssignment {
    pub fn new(labels: Vec<usize>, k: usize) -> Result<Self> {
        if let Some(bad) = labels.iter().find(|&&c| c >= k) {
            return Err(PipelineError::InvalidInput(format!(
                "cluster label {} out of range for k = {}",
                bad, k
            )));
        }
        Ok(Self { labels, k })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &c in &self.labels {
            sizes[c] += 1;
        }
        sizes
    }
}

/// How the initial centroids are produced
#[derive(Debug, Clone, PartialEq)]
pub enum Seeding {
    /// `mean + i * offset` for cluster `i`, offset applied to every feature
    GlobalMean { offset: f64 },
    /// Plaintext seeds, encrypted fresh; one per cluster
    Explicit(Vec<Vec<f64>>),
}

/// Decrypted cluster, ready for reporting
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: u32,
    pub point_ids: Vec<u32>,
    pub centroid: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ClusterResult<C> {
    pub centroids: Vec<Centroid<C>>,
    /// Labels of the last round that ran
    pub assignment: ClusterAssignment,
    pub iterations: usize,
    pub dim: usize,
}
