use tracing::{debug, info};

use crate::aggregator::AggregationEngine;
use crate::backend::{CryptoContext, HeBackend};
use crate::clusterer::{
    centroid::compute_centroid,
    distance::{nearest, squared_distance},
    types::{Centroid, Cluster, ClusterAssignment, ClusterResult, Seeding},
};
use crate::config::ClusteringConfig;
use crate::decoder::ResultDecoder;
use crate::depth::{DepthBudget, clustering_depth};
use crate::encryptor::{EncryptedBatch, Layout};
use crate::error::{PipelineError, Result, Stage};

/// Encrypted-domain k-means over per-record ciphertexts.
///
/// Runs `Init`, then a fixed number of `Assign`/`Update` rounds. Assign only
/// reads the centroid snapshot produced by the previous Update.
pub struct ClusteringEngine<'a, B: HeBackend> {
    ctx: &'a CryptoContext<B>,
    k: usize,
    rounds: usize,
    stop_when_stable: bool,
}

impl<'a, B: HeBackend> ClusteringEngine<'a, B> {
    pub fn new(ctx: &'a CryptoContext<B>, config: &ClusteringConfig) -> Result<Self> {
        if config.k == 0 {
            return Err(PipelineError::InvalidInput(
                "k must be greater than 0".to_string(),
            ));
        }
        if config.rounds == 0 {
            return Err(PipelineError::InvalidInput(
                "clustering needs at least one round".to_string(),
            ));
        }

        let required = clustering_depth(ctx.backend().compare_depth());
        DepthBudget::of(ctx).check(Stage::Cluster, required)?;

        Ok(Self {
            ctx,
            k: config.k,
            rounds: config.rounds,
            stop_when_stable: config.stop_when_stable,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn run(
        &self,
        points: &EncryptedBatch<B::Ciphertext>,
        seeding: &Seeding,
    ) -> Result<ClusterResult<B::Ciphertext>> {
        let dim = self.validate(points, seeding)?;
        info!(
            points = points.len(),
            dim,
            k = self.k,
            rounds = self.rounds,
            "clustering started"
        );

        let mut centroids = self.initialize(points, seeding)?;
        let mut previous: Option<ClusterAssignment> = None;
        let mut iterations = 0;

        for round in 1..=self.rounds {
            iterations = round;
            let assignment = self.assign(points, &centroids)?;

            if self.stop_when_stable && previous.as_ref() == Some(&assignment) {
                info!(round, "labels stable, stopping early");
                break;
            }

            centroids = self.update(points, &assignment, &centroids)?;
            debug!(round, sizes = ?assignment.sizes(), "round complete");
            previous = Some(assignment);
        }

        let assignment = previous.ok_or_else(|| {
            PipelineError::InvalidInput("clustering ran no rounds".to_string())
        })?;

        Ok(ClusterResult {
            centroids,
            assignment,
            iterations,
            dim,
        })
    }

    /// Seed `k` centroids. Runs before any round; consumes at most one depth
    /// unit, shared by all seeds.
    pub fn initialize(
        &self,
        points: &EncryptedBatch<B::Ciphertext>,
        seeding: &Seeding,
    ) -> Result<Vec<Centroid<B::Ciphertext>>> {
        let dim = self.validate(points, seeding)?;
        let backend = self.ctx.backend();

        match seeding {
            Seeding::GlobalMean { offset } => {
                let mean = AggregationEngine::new(self.ctx)?.encrypted_mean(points)?;
                (0..self.k)
                    .map(|i| -> Result<Centroid<B::Ciphertext>> {
                        let shift = backend.pack(&vec![i as f64 * offset; dim])?;
                        Ok(Centroid::seed(i, backend.add_plain(&mean, &shift)?))
                    })
                    .collect()
            }
            Seeding::Explicit(seeds) => seeds
                .iter()
                .enumerate()
                .map(|(i, seed)| -> Result<Centroid<B::Ciphertext>> {
                    let plaintext = backend.pack(seed)?;
                    let ciphertext = backend.encrypt(self.ctx.public_key(), &plaintext)?;
                    Ok(Centroid::seed(i, ciphertext))
                })
                .collect(),
        }
    }

    /// Label every point with its nearest centroid.
    pub fn assign(
        &self,
        points: &EncryptedBatch<B::Ciphertext>,
        centroids: &[Centroid<B::Ciphertext>],
    ) -> Result<ClusterAssignment> {
        let dim = Self::point_dim(points)?;
        self.check_centroids(centroids)?;

        let mut labels = Vec::with_capacity(points.len());
        for point in points.ciphertexts() {
            let distances = centroids
                .iter()
                .map(|c| squared_distance(self.ctx, point, c.ciphertext(), dim))
                .collect::<Result<Vec<_>>>()?;
            labels.push(nearest(self.ctx, &distances)?);
        }

        ClusterAssignment::new(labels, self.k)
    }

    /// New centroid per cluster from its members; empty clusters keep the
    /// previous centroid as is.
    pub fn update(
        &self,
        points: &EncryptedBatch<B::Ciphertext>,
        assignment: &ClusterAssignment,
        centroids: &[Centroid<B::Ciphertext>],
    ) -> Result<Vec<Centroid<B::Ciphertext>>> {
        let dim = Self::point_dim(points)?;
        self.check_centroids(centroids)?;
        if assignment.len() != points.len() || assignment.k() != self.k {
            return Err(PipelineError::InvalidInput(format!(
                "assignment covers {} points in {} clusters, expected {} points in {}",
                assignment.len(),
                assignment.k(),
                points.len(),
                self.k
            )));
        }

        let chunks = points.chunks();
        let mut next = Vec::with_capacity(self.k);

        for (c, previous) in centroids.iter().enumerate() {
            let members: Vec<&B::Ciphertext> = assignment
                .members(c)
                .into_iter()
                .map(|i| chunks[i].ciphertext())
                .collect();

            if members.is_empty() {
                debug!(cluster = c, "no members, centroid retained");
                next.push(previous.clone());
                continue;
            }

            let ciphertext = compute_centroid(self.ctx, &members, dim)?;
            next.push(previous.replace(ciphertext));
        }

        Ok(next)
    }

    /// Decrypt the final centroids and group point ids by label.
    pub fn decode(&self, result: &ClusterResult<B::Ciphertext>) -> Result<Vec<Cluster>> {
        let decoder = ResultDecoder::new(self.ctx);

        result
            .centroids
            .iter()
            .map(|centroid| -> Result<Cluster> {
                Ok(Cluster {
                    id: centroid.id() as u32,
                    point_ids: result
                        .assignment
                        .members(centroid.id())
                        .into_iter()
                        .map(|i| i as u32)
                        .collect(),
                    centroid: decoder.decode(centroid.ciphertext(), result.dim)?,
                })
            })
            .collect()
    }

    /// Input checks that must pass before any homomorphic operation runs.
    fn validate(&self, points: &EncryptedBatch<B::Ciphertext>, seeding: &Seeding) -> Result<usize> {
        if points.is_empty() {
            return Err(PipelineError::InvalidInput(
                "cannot cluster an empty dataset".to_string(),
            ));
        }
        let dim = Self::point_dim(points)?;
        self.check_seeding(dim, seeding)?;
        Ok(dim)
    }

    /// Plaintext-only check of the seeding against `k` and the point dimension.
    pub fn check_seeding(&self, dim: usize, seeding: &Seeding) -> Result<()> {
        match seeding {
            Seeding::GlobalMean { offset } if !offset.is_finite() => Err(
                PipelineError::InvalidInput(format!("seed offset {} is not finite", offset)),
            ),
            Seeding::GlobalMean { .. } => Ok(()),
            Seeding::Explicit(seeds) => {
                if seeds.len() != self.k {
                    return Err(PipelineError::InvalidInput(format!(
                        "{} seeds given for k = {}",
                        seeds.len(),
                        self.k
                    )));
                }
                if let Some(i) = seeds.iter().position(|s| s.len() != dim) {
                    return Err(PipelineError::InvalidInput(format!(
                        "seed {} has {} features, points have {}",
                        i,
                        seeds[i].len(),
                        dim
                    )));
                }
                Ok(())
            }
        }
    }

    fn point_dim(points: &EncryptedBatch<B::Ciphertext>) -> Result<usize> {
        match points.layout() {
            Layout::PerRecord { dim } => Ok(dim),
            Layout::Packed { .. } => Err(PipelineError::InvalidInput(
                "clustering needs one ciphertext per point".to_string(),
            )),
        }
    }

    fn check_centroids(&self, centroids: &[Centroid<B::Ciphertext>]) -> Result<()> {
        if centroids.len() != self.k {
            return Err(PipelineError::InvalidInput(format!(
                "{} centroids given for k = {}",
                centroids.len(),
                self.k
            )));
        }
        Ok(())
    }
}
