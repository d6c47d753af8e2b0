//! End-to-end runs: records -> chunks -> ciphertexts -> mean | k-means -> decode.
//!
//! Every run is all-or-nothing. The first failing stage aborts the run and is
//! reported in [`RunError`]; intermediate ciphertexts are dropped with it.

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregator::AggregationEngine;
use crate::backend::{CryptoContext, HeBackend};
use crate::clusterer::{Cluster, ClusteringEngine, Seeding};
use crate::config::ClusteringConfig;
use crate::decoder::ResultDecoder;
use crate::encryptor::{EncryptedBatch, EncryptionPipeline, Layout};
use crate::error::{AtStage, PipelineError, RunError, Stage};

/// Wall-clock seconds per stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageTimings {
    pub encrypt_secs: f64,
    pub compute_secs: f64,
    pub decode_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeanReport {
    pub generated_at: String,
    pub backend: String,
    pub records: usize,
    pub ciphertexts: usize,
    pub mean: Vec<f64>,
    pub timings: StageTimings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    pub generated_at: String,
    pub backend: String,
    pub points: usize,
    pub rounds_run: usize,
    pub clusters: Vec<Cluster>,
    pub timings: StageTimings,
}

pub struct Pipeline<'a, B: HeBackend> {
    ctx: &'a CryptoContext<B>,
    clustering: ClusteringConfig,
}

impl<'a, B: HeBackend> Pipeline<'a, B> {
    pub fn new(ctx: &'a CryptoContext<B>, clustering: ClusteringConfig) -> Self {
        Self { ctx, clustering }
    }

    /// Mean of scalar records, packed `slot_capacity` per ciphertext.
    pub fn run_mean(&self, values: &[f64]) -> Result<MeanReport, RunError> {
        let engine = AggregationEngine::new(self.ctx).at(Stage::Configure)?;

        let start = Instant::now();
        let batch = EncryptionPipeline::new(self.ctx)
            .encrypt_scalars(values)
            .at(Stage::Encrypt)?;
        let encrypt_secs = start.elapsed().as_secs_f64();

        self.finish_mean(&engine, &batch, encrypt_secs)
    }

    /// Per-feature mean of feature-vector records, one ciphertext per record.
    pub fn run_feature_mean(&self, points: &[Vec<f64>]) -> Result<MeanReport, RunError> {
        let engine = AggregationEngine::new(self.ctx).at(Stage::Configure)?;

        let start = Instant::now();
        let batch = EncryptionPipeline::new(self.ctx)
            .encrypt_points(points)
            .at(Stage::Encrypt)?;
        let encrypt_secs = start.elapsed().as_secs_f64();

        self.finish_mean(&engine, &batch, encrypt_secs)
    }

    pub fn run_clustering(
        &self,
        points: &[Vec<f64>],
        seeding: &Seeding,
    ) -> Result<ClusterReport, RunError> {
        let engine = ClusteringEngine::new(self.ctx, &self.clustering).at(Stage::Configure)?;
        let dim = points.first().map(|p| p.len()).unwrap_or(0);
        engine.check_seeding(dim, seeding).at(Stage::Configure)?;

        let start = Instant::now();
        let batch = EncryptionPipeline::new(self.ctx)
            .encrypt_points(points)
            .at(Stage::Encrypt)?;
        let encrypt_secs = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let result = engine.run(&batch, seeding).at(Stage::Cluster)?;
        let compute_secs = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let clusters = engine.decode(&result).at(Stage::Decode)?;
        let decode_secs = start.elapsed().as_secs_f64();

        info!(
            points = batch.len(),
            k = engine.k(),
            rounds = result.iterations,
            "clustering run complete"
        );

        Ok(ClusterReport {
            generated_at: Utc::now().to_rfc3339(),
            backend: self.ctx.backend().name().to_string(),
            points: batch.len(),
            rounds_run: result.iterations,
            clusters,
            timings: StageTimings {
                encrypt_secs,
                compute_secs,
                decode_secs,
            },
        })
    }

    fn finish_mean(
        &self,
        engine: &AggregationEngine<'a, B>,
        batch: &EncryptedBatch<B::Ciphertext>,
        encrypt_secs: f64,
    ) -> Result<MeanReport, RunError> {
        let start = Instant::now();
        let encrypted = engine.encrypted_mean(batch).at(Stage::Aggregate)?;
        let compute_secs = start.elapsed().as_secs_f64();

        let width = match batch.layout() {
            Layout::Packed { .. } => 1,
            Layout::PerRecord { dim } => dim,
        };

        let start = Instant::now();
        let mean = ResultDecoder::new(self.ctx)
            .decode(&encrypted, width)
            .at(Stage::Decode)?;
        let decode_secs = start.elapsed().as_secs_f64();

        info!(
            records = batch.record_count(),
            ciphertexts = batch.len(),
            "mean run complete"
        );

        Ok(MeanReport {
            generated_at: Utc::now().to_rfc3339(),
            backend: self.ctx.backend().name().to_string(),
            records: batch.record_count(),
            ciphertexts: batch.len(),
            mean,
            timings: StageTimings {
                encrypt_secs,
                compute_secs,
                decode_secs,
            },
        })
    }
}

/// Wrap a record-source failure as a fetch-stage run error, unchanged.
pub fn fetch_failed(error: crate::source::FetchError) -> RunError {
    RunError {
        stage: Stage::Fetch,
        source: PipelineError::ExternalFetch(error),
    }
}
