// Public API exports
pub mod aggregator;
pub mod backend;
pub mod clusterer;
pub mod config;
pub mod decoder;
pub mod depth;
pub mod encryptor;
pub mod error;
pub mod pipeline;
pub mod planner;
pub mod source;

// Re-export main types for convenience
pub use backend::{CryptoContext, CryptoError, CryptoParams, HeBackend, SimulatedCkks};
pub use error::{PipelineError, Result, RunError, Stage};

pub use planner::{ChunkSpan, DEFAULT_CHUNK_CAPACITY, chunk_count, plan_chunks};

pub use encryptor::{EncryptedBatch, EncryptedChunk, EncryptionPipeline, Layout};

pub use aggregator::AggregationEngine;

pub use clusterer::{Centroid, Cluster, ClusterAssignment, ClusterResult, ClusteringEngine, Seeding};

pub use decoder::ResultDecoder;

pub use config::{ClusteringConfig, Config, SourceConfig};
pub use pipeline::{ClusterReport, MeanReport, Pipeline, StageTimings};

pub use source::{FetchError, ThreatFeedClient, ThreatRecord};
