use super::centroid::compute_centroid;
use super::distance::{nearest, squared_distance};
use super::*;
use crate::backend::{CryptoContext, CryptoParams, HeBackend, SimulatedCkks};
use crate::config::ClusteringConfig;
use crate::decoder::ResultDecoder;
use crate::encryptor::EncryptionPipeline;

fn context(depth: usize) -> CryptoContext<SimulatedCkks> {
    let params = CryptoParams::new(256, 50, depth).with_slot_capacity(8);
    CryptoContext::new(SimulatedCkks::with_seed(params, 42)).unwrap()
}

fn config(k: usize, rounds: usize) -> ClusteringConfig {
    ClusteringConfig {
        k,
        rounds,
        ..ClusteringConfig::default()
    }
}

fn scalars(values: &[f64]) -> Vec<Vec<f64>> {
    values.iter().map(|&v| vec![v]).collect()
}

#[test]
fn test_two_clusters_explicit_seeds() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.25, 0.68]))
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(2, 1)).unwrap();

    let result = engine
        .run(&batch, &Seeding::Explicit(vec![vec![0.2], vec![0.7]]))
        .unwrap();

    assert_eq!(result.assignment.labels(), &[0, 1]);
    assert_eq!(result.iterations, 1);

    let clusters = engine.decode(&result).unwrap();
    assert_eq!(clusters[0].point_ids, vec![0]);
    assert_eq!(clusters[1].point_ids, vec![1]);
    assert!((clusters[0].centroid[0] - 0.25).abs() < 1e-6);
    assert!((clusters[1].centroid[0] - 0.68).abs() < 1e-6);
}

#[test]
fn test_empty_cluster_keeps_previous_centroid() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.1, 0.12, 0.88]))
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(3, 1)).unwrap();
    let seeding = Seeding::Explicit(vec![vec![0.1], vec![0.5], vec![0.9]]);

    let initial = engine.initialize(&batch, &seeding).unwrap();
    let assignment = engine.assign(&batch, &initial).unwrap();
    assert_eq!(assignment.labels(), &[0, 0, 2]);
    assert_eq!(assignment.sizes(), vec![2, 0, 1]);

    let next = engine.update(&batch, &assignment, &initial).unwrap();

    assert!(next[1].shares_ciphertext(&initial[1]));
    assert_eq!(next[1].version(), 0);
    assert!(!next[0].shares_ciphertext(&initial[0]));
    assert_eq!(next[0].version(), 1);

    let decoder = ResultDecoder::new(&ctx);
    let before = decoder.decode(initial[1].ciphertext(), 1).unwrap();
    let after = decoder.decode(next[1].ciphertext(), 1).unwrap();
    assert_eq!(before, after);

    let moved = decoder.decode(next[0].ciphertext(), 1).unwrap();
    assert!((moved[0] - 0.11).abs() < 1e-6);
}

#[test]
fn test_empty_cluster_over_full_run() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.1, 0.12, 0.88]))
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(3, 3)).unwrap();

    let result = engine
        .run(
            &batch,
            &Seeding::Explicit(vec![vec![0.1], vec![0.5], vec![0.9]]),
        )
        .unwrap();
    let clusters = engine.decode(&result).unwrap();

    assert_eq!(result.iterations, 3);
    assert!(clusters[1].point_ids.is_empty());
    assert!((clusters[1].centroid[0] - 0.5).abs() < 1e-6);
    assert_eq!(result.centroids[1].version(), 0);
}

#[test]
fn test_centroid_is_member_mean() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![8.0, 9.0]])
        .unwrap();
    let chunks = batch.chunks();
    let members = vec![chunks[0].ciphertext(), chunks[1].ciphertext()];

    let centroid = compute_centroid(&ctx, &members, 2).unwrap();
    assert_eq!(ctx.backend().depth_of(&centroid), 1);

    let decoded = ResultDecoder::new(&ctx).decode(&centroid, 2).unwrap();
    assert!((decoded[0] - 2.0).abs() < 1e-6);
    assert!((decoded[1] - 3.0).abs() < 1e-6);
}

#[test]
fn test_centroid_of_no_members_rejected() {
    let ctx = context(3);
    let err = compute_centroid(&ctx, &[], 1).unwrap_err();
    assert_eq!(err.kind(), "InvalidInputError");
}

#[test]
fn test_squared_distance() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&[vec![1.0, 2.0], vec![4.0, 6.0]])
        .unwrap();
    let chunks = batch.chunks();

    let d = squared_distance(&ctx, chunks[0].ciphertext(), chunks[1].ciphertext(), 2).unwrap();
    let value = ResultDecoder::new(&ctx).decode_scalar(&d).unwrap();
    assert!((value - 25.0).abs() < 1e-6);
}

#[test]
fn test_tie_goes_to_lower_index() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.3, 0.7, 0.3, 0.1]))
        .unwrap();
    let distances: Vec<_> = batch.ciphertexts().cloned().collect();

    assert_eq!(nearest(&ctx, &distances[..1]).unwrap(), 0);
    assert_eq!(nearest(&ctx, &distances[..3]).unwrap(), 0);
    assert_eq!(nearest(&ctx, &distances).unwrap(), 3);
}

#[test]
fn test_identical_seeds_label_lowest_cluster() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.2, 0.9]))
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(2, 1)).unwrap();

    let result = engine
        .run(&batch, &Seeding::Explicit(vec![vec![0.5], vec![0.5]]))
        .unwrap();
    assert_eq!(result.assignment.labels(), &[0, 0]);
}

#[test]
fn test_global_mean_seeding() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.2, 0.4, 0.6]))
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(3, 1)).unwrap();

    let centroids = engine
        .initialize(&batch, &Seeding::GlobalMean { offset: 0.1 })
        .unwrap();
    let decoder = ResultDecoder::new(&ctx);

    assert_eq!(centroids.len(), 3);
    for (i, centroid) in centroids.iter().enumerate() {
        assert_eq!(centroid.id(), i);
        assert_eq!(ctx.backend().depth_of(centroid.ciphertext()), 1);
        let value = decoder.decode(centroid.ciphertext(), 1).unwrap()[0];
        assert!((value - (0.4 + i as f64 * 0.1)).abs() < 1e-6);
    }
}

#[test]
fn test_stop_when_stable() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_points(&scalars(&[0.1, 0.15, 0.85, 0.9]))
        .unwrap();
    let seeding = Seeding::Explicit(vec![vec![0.0], vec![1.0]]);

    let fixed = ClusteringEngine::new(&ctx, &config(2, 5)).unwrap();
    assert_eq!(fixed.run(&batch, &seeding).unwrap().iterations, 5);

    let early = ClusteringEngine::new(
        &ctx,
        &ClusteringConfig {
            stop_when_stable: true,
            ..config(2, 5)
        },
    )
    .unwrap();
    let result = early.run(&batch, &seeding).unwrap();
    assert_eq!(result.iterations, 2);
    assert_eq!(result.assignment.labels(), &[0, 0, 1, 1]);
}

#[test]
fn test_invalid_engine_config() {
    let ctx = context(3);
    assert_eq!(
        ClusteringEngine::new(&ctx, &config(0, 1)).err().unwrap().kind(),
        "InvalidInputError"
    );
    assert_eq!(
        ClusteringEngine::new(&ctx, &config(2, 0)).err().unwrap().kind(),
        "InvalidInputError"
    );
}

#[test]
fn test_depth_checked_before_clustering() {
    let ctx = context(2);
    let err = ClusteringEngine::new(&ctx, &config(2, 1)).err().unwrap();
    assert_eq!(err.kind(), "CryptoOperationError");
    assert!(err.to_string().contains("depth"));
}

#[test]
fn test_packed_layout_rejected() {
    let ctx = context(3);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_scalars(&[0.1, 0.2, 0.3])
        .unwrap();
    let engine = ClusteringEngine::new(&ctx, &config(2, 1)).unwrap();

    let err = engine
        .run(&batch, &Seeding::GlobalMean { offset: 0.1 })
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidInputError");
}

#[test]
fn test_seed_mismatch_rejected() {
    let ctx = context(3);
    let engine = ClusteringEngine::new(&ctx, &config(2, 1)).unwrap();

    let wrong_count = Seeding::Explicit(vec![vec![0.1]]);
    assert!(engine.check_seeding(1, &wrong_count).is_err());

    let wrong_dim = Seeding::Explicit(vec![vec![0.1], vec![0.2, 0.3]]);
    let err = engine.check_seeding(1, &wrong_dim).unwrap_err();
    assert!(err.to_string().contains("seed 1"));

    let bad_offset = Seeding::GlobalMean { offset: f64::NAN };
    assert!(engine.check_seeding(1, &bad_offset).is_err());
}

#[test]
fn test_assignment_labels_validated() {
    assert!(ClusterAssignment::new(vec![0, 1, 2], 2).is_err());

    let assignment = ClusterAssignment::new(vec![1, 0, 1], 2).unwrap();
    assert_eq!(assignment.members(1), vec![0, 2]);
    assert_eq!(assignment.sizes(), vec![1, 2]);
}
