use sealstat::{
    ClusteringConfig, CryptoContext, CryptoParams, Pipeline, Seeding, SimulatedCkks, Stage,
    chunk_count, plan_chunks,
};

fn context(slots: usize, depth: usize) -> CryptoContext<SimulatedCkks> {
    let params = CryptoParams::new(16_384, 50, depth).with_slot_capacity(slots);
    CryptoContext::new(SimulatedCkks::with_seed(params, 7)).unwrap()
}

#[test]
fn mean_of_ten_values_across_three_chunks() {
    let ctx = context(4, 3);
    let values: Vec<f64> = (0..10).map(|i| i as f64 / 1000.0).collect();

    let spans = plan_chunks(values.len(), 4).unwrap();
    let sizes: Vec<usize> = spans.iter().map(|s| s.len()).collect();
    assert_eq!(sizes, vec![4, 4, 2]);

    let report = Pipeline::new(&ctx, ClusteringConfig::default())
        .run_mean(&values)
        .unwrap();
    assert_eq!(report.ciphertexts, 3);
    assert!((report.mean[0] - 0.0045).abs() < 1e-6);
}

#[test]
fn million_records_plan() {
    assert_eq!(chunk_count(1_000_000, 8_192), 123);
    let spans = plan_chunks(1_000_000, 8_192).unwrap();
    assert_eq!(spans.last().map(|s| s.len()), Some(1_000_000 - 122 * 8_192));
}

#[test]
fn two_points_two_clusters() {
    let ctx = context(8, 3);
    let config = ClusteringConfig {
        k: 2,
        rounds: 1,
        ..ClusteringConfig::default()
    };

    let report = Pipeline::new(&ctx, config)
        .run_clustering(
            &[vec![0.25], vec![0.68]],
            &Seeding::Explicit(vec![vec![0.2], vec![0.7]]),
        )
        .unwrap();

    assert_eq!(report.clusters[0].point_ids, vec![0]);
    assert_eq!(report.clusters[1].point_ids, vec![1]);
    assert!((report.clusters[0].centroid[0] - 0.25).abs() < 1e-6);
    assert!((report.clusters[1].centroid[0] - 0.68).abs() < 1e-6);
}

#[test]
fn empty_cluster_keeps_seed() {
    let ctx = context(8, 3);
    let config = ClusteringConfig {
        k: 3,
        rounds: 2,
        ..ClusteringConfig::default()
    };

    let report = Pipeline::new(&ctx, config)
        .run_clustering(
            &[vec![0.1], vec![0.12], vec![0.88]],
            &Seeding::Explicit(vec![vec![0.1], vec![0.5], vec![0.9]]),
        )
        .unwrap();

    assert_eq!(report.clusters[0].point_ids, vec![0, 1]);
    assert!(report.clusters[1].point_ids.is_empty());
    assert_eq!(report.clusters[2].point_ids, vec![2]);
    assert!((report.clusters[1].centroid[0] - 0.5).abs() < 1e-6);
}

#[test]
fn depth_too_small_aborts_before_encryption() {
    let ctx = context(8, 2);
    let err = Pipeline::new(&ctx, ClusteringConfig::default())
        .run_clustering(&[vec![0.1], vec![0.9]], &Seeding::GlobalMean { offset: 0.1 })
        .unwrap_err();

    assert_eq!(err.stage, Stage::Configure);
    assert_eq!(err.source.kind(), "CryptoOperationError");
}

#[test]
fn report_serializes() {
    let ctx = context(8, 3);
    let report = Pipeline::new(&ctx, ClusteringConfig::default())
        .run_mean(&[1.0, 2.0, 3.0])
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records"], 3);
    assert!(json["generated_at"].is_string());
    assert!(json["timings"]["encrypt_secs"].is_number());
}
