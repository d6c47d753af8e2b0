use super::*;
use crate::backend::{CryptoContext, CryptoParams, HeBackend, SimulatedCkks};
use crate::encryptor::{EncryptedBatch, EncryptionPipeline, Layout};
use proptest::prelude::*;

fn context(slots: usize, depth: usize) -> CryptoContext<SimulatedCkks> {
    let params = CryptoParams::new(1024, 50, depth).with_slot_capacity(slots);
    CryptoContext::new(SimulatedCkks::with_seed(params, 5)).unwrap()
}

#[test]
fn test_mean_of_packed_chunks() {
    let ctx = context(4, 2);
    let values: Vec<f64> = (0..10).map(|i| i as f64 / 1000.0).collect();
    let batch = EncryptionPipeline::new(&ctx).encrypt_scalars(&values).unwrap();
    assert_eq!(batch.len(), 3);

    let mean = AggregationEngine::new(&ctx).unwrap().mean(&batch).unwrap();

    assert_eq!(mean.len(), 1);
    assert!((mean[0] - 0.0045).abs() < 1e-6, "mean was {}", mean[0]);
}

#[test]
fn test_mean_consumes_one_depth_unit() {
    let ctx = context(4, 1);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_scalars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap();
    let engine = AggregationEngine::new(&ctx).unwrap();

    let sum = engine.encrypted_sum(&batch).unwrap();
    assert_eq!(ctx.backend().depth_of(&sum), 0);

    let mean = engine.encrypted_mean(&batch).unwrap();
    assert_eq!(ctx.backend().depth_of(&mean), 1);
}

#[test]
fn test_sum_is_grand_total() {
    let ctx = context(4, 1);
    let batch = EncryptionPipeline::new(&ctx)
        .encrypt_scalars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap();
    let engine = AggregationEngine::new(&ctx).unwrap();

    let sum = engine.encrypted_sum(&batch).unwrap();
    let total = crate::ResultDecoder::new(&ctx).decode_scalar(&sum).unwrap();
    assert!((total - 21.0).abs() < 1e-6);
}

#[test]
fn test_mean_of_feature_vectors() {
    let ctx = context(8, 1);
    let points = vec![
        vec![1.0, 10.0, 0.5],
        vec![3.0, 20.0, 0.7],
        vec![5.0, 30.0, 0.9],
    ];
    let batch = EncryptionPipeline::new(&ctx).encrypt_points(&points).unwrap();

    let mean = AggregationEngine::new(&ctx).unwrap().mean(&batch).unwrap();

    assert_eq!(mean.len(), 3);
    assert!((mean[0] - 3.0).abs() < 1e-6);
    assert!((mean[1] - 20.0).abs() < 1e-6);
    assert!((mean[2] - 0.7).abs() < 1e-6);
}

#[test]
fn test_depth_checked_at_construction() {
    let ctx = context(4, 0);
    let err = AggregationEngine::new(&ctx).err().unwrap();
    assert_eq!(err.kind(), "CryptoOperationError");
}

#[test]
fn test_empty_batch_rejected() {
    let ctx = context(4, 1);
    let empty: EncryptedBatch<crate::backend::simulated::SimCiphertext> =
        EncryptedBatch::new(Layout::Packed { records: 0 }, vec![]);

    let err = AggregationEngine::new(&ctx)
        .unwrap()
        .encrypted_mean(&empty)
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidInputError");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_mean_matches_plaintext(values in prop::collection::vec(-100.0f64..100.0, 1..200)) {
        let ctx = context(16, 1);
        let batch = EncryptionPipeline::new(&ctx).encrypt_scalars(&values).unwrap();
        let mean = AggregationEngine::new(&ctx).unwrap().mean(&batch).unwrap();

        let expected = values.iter().sum::<f64>() / values.len() as f64;
        prop_assert!((mean[0] - expected).abs() < 1e-6);
    }
}
