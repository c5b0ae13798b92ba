use textvec_core::traits::Embedder;
use textvec_embed::{FakeEmbedder, MiniLmEmbedder, ModelSpec, DEFAULT_MAX_LEN, DEFAULT_MODEL_ID};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(384);
    let v1 = embedder.embed("hello world").expect("embed");
    let v2 = embedder.embed("hello world").expect("embed");

    assert_eq!(v1.len(), 384, "embedding dim is 384");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn fake_embedder_values_are_finite() {
    let embedder = FakeEmbedder::new(128);
    let v = embedder.embed("the quick brown fox jumps over the lazy dog").expect("embed");
    assert!(v.iter().all(|x| x.is_finite()), "no NaN/Inf in output");
}

#[test]
fn empty_input_yields_full_length_vector() {
    let embedder = FakeEmbedder::new(64);
    let v = embedder.embed("").expect("empty input must not fail");
    assert_eq!(v.len(), 64);
    assert!(v.iter().all(|x| x.is_finite()));
}

#[test]
fn different_inputs_yield_different_vectors() {
    let embedder = FakeEmbedder::new(256);
    let a = embedder.embed("alpha").expect("embed");
    let b = embedder.embed("bravo charlie delta echo foxtrot").expect("embed");
    assert_ne!(a, b);
}

#[test]
fn embed_batch_maps_embed_over_inputs() {
    let embedder = FakeEmbedder::new(32);
    let texts = vec!["one".to_string(), "two".to_string()];
    let batch = embedder.embed_batch(&texts).expect("embed_batch");
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], embedder.embed("one").expect("embed"));
    assert_eq!(batch[1], embedder.embed("two").expect("embed"));
}

#[test]
fn model_dir_without_weights_is_model_unavailable() {
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let spec = ModelSpec {
        id: "acme/empty".to_string(),
        dir: Some(tmp.path().to_path_buf()),
        max_len: 16,
    };
    let err = MiniLmEmbedder::load(&spec).expect_err("load must fail");
    assert!(err.to_string().contains("Model unavailable"), "got: {err}");
}

#[test]
fn missing_model_dir_is_model_unavailable() {
    let spec = ModelSpec {
        id: "acme/no-such-model".to_string(),
        dir: Some(std::path::PathBuf::from("/definitely/not/here")),
        max_len: 16,
    };
    let err = MiniLmEmbedder::load(&spec).expect_err("load must fail");
    assert!(err.to_string().contains("Model unavailable"), "got: {err}");
}

#[test]
fn model_spec_defaults() {
    let spec = ModelSpec::default();
    assert_eq!(spec.id, DEFAULT_MODEL_ID);
    assert_eq!(spec.max_len, DEFAULT_MAX_LEN);
    assert!(spec.dir.is_none());
    assert_eq!(spec.name(), "all-MiniLM-L6-v2");
}
