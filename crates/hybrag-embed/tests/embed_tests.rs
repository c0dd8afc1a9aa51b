use hybrag_core::config::ModelSettings;
use hybrag_core::traits::{Embedder, RelevanceScorer};
use hybrag_embed::{get_default_embedder, get_default_scorer, FakeEmbedder, OverlapScorer, FAKE_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake models to avoid loading large weights
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder(&ModelSettings::default()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");
    assert_eq!(embedder.dim(), FAKE_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_separates_different_texts() {
    let embedder = FakeEmbedder::new(64);
    let embs = embedder.embed_batch(&["alpha bravo".to_string(), "charlie delta".to_string()]).unwrap();
    assert_eq!(embs[0].len(), 64);
    assert!(embs[0].iter().zip(&embs[1]).any(|(a, b)| (a - b).abs() > 1e-6));
}

#[test]
fn fake_scorer_returns_one_score_per_candidate() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let scorer = get_default_scorer(&ModelSettings::default()).expect("scorer");
    let scores = scorer.score("france capital", &["Paris is the capital of France.", "x", "capital"]).unwrap();
    assert_eq!(scores.len(), 3);
    assert!(scores[0] > scores[2] && scores[2] > scores[1]);
    assert_eq!(OverlapScorer.score("q", &[]).unwrap(), Vec::<f32>::new());
}

#[test]
#[ignore = "needs local bge-m3 weights (APP_MODEL_DIR)"]
fn real_embedder_produces_unit_vectors() {
    std::env::remove_var("APP_USE_FAKE_EMBEDDINGS");
    let embedder = get_default_embedder(&ModelSettings::default()).expect("embedder");
    let embs = embedder.embed_batch(&["The capital of France is Paris.".to_string()]).unwrap();
    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3);
}
