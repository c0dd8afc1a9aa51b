use std::time::Duration;
use tempfile::TempDir;

use hybrag_core::data_processor::DataProcessor;
use hybrag_core::types::{SourceKind, SourceScore};
use hybrag_embed::{FakeEmbedder, FAKE_DIM};
use hybrag_vector::LanceVectorIndex;

const TABLE: &str = "chunks_test_tmp";

fn open_index(tmp: &TempDir) -> LanceVectorIndex {
    LanceVectorIndex::open(tmp.path(), TABLE, Box::new(FakeEmbedder::new(FAKE_DIM)), Duration::from_secs(60)).expect("index")
}

fn sample_chunks() -> Vec<hybrag_core::types::Chunk> {
    DataProcessor::new().chunk_documents([
        ("france.txt", "The capital of France is Paris."),
        ("fruit.txt", "Bananas are yellow and grow in bunches."),
        ("space.txt", "Jupiter is the largest planet in the solar system."),
    ])
}

#[test]
fn rebuild_twice_keeps_one_row_per_chunk() {
    let tmp = TempDir::new().expect("tmp");
    let index = open_index(&tmp);
    let chunks = sample_chunks();

    assert_eq!(index.rebuild(&chunks).expect("first rebuild"), 3);
    assert_eq!(index.rebuild(&chunks).expect("second rebuild"), 3);
    assert_eq!(index.len().expect("len"), 3);
}

#[test]
fn rebuild_replaces_previous_epoch() {
    let tmp = TempDir::new().expect("tmp");
    let index = open_index(&tmp);
    index.rebuild(&sample_chunks()).expect("rebuild");
    let smaller = DataProcessor::new().chunk_documents([("only.txt", "A single remaining document body.")]);
    index.rebuild(&smaller).expect("rebuild");
    assert_eq!(index.len().expect("len"), 1);

    let hits = index.query("anything at all", 4, 0.5).expect("query");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].meta.filename, "only.txt");
}

#[test]
fn identical_text_is_found_under_threshold() {
    let tmp = TempDir::new().expect("tmp");
    let index = open_index(&tmp);
    index.rebuild(&sample_chunks()).expect("rebuild");

    let hits = index.query("The capital of France is Paris.", 4, 0.5).expect("query");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].text, "The capital of France is Paris.");
    assert_eq!(hits[0].meta.source_kind, SourceKind::Corpus);
    match hits[0].source_score {
        SourceScore::Distance(d) => assert!(d < 1e-3, "distance {d}"),
        other => panic!("unexpected score {other:?}"),
    }
}

#[test]
fn nearest_row_is_kept_when_nothing_passes_threshold() {
    let tmp = TempDir::new().expect("tmp");
    let index = open_index(&tmp);
    index.rebuild(&sample_chunks()).expect("rebuild");

    let hits = index.query("completely unrelated words here", 4, 1e-9).expect("query");
    assert_eq!(hits.len(), 1, "fallback returns the single nearest row");
}

#[test]
fn empty_index_and_zero_k_return_nothing() {
    let tmp = TempDir::new().expect("tmp");
    let index = open_index(&tmp);
    assert!(index.query("anything", 4, 0.5).expect("never built").is_empty());

    index.rebuild(&[]).expect("empty rebuild");
    assert_eq!(index.len().expect("len"), 0);
    assert!(index.query("anything", 4, 0.5).expect("empty").is_empty());

    index.rebuild(&sample_chunks()).expect("rebuild");
    assert!(index.query("anything", 0, 0.5).expect("k=0").is_empty());
}

#[test]
fn reopening_with_another_dimension_is_rejected() {
    let tmp = TempDir::new().expect("tmp");
    open_index(&tmp).rebuild(&sample_chunks()).expect("rebuild");

    let other = LanceVectorIndex::open(tmp.path(), TABLE, Box::new(FakeEmbedder::new(16)), Duration::from_secs(60)).expect("index");
    assert!(other.rebuild(&sample_chunks()).is_err());
}
