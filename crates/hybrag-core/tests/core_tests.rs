use std::fs;
use std::io::Write;
use tempfile::TempDir;

use hybrag_core::chunker::Chunker;
use hybrag_core::config::Config;
use hybrag_core::data_processor::DataProcessor;
use hybrag_core::types::{ChunkId, SourceKind};

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "The capital of France is Paris.").unwrap();

    let processor = DataProcessor::new();
    let chunks = processor.process_directory(dir).expect("process");

    assert_eq!(chunks.len(), 1, "one short document becomes one chunk");
    assert_eq!(chunks[0].text.trim(), "The capital of France is Paris.");
    assert_eq!(chunks[0].meta.filename, "a.txt");
    assert_eq!(chunks[0].meta.source_kind, SourceKind::Corpus);
}

#[test]
fn ids_are_positional_across_documents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "x".repeat(1200)).unwrap();
    fs::write(dir.join("b.txt"), "bravo charlie delta echo").unwrap();

    let chunks = DataProcessor::new().process_directory(dir).expect("process");
    // a.txt: windows at 0, 450, 900 ; b.txt: one window
    assert_eq!(chunks.len(), 4);
    for (i, c) in chunks.iter().enumerate() { assert_eq!(c.id, ChunkId(i)); }
    assert_eq!(chunks.iter().map(|c| c.offset).collect::<Vec<_>>(), vec![0, 450, 900, 0]);
    assert_eq!(chunks[3].meta.filename, "b.txt");
}

#[test]
fn failing_document_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a_broken.pdf"), b"%PDF-garbage").unwrap();
    fs::write(dir.join("b.txt"), "a perfectly readable document").unwrap();

    let chunks = DataProcessor::new().process_directory(dir).expect("process");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].meta.filename, "b.txt");
    assert_eq!(chunks[0].id, ChunkId(0));
}

#[test]
fn empty_or_missing_directory_yields_no_chunks() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blank.txt"), "   \n\n  ").unwrap();
    fs::write(tmp.path().join("ignored.bin"), "not a document type").unwrap();
    assert!(DataProcessor::new().process_directory(tmp.path()).unwrap().is_empty());
    assert!(DataProcessor::new().process_directory(&tmp.path().join("nope")).unwrap().is_empty());
}

#[test]
fn only_pdf_and_txt_documents_are_read() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.md"), "Markdown notes about Paris.").unwrap();
    fs::write(tmp.path().join("facts.txt"), "The capital of France is Paris.").unwrap();
    let chunks = DataProcessor::new().process_directory(tmp.path()).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].meta.filename, "facts.txt");
}

#[test]
fn process_directory_limited_two_files_limit_one() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo charlie").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta echo").unwrap();

    let chunks = DataProcessor::new().process_directory_limited(dir, 1).expect("process limited");

    let mut names = std::collections::HashSet::new();
    for c in &chunks { names.insert(c.meta.filename.clone()); }
    assert_eq!(names.len(), 1, "limited to one source document");
}

#[test]
fn chunking_is_deterministic() {
    let text = "lorem ipsum dolor sit amet ".repeat(60);
    let processor = DataProcessor::with_chunker(Chunker::new(100, 20, 10).unwrap());
    let a = processor.chunk_documents([("doc.txt", text.as_str())]);
    let b = processor.chunk_documents([("doc.txt", text.as_str())]);
    assert_eq!(a, b);
    let total = text.chars().count();
    for (i, c) in a.iter().enumerate() {
        assert_eq!(c.offset, i * 80);
        assert!(c.offset + c.text.chars().count() <= total);
    }
}

#[test]
fn config_files_and_env_layer_over_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[retrieval]\ntop_k_web = 0\n\n[chunking]\nsize = 300\noverlap = 30\n").unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[data]\ncollection = \"test_rag\"\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.retrieval.top_k_web, 0);
    assert_eq!(settings.retrieval.top_k_vec, 4, "unset keys keep defaults");
    assert_eq!(settings.chunking.size, 300);
    assert_eq!(settings.data.collection, "test_rag");
    let overlap: usize = config.get("chunking.overlap").expect("key");
    assert_eq!(overlap, 30);
}

#[test]
fn invalid_chunking_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[chunking]\nsize = 50\noverlap = 50\n").unwrap();
    assert!(Config::load_from(tmp.path(), "dev").is_err());
}
