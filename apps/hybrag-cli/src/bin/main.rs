use std::env;
use std::io;
use std::path::PathBuf;

use hybrag_cli::{format_citations, run_chat, OllamaClient};
use hybrag_core::config::{expand_path, Config, Settings};
use hybrag_core::logging::init_tracing;
use hybrag_hybrid::{HybridRetriever, RetrievalParams};
use hybrag_vector::LanceVectorIndex;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} <ingest|query|ask|chat> [args...]", prog); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn question_arg(args: &[String], cmd: &str) -> String {
    if args.is_empty() { eprintln!("Usage: hybrag {} \"<question>\"", cmd); std::process::exit(1); }
    args.join(" ")
}

fn ingest(settings: &Settings, data_dir: Option<&String>) -> anyhow::Result<HybridRetriever<LanceVectorIndex>> {
    let data_dir = data_dir.map(PathBuf::from).unwrap_or_else(|| expand_path(&settings.data.docs_dir));
    println!("Ingesting from {}", data_dir.display());
    let retriever = HybridRetriever::from_settings(settings)?;
    let report = retriever.ingest(&data_dir)?;
    println!("✅ Ingest complete: {} chunks, {} vectors (epoch {})", report.chunks, report.vector_rows, report.epoch);
    Ok(retriever)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let params = RetrievalParams::from(&settings.retrieval);
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => { ingest(&settings, args.first())?; }
        "query" => {
            let question = question_arg(&args, "query");
            let retriever = ingest(&settings, None)?;
            let out = retriever.hybrid_retrieve(&question, &params)?;
            println!("\n🔍 Context for: \"{}\"\n\n{}", question, out.context);
            println!("\n📚 Sources:\n{}", format_citations(&out.hits));
        }
        "ask" => {
            let question = question_arg(&args, "ask");
            let retriever = ingest(&settings, None)?;
            let client = OllamaClient::new(&settings.generation)?;
            let out = retriever.hybrid_retrieve(&question, &params)?;
            println!("\n{}", client.answer(&question, &out.context));
            if !out.hits.is_empty() { println!("\n📚 Sources:\n{}", format_citations(&out.hits)); }
        }
        "chat" => {
            let retriever = ingest(&settings, args.first())?;
            let client = OllamaClient::new(&settings.generation)?;
            println!("Ask a question (empty line or Ctrl-D to quit).");
            run_chat(io::stdin().lock(), &mut io::stdout(), &mut io::stderr(), |question| {
                let out = retriever.hybrid_retrieve(question, &params)?;
                let mut reply = client.answer(question, &out.context);
                if !out.hits.is_empty() { reply.push_str(&format!("\n\n📚 Sources:\n{}", format_citations(&out.hits))); }
                Ok(reply)
            })?;
        }
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}
