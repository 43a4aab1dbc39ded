//! Subcommand implementations.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use floatscope_config::Config;
use floatscope_llm::{build_embedder, build_generator, ChatError, FloatChatbot};
use floatscope_store::{FloatCatalog, StoreBuilder, VectorStore};
use floatscope_web::{router::build_router, state::AppState};

fn load_chatbot(config: &Config) -> anyhow::Result<FloatChatbot> {
    let store = VectorStore::load(&config.store.dir)
        .with_context(|| format!("loading vector store from {}", config.store.dir.display()))?;
    info!(profiles = store.len(), dim = store.dim(), "Vector store loaded");
    let embedder = build_embedder(config)?;
    let llm = build_generator(config)?;
    Ok(FloatChatbot::new(Arc::new(store), embedder, llm)
        .with_top_k(config.store.top_k)
        .with_generation(config.llm.temperature, config.llm.max_tokens))
}

/// Same wording the dashboard shows when the backend fails.
fn answer_text(result: Result<floatscope_llm::ChatAnswer, ChatError>) -> String {
    match result {
        Ok(answer) => answer.answer,
        Err(e) => format!("Sorry, I encountered an error: {e}"),
    }
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    info!("🌊 Floatscope starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let state = AppState::load(config);
    match &state.catalog {
        Some(catalog) => info!("✅ Float catalog loaded: {} profiles", catalog.len()),
        None => tracing::warn!("Dashboard will show load errors: {:?}", state.load_errors),
    }
    if state.chatbot.is_some() {
        info!("✅ Chat ready (model: {}, embeddings: {})", state.model, state.embed_model);
    }

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("🌐 Dashboard listening on http://{}", config.server.bind);
    info!("🌊 Floatscope ready. Press Ctrl+C to stop.");

    axum::serve(listener, router).await?;
    Ok(())
}

pub async fn chat(config: &Config) -> anyhow::Result<()> {
    let bot = load_chatbot(config)?;
    println!("🌊 Float Chatbot Ready!");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nAsk a question (or type 'exit'): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else { break };
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.is_empty() {
            continue;
        }
        println!("\n🤖 {}", answer_text(bot.query(question).await));
    }
    Ok(())
}

pub async fn ask(config: &Config, questions: &[String]) -> anyhow::Result<()> {
    let bot = load_chatbot(config)?;
    for (i, question) in questions.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if questions.len() > 1 {
            println!("Q: {question}");
        }
        println!("{}", answer_text(bot.query(question).await));
    }
    Ok(())
}

pub async fn build_index(config: &Config, input: &Path, batch_size: usize) -> anyhow::Result<()> {
    if batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    let builder = StoreBuilder::from_dataset_file(input)
        .with_context(|| format!("reading dataset {}", input.display()))?;
    info!(profiles = builder.len(), skipped = builder.skipped(), "Descriptions generated");

    let embedder = build_embedder(config)?;
    let total = builder.len();
    let mut embeddings = Vec::with_capacity(total);
    for batch in builder.descriptions().chunks(batch_size) {
        let vectors = embedder
            .embed(batch.to_vec())
            .await
            .with_context(|| format!("embedding with {}", config.ollama.embed_model))?;
        embeddings.extend(vectors);
        info!("Embedded {}/{} descriptions", embeddings.len(), total);
    }

    let summary = builder.write(&config.store.dir, &embeddings)?;
    println!(
        "Vector store written to {}: {} profiles, {} skipped, dimension {}",
        config.store.dir.display(),
        summary.profiles,
        summary.skipped,
        summary.dim
    );
    Ok(())
}

pub fn inspect(config: &Config) -> anyhow::Result<()> {
    let dir = &config.store.dir;
    let catalog = Arc::new(
        FloatCatalog::load(dir).with_context(|| format!("loading catalog from {}", dir.display()))?,
    );

    println!("Vector store: {}", dir.display());
    println!("Profiles: {}", catalog.len());
    match VectorStore::load_with_catalog(dir, catalog.clone()) {
        Ok(store) => println!("Index: {} vectors, dimension {}", store.len(), store.dim()),
        Err(e) => println!("Index: unavailable ({e})"),
    }

    let Some(first) = catalog.get(0) else {
        return Ok(());
    };
    let sample = serde_json::to_value(first.metadata)?;
    if let Some(fields) = sample.as_object() {
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        println!("\nFields: {}", names.join(", "));
    }
    println!("\nFirst record:\n{}", serde_json::to_string_pretty(&sample)?);

    println!("\nFirst depth samples:");
    for s in first.profile.iter().take(3) {
        println!(
            "  depth {:>8.1} m  temperature {:>6.2} °C  salinity {:>7.3} PSU",
            s.depth, s.temperature, s.salinity
        );
    }
    Ok(())
}
