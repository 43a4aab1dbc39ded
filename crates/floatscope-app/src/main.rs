//! Floatscope: ocean float data explorer.
//! Entry point for the `floatscope` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use floatscope_config::Config;

#[derive(Parser)]
#[command(name = "floatscope")]
#[command(about = "Explore ocean float profiles on a map and ask questions about them")]
#[command(version)]
struct Args {
    /// Config file (overrides FLOATSCOPE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web dashboard
    Serve {
        /// Address to listen on (overrides FLOATSCOPE_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Interactive question loop in the terminal
    Chat,

    /// Answer one or more questions and exit
    Ask {
        #[arg(required = true)]
        questions: Vec<String>,
    },

    /// Build the vector store from a cleaned JSON dataset
    BuildIndex {
        /// JSON array of {metadata, profiles} records
        #[arg(short, long)]
        input: PathBuf,

        /// Descriptions sent to the embedding model per request
        #[arg(long, default_value = "32")]
        batch_size: usize,
    },

    /// Print a summary of the vector store contents
    Inspect,
}

fn init_logging(debug: bool) {
    let fallback = if debug { "floatscope=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (mut config, env_file) = Config::load(args.config.as_deref())?;
    init_logging(config.debug);
    env_file.log();

    tracing::debug!(
        store = %config.store.dir.display(),
        backend = ?config.llm.backend,
        model = %config.ollama.model,
        "Configuration loaded"
    );

    match args.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            commands::serve(&config).await
        }
        Command::Chat => commands::chat(&config).await,
        Command::Ask { questions } => commands::ask(&config, &questions).await,
        Command::BuildIndex { input, batch_size } => commands::build_index(&config, &input, batch_size).await,
        Command::Inspect => commands::inspect(&config),
    }
}
