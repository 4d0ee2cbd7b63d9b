//! devgate: the local developer-AI gateway binary. Parses CLI/env config,
//! sets up tracing, and drives [`devgate::serve`] over real stdio, racing it
//! against SIGINT so either EOF or an interrupt triggers a graceful,
//! metrics-flushing shutdown (spec.md §4.8).

use clap::Parser;
use devgate_core::config::GatewaySettings;
use devgate_core::context::GatewayContext;
use std::path::PathBuf;
use std::sync::Arc;

/// Local developer-AI gateway: a stdio RPC router between an AI coding
/// assistant, a code-memory index, local model runners, and the filesystem.
#[derive(Parser, Debug)]
#[command(name = "devgate", version, about)]
struct Cli {
    /// Base directory for all persisted state. Overrides `MEMORY_ROOT`.
    #[arg(long, env = "MEMORY_ROOT")]
    memory_root: Option<PathBuf>,

    /// Local-model base URL. Overrides `OLLAMA_URL`.
    #[arg(long, env = "OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Preferred local-model name. Overrides `OLLAMA_CHAT_MODEL`.
    #[arg(long, env = "OLLAMA_CHAT_MODEL")]
    ollama_chat_model: Option<String>,

    /// Tracing filter, e.g. `info`, `devgate_core=debug`.
    #[arg(long, env = "DEVGATE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut settings = GatewaySettings::from_env();
    if let Some(memory_root) = cli.memory_root {
        settings.helpers_dir = memory_root.join("bin");
        settings.memory_root = memory_root;
    }
    if let Some(ollama_url) = cli.ollama_url {
        settings.ollama_url = ollama_url;
    }
    if let Some(model) = cli.ollama_chat_model {
        settings.ollama_chat_model = model;
    }

    let ctx = Arc::new(GatewayContext::new(settings).await);
    let reader = tokio::io::stdin();
    let writer = tokio::io::stdout();

    tokio::select! {
        result = devgate::serve(ctx.clone(), reader, writer) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT; shutting down");
            ctx.metrics.flush().await;
        }
    }

    Ok(())
}

fn init_tracing(filter: &str) {
    use tracing_subscriber::EnvFilter;
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
