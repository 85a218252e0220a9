//! Koko server binary.

use anyhow::Context;
use clap::Parser;
use koko_config::KokoConfig;
use koko_core::{SessionStore, TurnRunner};
use koko_db::Database;
use koko_gateway::OpenAiGateway;
use koko_memory::FileMemoryStore;
use koko_server::{AppState, router};
use koko_tools::builtin_tool_registry;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the Koko server.
#[derive(Parser)]
#[command(name = "koko", version)]
struct Cli {
    /// Optional path to a koko.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bind host override
    #[arg(long)]
    host: Option<String>,
    /// Bind port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let mut config = if let Some(path) = cli.config.as_ref() {
        info!("loading config from path: {}", path.display());
        KokoConfig::load_from_path(path).context("failed to load config")?
    } else {
        let cwd = std::env::current_dir().context("cwd")?;
        let layered = KokoConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        layered.config
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let gateway = OpenAiGateway::new(&config.model)
        .context("failed to build model gateway (is the API key set?)")?;
    let database = Arc::new(Database::new(config.database.clone()));
    let tools = builtin_tool_registry(database.clone());
    let runner = TurnRunner::new(Arc::new(gateway), tools);
    let memory = Arc::new(
        FileMemoryStore::new(&config.memory.path).context("failed to open memory store")?,
    );
    let sessions = SessionStore::new(
        &config.conversation.system_prompt,
        config.conversation.max_messages,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, sessions, runner, memory, database);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("koko listening (addr={})", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
