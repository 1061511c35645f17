use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arena_server::{ArenaConfig, ArenaService, SqliteStore, router};
use clap::Parser;
use game::{GameStore, MemoryStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena-server", version, about = "Chess arena for humans and LLM engines")]
struct Cli {
    /// TOML config file. Missing file means defaults.
    #[arg(short, long, default_value = "arena.toml")]
    config: PathBuf,

    /// Listen address, overrides the config and ARENA_BIND.
    #[arg(long)]
    bind: Option<String>,

    /// Keep games in memory instead of SQLite.
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ArenaConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    let store: Arc<dyn GameStore> = if cli.memory {
        info!("using in-memory game store");
        Arc::new(MemoryStore::new())
    } else {
        let store = SqliteStore::connect(&config.database_url)
            .await
            .with_context(|| format!("opening database {}", config.database_url))?;
        info!(url = %config.database_url, "connected to database");
        Arc::new(store)
    };

    let pipeline = Arc::new(config.build_pipeline());
    let engines: Vec<_> = pipeline.config().engine_ids().collect();
    info!(?engines, default = %config.default_engine, "decision pipeline ready");

    let service = Arc::new(ArenaService::new(store, pipeline.clone(), config.default_engine.clone()));
    let app = router(service);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "arena listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("arena stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
