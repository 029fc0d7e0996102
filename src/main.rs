use anyhow::Context;
use clap::Parser;
use hyurim_api::{ApiState, RestApi};
use hyurim_engine::{EngineConfig, ProviderKind, Recommender};
use hyurim_storage::{load_repository, EmbeddingStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Hybrid lodging recommendation server
#[derive(Parser, Debug)]
#[command(name = "hyurim")]
#[command(about = "Lodging recommendations for recreational forests", long_about = None)]
struct Args {
    /// Catalog JSON with forests, facilities and discount policies
    #[arg(short, long, default_value = "./data/catalog.json")]
    data_file: PathBuf,

    /// Engine configuration JSON; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Log level, ignored when RUST_LOG is set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Where facility embeddings are cached between runs
    #[arg(long)]
    embedding_cache: Option<PathBuf>,

    /// Serve everything from the fallback scorer
    #[arg(long)]
    disable_embeddings: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let data = fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse config {:?}", path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Starting Hyurim v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.data_file);
    info!("HTTP API port: {}", args.http_port);

    let mut config = load_config(args.config.as_deref())?;
    if args.disable_embeddings {
        config.embedding.provider = ProviderKind::Disabled;
    }

    let repository = Arc::new(load_repository(&args.data_file)?);
    let mut engine = Recommender::with_repository(config, repository)?;

    let store = args.embedding_cache.map(|path| Arc::new(EmbeddingStore::new(path)));
    if let Some(store) = &store {
        match store.load() {
            Ok(Some(cache)) => engine = engine.with_cache(cache),
            Ok(None) => info!("No embedding cache at {:?}, embedding from scratch", store.path()),
            Err(e) => warn!("Ignoring unreadable embedding cache: {:#}", e),
        }
    }
    let engine = Arc::new(engine);

    if engine.capabilities().embeddings_available() {
        match engine.rebuild_index() {
            Ok(report) => {
                info!("Index built: {} facilities ({} reused)", report.indexed, report.reused);
                if let Some(store) = &store {
                    if let Err(e) = store.save(&engine.cache_snapshot()) {
                        warn!("Failed to persist embedding cache: {:#}", e);
                    }
                }
            }
            Err(e) => warn!("Index build failed, serving from fallback scorer: {}", e),
        }
    } else {
        warn!("Embedding provider unavailable, all requests will be served degraded");
    }

    let mut state = ApiState::new(engine);
    if let Some(store) = store {
        state = state.with_store(store);
    }

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("Hyurim started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
