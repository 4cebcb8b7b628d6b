//! cloud-native-demo: a health probe demonstration service.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration, builds the key-value store client, sets up the Axum router
//! and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cloud_native_demo::config::{AppConfig, ConfigOverrides, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use cloud_native_demo::{create_router, http, store, AppState, RuntimeEnv};

/// cloud-native-demo: liveness, readiness and a Redis-backed counter
#[derive(Parser, Debug)]
#[command(name = "cloud-native-demo", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "cloud_native_demo=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Address to listen on
    #[arg(long, env = "LISTEN_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "LISTEN_PORT")]
    port: Option<u16>,

    /// Redis hostname
    #[arg(long, env = "REDIS_HOST")]
    redis_host: Option<String>,

    /// Redis port
    #[arg(long, env = "REDIS_PORT")]
    redis_port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            redis_host: self.redis_host.clone(),
            redis_port: self.redis_port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration comes first so the log format is known
    let mut config = AppConfig::load_or_default(&args.config)?;
    config.apply_overrides(args.overrides());
    config.validate()?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        config = %args.config,
        listen = %format!("{}:{}", config.http.host, config.http.port),
        backend = ?config.store.backend,
        redis_host = %config.redis.host,
        redis_port = config.redis.port,
        atomic_increment = config.counter.atomic_increment,
        "Loaded configuration"
    );

    let store = store::from_config(&config)?;
    let env = RuntimeEnv::from_process();
    if env.hostname.is_none() {
        tracing::warn!("HOSTNAME is not set; /counter will report the store as unavailable");
    }

    let state = AppState::new(config.clone(), store, env);
    let app = create_router(state);

    http::start_server(app, &config.http).await?;

    Ok(())
}
