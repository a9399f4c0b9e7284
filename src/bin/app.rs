use std::{
    fs::{self, OpenOptions},
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
};

use adapter::{database::connect_database_with, redis::RedisClient};
use anyhow::{Context, Result};
use api::route::api::routes;
use registry::AppRegistry;
use shared::{
    config::{AppConfig, LogConfig},
    env::{which, Environment},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{self, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::new()?;
    init_logger(&app_config.log)?;
    bootstrap(app_config).await
}

fn init_logger(log: &LogConfig) -> Result<()> {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    // ログ API が参照するファイルへ JSON で追記する
    fs::create_dir_all(&log.directory)
        .with_context(|| format!("cannot create {}", log.directory.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log.server_log())
        .with_context(|| format!("cannot open {}", log.server_log().display()))?;
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(subscriber)
        .with(file_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_headers(cors::Any)
        .allow_methods(cors::Any)
        .allow_origin(cors::Any)
}

async fn bootstrap(app_config: AppConfig) -> Result<()> {
    let pool = connect_database_with(&app_config.database);
    pool.migrate()
        .await
        .context("failed to apply database migrations")?;
    let kv = Arc::new(RedisClient::new(&app_config.redis)?);
    if let Err(e) = kv.try_connect().await {
        tracing::warn!(error.message = %e, "Redis is not reachable yet");
    }

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), app_config.server.port);
    let registry = AppRegistry::new(pool, kv, app_config);

    let app = routes()
        .layer(cors())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(registry);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,error.message = %e, "Unexpected error"
            )
        })
}
