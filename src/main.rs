//! # shorturl server
//!
//! Loads configuration, sets up logging and serves the router until Ctrl-C.

use std::{fs::OpenOptions, net::SocketAddr};

use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shorturl::{
    api::create_router,
    config::Config,
    error::{AppError, Result},
    services::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    config.validate()?;

    // flushes the file log on drop
    let _guard = init_tracing(&config)?;

    info!(environment = ?config.environment, "Starting URL shortener");
    if config.audit_endpoint.is_none() {
        info!("Audit endpoint not configured, remote audit disabled");
    }

    let addr = config.server_addr();
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

/// Console logging filtered by `RUST_LOG`, plus a plain-text copy in
/// `log_file` when one is configured.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shorturl=debug,tower_http=debug"));

    let (file_layer, guard) = match config.log_file.as_deref().filter(|f| !f.is_empty()) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let pretty = config.environment.is_development();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty.then(|| {
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
        }))
        .with((!pretty).then(|| fmt::layer().with_target(true)))
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
