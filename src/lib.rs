use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

use crate::{
    environment::{production_flag, Environment},
    http::{app, socket_addr},
};

mod environment;
mod http;
mod monitoring;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install shutdown handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    debug!("🔽 signal received, starting graceful shutdown");
}

fn init_tracing(production: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive("cafenv=info".parse().expect("Directive should parse"))
        .from_env_lossy();
    if production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

pub async fn run_cafenv() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(production_flag(dotenvy::var("CAFENV_PRODUCTION").ok()));

    let record = Arc::new(Environment::try_from_env()?);
    info!(
        "📦 Environment loaded: api server {}, auth0 tenant {}",
        record.api_server_url, record.auth0.url
    );

    let files_dir = dotenvy::var("CAFENV_FILES_DIR").unwrap_or_else(|_| String::from("files"));
    let bind_addr = socket_addr()?;
    let app = app(record, &files_dir)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Binding to {}", bind_addr))?;
    info!("☕ Listening on http://{}", &bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
