//! promptgate HTTP server
//!
//! Serves one authenticated route per prompt template.

use anyhow::Result;
use promptgate_server::{api, config::GatewayConfig, gateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing()?;

    // Load configuration
    let config = GatewayConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    // Load templates and backend client
    let gateway = gateway::init_gateway(&config).await?;
    info!("Gateway initialized");

    let addr = config.server_address.clone();
    info!("Registered routes:");
    for name in gateway.templates().names() {
        info!("  POST http://{}/template/{}", addr, name);
    }
    info!("  Health check: http://{}/health", addr);

    let app = api::create_router(Arc::new(gateway), &config.auth_token);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize tracing subscriber
///
/// `PROMPTGATE_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "promptgate_server=info,promptgate_backend=info,promptgate_templates=info,tower_http=debug"
            .into()
    });

    let json = std::env::var("PROMPTGATE_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    initialized.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
