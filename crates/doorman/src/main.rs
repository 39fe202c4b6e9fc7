mod app;
mod config;
mod error;
mod extractors;
mod handlers;
mod providers;
mod sessions;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use doorman_core::auth::OidcProviderClient;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{app::create_app, config::AppConfig, sessions::SessionStore, state::AppState};

/// Doorman - Auth0 OIDC login demo
#[derive(Parser, Debug)]
#[command(name = "doorman")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doorman=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The OAuth registration is immutable after this point
    let config = AppConfig::from_env()?;
    let provider = build_provider(&config).await?;

    let state = AppState::new(Arc::new(SessionStore::new()), provider, config);
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown; connect-info feeds the
    // client-address log fields
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Build the provider client: live OIDC discovery against the tenant.
#[cfg(not(feature = "mock"))]
async fn build_provider(config: &AppConfig) -> Result<Arc<dyn OidcProviderClient>> {
    use crate::providers::Auth0Provider;

    Ok(Arc::new(Auth0Provider::discover(config).await?))
}

/// Build the provider client: in-process mock, no tenant required.
#[cfg(feature = "mock")]
async fn build_provider(config: &AppConfig) -> Result<Arc<dyn OidcProviderClient>> {
    use crate::providers::MockProvider;
    use url::Url;

    let authorize = Url::parse(&format!("https://{}/authorize", config.domain))?;
    Ok(Arc::new(MockProvider::new(
        authorize,
        config.client_id.clone(),
        config.redirect_uri(),
    )))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
