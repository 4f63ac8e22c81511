use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use notification_cell::{mailer_from_config, spawn_notification_worker};
use security_cell::{CredentialHasher, FieldCipher, ValidationService};
use shared_config::AppConfig;
use shared_database::{ClinicStore, InMemoryStore, SupabaseClient};
use shared_utils::TokenService;

use crate::router::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic booking API server");

    // Missing secrets stop the process here
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let store: Arc<dyn ClinicStore> = if config.has_remote_store() {
        info!("Using PostgREST store at {}", config.supabase_url);
        Arc::new(SupabaseClient::new(&config))
    } else {
        warn!("No store configured, data lives in memory and is lost on exit");
        Arc::new(InMemoryStore::new())
    };

    let tokens = Arc::new(TokenService::new(&config.token_secret));
    let cipher = Arc::new(FieldCipher::new(&config.cipher_key).context("Invalid CIPHER_KEY")?);
    let hasher = CredentialHasher::new(config.hash_cost).context("Invalid HASH_COST")?;
    let validator = ValidationService::new().context("Failed to compile validation rules")?;

    let (notifier, notification_worker) = spawn_notification_worker(
        tokens.clone(),
        mailer_from_config(&config),
        config.public_base_url.clone(),
    );

    let context = AppContext::new(store, hasher, cipher, tokens, validator, notifier);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(context)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router owned the last dispatcher, so the worker drains what is
    // queued and stops.
    info!("Waiting for pending activation emails");
    if let Err(e) = notification_worker.await {
        error!("Notification worker ended abnormally: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
