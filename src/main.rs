//! Tollgate webhook server.
//!
//! Serves the Telegram, Stripe and PayPal webhook endpoints for every
//! tenant from a single process.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tollgate::adapters::http::{webhook_router, WebhookAppState, WebhookDependencies};
use tollgate::adapters::{
    InMemoryItemStore, InMemorySecretStore, PayPalRestClient, PostgresItemStore, SystemClock,
    TelegramBotApi, YamlFileSecretStore,
};
use tollgate::config::{AppConfig, StorageBackend, ValidationError};
use tollgate::ports::{ItemStore, SecretStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        storage = ?config.storage.backend,
        "Starting tollgate"
    );

    let store = build_item_store(&config).await?;
    let secret_store: Arc<dyn SecretStore> = match &config.secrets.file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Reading tenant secrets from file");
            Arc::new(YamlFileSecretStore::new(path.clone()))
        }
        None => {
            tracing::warn!("No secrets file configured; every tenant will fail secret lookup");
            Arc::new(InMemorySecretStore::new())
        }
    };

    let state = WebhookAppState::build(WebhookDependencies {
        store,
        secret_store,
        messenger: Arc::new(TelegramBotApi::new(
            config.telegram.api_base_url.clone(),
            config.telegram.http_timeout(),
        )?),
        paypal: Arc::new(PayPalRestClient::new(
            config.payment.paypal_api_base_url.clone(),
            config.payment.http_timeout(),
        )?),
        clock: Arc::new(SystemClock),
        secrets_path_prefix: config.secrets.path_prefix.clone(),
        secrets_cache_ttl: config.secrets.cache_ttl(),
        stripe_tolerance_secs: config.payment.stripe_tolerance_secs,
    });

    let app = webhook_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn build_item_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ItemStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; ledger state is lost on restart");
            Ok(Arc::new(InMemoryItemStore::new()))
        }
        StorageBackend::Postgres => {
            let settings = config
                .storage
                .postgres()?
                .ok_or(ValidationError::MissingRequired("STORAGE__POSTGRES__URL"))?;

            let pool = PgPoolOptions::new()
                .max_connections(settings.pool_size)
                .acquire_timeout(settings.acquire_timeout())
                .connect(&settings.url)
                .await?;
            tracing::info!(pool_size = settings.pool_size, "Database connection established");

            let store = PostgresItemStore::new(pool);
            if settings.migrate_on_start {
                store.migrate().await?;
                tracing::info!("Database migrations applied");
            }
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
