use std::{process, sync::Arc, time::Duration};

use kontur::{
    application::{
        AdvertisementService, ContractService, CrmCaches, CustomerService, DashboardService,
        LeadService, ProductService,
    },
    cache::{MemoryBackend, ViewCacheInvalidator},
    config,
    domain::permissions::StaticGate,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &InfraError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "startup error");
    });
}

async fn run() -> Result<(), InfraError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_app_state(repositories.as_ref().clone(), &settings);

    let router = http::build_router(state).merge(http::health_router(repositories.as_ref().clone()));

    let listener = tokio::net::TcpListener::bind(settings.server.addr).await?;
    info!(
        target = "kontur::server",
        addr = %settings.server.addr,
        caching = settings.cache.is_enabled(),
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await?;

    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, InfraError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| InfraError::database(err.to_string()))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_app_state(repositories: PostgresRepositories, settings: &config::Settings) -> AppState {
    let repos = Arc::new(repositories);
    let backend = Arc::new(MemoryBackend::new());
    let caches = CrmCaches::new(backend.clone(), &settings.cache);

    AppState {
        dashboard: DashboardService::new(repos.clone()),
        products: ProductService::new(repos.clone(), caches.clone()),
        ads: AdvertisementService::new(repos.clone(), caches.clone()),
        leads: LeadService::new(repos.clone(), caches.clone()),
        contracts: ContractService::new(repos.clone(), caches.clone()),
        customers: CustomerService::new(repos.clone(), repos.clone(), caches),
        gate: Arc::new(StaticGate),
        cache_backend: backend.clone(),
        cache_config: settings.cache.clone(),
        view_invalidator: ViewCacheInvalidator::new(backend),
    }
}

async fn shutdown_signal(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }

    info!(target = "kontur::server", "Shutdown signal received, draining connections");

    // Bound the drain so a stuck connection cannot keep the process alive.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(target = "kontur::server", "Graceful shutdown timed out");
        process::exit(1);
    });
}
