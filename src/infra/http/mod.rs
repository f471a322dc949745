//! HTTP surface: routers, middleware and the JSON error envelope.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::AppState;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::cache::{ViewCacheState, view_cache_layer};
use crate::domain::permissions::Action;
use crate::domain::types::EntityKind;
use crate::infra::db::PostgresRepositories;

use error::ErrorReport;
use middleware::{PermissionState, log_responses, require_permission, resolve_identity, set_request_context};

/// View names used in cache keys; the per-actor invalidation patterns are
/// built from the same constants.
pub mod views {
    pub const PRODUCTS_LIST: &str = "ProductsListView";
    pub const PRODUCTS_DETAIL: &str = "ProductsDetailView";
    pub const ADS_LIST: &str = "AdsListView";
    pub const ADS_DETAIL: &str = "AdsDetailView";
    pub const ADS_STATISTICS: &str = "AdsStatisticsView";
    pub const LEADS_LIST: &str = "LeadsListView";
    pub const LEADS_DETAIL: &str = "LeadsDetailView";
    pub const CONTRACTS_LIST: &str = "ContractsListView";
    pub const CONTRACTS_DETAIL: &str = "ContractsDetailView";
    pub const CUSTOMERS_LIST: &str = "CustomersListView";
    pub const CUSTOMERS_DETAIL: &str = "CustomersDetailView";
}

pub fn build_router(state: AppState) -> Router {
    let products = entity_router(
        &state,
        EntityKind::Product,
        "/products",
        views::PRODUCTS_LIST,
        views::PRODUCTS_DETAIL,
        get(handlers::list_products),
        get(handlers::get_product),
        post(handlers::create_product),
        put(handlers::update_product).delete(handlers::delete_product),
    );

    let ads = entity_router(
        &state,
        EntityKind::Advertisement,
        "/ads",
        views::ADS_LIST,
        views::ADS_DETAIL,
        get(handlers::list_ads),
        get(handlers::get_ad),
        post(handlers::create_ad),
        put(handlers::update_ad).delete(handlers::delete_ad),
    );

    // The statistics view carries its own permission, independent of the
    // method-derived CRUD action. It is served from the statistics queryset
    // cache, not the per-actor view cache, so every reader sees a write as
    // soon as the queryset is dropped.
    let statistics = Router::new()
        .route("/ads/statistics", get(handlers::ad_statistics))
        .route_layer(axum_middleware::from_fn_with_state(
            PermissionState {
                gate: state.gate.clone(),
                kind: EntityKind::Advertisement,
                action: Some(Action::ViewStats),
            },
            require_permission,
        ));

    let leads = entity_router(
        &state,
        EntityKind::Lead,
        "/leads",
        views::LEADS_LIST,
        views::LEADS_DETAIL,
        get(handlers::list_leads),
        get(handlers::get_lead),
        post(handlers::create_lead),
        put(handlers::update_lead).delete(handlers::delete_lead),
    );

    let contracts = entity_router(
        &state,
        EntityKind::Contract,
        "/contracts",
        views::CONTRACTS_LIST,
        views::CONTRACTS_DETAIL,
        get(handlers::list_contracts),
        get(handlers::get_contract),
        post(handlers::create_contract),
        put(handlers::update_contract).delete(handlers::delete_contract),
    );

    let customers = entity_router(
        &state,
        EntityKind::Customer,
        "/customers",
        views::CUSTOMERS_LIST,
        views::CUSTOMERS_DETAIL,
        get(handlers::list_customers),
        get(handlers::get_customer),
        post(handlers::create_customer),
        put(handlers::update_customer).delete(handlers::delete_customer),
    );

    Router::new()
        .route("/", get(handlers::index))
        .merge(statistics)
        .merge(products)
        .merge(ads)
        .merge(leads)
        .merge(contracts)
        .merge(customers)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(resolve_identity))
        .layer(axum_middleware::from_fn(set_request_context))
        .with_state(state)
}

/// Liveness/readiness probe, wired straight to the pool.
pub fn health_router(repos: PostgresRepositories) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .with_state(repos)
}

async fn health(
    axum::extract::State(repos): axum::extract::State<PostgresRepositories>,
) -> Response {
    match repos.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

fn view_state(state: &AppState, view: &'static str) -> ViewCacheState {
    ViewCacheState {
        backend: state.cache_backend.clone(),
        view,
        ttl: state.cache_config.view_ttl(),
        enabled: state.cache_config.enable_view_cache,
    }
}

/// One router per entity: cached list and detail reads, uncached writes,
/// everything behind the role gate. Cache runs inside the gate so a cached
/// page is never served to a role that may not view it.
#[allow(clippy::too_many_arguments)]
fn entity_router(
    state: &AppState,
    kind: EntityKind,
    base: &str,
    list_view: &'static str,
    detail_view: &'static str,
    list: axum::routing::MethodRouter<AppState>,
    detail: axum::routing::MethodRouter<AppState>,
    create: axum::routing::MethodRouter<AppState>,
    mutate: axum::routing::MethodRouter<AppState>,
) -> Router<AppState> {
    let detail_path = format!("{base}/{{id}}");

    let reads = Router::new()
        .route(base, list)
        .route_layer(axum_middleware::from_fn_with_state(
            view_state(state, list_view),
            view_cache_layer,
        ));
    let detail_reads = Router::new()
        .route(&detail_path, detail)
        .route_layer(axum_middleware::from_fn_with_state(
            view_state(state, detail_view),
            view_cache_layer,
        ));
    let writes = Router::new()
        .route(base, create)
        .route(&detail_path, mutate);

    reads
        .merge(detail_reads)
        .merge(writes)
        .route_layer(axum_middleware::from_fn_with_state(
            PermissionState {
                gate: state.gate.clone(),
                kind,
                action: None,
            },
            require_permission,
        ))
}
