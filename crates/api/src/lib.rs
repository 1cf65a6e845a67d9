//! HTTP surface for the commerce services.
//!
//! Assembles every service behind one axum router with the authorization
//! gate applied uniformly ahead of all handlers, structured logging
//! (tracing), and Prometheus metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use auth::{ApiWhitelist, AuthService, InMemoryTokenStore, InProcessAuthClient};
use axum::Router;
use axum::routing::{get, post};
use domain::{
    InMemoryOrderRepository, InMemoryUserRepository, OrderRepository, OrderService,
    UserRepository, UserService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use product::{InMemoryProductStore, ProductRepository, StockService};
use saga::OrderSagaCoordinator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use middleware::AuthGate;

/// Shared application state accessible from all handlers.
pub struct AppState<R, U, P>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    pub orders: OrderService<R>,
    pub users: UserService<U>,
    pub products: P,
    pub saga: OrderSagaCoordinator<R, P>,
    pub auth: Arc<AuthService>,
}

/// The state shape used by the default in-process wiring.
pub type DefaultAppState =
    AppState<InMemoryOrderRepository, InMemoryUserRepository, InMemoryProductStore>;

/// Methods exempt from token validation.
pub fn default_whitelist() -> ApiWhitelist {
    [
        "/health",
        "/metrics",
        "/v1/user/register",
        "/v1/user/login",
    ]
    .into_iter()
    .collect()
}

/// Creates the default application state with in-process stores.
///
/// Returns the state plus the auth client handed to the gate, so tests can
/// flip its fault switches.
pub fn create_default_state(config: &Config) -> (Arc<DefaultAppState>, Arc<InProcessAuthClient>) {
    let auth = Arc::new(
        AuthService::new(Arc::new(InMemoryTokenStore::new()), default_whitelist())
            .with_token_ttl(chrono::Duration::seconds(config.token_ttl_secs)),
    );

    let order_repo = InMemoryOrderRepository::new();
    let user_repo = InMemoryUserRepository::new();
    let products = InMemoryProductStore::new();

    let saga = OrderSagaCoordinator::new(order_repo.clone(), products.clone())
        .with_step_timeout(Duration::from_millis(config.saga_step_timeout_ms));

    let state = Arc::new(AppState {
        orders: OrderService::new(order_repo),
        users: UserService::new(user_repo, auth.clone()),
        products,
        saga,
        auth: auth.clone(),
    });

    let client = Arc::new(InProcessAuthClient::new(auth));
    (state, client)
}

/// Creates the axum application router with all routes, the authorization
/// gate, and shared state.
pub fn create_app<R, U, P>(
    state: Arc<AppState<R, U, P>>,
    gate: AuthGate,
    metrics_handle: PrometheusHandle,
) -> Router
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/v1/user/register", post(routes::users::register::<R, U, P>))
        .route("/v1/user/login", post(routes::users::login::<R, U, P>))
        .route("/v1/user/logout", post(routes::users::logout::<R, U, P>))
        .route("/v1/user/info", get(routes::users::info::<R, U, P>))
        .route("/v1/order/create", post(routes::orders::create::<R, U, P>))
        .route(
            "/v1/order/create_saga",
            post(routes::orders::create_saga::<R, U, P>),
        )
        .route(
            "/v1/order/create_revert",
            post(routes::orders::create_revert::<R, U, P>),
        )
        .route("/v1/order/update", post(routes::orders::update::<R, U, P>))
        .route("/v1/order/delete", post(routes::orders::delete::<R, U, P>))
        .route(
            "/v1/order/detail/{order_no}",
            get(routes::orders::detail::<R, U, P>),
        )
        .route("/v1/order/list", get(routes::orders::list::<R, U, P>))
        .route(
            "/v1/product/create",
            post(routes::products::create::<R, U, P>),
        )
        .route(
            "/v1/product/update",
            post(routes::products::update::<R, U, P>),
        )
        .route(
            "/v1/product/delete",
            post(routes::products::delete::<R, U, P>),
        )
        .route(
            "/v1/product/detail/{id}",
            get(routes::products::detail::<R, U, P>),
        )
        .route("/v1/product/list", get(routes::products::list::<R, U, P>))
        .route(
            "/v1/product/decrease_stock",
            post(routes::products::decrease_stock::<R, U, P>),
        )
        .route(
            "/v1/product/decrease_stock_revert",
            post(routes::products::decrease_stock_revert::<R, U, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(axum::middleware::from_fn_with_state(
            gate,
            middleware::require_auth,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
