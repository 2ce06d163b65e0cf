//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                - Redirect to /menu
//! GET  /menu            - Menu listing (?category=, ?q=)
//! GET  /check           - Cart contents with nutrition totals
//! GET  /health          - Liveness check
//! GET  /health/ready    - Readiness check (database)
//!
//! # Cart (form posts, 303 back to the referring page)
//! POST /cart/add        - Add `qty` (default 1) of `slug`
//! POST /cart/remove     - Decrement `slug`, deleting it at 1
//! POST /cart/clear      - Empty the cart, redirect to /menu
//! ```

pub mod cart;
pub mod health;
pub mod layout;
pub mod menu;

use axum::{
    Router,
    body::Body,
    http::{Request, Uri},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::error::AppError;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Answer unknown paths with a 404.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all page and cart routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::root))
        .route("/menu", get(menu::index))
        .nest("/cart", cart_routes())
        .route("/check", get(cart::check))
}

/// Build the complete application router with sessions, tracing, and
/// request IDs applied.
///
/// The session store must already be migrated. Sentry layers are added by
/// the binary on top of this.
pub fn app(state: AppState, store: SqliteStore) -> Router {
    let session_layer = create_session_layer(store, state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
