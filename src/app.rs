use std::any::Any;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// The full application: routes, 404 fallback and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();
    let routes = Router::new()
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings)
                .post(handlers::bookings::create_booking)
                .fallback(handlers::fallback::not_found),
        )
        .route("/api/db-status", get(handlers::health::db_status))
        .route("/health", get(handlers::health::health))
        .fallback(handlers::fallback::not_found)
        .with_state(state);

    with_middleware(routes, &config)
}

/// Wraps `router` in request tracing, CORS and the panic-to-500 stage.
pub fn with_middleware(router: Router, config: &AppConfig) -> Router {
    let expose_detail = config.environment.exposes_error_detail();

    router
        .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
            handlers::fallback::panic_response(expose_detail, err)
        }))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                tracing::warn!("ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}
