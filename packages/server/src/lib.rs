pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod sweep;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tickets Catalog API",
        version = "1.0.0",
        description = "Back-office and storefront API for the movie ticketing catalog"
    ),
    tags(
        (name = "Movies", description = "Movie catalog: listing, detail, multipart create/update, delete"),
        (name = "Actors", description = "Actor CRUD"),
        (name = "Categories", description = "Category CRUD"),
        (name = "Cinemas", description = "Cinema CRUD with logo upload"),
        (name = "Showtimes", description = "Showtime scheduling"),
        (name = "Bookings", description = "Bookings and their tickets"),
        (name = "Admin", description = "Dashboard counts and upload reconciliation"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let uploads = ServeDir::new(state.config.storage.public_root.join("uploads"));
    let cors = cors_layer(&state.config.server.cors);

    let router = router
        .nest_service("/uploads", uploads)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// `None` when no origin is allowed, which leaves the API same-origin only.
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .max_age(Duration::from_secs(config.max_age)),
    )
}
