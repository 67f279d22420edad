pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod schema;
pub mod state;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::config;
use crate::handlers::{protected, public};
use crate::state::AppState;

/// Full application router: public routes, token-protected API and media files.
pub fn app(state: AppState) -> Router {
    let media_prefix = state.media.url_prefix().to_string();
    let media_files = ServeDir::new(state.media.root());

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .nest_service(&media_prefix, media_files)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config().api.max_request_size_bytes))
                .layer(cors_layer()),
        );

    let router = if config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/api/user/create", post(public::user_create_post))
        .route("/api/user/token", post(public::user_token_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{ingredients, recipe, tags};

    Router::new()
        .route("/api/user/me", get(protected::me_get).patch(protected::me_patch))
        .route("/api/recipe/tags", get(tags::list_get).post(tags::create_post))
        .route(
            "/api/recipe/tags/:id",
            get(tags::item_get)
                .put(tags::item_put)
                .patch(tags::item_patch)
                .delete(tags::item_delete),
        )
        .route(
            "/api/recipe/ingredients",
            get(ingredients::list_get).post(ingredients::create_post),
        )
        .route(
            "/api/recipe/ingredients/:id",
            get(ingredients::item_get)
                .put(ingredients::item_put)
                .patch(ingredients::item_patch)
                .delete(ingredients::item_delete),
        )
        .route("/api/recipe/recipes", get(recipe::list_get).post(recipe::create_post))
        .route(
            "/api/recipe/recipes/:id",
            get(recipe::item_get)
                .put(recipe::item_put)
                .patch(recipe::item_patch)
                .delete(recipe::item_delete),
        )
        .route(
            "/api/recipe/recipes/:id/upload-image",
            post(protected::upload_image_post),
        )
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
