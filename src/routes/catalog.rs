use crate::{AppState, handlers};
use axum::{
    Router,
    middleware,
    routing::{delete, get},
};

/// Catalog Router Module
///
/// Categories, genres and titles. Anyone may read; every write passes the
/// `admin_or_read_only` guard first.
pub fn catalog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // --- Categories ---
        .route(
            "/v1/categories/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        // DELETE /v1/categories/{slug}/
        // Titles in the category survive with `category: null`.
        .route(
            "/v1/categories/{slug}/",
            delete(handlers::catalog::delete_category),
        )
        // --- Genres ---
        .route(
            "/v1/genres/",
            get(handlers::catalog::list_genres).post(handlers::catalog::create_genre),
        )
        .route("/v1/genres/{slug}/", delete(handlers::catalog::delete_genre))
        // --- Titles ---
        // GET /v1/titles/?genre=&category=&year=&name=
        .route(
            "/v1/titles/",
            get(handlers::titles::list_titles).post(handlers::titles::create_title),
        )
        .route(
            "/v1/titles/{title_id}/",
            get(handlers::titles::get_title)
                .put(handlers::titles::replace_title)
                .patch(handlers::titles::update_title)
                .delete(handlers::titles::delete_title),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            super::admin_or_read_only,
        ))
}
