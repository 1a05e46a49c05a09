use crate::{AppState, auth_middleware, handlers::users};
use axum::{Router, middleware, routing::get};

/// Authenticated Router Module
///
/// Self-service account endpoints. The `auth_middleware` layer rejects
/// anonymous requests with 401 before the handlers run; handlers still take
/// `AuthUser` to know who is calling.
pub fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // GET/PATCH /v1/users/me/
        // `role` cannot be changed through this endpoint.
        .route("/v1/users/me/", get(users::get_me).patch(users::update_me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
