use crate::{AppState, handlers::users};
use axum::{Router, middleware, routing::get};

/// Admin Router Module
///
/// Account management. Every method, reads included, requires the admin role;
/// moderators are refused. There is no PUT on a single account.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // GET/POST /v1/users/?search=
        .route("/v1/users/", get(users::list_users).post(users::create_user))
        // GET/PATCH/DELETE /v1/users/{username}/
        .route(
            "/v1/users/{username}/",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            super::admin_not_moderator,
        ))
}
