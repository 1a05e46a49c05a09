use crate::{AppState, handlers::reviews};
use axum::{Router, middleware, routing::get};

/// Reviews Router Module
///
/// Reviews live under their title and comments under their review. The path
/// parameter names match the title routes (`title_id`) so the merged router
/// resolves every nested segment consistently.
pub fn review_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/v1/titles/{title_id}/reviews/",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/v1/titles/{title_id}/reviews/{review_id}/",
            get(reviews::get_review)
                .put(reviews::replace_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/v1/titles/{title_id}/reviews/{review_id}/comments/",
            get(reviews::list_comments).post(reviews::create_comment),
        )
        // PUT and PATCH share a handler: a comment only has `text`.
        .route(
            "/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
            get(reviews::get_comment)
                .put(reviews::update_comment)
                .patch(reviews::update_comment)
                .delete(reviews::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            super::owner_or_staff_or_read_only,
        ))
}
