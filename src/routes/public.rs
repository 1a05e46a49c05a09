use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: the liveness probe and the
/// email/confirmation-code token flow.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Returns "ok" immediately for monitoring and load balancer checks.
        .route("/health", get(handlers::health))
        // POST /v1/auth/email/
        // Lookup-or-create by email, then mail the confirmation code.
        .route("/v1/auth/email/", post(handlers::auth::register))
        // POST /v1/auth/token/
        // Email + confirmation code in, access/refresh pair out.
        .route("/v1/auth/token/", post(handlers::auth::token))
        // POST /v1/auth/token/refresh/
        .route("/v1/auth/token/refresh/", post(handlers::auth::refresh))
}
