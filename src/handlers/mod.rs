//! HTTP handlers, one module per resource.
//!
//! Handlers validate the payload, check object-level permissions where the
//! route guard cannot (reviews and comments), and delegate to the repository.
//! Every handler returns `AppResult`, so failures render through `AppError`.

pub mod auth;
pub mod catalog;
pub mod reviews;
pub mod titles;
pub mod users;

use crate::{
    AppState,
    error::AppResult,
    pagination::{PageQuery, PageRequest},
};

/// Resolves `?page=N` against the configured page size.
pub(crate) fn page_request(state: &AppState, query: PageQuery) -> AppResult<PageRequest> {
    PageRequest::new(query, state.config.page_size)
}

/// health
///
/// Liveness probe for load balancers and container orchestration.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String)),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "ok"
}
