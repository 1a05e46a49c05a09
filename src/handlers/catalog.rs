//! Categories and genres: flat, slug-addressed lookup lists.
//!
//! Writes are restricted to admins by the route guard; handlers here only
//! validate and persist.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::page_request;
use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::Payload,
    models::{CatalogEntryRequest, Category, Genre, SearchQuery},
    pagination::{Page, PageQuery},
};

// --- Categories ---

/// list_categories
///
/// [Open] Categories ordered by name. `?search=` matches the name exactly.
#[utoipa::path(
    get,
    path = "/v1/categories/",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Categories", body = Page<Category>),
        (status = 404, description = "Page out of range")
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Category>>> {
    let request = page_request(&state, page)?;
    let (rows, count) = state
        .repo
        .list_categories(search.search.as_deref(), request)
        .await?;
    Ok(Json(Page::new(request, count, rows)?))
}

/// create_category
///
/// [Admin] Adds a category. Slugs are unique.
#[utoipa::path(
    post,
    path = "/v1/categories/",
    request_body = CatalogEntryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 400, description = "Invalid payload or duplicate slug"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Payload(payload): Payload<CatalogEntryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let entry = payload.validate()?;
    let category = state.repo.create_category(entry).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// delete_category
///
/// [Admin] Removes a category. Titles that referenced it are kept with no category.
#[utoipa::path(
    delete,
    path = "/v1/categories/{slug}/",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    if state.repo.delete_category(&slug).await? {
        tracing::info!(%slug, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// --- Genres ---

/// list_genres
///
/// [Open] Genres ordered by name. `?search=` matches the name exactly.
#[utoipa::path(
    get,
    path = "/v1/genres/",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Genres", body = Page<Genre>),
        (status = 404, description = "Page out of range")
    ),
    tag = "catalog"
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Genre>>> {
    let request = page_request(&state, page)?;
    let (rows, count) = state
        .repo
        .list_genres(search.search.as_deref(), request)
        .await?;
    Ok(Json(Page::new(request, count, rows)?))
}

#[utoipa::path(
    post,
    path = "/v1/genres/",
    request_body = CatalogEntryRequest,
    responses(
        (status = 201, description = "Created", body = Genre),
        (status = 400, description = "Invalid payload or duplicate slug"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "catalog"
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Payload(payload): Payload<CatalogEntryRequest>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let entry = payload.validate()?;
    let genre = state.repo.create_genre(entry).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// delete_genre
///
/// [Admin] Removes a genre and unlinks it from every title.
#[utoipa::path(
    delete,
    path = "/v1/genres/{slug}/",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    ),
    tag = "catalog"
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    if state.repo.delete_genre(&slug).await? {
        tracing::info!(%slug, "Genre deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
