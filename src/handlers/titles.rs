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
    models::{Title, TitleFilter, TitleRequest},
    pagination::{Page, PageQuery},
};

/// list_titles
///
/// [Open] Titles ordered by id, each with its live rating.
///
/// *Filters*: `genre` and `category` take slugs, `year` matches exactly and
/// `name` is a case-insensitive substring match. All filters combine with AND.
#[utoipa::path(
    get,
    path = "/v1/titles/",
    params(TitleFilter, PageQuery),
    responses(
        (status = 200, description = "Titles", body = Page<Title>),
        (status = 404, description = "Page out of range")
    ),
    tag = "titles"
)]
pub async fn list_titles(
    State(state): State<AppState>,
    Query(filter): Query<TitleFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Title>>> {
    let request = page_request(&state, page)?;
    let (titles, count) = state.repo.list_titles(&filter, request).await?;
    Ok(Json(Page::new(request, count, titles)?))
}

/// create_title
///
/// [Admin] Adds a title. `category` and `genre` reference existing slugs; the
/// response uses the read representation.
#[utoipa::path(
    post,
    path = "/v1/titles/",
    request_body = TitleRequest,
    responses(
        (status = 201, description = "Created", body = Title),
        (status = 400, description = "Invalid payload or unknown slug"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "titles"
)]
pub async fn create_title(
    State(state): State<AppState>,
    Payload(payload): Payload<TitleRequest>,
) -> AppResult<(StatusCode, Json<Title>)> {
    let title = state.repo.create_title(payload.into_new_title()?).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

#[utoipa::path(
    get,
    path = "/v1/titles/{title_id}/",
    params(("title_id" = i64, Path, description = "Title ID")),
    responses(
        (status = 200, description = "Found", body = Title),
        (status = 404, description = "Not Found")
    ),
    tag = "titles"
)]
pub async fn get_title(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
) -> AppResult<Json<Title>> {
    let title = state.repo.get_title(title_id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(title))
}

/// replace_title
///
/// [Admin] Full replacement: `name` and `year` are required, omitted optional
/// fields are reset (no category, no genres, empty description).
#[utoipa::path(
    put,
    path = "/v1/titles/{title_id}/",
    params(("title_id" = i64, Path, description = "Title ID")),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Replaced", body = Title),
        (status = 400, description = "Invalid payload or unknown slug"),
        (status = 404, description = "Not Found")
    ),
    tag = "titles"
)]
pub async fn replace_title(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Payload(payload): Payload<TitleRequest>,
) -> AppResult<Json<Title>> {
    let changes = payload.into_replacement()?;
    let title = state
        .repo
        .update_title(title_id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(title))
}

/// update_title
///
/// [Admin] Partial update: only the provided fields change.
#[utoipa::path(
    patch,
    path = "/v1/titles/{title_id}/",
    params(("title_id" = i64, Path, description = "Title ID")),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Updated", body = Title),
        (status = 400, description = "Invalid payload or unknown slug"),
        (status = 404, description = "Not Found")
    ),
    tag = "titles"
)]
pub async fn update_title(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Payload(payload): Payload<TitleRequest>,
) -> AppResult<Json<Title>> {
    let changes = payload.into_changes()?;
    let title = state
        .repo
        .update_title(title_id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(title))
}

/// delete_title
///
/// [Admin] Removes a title together with its reviews and their comments.
#[utoipa::path(
    delete,
    path = "/v1/titles/{title_id}/",
    params(("title_id" = i64, Path, description = "Title ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    ),
    tag = "titles"
)]
pub async fn delete_title(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.repo.delete_title(title_id).await? {
        tracing::info!(title_id, "Title deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
