//! Reviews nested under titles, comments nested under reviews.
//!
//! Every ancestor in the path must resolve before anything else happens; a
//! review id under the wrong title is a 404, never a partial result. The route
//! guard requires authentication for writes; editing or deleting an existing
//! object is further limited to its author and staff, checked here once the
//! object is loaded.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::page_request;
use crate::{
    AppState,
    auth::{AuthUser, Identity},
    error::{AppError, AppResult},
    extract::Payload,
    models::{Comment, CommentRequest, Review, ReviewChanges, ReviewRequest},
    pagination::{Page, PageQuery},
    permissions::{Access, authorize, owner_or_staff_or_read_only},
};

async fn require_title(state: &AppState, title_id: i64) -> AppResult<()> {
    match state.repo.get_title(title_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound),
    }
}

async fn require_review(state: &AppState, title_id: i64, review_id: i64) -> AppResult<Review> {
    state
        .repo
        .get_review(title_id, review_id)
        .await?
        .ok_or(AppError::NotFound)
}

async fn require_comment(
    state: &AppState,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> AppResult<Comment> {
    require_review(state, title_id, review_id).await?;
    state
        .repo
        .get_comment(review_id, comment_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// The caller must be the author or staff to modify an existing object.
fn authorize_edit(identity: &Identity, author_id: i64) -> AppResult<()> {
    authorize(
        identity,
        owner_or_staff_or_read_only(identity, Access::Write, Some(author_id)),
    )
}

// --- Reviews ---

#[utoipa::path(
    get,
    path = "/v1/titles/{title_id}/reviews/",
    params(("title_id" = i64, Path, description = "Title ID"), PageQuery),
    responses(
        (status = 200, description = "Reviews of the title", body = Page<Review>),
        (status = 404, description = "Unknown title or page out of range")
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Review>>> {
    require_title(&state, title_id).await?;
    let request = page_request(&state, page)?;
    let (reviews, count) = state.repo.list_reviews(title_id, request).await?;
    Ok(Json(Page::new(request, count, reviews)?))
}

/// create_review
///
/// [Authenticated] Posts a review of the title. One review per author per
/// title; a second attempt is a 400.
#[utoipa::path(
    post,
    path = "/v1/titles/{title_id}/reviews/",
    params(("title_id" = i64, Path, description = "Title ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Created", body = Review),
        (status = 400, description = "Invalid payload or already reviewed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown title")
    ),
    tag = "reviews"
)]
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Payload(payload): Payload<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    require_title(&state, title_id).await?;
    let review = payload.into_new_review()?;
    let review = state.repo.create_review(title_id, user.id, review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    get,
    path = "/v1/titles/{title_id}/reviews/{review_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Found", body = Review),
        (status = 404, description = "Not Found")
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<Json<Review>> {
    Ok(Json(require_review(&state, title_id, review_id).await?))
}

/// replace_review
///
/// [Author or staff] Full replacement; `text` and `score` are both required.
/// The publication date moves to now.
#[utoipa::path(
    put,
    path = "/v1/titles/{title_id}/reviews/{review_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Replaced", body = Review),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    ),
    tag = "reviews"
)]
pub async fn replace_review(
    identity: Identity,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Payload(payload): Payload<ReviewRequest>,
) -> AppResult<Json<Review>> {
    let existing = require_review(&state, title_id, review_id).await?;
    authorize_edit(&identity, existing.author_id)?;

    let review = payload.into_new_review()?;
    let changes = ReviewChanges {
        text: Some(review.text),
        score: Some(review.score),
    };
    let review = state
        .repo
        .update_review(title_id, review_id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(review))
}

/// update_review
///
/// [Author or staff] Partial update of `text` and/or `score`.
#[utoipa::path(
    patch,
    path = "/v1/titles/{title_id}/reviews/{review_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    ),
    tag = "reviews"
)]
pub async fn update_review(
    identity: Identity,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Payload(payload): Payload<ReviewRequest>,
) -> AppResult<Json<Review>> {
    let existing = require_review(&state, title_id, review_id).await?;
    authorize_edit(&identity, existing.author_id)?;

    let review = state
        .repo
        .update_review(title_id, review_id, payload.into_changes()?)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(review))
}

/// delete_review
///
/// [Author or staff] Removes the review and its comments.
#[utoipa::path(
    delete,
    path = "/v1/titles/{title_id}/reviews/{review_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    identity: Identity,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let existing = require_review(&state, title_id, review_id).await?;
    authorize_edit(&identity, existing.author_id)?;

    if state.repo.delete_review(title_id, review_id).await? {
        tracing::info!(title_id, review_id, "Review deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// --- Comments ---

#[utoipa::path(
    get,
    path = "/v1/titles/{title_id}/reviews/{review_id}/comments/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Comments on the review", body = Page<Comment>),
        (status = 404, description = "Unknown title/review or page out of range")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Comment>>> {
    require_review(&state, title_id, review_id).await?;
    let request = page_request(&state, page)?;
    let (comments, count) = state.repo.list_comments(review_id, request).await?;
    Ok(Json(Page::new(request, count, comments)?))
}

#[utoipa::path(
    post,
    path = "/v1/titles/{title_id}/reviews/{review_id}/comments/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Created", body = Comment),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown title or review")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Payload(payload): Payload<CommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    require_review(&state, title_id, review_id).await?;
    let text = payload.into_text()?;
    let comment = state.repo.create_comment(review_id, user.id, text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not Found")
    ),
    tag = "comments"
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<Json<Comment>> {
    Ok(Json(
        require_comment(&state, title_id, review_id, comment_id).await?,
    ))
}

/// update_comment
///
/// [Author or staff] Comments only carry text, so PUT and PATCH behave alike.
#[utoipa::path(
    patch,
    path = "/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    identity: Identity,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Payload(payload): Payload<CommentRequest>,
) -> AppResult<Json<Comment>> {
    let existing = require_comment(&state, title_id, review_id, comment_id).await?;
    authorize_edit(&identity, existing.author_id)?;

    let text = payload.into_text()?;
    let comment = state
        .repo
        .update_comment(review_id, comment_id, text)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(comment))
}

#[utoipa::path(
    delete,
    path = "/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author or staff"),
        (status = 404, description = "Not Found")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    identity: Identity,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<StatusCode> {
    let existing = require_comment(&state, title_id, review_id, comment_id).await?;
    authorize_edit(&identity, existing.author_id)?;

    if state.repo.delete_comment(review_id, comment_id).await? {
        tracing::info!(review_id, comment_id, "Comment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
