use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::page_request;
use crate::{
    AppState,
    auth::{AuthUser, generate_confirmation_code},
    error::{AppError, AppResult},
    extract::Payload,
    models::{SearchQuery, UserRequest, UserResponse},
    pagination::{Page, PageQuery},
};

// --- Admin account management ---

/// list_users
///
/// [Admin] Accounts ordered by id. `?search=` is a case-insensitive substring
/// match on the username.
#[utoipa::path(
    get,
    path = "/v1/users/",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Accounts", body = Page<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<UserResponse>>> {
    let request = page_request(&state, page)?;
    let (users, count) = state
        .repo
        .list_users(search.search.as_deref(), request)
        .await?;
    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(request, count, users)?))
}

/// create_user
///
/// [Admin] Creates an account directly. A confirmation code is generated so
/// the new user can obtain a token through the normal flow.
#[utoipa::path(
    post,
    path = "/v1/users/",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid payload or duplicate username/email"),
        (status = 403, description = "Not an admin")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload<UserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = payload.into_new_user(generate_confirmation_code())?;
    let user = state.repo.create_user(user).await?;
    tracing::info!(user_id = user.id, role = user.role.as_str(), "User created by admin");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/v1/users/{username}/",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

/// update_user
///
/// [Admin] Partial update of any account, role included.
#[utoipa::path(
    patch,
    path = "/v1/users/{username}/",
    params(("username" = String, Path, description = "Username")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid payload or duplicate username/email"),
        (status = 404, description = "Not Found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Payload(payload): Payload<UserRequest>,
) -> AppResult<Json<UserResponse>> {
    let changes = payload.into_changes()?;
    let user = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;
    let user = state
        .repo
        .update_user(user.id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{username}/",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    if state.repo.delete_user(&username).await? {
        tracing::info!(%username, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// --- Self service ---

/// get_me
///
/// [Authenticated] The caller's own account.
#[utoipa::path(
    get,
    path = "/v1/users/me/",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.repo.get_user(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

/// update_me
///
/// [Authenticated] Partial update of the caller's own account. A `role` in the
/// body is ignored; nobody can promote themselves.
#[utoipa::path(
    patch,
    path = "/v1/users/me/",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid payload or duplicate username/email"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn update_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Payload(payload): Payload<UserRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut changes = payload.into_changes()?;
    changes.role = None;

    let user = state
        .repo
        .update_user(id, changes)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}
