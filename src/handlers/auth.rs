use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::{TokenType, generate_confirmation_code, issue_token, issue_token_pair, verify_token},
    error::{AppError, AppResult, FieldErrors},
    extract::Payload,
    models::{RefreshRequest, RegisterRequest, RegisterResponse, TokenRequest, TokenResponse},
    validation,
};

/// register
///
/// [Open] Looks up or creates an account for `email` and mails its confirmation
/// code. Calling it again for the same address re-sends the same code.
///
/// *Delivery*: A mail failure is logged and does not fail the request; the
/// client can simply ask again.
#[utoipa::path(
    post,
    path = "/v1/auth/email/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Code sent", body = RegisterResponse),
        (status = 400, description = "Missing or invalid email")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let mut errors = FieldErrors::new();
    let email = validation::required(&mut errors, "email", payload.email);
    if let Some(email) = &email {
        validation::email(&mut errors, "email", email);
    }
    errors.into_result()?;
    let email = email.unwrap_or_default();

    let user = state
        .repo
        .register_user(&email, &generate_confirmation_code())
        .await?;
    let code = user
        .confirmation_code
        .ok_or_else(|| AppError::Internal("registered user has no confirmation code".to_string()))?;

    if let Err(e) = state.mailer.send_confirmation_code(&user.email, &code).await {
        tracing::warn!(error = %e, user_id = user.id, "Confirmation code delivery failed");
    }

    Ok((StatusCode::CREATED, Json(RegisterResponse { email: user.email })))
}

/// token
///
/// [Open] Exchanges an email and confirmation code for an access/refresh token pair.
/// Both fields must match one account exactly.
#[utoipa::path(
    post,
    path = "/v1/auth/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "Missing field"),
        (status = 404, description = "No account matches")
    ),
    tag = "auth"
)]
pub async fn token(
    State(state): State<AppState>,
    Payload(payload): Payload<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let mut errors = FieldErrors::new();
    let email = validation::required(&mut errors, "email", payload.email);
    let code = validation::required(&mut errors, "confirmation_code", payload.confirmation_code);
    errors.into_result()?;

    let user = state
        .repo
        .find_user_by_credentials(&email.unwrap_or_default(), &code.unwrap_or_default())
        .await?
        .ok_or(AppError::NotFound)?;

    let pair = issue_token_pair(user.id, &state.config)?;
    tracing::info!(user_id = user.id, "Tokens issued");

    Ok(Json(TokenResponse {
        token: pair.access,
        refresh: Some(pair.refresh),
    }))
}

/// refresh
///
/// [Open] Mints a new access token from a valid refresh token. Access tokens
/// are not accepted here.
#[utoipa::path(
    post,
    path = "/v1/auth/token/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Payload(payload): Payload<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let mut errors = FieldErrors::new();
    let refresh = validation::required(&mut errors, "refresh", payload.refresh);
    errors.into_result()?;

    let claims = verify_token(&refresh.unwrap_or_default(), TokenType::Refresh, &state.config)?;
    if state.repo.get_user(claims.sub).await?.is_none() {
        return Err(AppError::Unauthorized("User not found".to_string()));
    }

    Ok(Json(TokenResponse {
        token: issue_token(claims.sub, TokenType::Access, &state.config)?,
        refresh: None,
    }))
}
