mod common;

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use common::TestContext;
use jsonwebtoken::{EncodingKey, Header, encode};
use media_reviews::{
    auth::{AuthUser, Claims, Identity, TokenType, issue_token},
    models::Role,
    repository::Repository,
};
use std::time::SystemTime;

// --- Helper Functions ---

/// Signs a token with the context's secret, `exp_offset` seconds from now
/// (negative for an already expired token).
fn create_token(ctx: &TestContext, user_id: i64, exp_offset: i64, token_type: TokenType) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
        token_type,
    };

    let key = EncodingKey::from_secret(ctx.state.config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(mut parts: Parts, token: &str) -> Parts {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn status_of<E: IntoResponse>(err: E) -> StatusCode {
    err.into_response().status()
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::Moderator);
    let token = create_token(&ctx, user.id, 3600, TokenType::Access);

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state).await;

    assert!(auth_user.is_ok());
    let auth_user = auth_user.unwrap();
    assert_eq!(auth_user.id, user.id);
    assert_eq!(auth_user.username, "reader");
    assert_eq!(auth_user.role, Role::Moderator);
}

#[tokio::test]
async fn test_identity_is_anonymous_without_header() {
    let ctx = TestContext::new();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;
    assert_eq!(identity.unwrap(), Identity::Anonymous);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let ctx = TestContext::new();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state).await;

    assert!(auth_user.is_err());
    assert_eq!(status_of(auth_user.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_scheme() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    let token = create_token(&ctx, user.id, 3600, TokenType::Access);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Token {}", token)).unwrap(),
    );

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;
    assert_eq!(status_of(identity.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    // Beyond the decoder's default leeway.
    let token = create_token(&ctx, user.id, -3600, TokenType::Access);

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state).await;

    assert_eq!(status_of(auth_user.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_foreign_secret() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);

    let mut other = ctx.state.config.clone();
    other.jwt_secret = "some-other-secret".to_string();
    let token = issue_token(user.id, TokenType::Access, &other).unwrap();

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state).await;

    assert_eq!(status_of(auth_user.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_rejected_as_access() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    let token = create_token(&ctx, user.id, 3600, TokenType::Refresh);

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state).await;

    assert_eq!(status_of(auth_user.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    let token = create_token(&ctx, user.id, 3600, TokenType::Access);
    assert!(ctx.repo.delete_user("reader").await.unwrap());

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert_eq!(status_of(identity.unwrap_err()), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_changes_apply_to_existing_tokens() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    let token = create_token(&ctx, user.id, 3600, TokenType::Access);

    let changes = media_reviews::models::UserChanges {
        role: Some(Role::Admin),
        ..Default::default()
    };
    ctx.repo.update_user(user.id, changes).await.unwrap();

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap();
    assert_eq!(auth_user.role, Role::Admin);
}

#[tokio::test]
async fn test_resolved_identity_is_cached_on_the_request() {
    let ctx = TestContext::new();
    let user = ctx.seed_user("reader", Role::User);
    let token = create_token(&ctx, user.id, 3600, TokenType::Access);

    let mut parts = with_bearer(get_request_parts(Method::GET, "/".parse().unwrap()), &token);
    let first = Identity::from_request_parts(&mut parts, &ctx.state).await.unwrap();
    assert!(parts.extensions.get::<Identity>().is_some());

    // A second extraction reuses the cached identity even once the account is gone.
    ctx.repo.delete_user("reader").await.unwrap();
    let second = Identity::from_request_parts(&mut parts, &ctx.state).await.unwrap();
    assert_eq!(first, second);
}
