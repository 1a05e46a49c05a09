use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::{Role, User},
    repository::RepositoryState,
};

/// TokenType
///
/// Distinguishes the two kinds of JWT this service signs. Access tokens
/// authenticate requests; refresh tokens only mint new access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims
///
/// Payload of every token issued by this service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id in the `users` table.
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
    pub token_type: TokenType,
}

/// An access/refresh pair handed out by POST /v1/auth/token/.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Signs a token of the given type for `user_id`, valid for the configured lifetime.
pub fn issue_token(user_id: i64, token_type: TokenType, config: &AppConfig) -> AppResult<String> {
    let now = now_secs();
    let ttl = match token_type {
        TokenType::Access => config.access_token_ttl_secs,
        TokenType::Refresh => config.refresh_token_ttl_secs,
    };
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + ttl) as usize,
        token_type,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

pub fn issue_token_pair(user_id: i64, config: &AppConfig) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access: issue_token(user_id, TokenType::Access, config)?,
        refresh: issue_token(user_id, TokenType::Refresh, config)?,
    })
}

/// Verifies signature and expiry and checks the token is of the expected type.
/// Every failure is a 401; the reason is only logged.
pub fn verify_token(token: &str, expected: TokenType, config: &AppConfig) -> AppResult<Claims> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Given token not valid for any token type".to_string())
        })?
        .claims;

    if claims.token_type != expected {
        tracing::debug!(?expected, actual = ?claims.token_type, "Token type mismatch");
        return Err(AppError::Unauthorized(
            "Given token not valid for this token type".to_string(),
        ));
    }
    Ok(claims)
}

/// Generates the opaque code mailed to a user and exchanged for a token.
pub fn generate_confirmation_code() -> String {
    Uuid::new_v4().simple().to_string()
}

/// AuthUser
///
/// The resolved identity of an authenticated request, reloaded from the
/// repository on every request so role changes and deletions apply immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }
}

/// Identity
///
/// Who is making the request. Passed explicitly to guards and handlers; an
/// absent `Authorization` header is `Anonymous`, a present but invalid one is
/// rejected with 401.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Anonymous,
    Authenticated(AuthUser),
}

impl Identity {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// Identity Extractor Implementation
///
/// 1. Reuses an identity already resolved by a route guard (request extensions).
/// 2. Extracts the `Bearer` token from the `Authorization` header.
/// 3. Verifies it as an access token.
/// 4. Loads the user; a token for a deleted user is rejected.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Identity::Anonymous);
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".to_string(),
                )
            })?;

        let config = AppConfig::from_ref(state);
        let claims = verify_token(token, TokenType::Access, &config)?;

        let repo = RepositoryState::from_ref(state);
        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        let identity = Identity::Authenticated(AuthUser::from(user));
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

/// AuthUser Extractor Implementation
///
/// Same resolution as `Identity`, but anonymous requests are rejected with 401.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await? {
            Identity::Authenticated(user) => Ok(user),
            Identity::Anonymous => Err(AppError::Unauthorized(
                "Authentication credentials were not provided.".to_string(),
            )),
        }
    }
}
