use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// Key used for errors that do not belong to a single request field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// FieldErrors
///
/// Field-level validation messages, serialized as `{"<field>": ["message", ...]}`.
/// A `BTreeMap` keeps the response body ordering stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding exactly one message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Turns a non-empty set into `AppError::Validation`.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// AppError
///
/// The single error type returned by handlers and repositories. Each variant maps
/// to exactly one HTTP status in the `IntoResponse` implementation below.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 400 with field-level messages.
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    /// 400 for bodies that could not be decoded at all.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401: no identity, or the bearer token could not be verified.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: authenticated, but the role or ownership check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    /// 404 for a page number outside the result set.
    #[error("invalid page")]
    InvalidPage,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias for handler and repository return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::InvalidPage => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a named unique constraint to the request field it protects and the
/// message reported for it. Both repository implementations go through here so
/// clients see the same body regardless of the backing store.
pub fn unique_violation(constraint: &str) -> FieldErrors {
    match constraint {
        "uq_reviews_author_title" => FieldErrors::single(
            NON_FIELD_ERRORS,
            "You have already reviewed this title.",
        ),
        "uq_categories_slug" => FieldErrors::single("slug", "category with this slug already exists."),
        "uq_genres_slug" => FieldErrors::single("slug", "genre with this slug already exists."),
        "uq_users_username" => {
            FieldErrors::single("username", "A user with that username already exists.")
        }
        "uq_users_email" => FieldErrors::single("email", "user with this email already exists."),
        other => FieldErrors::single(NON_FIELD_ERRORS, format!("Duplicate value violates {other}.")),
    }
}

/// Registration derives the username from the email, so a clash on that
/// username is reported against `email`, the only field the client sent.
pub fn email_taken_as_username() -> AppError {
    AppError::field("email", "A user with this email as username already exists.")
}

/// Message used when a slug reference in a write payload does not resolve.
pub fn missing_slug(slug: &str) -> String {
    format!("Object with slug={slug} does not exist.")
}

impl From<sqlx::Error> for AppError {
    /// Unique violations (23505) become validation errors on the guarded field;
    /// foreign key violations (23503) mean a referenced row vanished mid-request.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    return AppError::Validation(unique_violation(constraint));
                }
                Some("23503") => {
                    return AppError::field(NON_FIELD_ERRORS, "Referenced object no longer exists.");
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token encoding failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => json!(errors),
            AppError::BadRequest(detail)
            | AppError::Unauthorized(detail)
            | AppError::Forbidden(detail) => json!({ "detail": detail }),
            AppError::NotFound => json!({ "detail": "Not found." }),
            AppError::InvalidPage => json!({ "detail": "Invalid page." }),
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                json!({ "detail": "An internal error occurred." })
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                json!({ "detail": "An internal error occurred." })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_group_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("name", "This field is required.");
        errors.add("name", "Ensure this field has no more than 200 characters.");
        errors.add("slug", "This field is required.");

        let body = serde_json::to_value(&errors).unwrap();
        assert_eq!(body["name"].as_array().unwrap().len(), 2);
        assert_eq!(body["slug"][0], "This field is required.");
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn duplicate_review_is_a_non_field_error() {
        let errors = unique_violation("uq_reviews_author_title");
        assert!(errors.get(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn statuses_follow_variants() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::field("email", "This field is required.").status(),
            StatusCode::BAD_REQUEST
        );
    }
}
