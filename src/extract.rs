use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Payload
///
/// `Json<T>` with the rejection mapped to `AppError::BadRequest`, so malformed
/// or mistyped bodies answer 400 `{"detail": ...}` like every other client error
/// instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(AppError::BadRequest(rejection_detail(&rejection)))
            }
        }
    }
}

fn rejection_detail(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Unsupported media type; expected \"application/json\".".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "JSON parse error.".to_string(),
        _ => rejection.body_text(),
    }
}
