//! Authorization predicates.
//!
//! Each predicate is a pure function of (identity, access, optional target) and
//! answers yes/no. `authorize` turns a "no" into the right HTTP error: 401 for
//! anonymous callers, 403 for authenticated ones.

use axum::http::Method;

use crate::{
    auth::Identity,
    error::{AppError, AppResult},
    models::Role,
};

/// Access
///
/// The method class of a request: `Read` for GET, HEAD and OPTIONS, `Write` for
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl From<&Method> for Access {
    fn from(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS {
            Access::Read
        } else {
            Access::Write
        }
    }
}

/// Reads are open to anyone; writes need the admin role or a superuser.
pub fn admin_or_read_only(identity: &Identity, access: Access) -> bool {
    match access {
        Access::Read => true,
        Access::Write => identity
            .user()
            .is_some_and(|user| user.is_superuser || user.role == Role::Admin),
    }
}

/// Reads are open to anyone. Writes need an authenticated caller and, when the
/// target object is known (`author_id`), that the caller wrote it or is staff
/// (moderator, admin, superuser).
pub fn owner_or_staff_or_read_only(
    identity: &Identity,
    access: Access,
    author_id: Option<i64>,
) -> bool {
    if access == Access::Read {
        return true;
    }
    let Some(user) = identity.user() else {
        return false;
    };
    match author_id {
        None => true,
        Some(author_id) => {
            user.id == author_id
                || user.is_superuser
                || matches!(user.role, Role::Moderator | Role::Admin)
        }
    }
}

/// Every method needs the admin role. Moderators are refused.
pub fn admin_not_moderator(identity: &Identity) -> bool {
    identity
        .user()
        .is_some_and(|user| match user.role {
            Role::Admin => true,
            Role::Moderator | Role::User => false,
        })
}

/// Maps a predicate's answer to a result.
pub fn authorize(identity: &Identity, allowed: bool) -> AppResult<()> {
    if allowed {
        return Ok(());
    }
    match identity {
        Identity::Anonymous => Err(AppError::Unauthorized(
            "Authentication credentials were not provided.".to_string(),
        )),
        Identity::Authenticated(user) => {
            tracing::debug!(user_id = user.id, role = user.role.as_str(), "Permission denied");
            Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}
