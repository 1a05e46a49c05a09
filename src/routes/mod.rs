//! Router Module Index
//!
//! Routes are grouped by the permission class that guards them. Each group
//! attaches its guard with `route_layer`, so the check runs before any handler
//! in the group and cannot be forgotten on a single endpoint.

/// Health probe and the token flow. No guard.
pub mod public;

/// Categories, genres and titles: reads open, writes for admins.
pub mod catalog;

/// Reviews and comments: reads open, writes for authenticated users; ownership
/// of an existing object is checked in the handlers.
pub mod reviews;

/// `/v1/users/me/`: any authenticated user.
pub mod authenticated;

/// Account management: admins only, moderators included in the refusal.
pub mod admin;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{
    auth::Identity,
    error::AppError,
    permissions::{self, Access, authorize},
};

/// Guard for `catalog` routes.
pub async fn admin_or_read_only(
    identity: Identity,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = Access::from(request.method());
    authorize(&identity, permissions::admin_or_read_only(&identity, access))?;
    Ok(next.run(request).await)
}

/// Guard for `reviews` routes. The target object is not known yet at this
/// point, so only authentication is enforced for writes.
pub async fn owner_or_staff_or_read_only(
    identity: Identity,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = Access::from(request.method());
    authorize(
        &identity,
        permissions::owner_or_staff_or_read_only(&identity, access, None),
    )?;
    Ok(next.run(request).await)
}

/// Guard for `admin` routes, applied to every method including reads.
pub async fn admin_not_moderator(
    identity: Identity,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&identity, permissions::admin_not_moderator(&identity))?;
    Ok(next.run(request).await)
}
