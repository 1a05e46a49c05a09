use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use media_reviews::{
    auth::{AuthUser, Identity},
    models::Role,
    permissions::{
        Access, admin_not_moderator, admin_or_read_only, authorize, owner_or_staff_or_read_only,
    },
};

// --- Test Utilities ---

fn identity(id: i64, role: Role, is_superuser: bool) -> Identity {
    Identity::Authenticated(AuthUser {
        id,
        username: format!("user{id}"),
        role,
        is_superuser,
    })
}

// --- Tests ---

#[test]
fn test_access_class_follows_method() {
    assert_eq!(Access::from(&Method::GET), Access::Read);
    assert_eq!(Access::from(&Method::HEAD), Access::Read);
    assert_eq!(Access::from(&Method::OPTIONS), Access::Read);
    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        assert_eq!(Access::from(&method), Access::Write, "{method}");
    }
}

#[test]
fn test_admin_or_read_only_matrix() {
    let cases = [
        (Identity::Anonymous, true, false),
        (identity(1, Role::User, false), true, false),
        (identity(2, Role::Moderator, false), true, false),
        (identity(3, Role::Admin, false), true, true),
        (identity(4, Role::User, true), true, true),
    ];

    for (who, read, write) in cases {
        assert_eq!(admin_or_read_only(&who, Access::Read), read, "{who:?} read");
        assert_eq!(admin_or_read_only(&who, Access::Write), write, "{who:?} write");
    }
}

#[test]
fn test_owner_or_staff_or_read_only_matrix() {
    let author_id = Some(1);
    let cases = [
        (Identity::Anonymous, false, false),
        (identity(1, Role::User, false), true, true),
        (identity(2, Role::User, false), true, false),
        (identity(3, Role::Moderator, false), true, true),
        (identity(4, Role::Admin, false), true, true),
        (identity(5, Role::User, true), true, true),
    ];

    for (who, create, edit) in cases {
        assert_eq!(
            owner_or_staff_or_read_only(&who, Access::Write, None),
            create,
            "{who:?} create"
        );
        assert_eq!(
            owner_or_staff_or_read_only(&who, Access::Write, author_id),
            edit,
            "{who:?} edit"
        );
        assert!(owner_or_staff_or_read_only(&who, Access::Read, author_id));
    }
}

#[test]
fn test_admin_not_moderator_matrix() {
    assert!(!admin_not_moderator(&Identity::Anonymous));
    assert!(!admin_not_moderator(&identity(1, Role::User, false)));
    assert!(!admin_not_moderator(&identity(2, Role::Moderator, false)));
    assert!(admin_not_moderator(&identity(3, Role::Admin, false)));
}

#[test]
fn test_authorize_distinguishes_anonymous_from_forbidden() {
    assert!(authorize(&Identity::Anonymous, true).is_ok());

    let anonymous = authorize(&Identity::Anonymous, false).unwrap_err();
    assert_eq!(anonymous.into_response().status(), StatusCode::UNAUTHORIZED);

    let user = authorize(&identity(1, Role::User, false), false).unwrap_err();
    assert_eq!(user.into_response().status(), StatusCode::FORBIDDEN);
}
