use chrono::Utc;
use media_reviews::{
    AppError,
    error::FieldErrors,
    models::{
        CatalogEntryRequest, CommentRequest, Review, ReviewRequest, Role, TitleChanges,
        TitleRequest, TokenResponse, User, UserRequest, UserResponse,
    },
};
use serde_json::json;

// --- Test Utilities ---

fn field_errors(err: AppError) -> FieldErrors {
    match err {
        AppError::Validation(errors) => errors,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// --- Catalog ---

#[test]
fn test_catalog_entry_requires_name_and_slug() {
    let errors = field_errors(CatalogEntryRequest::default().validate().unwrap_err());

    assert_eq!(errors.get("name").unwrap()[0], "This field is required.");
    assert_eq!(errors.get("slug").unwrap()[0], "This field is required.");
}

#[test]
fn test_catalog_entry_rejects_blank_name_and_bad_slug() {
    let request = CatalogEntryRequest {
        name: Some("  ".to_string()),
        slug: Some("sci fi".to_string()),
    };
    let errors = field_errors(request.validate().unwrap_err());

    assert_eq!(errors.get("name").unwrap()[0], "This field may not be blank.");
    assert!(errors.get("slug").is_some());
}

// --- Titles ---

#[test]
fn test_title_create_requires_name_and_year() {
    let request = TitleRequest {
        description: Some("No name".to_string()),
        ..Default::default()
    };
    let errors = field_errors(request.into_new_title().unwrap_err());

    assert!(errors.get("name").is_some());
    assert!(errors.get("year").is_some());
    assert!(errors.get("description").is_none());
}

#[test]
fn test_title_replacement_resets_omitted_fields() {
    let request = TitleRequest {
        name: Some("Alien".to_string()),
        year: Some(1979),
        ..Default::default()
    };
    let changes = request.into_replacement().unwrap();

    assert_eq!(
        changes,
        TitleChanges {
            name: Some("Alien".to_string()),
            year: Some(1979),
            description: Some(String::new()),
            category: Some(None),
            genre: Some(Vec::new()),
        }
    );
}

#[test]
fn test_title_patch_keeps_omitted_fields() {
    let request = TitleRequest {
        category: Some("films".to_string()),
        ..Default::default()
    };
    let changes = request.into_changes().unwrap();

    assert_eq!(changes.name, None);
    assert_eq!(changes.genre, None);
    assert_eq!(changes.category, Some(Some("films".to_string())));
}

#[test]
fn test_title_patch_still_validates_present_fields() {
    let request = TitleRequest {
        name: Some(String::new()),
        ..Default::default()
    };
    let errors = field_errors(request.into_changes().unwrap_err());
    assert!(errors.get("name").is_some());
}

// --- Reviews & Comments ---

#[test]
fn test_review_score_must_be_between_one_and_ten() {
    for score in [0, 11, -3] {
        let request = ReviewRequest {
            text: Some("Fine".to_string()),
            score: Some(score),
        };
        let errors = field_errors(request.into_new_review().unwrap_err());
        assert!(errors.get("score").is_some(), "score {score}");
    }

    let request = ReviewRequest {
        text: Some("Fine".to_string()),
        score: Some(10),
    };
    assert_eq!(request.into_new_review().unwrap().score, 10);
}

#[test]
fn test_review_patch_allows_partial_payload() {
    let request = ReviewRequest {
        text: None,
        score: Some(3),
    };
    let changes = request.into_changes().unwrap();
    assert_eq!(changes.text, None);
    assert_eq!(changes.score, Some(3));
}

#[test]
fn test_comment_text_is_required() {
    let errors = field_errors(CommentRequest::default().into_text().unwrap_err());
    assert_eq!(errors.get("text").unwrap()[0], "This field is required.");
}

// --- Users ---

#[test]
fn test_user_create_requires_username_and_valid_email() {
    let request = UserRequest {
        username: Some("critic".to_string()),
        email: Some("not-an-email".to_string()),
        ..Default::default()
    };
    let errors = field_errors(request.into_new_user("code".to_string()).unwrap_err());
    assert!(errors.get("email").is_some());
    assert!(errors.get("username").is_none());

    let request = UserRequest {
        username: Some("critic".to_string()),
        email: Some("critic@example.com".to_string()),
        ..Default::default()
    };
    let user = request.into_new_user("code".to_string()).unwrap();
    assert_eq!(user.role, Role::User);
    assert_eq!(user.bio, "");
}

#[test]
fn test_role_parses_from_lowercase_json() {
    let request: UserRequest = serde_json::from_value(json!({ "role": "moderator" })).unwrap();
    assert_eq!(request.role, Some(Role::Moderator));

    let unknown = serde_json::from_value::<UserRequest>(json!({ "role": "owner" }));
    assert!(unknown.is_err());
}

// --- Serialization ---

#[test]
fn test_user_response_hides_id_and_confirmation_code() {
    let user = User {
        id: 7,
        username: "reader".to_string(),
        email: "reader@example.com".to_string(),
        confirmation_code: Some("secret".to_string()),
        ..Default::default()
    };

    let body = serde_json::to_value(UserResponse::from(user)).unwrap();
    assert_eq!(body["username"], "reader");
    assert_eq!(body["role"], "user");
    assert!(body.get("id").is_none());
    assert!(body.get("confirmation_code").is_none());
}

#[test]
fn test_review_serializes_names_not_ids() {
    let review = Review {
        id: 3,
        text: "Great".to_string(),
        author: "reader".to_string(),
        score: 9,
        pub_date: Utc::now(),
        title: "Alien".to_string(),
        author_id: 11,
        title_id: 12,
    };

    let body = serde_json::to_value(&review).unwrap();
    assert_eq!(body["author"], "reader");
    assert_eq!(body["title"], "Alien");
    assert!(body.get("author_id").is_none());
    assert!(body.get("title_id").is_none());
}

#[test]
fn test_access_token_response_omits_refresh() {
    let body = serde_json::to_value(TokenResponse {
        token: "abc".to_string(),
        refresh: None,
    })
    .unwrap();
    assert_eq!(body, json!({ "token": "abc" }));
}
