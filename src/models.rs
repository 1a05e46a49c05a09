use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::{AppResult, FieldErrors},
    validation,
};

// --- Accounts ---

/// Role
///
/// The closed set of account roles. Stored as lowercase text (`admin`, `moderator`,
/// `user`); roles are flat, so no variant implies another.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Moderator,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

/// Raised when the `role` column holds a value outside the enumeration.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            _ => Err(UnknownRole(value)),
        }
    }
}

/// User
///
/// The account record from the `users` table. Never serialized directly since it
/// carries the confirmation code; see `UserResponse`.
#[derive(Debug, Clone, FromRow, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_superuser: bool,
    pub confirmation_code: Option<String>,
}

/// Public representation of an account (GET /v1/users/..., GET /v1/users/me/).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

/// Body of POST/PATCH on /v1/users/ and PATCH /v1/users/me/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// A validated account ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub confirmation_code: String,
}

/// A validated partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UserRequest {
    fn check_present(&self, errors: &mut FieldErrors) {
        if let Some(username) = &self.username {
            validation::text(errors, "username", username, 150);
        }
        if let Some(email) = &self.email {
            validation::email(errors, "email", email);
        }
        if let Some(first_name) = &self.first_name {
            validation::max_length(errors, "first_name", first_name, 150);
        }
        if let Some(last_name) = &self.last_name {
            validation::max_length(errors, "last_name", last_name, 150);
        }
    }

    pub fn into_new_user(self, confirmation_code: String) -> AppResult<NewUser> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        let username = validation::required(&mut errors, "username", self.username);
        let email = validation::required(&mut errors, "email", self.email);
        errors.into_result()?;

        Ok(NewUser {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            confirmation_code,
        })
    }

    pub fn into_changes(self) -> AppResult<UserChanges> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        errors.into_result()?;

        Ok(UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        })
    }
}

// --- Authentication payloads ---

/// Body of POST /v1/auth/email/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RegisterRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RegisterResponse {
    pub email: String,
}

/// Body of POST /v1/auth/token/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Body of POST /v1/auth/token/refresh/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Issued bearer credentials. `refresh` is only present when a new pair is issued.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

// --- Catalog ---

/// Category
///
/// A top-level grouping for titles (e.g. "Films", "Books"), addressed by slug.
#[derive(
    Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq, Eq,
)]
#[ts(export)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

/// Genre
///
/// A tag attached to any number of titles, addressed by slug.
#[derive(
    Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq, Eq,
)]
#[ts(export)]
pub struct Genre {
    pub name: String,
    pub slug: String,
}

/// Body of POST /v1/categories/ and POST /v1/genres/.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CatalogEntryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// A validated category or genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub name: String,
    pub slug: String,
}

impl CatalogEntryRequest {
    pub fn validate(self) -> AppResult<NewCatalogEntry> {
        let mut errors = FieldErrors::new();
        let name = validation::required(&mut errors, "name", self.name);
        let slug = validation::required(&mut errors, "slug", self.slug);
        if let Some(name) = &name {
            validation::text(&mut errors, "name", name, 200);
        }
        if let Some(slug) = &slug {
            validation::slug(&mut errors, "slug", slug);
        }
        errors.into_result()?;

        Ok(NewCatalogEntry {
            name: name.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
        })
    }
}

/// Title
///
/// Read representation of a reviewable work. `rating` is the mean review score,
/// computed on every read; it is `None` while the title has no reviews.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub rating: Option<f64>,
    pub category: Option<Category>,
    pub genre: Vec<Genre>,
}

/// Body of POST/PUT/PATCH on /v1/titles/. Category and genres are referenced by slug.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category: Option<String>,
    pub genre: Vec<String>,
}

/// A validated title update. `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

impl TitleRequest {
    fn check_present(&self, errors: &mut FieldErrors) {
        if let Some(name) = &self.name {
            validation::text(errors, "name", name, 200);
        }
    }

    pub fn into_new_title(self) -> AppResult<NewTitle> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        let name = validation::required(&mut errors, "name", self.name);
        let year = validation::required(&mut errors, "year", self.year);
        errors.into_result()?;

        Ok(NewTitle {
            name: name.unwrap_or_default(),
            year: year.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category,
            genre: self.genre.unwrap_or_default(),
        })
    }

    /// Full replacement (PUT): required fields must be present and omitted
    /// optional ones are reset.
    pub fn into_replacement(self) -> AppResult<TitleChanges> {
        let title = self.into_new_title()?;
        Ok(TitleChanges {
            name: Some(title.name),
            year: Some(title.year),
            description: Some(title.description),
            category: Some(title.category),
            genre: Some(title.genre),
        })
    }

    /// Partial update (PATCH): only the provided fields change.
    pub fn into_changes(self) -> AppResult<TitleChanges> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        errors.into_result()?;

        Ok(TitleChanges {
            name: self.name,
            year: self.year,
            description: self.description,
            category: self.category.map(Some),
            genre: self.genre,
        })
    }
}

/// Optional filters on GET /v1/titles/.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::IntoParams)]
pub struct TitleFilter {
    /// Genre slug.
    pub genre: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
}

// --- Reviews & Comments ---

/// Review
///
/// A scored review of a title. `author` and `title` are rendered as the author's
/// username and the title's name; the ids stay internal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Review {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub score: i32,
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    pub title: String,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(skip)]
    pub title_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub text: String,
    pub score: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl ReviewRequest {
    fn check_present(&self, errors: &mut FieldErrors) {
        if let Some(text) = &self.text {
            validation::text(errors, "text", text, 2000);
        }
        if let Some(score) = self.score {
            validation::score(errors, "score", score);
        }
    }

    pub fn into_new_review(self) -> AppResult<NewReview> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        let text = validation::required(&mut errors, "text", self.text);
        let score = validation::required(&mut errors, "score", self.score);
        errors.into_result()?;

        Ok(NewReview {
            text: text.unwrap_or_default(),
            score: score.unwrap_or_default(),
        })
    }

    pub fn into_changes(self) -> AppResult<ReviewChanges> {
        let mut errors = FieldErrors::new();
        self.check_present(&mut errors);
        errors.into_result()?;

        Ok(ReviewChanges {
            text: self.text,
            score: self.score,
        })
    }
}

/// Comment
///
/// A reply attached to a review; the parent review is implied by the URL.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author: String,
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(skip)]
    pub review_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentRequest {
    pub text: Option<String>,
}

impl CommentRequest {
    /// Comments only carry text, so PUT, PATCH and POST all need it.
    pub fn into_text(self) -> AppResult<String> {
        let mut errors = FieldErrors::new();
        let text = validation::required(&mut errors, "text", self.text);
        if let Some(text) = &text {
            validation::text(&mut errors, "text", text, 200);
        }
        errors.into_result()?;
        Ok(text.unwrap_or_default())
    }
}

/// Free-text search on list endpoints that support it.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub search: Option<String>,
}
