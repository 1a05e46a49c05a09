use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        Category, Comment, Genre, NewCatalogEntry, NewReview, NewTitle, NewUser, Review,
        ReviewChanges, Title, TitleChanges, TitleFilter, User, UserChanges,
    },
    pagination::PageRequest,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// One page of rows plus the total row count of the unpaginated query.
pub type Listing<T> = (Vec<T>, i64);

/// Repository Trait
///
/// The persistence contract used by handlers and the auth extractor. Both
/// implementations enforce uniqueness (slugs, usernames, emails, one review per
/// author and title) inside the store itself, so concurrent writers cannot slip
/// a duplicate past a check-then-insert.
///
/// Nested lookups take every ancestor id: a review is only found under its own
/// title, a comment only under its own review.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Exact match on both fields; used for token issuance.
    async fn find_user_by_credentials(
        &self,
        email: &str,
        confirmation_code: &str,
    ) -> AppResult<Option<User>>;
    /// Lookup-or-create by email. A new account gets `username = email` and the
    /// given code; an existing one keeps its code (or adopts this one if it had none).
    async fn register_user(&self, email: &str, confirmation_code: &str) -> AppResult<User>;
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn list_users(&self, search: Option<&str>, page: PageRequest)
    -> AppResult<Listing<User>>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<User>>;
    async fn delete_user(&self, username: &str) -> AppResult<bool>;

    // --- Catalog ---
    /// `search` matches the name exactly.
    async fn list_categories(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Listing<Category>>;
    async fn create_category(&self, entry: NewCatalogEntry) -> AppResult<Category>;
    /// Titles in the category keep existing with no category.
    async fn delete_category(&self, slug: &str) -> AppResult<bool>;

    async fn list_genres(&self, search: Option<&str>, page: PageRequest)
    -> AppResult<Listing<Genre>>;
    async fn create_genre(&self, entry: NewCatalogEntry) -> AppResult<Genre>;
    async fn delete_genre(&self, slug: &str) -> AppResult<bool>;

    // --- Titles ---
    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest)
    -> AppResult<Listing<Title>>;
    async fn get_title(&self, id: i64) -> AppResult<Option<Title>>;
    /// Unknown category or genre slugs fail validation on that field.
    async fn create_title(&self, title: NewTitle) -> AppResult<Title>;
    async fn update_title(&self, id: i64, changes: TitleChanges) -> AppResult<Option<Title>>;
    /// Cascades to the title's reviews and their comments.
    async fn delete_title(&self, id: i64) -> AppResult<bool>;

    // --- Reviews ---
    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> AppResult<Listing<Review>>;
    async fn get_review(&self, title_id: i64, review_id: i64) -> AppResult<Option<Review>>;
    /// A second review by the same author for the same title fails validation.
    async fn create_review(
        &self,
        title_id: i64,
        author_id: i64,
        review: NewReview,
    ) -> AppResult<Review>;
    async fn update_review(
        &self,
        title_id: i64,
        review_id: i64,
        changes: ReviewChanges,
    ) -> AppResult<Option<Review>>;
    /// Cascades to the review's comments.
    async fn delete_review(&self, title_id: i64, review_id: i64) -> AppResult<bool>;

    // --- Comments ---
    async fn list_comments(&self, review_id: i64, page: PageRequest)
    -> AppResult<Listing<Comment>>;
    async fn get_comment(&self, review_id: i64, comment_id: i64) -> AppResult<Option<Comment>>;
    async fn create_comment(&self, review_id: i64, author_id: i64, text: String)
    -> AppResult<Comment>;
    async fn update_comment(
        &self,
        review_id: i64,
        comment_id: i64,
        text: String,
    ) -> AppResult<Option<Comment>>;
    async fn delete_comment(&self, review_id: i64, comment_id: i64) -> AppResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
