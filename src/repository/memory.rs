use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Listing, Repository};
use crate::{
    error::{
        AppError, AppResult, FieldErrors, email_taken_as_username, missing_slug, unique_violation,
    },
    models::{
        Category, Comment, Genre, NewCatalogEntry, NewReview, NewTitle, NewUser, Review,
        ReviewChanges, Title, TitleChanges, TitleFilter, User, UserChanges,
    },
    pagination::PageRequest,
};

#[derive(Debug, Clone)]
struct CatalogRecord {
    name: String,
    slug: String,
}

#[derive(Debug, Clone)]
struct TitleRecord {
    name: String,
    year: i32,
    description: String,
    category_id: Option<i64>,
    genre_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
struct ReviewRecord {
    title_id: i64,
    author_id: i64,
    text: String,
    score: i32,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    review_id: i64,
    author_id: i64,
    text: String,
    pub_date: DateTime<Utc>,
}

/// Tables keyed by id. `BTreeMap` iteration gives id order for free.
#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, CatalogRecord>,
    genres: BTreeMap<i64, CatalogRecord>,
    titles: BTreeMap<i64, TitleRecord>,
    reviews: BTreeMap<i64, ReviewRecord>,
    comments: BTreeMap<i64, CommentRecord>,
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Listing<T> {
    let count = items.len() as i64;
    let results = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (results, count)
}

/// Catalog rows ordered by name, then id, optionally narrowed to an exact name.
fn catalog_listing(
    table: &BTreeMap<i64, CatalogRecord>,
    search: Option<&str>,
) -> Vec<(i64, CatalogRecord)> {
    let mut rows: Vec<(i64, CatalogRecord)> = table
        .iter()
        .filter(|(_, record)| search.is_none_or(|name| record.name == name))
        .map(|(id, record)| (*id, record.clone()))
        .collect();
    rows.sort_by(|(a_id, a), (b_id, b)| a.name.cmp(&b.name).then(a_id.cmp(b_id)));
    rows
}

fn find_slug(table: &BTreeMap<i64, CatalogRecord>, slug: &str) -> Option<i64> {
    table
        .iter()
        .find(|(_, record)| record.slug == slug)
        .map(|(id, _)| *id)
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.username == username && Some(user.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<i64>) -> AppResult<()> {
        if self.username_taken(username, except) {
            return Err(AppError::Validation(unique_violation("uq_users_username")));
        }
        if self.email_taken(email, except) {
            return Err(AppError::Validation(unique_violation("uq_users_email")));
        }
        Ok(())
    }

    fn insert_catalog(
        &mut self,
        entry: NewCatalogEntry,
        genres: bool,
    ) -> AppResult<CatalogRecord> {
        let (table, constraint) = if genres {
            (&self.genres, "uq_genres_slug")
        } else {
            (&self.categories, "uq_categories_slug")
        };
        if find_slug(table, &entry.slug).is_some() {
            return Err(AppError::Validation(unique_violation(constraint)));
        }

        let id = self.next_id();
        let record = CatalogRecord {
            name: entry.name,
            slug: entry.slug,
        };
        let table = if genres {
            &mut self.genres
        } else {
            &mut self.categories
        };
        table.insert(id, record.clone());
        Ok(record)
    }

    fn resolve_category(&self, slug: &str) -> AppResult<i64> {
        find_slug(&self.categories, slug).ok_or_else(|| AppError::field("category", missing_slug(slug)))
    }

    /// Resolves genre slugs, reporting all unknown ones together. Duplicates collapse.
    fn resolve_genres(&self, slugs: &[String]) -> AppResult<Vec<i64>> {
        let mut ids: Vec<i64> = Vec::with_capacity(slugs.len());
        let mut errors = FieldErrors::new();
        for slug in slugs {
            match find_slug(&self.genres, slug) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => errors.add("genre", missing_slug(slug)),
            }
        }
        errors.into_result()?;
        Ok(ids)
    }

    fn rating(&self, title_id: i64) -> Option<f64> {
        let scores: Vec<i32> = self
            .reviews
            .values()
            .filter(|review| review.title_id == title_id)
            .map(|review| review.score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let total: i64 = scores.iter().map(|score| i64::from(*score)).sum();
        Some(total as f64 / scores.len() as f64)
    }

    fn render_title(&self, id: i64, record: &TitleRecord) -> Title {
        let category = record
            .category_id
            .and_then(|category_id| self.categories.get(&category_id))
            .map(|c| Category {
                name: c.name.clone(),
                slug: c.slug.clone(),
            });

        let mut genre: Vec<(i64, Genre)> = record
            .genre_ids
            .iter()
            .filter_map(|genre_id| {
                self.genres.get(genre_id).map(|g| {
                    (
                        *genre_id,
                        Genre {
                            name: g.name.clone(),
                            slug: g.slug.clone(),
                        },
                    )
                })
            })
            .collect();
        genre.sort_by(|(a_id, a), (b_id, b)| a.name.cmp(&b.name).then(a_id.cmp(b_id)));

        Title {
            id,
            name: record.name.clone(),
            year: record.year,
            description: record.description.clone(),
            rating: self.rating(id),
            category,
            genre: genre.into_iter().map(|(_, genre)| genre).collect(),
        }
    }

    fn title_matches(&self, record: &TitleRecord, filter: &TitleFilter) -> bool {
        if let Some(slug) = &filter.genre {
            let tagged = record
                .genre_ids
                .iter()
                .any(|id| self.genres.get(id).is_some_and(|g| &g.slug == slug));
            if !tagged {
                return false;
            }
        }
        if let Some(slug) = &filter.category {
            let in_category = record
                .category_id
                .and_then(|id| self.categories.get(&id))
                .is_some_and(|c| &c.slug == slug);
            if !in_category {
                return false;
            }
        }
        if filter.year.is_some_and(|year| record.year != year) {
            return false;
        }
        if let Some(name) = &filter.name {
            if !record.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }

    fn username_of(&self, user_id: i64) -> String {
        self.users
            .get(&user_id)
            .map(|user| user.username.clone())
            .unwrap_or_default()
    }

    fn render_review(&self, id: i64, record: &ReviewRecord) -> Review {
        Review {
            id,
            text: record.text.clone(),
            author: self.username_of(record.author_id),
            score: record.score,
            pub_date: record.pub_date,
            title: self
                .titles
                .get(&record.title_id)
                .map(|title| title.name.clone())
                .unwrap_or_default(),
            author_id: record.author_id,
            title_id: record.title_id,
        }
    }

    fn render_comment(&self, id: i64, record: &CommentRecord) -> Comment {
        Comment {
            id,
            text: record.text.clone(),
            author: self.username_of(record.author_id),
            pub_date: record.pub_date,
            author_id: record.author_id,
            review_id: record.review_id,
        }
    }

    /// Removes the given reviews along with their comments.
    fn drop_reviews(&mut self, review_ids: &[i64]) {
        for id in review_ids {
            self.reviews.remove(id);
        }
        self.comments
            .retain(|_, comment| !review_ids.contains(&comment.review_id));
    }
}

/// MemoryRepository
///
/// A `Repository` held entirely in process memory. Every operation runs under a
/// single lock, so uniqueness checks and the writes they guard are atomic.
/// Used for local runs without `DATABASE_URL` and by the HTTP test suites.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: Mutex<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> AppResult<MutexGuard<'_, Store>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    /// Inserts an account with an explicit role and superuser flag. Accounts
    /// created through the API can never be superusers; tests and local
    /// bootstrap use this to seed staff accounts.
    pub fn seed_user(&self, user: NewUser, is_superuser: bool) -> AppResult<User> {
        let mut store = self.store()?;
        store.check_user_unique(&user.username, &user.email, None)?;

        let id = store.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
            is_superuser,
            confirmation_code: Some(user.confirmation_code),
        };
        store.users.insert(id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- USERS ---

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.store()?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let store = self.store()?;
        Ok(store
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        confirmation_code: &str,
    ) -> AppResult<Option<User>> {
        let store = self.store()?;
        Ok(store
            .users
            .values()
            .find(|user| {
                user.email == email && user.confirmation_code.as_deref() == Some(confirmation_code)
            })
            .cloned())
    }

    async fn register_user(&self, email: &str, confirmation_code: &str) -> AppResult<User> {
        let mut store = self.store()?;

        if let Some(user) = store.users.values_mut().find(|user| user.email == email) {
            if user.confirmation_code.is_none() {
                user.confirmation_code = Some(confirmation_code.to_string());
            }
            return Ok(user.clone());
        }

        if store.username_taken(email, None) {
            return Err(email_taken_as_username());
        }
        store.check_user_unique(email, email, None)?;
        let id = store.next_id();
        let user = User {
            id,
            username: email.to_string(),
            email: email.to_string(),
            confirmation_code: Some(confirmation_code.to_string()),
            ..User::default()
        };
        store.users.insert(id, user.clone());
        tracing::info!(user_id = id, "User registered");
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.seed_user(user, false)
    }

    async fn list_users(&self, search: Option<&str>, page: PageRequest) -> AppResult<Listing<User>> {
        let store = self.store()?;
        let needle = search.map(str::to_lowercase);
        let users = store
            .users
            .values()
            .filter(|user| {
                needle
                    .as_deref()
                    .is_none_or(|needle| user.username.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        Ok(paginate(users, page))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<User>> {
        let mut store = self.store()?;
        let Some(current) = store.users.get(&id).cloned() else {
            return Ok(None);
        };

        let username = changes.username.unwrap_or(current.username.clone());
        let email = changes.email.unwrap_or(current.email.clone());
        store.check_user_unique(&username, &email, Some(id))?;

        let updated = User {
            username,
            email,
            first_name: changes.first_name.unwrap_or(current.first_name.clone()),
            last_name: changes.last_name.unwrap_or(current.last_name.clone()),
            bio: changes.bio.unwrap_or(current.bio.clone()),
            role: changes.role.unwrap_or(current.role),
            ..current
        };
        store.users.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_user(&self, username: &str) -> AppResult<bool> {
        let mut store = self.store()?;
        let Some(id) = store
            .users
            .values()
            .find(|user| user.username == username)
            .map(|user| user.id)
        else {
            return Ok(false);
        };

        store.users.remove(&id);
        let authored: Vec<i64> = store
            .reviews
            .iter()
            .filter(|(_, review)| review.author_id == id)
            .map(|(review_id, _)| *review_id)
            .collect();
        store.drop_reviews(&authored);
        store.comments.retain(|_, comment| comment.author_id != id);
        Ok(true)
    }

    // --- CATALOG ---

    async fn list_categories(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Listing<Category>> {
        let store = self.store()?;
        let rows = catalog_listing(&store.categories, search)
            .into_iter()
            .map(|(_, record)| Category {
                name: record.name,
                slug: record.slug,
            })
            .collect();
        Ok(paginate(rows, page))
    }

    async fn create_category(&self, entry: NewCatalogEntry) -> AppResult<Category> {
        let record = self.store()?.insert_catalog(entry, false)?;
        Ok(Category {
            name: record.name,
            slug: record.slug,
        })
    }

    async fn delete_category(&self, slug: &str) -> AppResult<bool> {
        let mut store = self.store()?;
        let Some(id) = find_slug(&store.categories, slug) else {
            return Ok(false);
        };
        store.categories.remove(&id);
        for title in store.titles.values_mut() {
            if title.category_id == Some(id) {
                title.category_id = None;
            }
        }
        Ok(true)
    }

    async fn list_genres(&self, search: Option<&str>, page: PageRequest) -> AppResult<Listing<Genre>> {
        let store = self.store()?;
        let rows = catalog_listing(&store.genres, search)
            .into_iter()
            .map(|(_, record)| Genre {
                name: record.name,
                slug: record.slug,
            })
            .collect();
        Ok(paginate(rows, page))
    }

    async fn create_genre(&self, entry: NewCatalogEntry) -> AppResult<Genre> {
        let record = self.store()?.insert_catalog(entry, true)?;
        Ok(Genre {
            name: record.name,
            slug: record.slug,
        })
    }

    async fn delete_genre(&self, slug: &str) -> AppResult<bool> {
        let mut store = self.store()?;
        let Some(id) = find_slug(&store.genres, slug) else {
            return Ok(false);
        };
        store.genres.remove(&id);
        for title in store.titles.values_mut() {
            title.genre_ids.retain(|genre_id| *genre_id != id);
        }
        Ok(true)
    }

    // --- TITLES ---

    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest) -> AppResult<Listing<Title>> {
        let store = self.store()?;
        let titles = store
            .titles
            .iter()
            .filter(|(_, record)| store.title_matches(record, filter))
            .map(|(id, record)| store.render_title(*id, record))
            .collect();
        Ok(paginate(titles, page))
    }

    async fn get_title(&self, id: i64) -> AppResult<Option<Title>> {
        let store = self.store()?;
        Ok(store
            .titles
            .get(&id)
            .map(|record| store.render_title(id, record)))
    }

    async fn create_title(&self, title: NewTitle) -> AppResult<Title> {
        let mut store = self.store()?;
        let category_id = match &title.category {
            Some(slug) => Some(store.resolve_category(slug)?),
            None => None,
        };
        let genre_ids = store.resolve_genres(&title.genre)?;

        let id = store.next_id();
        let record = TitleRecord {
            name: title.name,
            year: title.year,
            description: title.description,
            category_id,
            genre_ids,
        };
        let rendered = store.render_title(id, &record);
        store.titles.insert(id, record);
        tracing::info!(title_id = id, "Title created");
        Ok(rendered)
    }

    async fn update_title(&self, id: i64, changes: TitleChanges) -> AppResult<Option<Title>> {
        let mut store = self.store()?;
        let Some(mut record) = store.titles.get(&id).cloned() else {
            return Ok(None);
        };

        match &changes.category {
            Some(Some(slug)) => record.category_id = Some(store.resolve_category(slug)?),
            Some(None) => record.category_id = None,
            None => {}
        }
        if let Some(slugs) = &changes.genre {
            record.genre_ids = store.resolve_genres(slugs)?;
        }
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(year) = changes.year {
            record.year = year;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }

        let rendered = store.render_title(id, &record);
        store.titles.insert(id, record);
        Ok(Some(rendered))
    }

    async fn delete_title(&self, id: i64) -> AppResult<bool> {
        let mut store = self.store()?;
        if store.titles.remove(&id).is_none() {
            return Ok(false);
        }
        let reviews: Vec<i64> = store
            .reviews
            .iter()
            .filter(|(_, review)| review.title_id == id)
            .map(|(review_id, _)| *review_id)
            .collect();
        store.drop_reviews(&reviews);
        Ok(true)
    }

    // --- REVIEWS ---

    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> AppResult<Listing<Review>> {
        let store = self.store()?;
        let reviews = store
            .reviews
            .iter()
            .filter(|(_, review)| review.title_id == title_id)
            .map(|(id, review)| store.render_review(*id, review))
            .collect();
        Ok(paginate(reviews, page))
    }

    async fn get_review(&self, title_id: i64, review_id: i64) -> AppResult<Option<Review>> {
        let store = self.store()?;
        Ok(store
            .reviews
            .get(&review_id)
            .filter(|review| review.title_id == title_id)
            .map(|review| store.render_review(review_id, review)))
    }

    async fn create_review(
        &self,
        title_id: i64,
        author_id: i64,
        review: NewReview,
    ) -> AppResult<Review> {
        let mut store = self.store()?;
        if !store.titles.contains_key(&title_id) || !store.users.contains_key(&author_id) {
            return Err(AppError::NotFound);
        }
        let duplicate = store
            .reviews
            .values()
            .any(|existing| existing.title_id == title_id && existing.author_id == author_id);
        if duplicate {
            return Err(AppError::Validation(unique_violation("uq_reviews_author_title")));
        }

        let id = store.next_id();
        let record = ReviewRecord {
            title_id,
            author_id,
            text: review.text,
            score: review.score,
            pub_date: Utc::now(),
        };
        let rendered = store.render_review(id, &record);
        store.reviews.insert(id, record);
        tracing::info!(review_id = id, title_id, author_id, "Review created");
        Ok(rendered)
    }

    async fn update_review(
        &self,
        title_id: i64,
        review_id: i64,
        changes: ReviewChanges,
    ) -> AppResult<Option<Review>> {
        let mut store = self.store()?;
        let Some(mut record) = store
            .reviews
            .get(&review_id)
            .filter(|review| review.title_id == title_id)
            .cloned()
        else {
            return Ok(None);
        };

        if let Some(text) = changes.text {
            record.text = text;
        }
        if let Some(score) = changes.score {
            record.score = score;
        }
        record.pub_date = Utc::now();

        let rendered = store.render_review(review_id, &record);
        store.reviews.insert(review_id, record);
        Ok(Some(rendered))
    }

    async fn delete_review(&self, title_id: i64, review_id: i64) -> AppResult<bool> {
        let mut store = self.store()?;
        let belongs = store
            .reviews
            .get(&review_id)
            .is_some_and(|review| review.title_id == title_id);
        if belongs {
            store.drop_reviews(&[review_id]);
        }
        Ok(belongs)
    }

    // --- COMMENTS ---

    async fn list_comments(&self, review_id: i64, page: PageRequest) -> AppResult<Listing<Comment>> {
        let store = self.store()?;
        let comments = store
            .comments
            .iter()
            .filter(|(_, comment)| comment.review_id == review_id)
            .map(|(id, comment)| store.render_comment(*id, comment))
            .collect();
        Ok(paginate(comments, page))
    }

    async fn get_comment(&self, review_id: i64, comment_id: i64) -> AppResult<Option<Comment>> {
        let store = self.store()?;
        Ok(store
            .comments
            .get(&comment_id)
            .filter(|comment| comment.review_id == review_id)
            .map(|comment| store.render_comment(comment_id, comment)))
    }

    async fn create_comment(&self, review_id: i64, author_id: i64, text: String) -> AppResult<Comment> {
        let mut store = self.store()?;
        if !store.reviews.contains_key(&review_id) || !store.users.contains_key(&author_id) {
            return Err(AppError::NotFound);
        }

        let id = store.next_id();
        let record = CommentRecord {
            review_id,
            author_id,
            text,
            pub_date: Utc::now(),
        };
        let rendered = store.render_comment(id, &record);
        store.comments.insert(id, record);
        tracing::info!(comment_id = id, review_id, author_id, "Comment created");
        Ok(rendered)
    }

    async fn update_comment(
        &self,
        review_id: i64,
        comment_id: i64,
        text: String,
    ) -> AppResult<Option<Comment>> {
        let mut store = self.store()?;
        let Some(record) = store
            .comments
            .get_mut(&comment_id)
            .filter(|comment| comment.review_id == review_id)
        else {
            return Ok(None);
        };
        record.text = text;
        record.pub_date = Utc::now();
        let record = record.clone();
        Ok(Some(store.render_comment(comment_id, &record)))
    }

    async fn delete_comment(&self, review_id: i64, comment_id: i64) -> AppResult<bool> {
        let mut store = self.store()?;
        let belongs = store
            .comments
            .get(&comment_id)
            .is_some_and(|comment| comment.review_id == review_id);
        if belongs {
            store.comments.remove(&comment_id);
        }
        Ok(belongs)
    }
}
