use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, query_builder::QueryBuilder};

use super::{Listing, Repository};
use crate::{
    error::{AppError, AppResult, FieldErrors, email_taken_as_username, missing_slug},
    models::{
        Category, Comment, Genre, NewCatalogEntry, NewReview, NewTitle, NewUser, Review,
        ReviewChanges, Title, TitleChanges, TitleFilter, User, UserChanges,
    },
    pagination::PageRequest,
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, bio, role, is_superuser, confirmation_code";

const TITLE_SELECT: &str = r#"
    SELECT
        t.id, t.name, t.year, t.description,
        c.name AS category_name, c.slug AS category_slug,
        (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
    WHERE TRUE
"#;

const TITLE_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
    WHERE TRUE
"#;

const REVIEW_SELECT: &str = r#"
    SELECT
        r.id, r.text, u.username AS author, r.score, r.pub_date,
        t.name AS title, r.author_id, r.title_id
    FROM reviews r
    JOIN users u ON u.id = r.author_id
    JOIN titles t ON t.id = r.title_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.text, u.username AS author, c.pub_date, c.author_id, c.review_id
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// Flat title row; category and genres are stitched on afterwards.
#[derive(FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: String,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<f64>,
}

#[derive(FromRow)]
struct TitleGenreRow {
    title_id: i64,
    name: String,
    slug: String,
}

/// Which slug-addressed catalog table an operation targets.
#[derive(Clone, Copy)]
enum Catalog {
    Categories,
    Genres,
}

impl Catalog {
    fn table(self) -> &'static str {
        match self {
            Catalog::Categories => "categories",
            Catalog::Genres => "genres",
        }
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Uniqueness and
/// cascades live in the schema (`migrations/`); violations come back through
/// `From<sqlx::Error> for AppError`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_catalog(
        &self,
        catalog: Catalog,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Listing<Category>> {
        let table = catalog.table();
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE ($1::text IS NULL OR name = $1)"
        ))
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT name, slug FROM {table} WHERE ($1::text IS NULL OR name = $1) \
             ORDER BY name, id LIMIT $2 OFFSET $3"
        ))
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, count))
    }

    async fn create_catalog(&self, catalog: Catalog, entry: NewCatalogEntry) -> AppResult<Category> {
        let table = catalog.table();
        let row = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO {table} (name, slug) VALUES ($1, $2) RETURNING name, slug"
        ))
        .bind(&entry.name)
        .bind(&entry.slug)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(table, slug = %row.slug, "Catalog entry created");
        Ok(row)
    }

    async fn delete_catalog(&self, catalog: Catalog, slug: &str) -> AppResult<bool> {
        let table = catalog.table();
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE slug = $1"))
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Loads genres for a batch of titles in one query, keyed by title id.
    async fn genres_for(&self, title_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Genre>>> {
        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name, g.id
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_title: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            by_title.entry(row.title_id).or_default().push(Genre {
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(by_title)
    }

    async fn assemble_titles(&self, rows: Vec<TitleRow>) -> AppResult<Vec<Title>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut genres = self.genres_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| Title {
                genre: genres.remove(&row.id).unwrap_or_default(),
                category: match (row.category_name, row.category_slug) {
                    (Some(name), Some(slug)) => Some(Category { name, slug }),
                    _ => None,
                },
                id: row.id,
                name: row.name,
                year: row.year,
                description: row.description,
                rating: row.rating,
            })
            .collect())
    }
}

/// Appends the optional title filters shared by the row and count queries.
fn push_title_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TitleFilter) {
    if let Some(genre) = &filter.genre {
        builder.push(
            " AND EXISTS (SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = t.id AND g.slug = ",
        );
        builder.push_bind(genre.clone());
        builder.push(")");
    }
    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ");
        builder.push_bind(category.clone());
    }
    if let Some(year) = filter.year {
        builder.push(" AND t.year = ");
        builder.push_bind(year);
    }
    if let Some(name) = &filter.name {
        builder.push(" AND t.name ILIKE ");
        builder.push_bind(format!("%{name}%"));
    }
}

async fn resolve_category(conn: &mut PgConnection, slug: &str) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::field("category", missing_slug(slug)))
}

/// Resolves every genre slug in one query, reporting all unknown ones together.
async fn resolve_genres(conn: &mut PgConnection, slugs: &[String]) -> AppResult<Vec<i64>> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, slug FROM genres WHERE slug = ANY($1)")
        .bind(slugs)
        .fetch_all(conn)
        .await?;
    let found: HashMap<&str, i64> = rows.iter().map(|(id, slug)| (slug.as_str(), *id)).collect();

    let mut ids = Vec::with_capacity(slugs.len());
    let mut errors = FieldErrors::new();
    for slug in slugs {
        match found.get(slug.as_str()) {
            Some(id) => ids.push(*id),
            None => errors.add("genre", missing_slug(slug)),
        }
    }
    errors.into_result()?;
    Ok(ids)
}

async fn replace_genres(conn: &mut PgConnection, title_id: i64, genre_ids: &[i64]) -> AppResult<()> {
    sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
        .bind(title_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO title_genres (title_id, genre_id) \
         SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
    )
    .bind(title_id)
    .bind(genre_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_credentials(
        &self,
        email: &str,
        confirmation_code: &str,
    ) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND confirmation_code = $2"
        ))
        .bind(email)
        .bind(confirmation_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// register_user
    ///
    /// A single upsert keyed on `email`, so two concurrent registrations of the
    /// same address end with one row. An existing code is never replaced.
    async fn register_user(&self, email: &str, confirmation_code: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, confirmation_code)
            VALUES ($1, $1, $2)
            ON CONFLICT (email) DO UPDATE
                SET confirmation_code = COALESCE(users.confirmation_code, EXCLUDED.confirmation_code)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(confirmation_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.constraint() == Some("uq_users_username") => {
                email_taken_as_username()
            }
            _ => AppError::from(err),
        })?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, bio, role, confirmation_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.bio)
        .bind(user.role.as_str())
        .bind(&user.confirmation_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self, search: Option<&str>, page: PageRequest) -> AppResult<Listing<User>> {
        let pattern = search.map(|s| format!("%{s}%"));

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR username ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::text IS NULL OR username ILIKE $1) \
             ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((users, count))
    }

    /// update_user
    ///
    /// `COALESCE` keeps the stored value for every field left as `None`.
    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.bio)
        .bind(changes.role.map(|role| role.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, username: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- CATALOG ---

    async fn list_categories(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Listing<Category>> {
        self.list_catalog(Catalog::Categories, search, page).await
    }

    async fn create_category(&self, entry: NewCatalogEntry) -> AppResult<Category> {
        self.create_catalog(Catalog::Categories, entry).await
    }

    async fn delete_category(&self, slug: &str) -> AppResult<bool> {
        self.delete_catalog(Catalog::Categories, slug).await
    }

    async fn list_genres(&self, search: Option<&str>, page: PageRequest) -> AppResult<Listing<Genre>> {
        let (rows, count) = self.list_catalog(Catalog::Genres, search, page).await?;
        let genres = rows
            .into_iter()
            .map(|row| Genre {
                name: row.name,
                slug: row.slug,
            })
            .collect();
        Ok((genres, count))
    }

    async fn create_genre(&self, entry: NewCatalogEntry) -> AppResult<Genre> {
        let row = self.create_catalog(Catalog::Genres, entry).await?;
        Ok(Genre {
            name: row.name,
            slug: row.slug,
        })
    }

    async fn delete_genre(&self, slug: &str) -> AppResult<bool> {
        self.delete_catalog(Catalog::Genres, slug).await
    }

    // --- TITLES ---

    /// list_titles
    ///
    /// Filters are appended with `QueryBuilder` so every value is bound, never
    /// interpolated. The count query shares the same filter clause.
    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest) -> AppResult<Listing<Title>> {
        let mut count_builder: QueryBuilder<Postgres> = QueryBuilder::new(TITLE_COUNT);
        push_title_filters(&mut count_builder, filter);
        let count: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(TITLE_SELECT);
        push_title_filters(&mut builder, filter);
        builder.push(" ORDER BY t.id LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows = builder
            .build_query_as::<TitleRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((self.assemble_titles(rows).await?, count))
    }

    async fn get_title(&self, id: i64) -> AppResult<Option<Title>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(TITLE_SELECT);
        builder.push(" AND t.id = ");
        builder.push_bind(id);

        let row = builder
            .build_query_as::<TitleRow>()
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.assemble_titles(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// create_title
    ///
    /// Slug resolution, insert and genre links run in one transaction; an
    /// unknown slug rolls the whole write back.
    async fn create_title(&self, title: NewTitle) -> AppResult<Title> {
        let mut tx = self.pool.begin().await?;

        let category_id = match &title.category {
            Some(slug) => Some(resolve_category(&mut tx, slug).await?),
            None => None,
        };
        let genre_ids = resolve_genres(&mut tx, &title.genre).await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO titles (name, year, description, category_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&title.name)
        .bind(title.year)
        .bind(&title.description)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_genres(&mut tx, id, &genre_ids).await?;
        tx.commit().await?;

        tracing::info!(title_id = id, "Title created");
        self.get_title(id).await?.ok_or(AppError::NotFound)
    }

    async fn update_title(&self, id: i64, changes: TitleChanges) -> AppResult<Option<Title>> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM titles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let (set_category, category_id) = match &changes.category {
            Some(Some(slug)) => (true, Some(resolve_category(&mut tx, slug).await?)),
            Some(None) => (true, None),
            None => (false, None),
        };
        let genre_ids = match &changes.genre {
            Some(slugs) => Some(resolve_genres(&mut tx, slugs).await?),
            None => None,
        };

        sqlx::query(
            r#"
            UPDATE titles
            SET name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = CASE WHEN $5 THEN $6 ELSE category_id END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.year)
        .bind(changes.description)
        .bind(set_category)
        .bind(category_id)
        .execute(&mut *tx)
        .await?;

        if let Some(genre_ids) = genre_ids {
            replace_genres(&mut tx, id, &genre_ids).await?;
        }
        tx.commit().await?;

        self.get_title(id).await
    }

    async fn delete_title(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- REVIEWS ---

    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> AppResult<Listing<Review>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 ORDER BY r.id LIMIT $2 OFFSET $3"
        ))
        .bind(title_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((reviews, count))
    }

    async fn get_review(&self, title_id: i64, review_id: i64) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 AND r.id = $2"
        ))
        .bind(title_id)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    /// create_review
    ///
    /// Inserts and joins in one statement (CTE) so the response carries the
    /// author's username and the title's name. A second review by the same
    /// author hits `uq_reviews_author_title`.
    async fn create_review(
        &self,
        title_id: i64,
        author_id: i64,
        review: NewReview,
    ) -> AppResult<Review> {
        let created = sqlx::query_as::<_, Review>(
            r#"
            WITH inserted AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, score, pub_date, author_id, title_id
            )
            SELECT i.id, i.text, u.username AS author, i.score, i.pub_date,
                   t.name AS title, i.author_id, i.title_id
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            JOIN titles t ON t.id = i.title_id
            "#,
        )
        .bind(title_id)
        .bind(author_id)
        .bind(&review.text)
        .bind(review.score)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(review_id = created.id, title_id, author_id, "Review created");
        Ok(created)
    }

    async fn update_review(
        &self,
        title_id: i64,
        review_id: i64,
        changes: ReviewChanges,
    ) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            WITH updated AS (
                UPDATE reviews
                SET text = COALESCE($3, text),
                    score = COALESCE($4, score),
                    pub_date = NOW()
                WHERE title_id = $1 AND id = $2
                RETURNING id, text, score, pub_date, author_id, title_id
            )
            SELECT x.id, x.text, u.username AS author, x.score, x.pub_date,
                   t.name AS title, x.author_id, x.title_id
            FROM updated x
            JOIN users u ON u.id = x.author_id
            JOIN titles t ON t.id = x.title_id
            "#,
        )
        .bind(title_id)
        .bind(review_id)
        .bind(changes.text)
        .bind(changes.score)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn delete_review(&self, title_id: i64, review_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE title_id = $1 AND id = $2")
            .bind(title_id)
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- COMMENTS ---

    async fn list_comments(&self, review_id: i64, page: PageRequest) -> AppResult<Listing<Comment>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(&self.pool)
            .await?;

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 ORDER BY c.id LIMIT $2 OFFSET $3"
        ))
        .bind(review_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((comments, count))
    }

    async fn get_comment(&self, review_id: i64, comment_id: i64) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 AND c.id = $2"
        ))
        .bind(review_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn create_comment(&self, review_id: i64, author_id: i64, text: String) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, text, pub_date, author_id, review_id
            )
            SELECT i.id, i.text, u.username AS author, i.pub_date, i.author_id, i.review_id
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(comment_id = comment.id, review_id, author_id, "Comment created");
        Ok(comment)
    }

    async fn update_comment(
        &self,
        review_id: i64,
        comment_id: i64,
        text: String,
    ) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments
                SET text = $3, pub_date = NOW()
                WHERE review_id = $1 AND id = $2
                RETURNING id, text, pub_date, author_id, review_id
            )
            SELECT x.id, x.text, u.username AS author, x.pub_date, x.author_id, x.review_id
            FROM updated x
            JOIN users u ON u.id = x.author_id
            "#,
        )
        .bind(review_id)
        .bind(comment_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, review_id: i64, comment_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = $1 AND id = $2")
            .bind(review_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
