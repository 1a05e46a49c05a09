use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod pagination;
pub mod permissions;
pub mod repository;
pub mod validation;

// Routing, grouped by permission class.
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, catalog, public, reviews};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use mailer::{LogMailer, MailerState, MockMailer, SmtpMailer};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register, handlers::auth::token, handlers::auth::refresh,
        handlers::catalog::list_categories, handlers::catalog::create_category,
        handlers::catalog::delete_category, handlers::catalog::list_genres,
        handlers::catalog::create_genre, handlers::catalog::delete_genre,
        handlers::titles::list_titles, handlers::titles::create_title,
        handlers::titles::get_title, handlers::titles::replace_title,
        handlers::titles::update_title, handlers::titles::delete_title,
        handlers::reviews::list_reviews, handlers::reviews::create_review,
        handlers::reviews::get_review, handlers::reviews::replace_review,
        handlers::reviews::update_review, handlers::reviews::delete_review,
        handlers::reviews::list_comments, handlers::reviews::create_comment,
        handlers::reviews::get_comment, handlers::reviews::update_comment,
        handlers::reviews::delete_comment,
        handlers::users::list_users, handlers::users::create_user,
        handlers::users::get_user, handlers::users::update_user,
        handlers::users::delete_user, handlers::users::get_me, handlers::users::update_me,
    ),
    components(
        schemas(
            models::Role, models::UserResponse, models::UserRequest,
            models::RegisterRequest, models::RegisterResponse, models::TokenRequest,
            models::RefreshRequest, models::TokenResponse, models::Category, models::Genre,
            models::CatalogEntryRequest, models::Title, models::TitleRequest, models::Review,
            models::ReviewRequest, models::Comment, models::CommentRequest,
        )
    ),
    tags(
        (name = "media-reviews", description = "Media review API: titles, reviews, comments and accounts")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, cloneable container of shared services. Handlers pull the whole
/// state; extractors pull individual parts through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: PostgreSQL in deployments, in-memory locally and in tests.
    pub repo: RepositoryState,
    /// Out-of-band delivery of confirmation codes.
    pub mailer: MailerState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MailerState {
    fn from_ref(app_state: &AppState) -> MailerState {
        app_state.mailer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects anonymous requests. Extracting `AuthUser` verifies the bearer token
/// and loads the account; any failure short-circuits with 401 before the
/// handler runs.
pub async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global middleware and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(catalog::catalog_routes(state.clone()))
        .merge(reviews::review_routes(state.clone()))
        .merge(authenticated::authenticated_routes(state.clone()))
        .merge(admin::admin_routes(state.clone()))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Generate a UUID x-request-id for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Wrap the request/response lifecycle in a span carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo the x-request-id header back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the `http_request` span for `TraceLayer` so every log line of one
/// request shares its method, URI and request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
