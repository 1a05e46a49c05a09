#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use media_reviews::{
    AppConfig, AppState, MemoryRepository, MockMailer,
    auth::{TokenType, issue_token},
    create_router,
    models::{NewUser, Role, User},
};
use serde_json::Value;
use tower::ServiceExt;

/// An application wired to the in-memory store and a recording mailer.
pub struct TestContext {
    pub repo: Arc<MemoryRepository>,
    pub mailer: Arc<MockMailer>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mailer(MockMailer::new())
    }

    pub fn with_mailer(mailer: MockMailer) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let mailer = Arc::new(mailer);
        let state = AppState {
            repo: repo.clone(),
            mailer: mailer.clone(),
            config: AppConfig::default(),
        };
        Self {
            repo,
            mailer,
            state,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub fn seed_user(&self, username: &str, role: Role) -> User {
        self.repo
            .seed_user(new_user(username, role), false)
            .expect("seed user")
    }

    pub fn seed_superuser(&self, username: &str) -> User {
        self.repo
            .seed_user(new_user(username, Role::User), true)
            .expect("seed superuser")
    }

    pub fn token_for(&self, user: &User) -> String {
        issue_token(user.id, TokenType::Access, &self.state.config).expect("issue token")
    }

    /// Drives one request through the full router and decodes the JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn new_user(username: &str, role: Role) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        bio: String::new(),
        role,
        confirmation_code: format!("code-{username}"),
    }
}
