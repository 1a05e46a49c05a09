use std::{env, fmt};

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup,
/// immutable afterwards, and pulled into handlers and extractors via `FromRef`.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // Postgres connection string. Without one, local runs fall back to the in-memory store.
    pub db_url: Option<String>,
    // HMAC secret used to sign and verify access and refresh tokens.
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    // Number of results per page on list endpoints.
    pub page_size: i64,
    pub bind_addr: String,
    // Outgoing mail. `None` means confirmation codes are only logged.
    pub smtp: Option<SmtpSettings>,
}

/// Env
///
/// Defines the runtime context: developer conveniences locally, mandatory secrets
/// in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// SMTP relay used to deliver confirmation codes.
#[derive(Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

const REDACTED: &str = "<redacted>";

// Secrets never appear in Debug output.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("db_url", &self.db_url.as_ref().map(|_| REDACTED))
            .field("jwt_secret", &REDACTED)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("page_size", &self.page_size)
            .field("bind_addr", &self.bind_addr)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("from", &self.from)
            .finish()
    }
}

const LOCAL_JWT_SECRET: &str = "local-development-secret-change-me";
const DEFAULT_ACCESS_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM: &str = "noreply@media-reviews.local";

impl Default for AppConfig {
    /// Safe, non-panicking values for test setup: local env, in-memory store, no SMTP.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            access_token_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            smtp: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from environment variables.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `JWT_SECRET` is missing, and in
    /// any environment when a numeric variable does not parse. Starting with a
    /// half-configured server is never useful.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok(),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        Self {
            env,
            db_url,
            jwt_secret,
            access_token_ttl_secs: parsed_var("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS),
            refresh_token_ttl_secs: parsed_var("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS),
            page_size: parsed_var("PAGE_SIZE", DEFAULT_PAGE_SIZE),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            smtp: SmtpSettings::from_env(),
        }
    }
}

impl SmtpSettings {
    /// Returns `None` when `SMTP_HOST` is unset.
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok()?;
        Some(Self {
            host,
            port: parsed_var("SMTP_PORT", DEFAULT_SMTP_PORT),
            username: env::var("SMTP_USER").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string()),
        })
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {name} must be a valid number, got {raw:?}")),
        Err(_) => default,
    }
}
