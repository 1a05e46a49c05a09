use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::SmtpSettings;

/// MailError
///
/// Failures while building or sending a confirmation email. Registration logs
/// these and carries on; the code can always be requested again.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Mock mailer failure: {0}")]
    Mock(String),
}

// 1. Mailer Contract
/// Mailer
///
/// Out-of-band delivery of confirmation codes. Swappable between SMTP in
/// deployments, a logging sink for local runs, and a recording mock in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation_code(&self, email: &str, code: &str) -> Result<(), MailError>;
}

/// MailerState
///
/// The concrete type used to share the mailer across the application state.
pub type MailerState = Arc<dyn Mailer>;

const SUBJECT: &str = "Confirmation code";

// 2. SMTP Implementation
/// SmtpMailer
///
/// Sends plain-text mail through a STARTTLS relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port);

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: settings.from.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation_code(&self, email: &str, code: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.parse()?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(code.to_string())?;

        self.transport.send(message).await?;
        tracing::info!(to = email, "Confirmation code sent");
        Ok(())
    }
}

// 3. Logging Implementation
/// LogMailer
///
/// Used when no SMTP relay is configured: the code goes to the log so a
/// developer can complete the token exchange by hand.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation_code(&self, email: &str, code: &str) -> Result<(), MailError> {
        tracing::info!(to = email, code, "Confirmation code (SMTP not configured)");
        Ok(())
    }
}

// 4. Mock Implementation
/// A message captured by `MockMailer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub code: String,
}

/// MockMailer
///
/// Records every delivery instead of sending it.
#[derive(Default)]
pub struct MockMailer {
    /// When true, every delivery fails after being recorded.
    pub should_fail: bool,
    sent: Mutex<Vec<SentMail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            sent: Mutex::default(),
        }
    }

    /// Everything delivered so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// The most recent code mailed to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|mail| mail.to == email)
            .map(|mail| mail.code)
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_confirmation_code(&self, email: &str, code: &str) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMail {
                to: email.to_string(),
                code: code.to_string(),
            });
        }
        if self.should_fail {
            return Err(MailError::Mock("Simulation requested".to_string()));
        }
        Ok(())
    }
}
