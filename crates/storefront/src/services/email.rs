//! Login code delivery.
//!
//! [`SmtpMailer`] sends the code over SMTP via lettre. When SMTP is not
//! configured the storefront falls back to [`LogMailer`], which writes the
//! code to the log so the login flow still works in development.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use sneaker_store_core::{Email, LoginCode};

use crate::config::EmailConfig;
use crate::models::code::CODE_TTL_MINUTES;

/// Subject line of the login code email.
pub const LOGIN_CODE_SUBJECT: &str = "Your Sneaker Store OTP";

/// Plain text body of the login code email.
#[derive(Template)]
#[template(path = "email/login_code.txt")]
struct LoginCodeEmailText<'a> {
    code: &'a str,
    ttl_minutes: i64,
}

/// Render the body of the login code email.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_login_code(code: &LoginCode) -> Result<String, askama::Error> {
    LoginCodeEmailText {
        code: code.as_str(),
        ttl_minutes: CODE_TTL_MINUTES,
    }
    .render()
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Delivery was refused for another reason.
    #[error("Delivery failed: {0}")]
    Rejected(String),
}

/// Something that can deliver a login code to a mailbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `code` to `to`.
    async fn send_login_code(&self, to: &Email, code: &LoginCode) -> Result<(), MailerError>;
}

/// SMTP delivery.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_login_code(&self, to: &Email, code: &LoginCode) -> Result<(), MailerError> {
        let body = render_login_code(code)?;

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| MailerError::InvalidAddress(to.to_string()))?)
            .subject(LOGIN_CODE_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(message).await?;

        tracing::info!(to = %to, "Login code email sent");
        Ok(())
    }
}

/// Development delivery: logs the code instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_login_code(&self, to: &Email, code: &LoginCode) -> Result<(), MailerError> {
        tracing::warn!(
            email = %to,
            code = %code,
            "SMTP not configured - login code logged (dev mode)"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_code_body() {
        let body = render_login_code(&LoginCode::parse("042137").unwrap()).unwrap();
        assert_eq!(
            body,
            "Your OTP for Sneaker Store login is: 042137\nThis OTP will expire in 10 minutes."
        );
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let to = Email::parse("runner@example.com").unwrap();
        LogMailer
            .send_login_code(&to, &LoginCode::generate())
            .await
            .unwrap();
    }
}
