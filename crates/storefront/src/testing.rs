//! Test doubles and an in-memory application.
//!
//! Available to this crate's unit tests and, through the `test-support`
//! feature, to the integration test crate.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use secrecy::SecretString;
use tower_sessions::MemoryStore;

use sneaker_store_core::{Email, LoginCode};

use crate::config::{SentryConfig, StorefrontConfig};
use crate::db::memory::{MemoryCodeStore, MemoryOrderStore, MemoryProductStore};
use crate::middleware::create_session_layer;
use crate::routes;
use crate::services::email::{Mailer, MailerError};
use crate::state::{AppState, Stores};

/// Mailer that records every code instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(Email, LoginCode)>>,
    fail: bool,
}

impl RecordingMailer {
    /// A mailer whose deliveries succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose deliveries always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every successful delivery so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<(Email, LoginCode)> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// The most recent code delivered to `email`.
    #[must_use]
    pub fn last_code_for(&self, email: &Email) -> Option<LoginCode> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_login_code(&self, to: &Email, code: &LoginCode) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::Rejected("recording mailer set to fail".to_owned()));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((to.clone(), code.clone()));
        Ok(())
    }
}

/// Configuration for tests: plain HTTP, no SMTP, no Sentry.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/sneaker_store_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        debug_session: false,
        catalog_cache_ttl: Duration::from_secs(60),
        email: None,
        sentry: SentryConfig::default(),
    }
}

/// The storefront wired to in-memory stores and sessions.
///
/// The fields are the same instances the router uses, so tests can seed
/// and inspect them.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub codes: Arc<MemoryCodeStore>,
    pub orders: Arc<MemoryOrderStore>,
    pub products: Arc<MemoryProductStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Build with [`test_config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Build with a custom configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self::build(config, Arc::new(RecordingMailer::new()))
    }

    /// Build with a mailer whose deliveries fail.
    #[must_use]
    pub fn with_failing_mailer() -> Self {
        Self::build(test_config(), Arc::new(RecordingMailer::failing()))
    }

    fn build(config: StorefrontConfig, mailer: Arc<RecordingMailer>) -> Self {
        let codes = Arc::new(MemoryCodeStore::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let products = Arc::new(MemoryProductStore::new());

        let stores = Stores {
            codes: codes.clone(),
            orders: orders.clone(),
            products: products.clone(),
        };
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, stores, mailer.clone());

        let router = routes::routes()
            .layer(session_layer)
            .with_state(state.clone());

        Self {
            router,
            state,
            codes,
            orders,
            products,
            mailer,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
