//! Integration tests for Sneaker Store.
//!
//! Each test starts the storefront router on an ephemeral port, backed by
//! the in-memory stores and session store from the `test-support` feature,
//! and drives it over HTTP with a cookie-keeping client. No database or
//! SMTP server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sneaker-store-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, Response, StatusCode, redirect::Policy};
use serde_json::Value;

use sneaker_store_core::Email;
use sneaker_store_storefront::config::StorefrontConfig;
use sneaker_store_storefront::testing::TestApp;

pub use sneaker_store_storefront::testing::test_config;

/// A running storefront plus a client that keeps its session cookie.
pub struct TestContext {
    pub app: TestApp,
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront with the default test configuration.
    pub async fn new() -> Self {
        Self::serve(TestApp::new()).await
    }

    /// Start a storefront with a custom configuration.
    pub async fn with_config(config: StorefrontConfig) -> Self {
        Self::serve(TestApp::with_config(config)).await
    }

    /// Start a storefront whose mailer refuses every delivery.
    pub async fn with_failing_mailer() -> Self {
        Self::serve(TestApp::with_failing_mailer()).await
    }

    async fn serve(app: TestApp) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let router = app.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self {
            app,
            client: Self::client(),
            base_url: format!("http://{addr}"),
        }
    }

    /// A fresh client with its own cookie jar. Redirects are not followed,
    /// so tests can assert on `Location`.
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Value {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.expect("Response was not JSON")
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> Value {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST failed");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.expect("Response was not JSON")
    }

    /// Request a code for `email` and enter it, leaving the client logged in.
    pub async fn login(&self, email: &str) {
        let resp = self.post_form("/", &[("email", email)]).await;
        assert_eq!(location(&resp), "/verify-otp?success=otp_sent");

        let parsed = Email::parse(email).expect("Invalid test email");
        let code = self
            .app
            .mailer
            .last_code_for(&parsed)
            .expect("No code was sent");

        let resp = self.post_form("/verify-otp", &[("otp", code.as_str())]).await;
        assert_eq!(location(&resp), "/home?success=login");
    }
}

/// The `Location` header of a redirect.
pub fn location(resp: &Response) -> &str {
    assert!(
        resp.status().is_redirection(),
        "expected a redirect, got {}",
        resp.status()
    );
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("Redirect without Location")
}
