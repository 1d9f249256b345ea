//! Email one-time-code login over HTTP.

use chrono::Duration;
use reqwest::StatusCode;

use sneaker_store_core::{Email, LoginCode};
use sneaker_store_integration_tests::{TestContext, location};

fn email(s: &str) -> Email {
    Email::parse(s).expect("valid email")
}

#[tokio::test]
async fn test_login_page_renders() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("name=\"email\""));
}

#[tokio::test]
async fn test_invalid_email_redirects_with_error() {
    let ctx = TestContext::new().await;

    let resp = ctx.post_form("/", &[("email", "not-an-email")]).await;
    assert_eq!(location(&resp), "/?error=invalid_email");
    assert!(ctx.app.mailer.sent().is_empty());

    let body = ctx.get("/?error=invalid_email").await.text().await.expect("body");
    assert!(body.contains("Please enter a valid email address."));
}

#[tokio::test]
async fn test_full_login_reaches_home() {
    let ctx = TestContext::new().await;

    ctx.login("Runner@Example.com ").await;

    let resp = ctx.get("/home?success=login").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Login successful!"));
    assert!(body.contains("runner@example.com"));

    let codes = ctx.app.codes.codes_for(&email("runner@example.com"));
    assert_eq!(codes.len(), 1);
    assert!(codes[0].verified);
}

#[tokio::test]
async fn test_verify_page_shows_pending_email() {
    let ctx = TestContext::new().await;
    ctx.post_form("/", &[("email", "runner@example.com")]).await;

    let body = ctx
        .get("/verify-otp?success=otp_sent")
        .await
        .text()
        .await
        .expect("body");

    assert!(body.contains("runner@example.com"));
    assert!(body.contains("OTP sent to your email!"));
}

#[tokio::test]
async fn test_verify_without_pending_email_redirects_to_login() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/verify-otp").await;
    assert_eq!(location(&resp), "/");

    let resp = ctx.post_form("/verify-otp", &[("otp", "123456")]).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_wrong_code_rerenders_with_error() {
    let ctx = TestContext::new().await;
    ctx.post_form("/", &[("email", "runner@example.com")]).await;
    let sent = ctx
        .app
        .mailer
        .last_code_for(&email("runner@example.com"))
        .expect("code sent");
    let wrong = if sent.as_str() == "111111" { "222222" } else { "111111" };

    for otp in [wrong, "12ab", ""] {
        let resp = ctx.post_form("/verify-otp", &[("otp", otp)]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.text().await.expect("body");
        assert!(body.contains("Invalid OTP. Please try again."));
    }

    // Still not logged in.
    let resp = ctx.get("/home").await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_expired_code_sends_shopper_back_to_login() {
    let ctx = TestContext::new().await;
    ctx.post_form("/", &[("email", "runner@example.com")]).await;
    let stored = ctx.app.codes.codes_for(&email("runner@example.com"));
    let code = stored[0].clone();
    ctx.app
        .codes
        .set_issued_at(code.id, code.issued_at - Duration::minutes(11));

    let resp = ctx
        .post_form("/verify-otp", &[("otp", code.code.as_str())])
        .await;

    assert_eq!(location(&resp), "/?error=otp_expired");
    let body = ctx.get("/?error=otp_expired").await.text().await.expect("body");
    assert!(body.contains("OTP has expired. Please request a new one."));
}

#[tokio::test]
async fn test_rerequest_invalidates_used_code() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    let code: LoginCode = ctx
        .app
        .mailer
        .last_code_for(&email("runner@example.com"))
        .expect("code sent");

    // A second browser requests a code for the same email, then tries the old one.
    let other = TestContext::client();
    other
        .post(ctx.url("/"))
        .form(&[("email", "runner@example.com")])
        .send()
        .await
        .expect("POST failed");
    let resp = other
        .post(ctx.url("/verify-otp"))
        .form(&[("otp", code.as_str())])
        .send()
        .await
        .expect("POST failed");

    // The re-request replaced the code, so the old one no longer matches.
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Invalid OTP"));
}

#[tokio::test]
async fn test_mail_failure_shows_send_error() {
    let ctx = TestContext::with_failing_mailer().await;

    let resp = ctx.post_form("/", &[("email", "runner@example.com")]).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Failed to send OTP. Please try again."));
    assert_eq!(ctx.app.codes.codes_for(&email("runner@example.com")).len(), 1);

    // No pending email was recorded.
    let resp = ctx.get("/verify-otp").await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_protected_pages_redirect_anonymous_shoppers() {
    let ctx = TestContext::new().await;

    for path in ["/home", "/address", "/payment", "/success"] {
        let resp = ctx.get(path).await;
        assert_eq!(location(&resp), "/", "{path} should require login");
    }
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;

    let resp = ctx.get("/logout").await;
    assert_eq!(location(&resp), "/?success=logged_out");

    let resp = ctx.get("/home").await;
    assert_eq!(location(&resp), "/");

    let body = ctx.get("/?success=logged_out").await.text().await.expect("body");
    assert!(body.contains("Logged out successfully!"));
}
