//! Checkout fragment endpoints.
//!
//! The browser posts the cart, the delivery address and the payment method
//! here independently and in any order. Each write replaces the previous
//! value for that fragment only. Every outcome, including a malformed body,
//! is a `200` with a `{status, message?}` JSON body.

use axum::{Json, body::Bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use sneaker_store_core::{PaymentMethod, Price};

use crate::error::add_breadcrumb;
use crate::models::ShopperSession;

/// Outcome of a fragment write.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FragmentResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FragmentResponse {
    fn success() -> Json<Self> {
        Json(Self {
            status: "success".to_owned(),
            message: None,
        })
    }

    fn error(message: impl std::fmt::Display) -> Json<Self> {
        Json(Self {
            status: "error".to_owned(),
            message: Some(message.to_string()),
        })
    }
}

/// `POST /save-cart` body.
#[derive(Debug, Deserialize)]
pub struct SaveCartRequest {
    /// Stored verbatim; shape is only checked when the order is placed.
    cart: Option<Value>,
    total: Price,
}

/// `POST /save-payment` body.
#[derive(Debug, Deserialize)]
pub struct SavePaymentRequest {
    payment_method: PaymentMethod,
}

/// Response for any method other than `POST`.
pub async fn not_post() -> Json<FragmentResponse> {
    Json(FragmentResponse {
        status: "error".to_owned(),
        message: None,
    })
}

/// Store the cart and its total.
#[instrument(skip_all)]
pub async fn save_cart(session: ShopperSession, body: Bytes) -> Json<FragmentResponse> {
    let request: SaveCartRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return FragmentResponse::error(e),
    };
    let Some(cart) = request.cart.filter(|c| !c.is_null()) else {
        return FragmentResponse::error("missing field `cart`");
    };

    let items = cart.as_array().map_or(0, Vec::len);
    if let Err(e) = session.store_cart(cart, request.total).await {
        tracing::error!(error = %e, "Failed to store cart");
        return FragmentResponse::error(e);
    }

    add_breadcrumb(
        "checkout",
        "Saved cart",
        Some(&[("items", &items.to_string()), ("total", &request.total.to_string())]),
    );
    FragmentResponse::success()
}

/// Store the delivery address document verbatim.
#[instrument(skip_all)]
pub async fn save_address(session: ShopperSession, body: Bytes) -> Json<FragmentResponse> {
    let address: Value = match serde_json::from_slice(&body) {
        Ok(address) => address,
        Err(e) => return FragmentResponse::error(e),
    };

    if let Err(e) = session.store_address(address).await {
        tracing::error!(error = %e, "Failed to store delivery address");
        return FragmentResponse::error(e);
    }

    add_breadcrumb("checkout", "Saved delivery address", None);
    FragmentResponse::success()
}

/// Store the chosen payment method.
#[instrument(skip_all)]
pub async fn save_payment(session: ShopperSession, body: Bytes) -> Json<FragmentResponse> {
    let request: SavePaymentRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return FragmentResponse::error(e),
    };

    if let Err(e) = session.store_payment_method(request.payment_method).await {
        tracing::error!(error = %e, "Failed to store payment method");
        return FragmentResponse::error(e);
    }

    add_breadcrumb(
        "checkout",
        "Chose payment method",
        Some(&[("payment_method", request.payment_method.as_str())]),
    );
    FragmentResponse::success()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::testing::TestApp;

    async fn call(method: Method, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let app = TestApp::new();
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_save_cart_accepts_numeric_and_string_prices() {
        let (status, body) = call(
            Method::POST,
            "/save-cart",
            r#"{"cart":[{"name":"Air Max 90","price":"8999"}],"total":8999}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success"}));
    }

    #[tokio::test]
    async fn test_save_cart_null_cart_is_error() {
        let (status, body) = call(Method::POST, "/save-cart", r#"{"cart":null,"total":0}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "missing field `cart`");
    }

    #[tokio::test]
    async fn test_save_address_rejects_invalid_json() {
        let (status, body) = call(Method::POST, "/save-address", "{").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_save_payment_rejects_unknown_method() {
        let (_, body) = call(
            Method::POST,
            "/save-payment",
            r#"{"payment_method":"cheque"}"#,
        )
        .await;

        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_non_post_is_error_without_message() {
        let (status, body) = call(Method::PUT, "/save-payment", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "error"}));
    }
}
