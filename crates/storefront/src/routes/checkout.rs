//! Checkout page handlers: address, payment, success.
//!
//! The address and payment pages write the same session fragments as the
//! JSON endpoints in [`super::fragments`]; the success page is where the
//! order is actually placed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sneaker_store_core::{Email, PaymentMethod};

use super::flash::{self, MessageQuery};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Order, ShopperSession};
use crate::services::checkout::{CheckoutError, OrderMaterializer};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Address form data, using the same field names as the JSON fragment.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub landmark: String,
}

/// Payment form data.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub payment_method: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Address page template.
#[derive(Template, WebTemplate)]
#[template(path = "address.html")]
pub struct AddressTemplate {
    pub user_email: String,
}

/// Payment method option for templates.
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub options: Vec<PaymentOption>,
    pub error: Option<&'static str>,
}

/// Line item display data for templates.
pub struct OrderItemView {
    pub product_name: String,
    pub brand: String,
    pub price: String,
    pub quantity: u32,
}

/// Placed order display data for templates.
pub struct OrderView {
    pub number: String,
    pub total: String,
    pub payment_method: &'static str,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number.to_string(),
            total: order.total_amount.to_string(),
            payment_method: order.payment_method.label(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    product_name: item.product_name.clone(),
                    brand: item.brand.clone(),
                    price: item.line_total().to_string(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Success page template.
///
/// `order` is `None` when there was nothing to place.
#[derive(Template, WebTemplate)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub order: Option<OrderView>,
    pub error: Option<&'static str>,
}

// =============================================================================
// Address
// =============================================================================

/// Display the delivery address form.
pub async fn address_page(RequireAuth(shopper): RequireAuth) -> impl IntoResponse {
    AddressTemplate {
        user_email: shopper.email.map(Email::into_inner).unwrap_or_default(),
    }
}

/// Store the submitted address and continue to payment.
#[instrument(skip_all)]
pub async fn save_address_form(
    RequireAuth(_shopper): RequireAuth,
    session: ShopperSession,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let address =
        serde_json::to_value(&form).map_err(|e| AppError::Internal(e.to_string()))?;
    session.store_address(address).await?;
    add_breadcrumb("checkout", "Saved delivery address", None);
    Ok(Redirect::to("/payment").into_response())
}

// =============================================================================
// Payment
// =============================================================================

fn payment_options() -> Vec<PaymentOption> {
    PaymentMethod::ALL
        .iter()
        .map(|m| PaymentOption {
            value: m.as_str(),
            label: m.label(),
        })
        .collect()
}

/// Display the payment method form.
pub async fn payment_page(
    RequireAuth(_shopper): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    PaymentTemplate {
        options: payment_options(),
        error: query.error_message(),
    }
}

/// Store the chosen payment method and continue to the success page.
#[instrument(skip_all)]
pub async fn save_payment_form(
    RequireAuth(_shopper): RequireAuth,
    session: ShopperSession,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let Ok(method) = form.payment_method.parse::<PaymentMethod>() else {
        let to = format!("/payment?error={}", flash::PAYMENT_METHOD);
        return Ok(Redirect::to(&to).into_response());
    };

    session.store_payment_method(method).await?;
    add_breadcrumb(
        "checkout",
        "Chose payment method",
        Some(&[("payment_method", method.as_str())]),
    );
    Ok(Redirect::to("/success").into_response())
}

// =============================================================================
// Success
// =============================================================================

/// Place the order from the session fragments and show the result.
///
/// Reloading the page after a successful order shows no order number, since
/// the fragments were consumed.
#[instrument(skip_all)]
pub async fn success(
    RequireAuth(_shopper): RequireAuth,
    State(state): State<AppState>,
    session: ShopperSession,
) -> impl IntoResponse {
    match OrderMaterializer::new(state.orders())
        .materialize(&session)
        .await
    {
        Ok(order) => SuccessTemplate {
            order: order.as_ref().map(OrderView::from),
            error: None,
        },
        Err(e) => {
            if let CheckoutError::Persistence(_) = e {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Error creating order");
            } else {
                tracing::error!(error = %e, "Error creating order");
            }
            SuccessTemplate {
                order: None,
                error: flash::error_message(flash::ORDER_FAILED),
            }
        }
    }
}

// =============================================================================
// Debug
// =============================================================================

/// Dump the raw checkout fragments as JSON.
///
/// Served only when `STOREFRONT_DEBUG_SESSION` is enabled; otherwise the
/// route does not exist as far as clients can tell.
pub async fn debug_session(
    State(state): State<AppState>,
    session: ShopperSession,
) -> Result<Response> {
    if !state.config().debug_session {
        return Err(AppError::NotFound("/debug-session".to_owned()));
    }
    if !session.is_authenticated().await? {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Json(session.snapshot().await?).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::testing::{TestApp, test_config};

    async fn get(app: TestApp, uri: &str) -> axum::response::Response {
        app.router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_debug_session_is_404_when_disabled() {
        let response = get(TestApp::new(), "/debug-session").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_debug_session_requires_login_when_enabled() {
        let mut config = test_config();
        config.debug_session = true;

        let response = get(TestApp::with_config(config), "/debug-session").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_success_requires_login() {
        let app = TestApp::new();
        let orders = app.orders.clone();

        let response = get(app, "/success").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(orders.all().is_empty());
    }
}
