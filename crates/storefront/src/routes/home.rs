//! Home page route handler.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use sneaker_store_core::Email;

use super::flash::MessageQuery;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Arc<Vec<Product>>,
    pub trending_products: Arc<Vec<Product>>,
    pub all_products: Arc<Vec<Product>>,
    pub user_email: String,
    pub success: Option<&'static str>,
}

/// Display the catalog: featured, trending and all products.
#[instrument(skip_all)]
pub async fn home(
    RequireAuth(shopper): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let listings = state.catalog().home().await?;

    Ok(HomeTemplate {
        featured_products: listings.featured,
        trending_products: listings.trending,
        all_products: listings.all,
        user_email: shopper.email.map(Email::into_inner).unwrap_or_default(),
        success: query.success_message(),
    })
}
