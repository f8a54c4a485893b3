//! Admin moderation routes.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin).

pub mod categories;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// `?notice=` / `?error=` codes set by redirects.
#[derive(Debug, Default, Deserialize)]
pub struct AdminNotice {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl AdminNotice {
    #[must_use]
    pub fn notice_message(&self) -> Option<String> {
        self.notice.as_deref().map(|code| {
            match code {
                "approved" => "Product approved.",
                "rejected" => "Product rejected.",
                "category_created" => "Category created.",
                "category_updated" => "Category updated.",
                "category_deleted" => "Category deleted.",
                "category_approved" => "Category approved.",
                "category_rejected" => "Category rejected.",
                _ => "Done.",
            }
            .to_string()
        })
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_deref().map(|code| {
            match code {
                "moderation" => "The product could not be moderated. Please try again.",
                "category_delete" => {
                    "The category could not be deleted. Move or delete its products and subcategories first."
                }
                "category_moderation" => "The category could not be moderated. Please try again.",
                _ => "Something went wrong. Please try again.",
            }
            .to_string()
        })
    }
}

/// Admin routes, mounted under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/bulk", post(products::bulk))
        .route("/products/{id}/approve", post(products::approve))
        .route("/products/{id}/reject", post(products::reject))
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/new", get(categories::new_page))
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/edit", get(categories::edit_page))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/categories/{id}/approve", post(categories::approve))
        .route("/categories/{id}/reject", post(categories::reject))
}
