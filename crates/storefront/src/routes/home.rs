//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use bazaar_core::CategoryMenu;
use bazaar_core::category::approved;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::views::{MenuLinkView, NavView, ProductCardView, category_href};

/// Number of featured products on the home page.
const FEATURED_LIMIT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub featured: Vec<ProductCardView>,
    /// Top-level categories.
    pub categories: Vec<MenuLinkView>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, user.as_ref()).await;

    let featured = state.api().featured_products().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch featured products: {e}");
            Vec::new()
        },
        |products| {
            products
                .iter()
                .filter(|p| p.status.is_public())
                .take(FEATURED_LIMIT)
                .map(ProductCardView::from)
                .collect()
        },
    );

    let categories = state.api().categories().await.map_or_else(
        |e| {
            tracing::warn!("Failed to fetch categories for home page: {e}");
            Vec::new()
        },
        |categories| {
            let menu = CategoryMenu::from_categories(&approved(categories.as_ref().clone()));
            menu.parents()
                .iter()
                .map(|c| MenuLinkView {
                    name: c.name.clone(),
                    href: category_href(c),
                })
                .collect()
        },
    );

    HomeTemplate {
        nav,
        featured,
        categories,
    }
}
