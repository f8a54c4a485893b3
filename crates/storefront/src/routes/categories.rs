//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_core::category::{approved, breadcrumbs, find_by_slug};
use bazaar_core::{CategoryMenu, ProductFilter, build_category_tree};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::ErrorTemplate;
use super::products::transient_list;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::views::{
    CategoryRowView, CrumbView, MenuLinkView, NavView, PagerView, ProductCardView, category_href,
    category_rows,
};

/// Page query for the category page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Category index template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub nav: NavView,
    pub rows: Vec<CategoryRowView>,
    pub error: Option<String>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub nav: NavView,
    pub name: String,
    pub description: Option<String>,
    pub crumbs: Vec<CrumbView>,
    pub subcategories: Vec<MenuLinkView>,
    pub products: Vec<ProductCardView>,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Display the category tree.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, user.as_ref()).await;

    let (rows, error) = match state.api().categories().await {
        Ok(categories) => {
            let tree = build_category_tree(&approved(categories.as_ref().clone()));
            (category_rows(&tree), None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            (Vec::new(), Some(e.user_message()))
        }
    };

    CategoriesIndexTemplate { nav, rows, error }
}

/// Display a category: breadcrumbs, subcategories and its products.
///
/// `key` is the category slug, or its id for categories without one.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(key): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let nav = NavView::load(&state, &session, user.as_ref()).await;

    let categories = match state.api().categories().await {
        Ok(categories) => approved(categories.as_ref().clone()),
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            return ErrorTemplate::new(nav, StatusCode::BAD_GATEWAY, e.user_message())
                .into_response();
        }
    };

    let Some(category) = find_by_slug(&categories, &key)
        .or_else(|| categories.iter().find(|c| c.id.as_str() == key))
    else {
        return ErrorTemplate::not_found(nav, "Category").into_response();
    };

    let crumbs = breadcrumbs(&categories, &category.id)
        .into_iter()
        .map(CrumbView::from)
        .collect();
    let menu = CategoryMenu::from_categories(&categories);
    let subcategories = menu
        .children_of(&category.id)
        .iter()
        .map(|c| MenuLinkView {
            name: c.name.clone(),
            href: category_href(c),
        })
        .collect();

    let filter = ProductFilter {
        category: Some(category.id.to_string()),
        ..ProductFilter::default()
    };
    let list = transient_list(state.config().list_per_page, filter, query.page);
    let href = category_href(category);

    let (products, pager, error) = match state.api().list_products(&list.query()).await {
        Ok(page) => (
            page.data.iter().map(ProductCardView::from).collect(),
            PagerView::new(&href, &list, page.pagination(list.page())),
            None,
        ),
        Err(e) => {
            tracing::error!("Failed to fetch category products: {e}");
            (Vec::new(), PagerView::default(), Some(e.user_message()))
        }
    };

    CategoryShowTemplate {
        nav,
        name: category.name.clone(),
        description: category.description.clone(),
        crumbs,
        subcategories,
        products,
        pager,
        error,
    }
    .into_response()
}
