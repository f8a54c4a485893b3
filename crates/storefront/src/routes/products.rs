//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_core::category::{approved, breadcrumbs};
use bazaar_core::filters::PRODUCT_SORTS;
use bazaar_core::{CategoryMenu, ListState, ProductFilter, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use super::ErrorTemplate;
use super::list::{ListParams, fetch_list, open_list};
use crate::api::ApiError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::state::AppState;
use crate::views::{
    CrumbView, NavView, PagerView, ProductCardView, ProductDetailView, SelectOption,
    category_options,
};

/// Current filter values for the filter form.
#[derive(Clone)]
pub struct ProductFilterView {
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub on_sale: bool,
    pub in_stock: bool,
    pub categories: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
}

impl ProductFilterView {
    fn new(filter: &ProductFilter, menu: &CategoryMenu) -> Self {
        let sort = filter.sort.as_deref().unwrap_or("newest");
        Self {
            search: filter.search.clone().unwrap_or_default(),
            min_price: filter.min_price.map(|p| p.to_string()).unwrap_or_default(),
            max_price: filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
            on_sale: filter.on_sale,
            in_stock: filter.in_stock,
            categories: category_options(menu, filter.category.as_deref(), "All categories"),
            sorts: PRODUCT_SORTS
                .iter()
                .map(|(key, label)| SelectOption::new(*key, *label, *key == sort))
                .collect(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: NavView,
    pub products: Vec<ProductCardView>,
    pub filter: ProductFilterView,
    pub pager: PagerView,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavView,
    pub product: ProductDetailView,
    pub crumbs: Vec<CrumbView>,
}

/// Display product listing page.
#[instrument(skip(state, session, user, params))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<ListParams<ProductFilter>>,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, user.as_ref()).await;
    let per_page = state.config().list_per_page;
    let (mut list, query) =
        open_list(&session, session_keys::LIST_PRODUCTS, per_page, params).await;

    let api = state.api();
    let result = fetch_list(
        &session,
        session_keys::LIST_PRODUCTS,
        &mut list,
        query,
        |q| async move { api.list_products(&q).await },
    )
    .await;

    let (products, pager, error) = match result {
        Ok(page) => (
            page.data.iter().map(ProductCardView::from).collect(),
            PagerView::new("/products", &list, page.pagination(list.page())),
            None,
        ),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (Vec::new(), PagerView::default(), Some(e.user_message()))
        }
    };

    let menu = category_menu(&state).await;

    ProductsIndexTemplate {
        nav,
        products,
        filter: ProductFilterView::new(list.filter(), &menu),
        pager,
        error,
    }
}

/// Display product detail page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Response {
    let nav = NavView::load(&state, &session, user.as_ref()).await;

    match state.api().get_product(&ProductId::new(id)).await {
        Ok(product) if product.status.is_public() => {
            let crumbs = match (&product.category_id, state.api().categories().await) {
                (Some(category_id), Ok(categories)) => breadcrumbs(&categories, category_id)
                    .into_iter()
                    .map(CrumbView::from)
                    .collect(),
                _ => Vec::new(),
            };
            ProductShowTemplate {
                nav,
                product: ProductDetailView::from(&product),
                crumbs,
            }
            .into_response()
        }
        Ok(_) | Err(ApiError::NotFound(_)) => ErrorTemplate::not_found(nav, "Product").into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch product: {e}");
            ErrorTemplate::new(nav, StatusCode::BAD_GATEWAY, e.user_message()).into_response()
        }
    }
}

/// Approved categories as a menu; empty when the fetch fails.
pub(super) async fn category_menu(state: &AppState) -> CategoryMenu {
    match state.api().categories().await {
        Ok(categories) => CategoryMenu::from_categories(&approved(categories.as_ref().clone())),
        Err(e) => {
            tracing::warn!("Failed to fetch categories: {e}");
            CategoryMenu::default()
        }
    }
}

/// A throwaway list state for pages that do not remember their position.
pub(super) fn transient_list(
    per_page: u32,
    filter: ProductFilter,
    page: Option<u32>,
) -> ListState<ProductFilter> {
    let mut list = ListState::new(per_page);
    crate::services::resolve_list(&mut list, filter, page);
    list
}
