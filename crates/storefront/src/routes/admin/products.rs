//! Product moderation queue.
//!
//! Defaults to pending products. Approve and reject work on single rows or
//! as bulk actions over the selection.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{
    BulkAction, CategoryMenu, ListState, ModerationFilter, Product, ProductId, ProductStatus,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::AdminNotice;
use crate::api::{ApiResult, Paginated};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::session_keys;
use crate::routes::list::{
    BulkForm, ListParams, back_to_list, bulk_action_options, bulk_on_page, fetch_list, open_list,
};
use crate::routes::products::category_menu;
use crate::services::load_list;
use crate::state::AppState;
use crate::views::{
    NavView, PagerView, ProductRowView, SelectOption, category_options, status_options,
};

/// Bulk actions available to moderators.
pub const MODERATION_BULK_ACTIONS: &[BulkAction] = &[BulkAction::Approve, BulkAction::Reject];

/// Current filter values for the filter form.
#[derive(Clone)]
pub struct ModerationFilterView {
    pub search: String,
    pub vendor: String,
    pub statuses: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
}

impl ModerationFilterView {
    fn new(filter: &ModerationFilter, menu: &CategoryMenu) -> Self {
        Self {
            search: filter.search.clone().unwrap_or_default(),
            vendor: filter.vendor.clone().unwrap_or_default(),
            statuses: status_options(ProductStatus::ALL, filter.status, ProductStatus::label),
            categories: category_options(menu, filter.category.as_deref(), "All categories"),
        }
    }
}

/// Moderation queue template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ModerationTemplate {
    pub nav: NavView,
    pub rows: Vec<ProductRowView>,
    pub filter: ModerationFilterView,
    pub pager: PagerView,
    pub bulk_actions: Vec<SelectOption>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl ModerationTemplate {
    fn new(
        nav: NavView,
        list: &ListState<ModerationFilter>,
        page: ApiResult<Paginated<Product>>,
        menu: &CategoryMenu,
    ) -> Self {
        let (rows, pager, error) = match page {
            Ok(page) => (
                page.data
                    .iter()
                    .map(|product| ProductRowView::new(product, list))
                    .collect(),
                PagerView::new("/admin/products", list, page.pagination(list.page())),
                None,
            ),
            Err(e) => {
                tracing::error!("Failed to fetch moderation queue: {e}");
                (Vec::new(), PagerView::default(), Some(e.user_message()))
            }
        };

        Self {
            nav,
            rows,
            filter: ModerationFilterView::new(list.filter(), menu),
            pager,
            bulk_actions: bulk_action_options(MODERATION_BULK_ACTIONS),
            notice: None,
            error,
        }
    }
}

/// Reject form with an optional reason for the vendor.
#[derive(Debug, Deserialize)]
pub struct RejectForm {
    #[serde(default)]
    pub reason: String,
}

/// Moderation queue.
#[instrument(skip(state, session, user, params, notice))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(params): Query<ListParams<ModerationFilter>>,
    Query(notice): Query<AdminNotice>,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, Some(&user)).await;
    let (mut list, query) = open_list(
        &session,
        session_keys::LIST_ADMIN_PRODUCTS,
        state.config().list_per_page,
        params,
    )
    .await;

    let api = state.api();
    let caller = user.caller();
    let caller = &caller;
    let page = fetch_list(
        &session,
        session_keys::LIST_ADMIN_PRODUCTS,
        &mut list,
        query,
        |q| async move { api.admin_products(caller, &q).await },
    )
    .await;

    let menu = category_menu(&state).await;
    let mut template = ModerationTemplate::new(nav, &list, page, &menu);
    template.notice = notice.notice_message();
    if template.error.is_none() {
        template.error = notice.error_message();
    }
    template
}

/// Approve or reject the selected products and re-render the queue.
///
/// Responds `207 Multi-Status` when some rows failed.
#[instrument(skip(state, session, user, form), fields(action = %form.action))]
pub async fn bulk(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<BulkForm>,
) -> Response {
    let nav = NavView::load(&state, &session, Some(&user)).await;
    let mut list: ListState<ModerationFilter> = load_list(
        &session,
        session_keys::LIST_ADMIN_PRODUCTS,
        state.config().list_per_page,
    )
    .await;
    let menu = category_menu(&state).await;
    let api = state.api();
    let caller = user.caller();
    let caller = &caller;

    let ids = form.product_ids();
    let action = match form.action_in(MODERATION_BULK_ACTIONS) {
        Ok(_) if ids.is_empty() => Err("Select at least one product.".to_string()),
        other => other,
    };
    let action = match action {
        Ok(action) => action,
        Err(message) => {
            let page = api.admin_products(caller, &list.query()).await;
            let mut template = ModerationTemplate::new(nav, &list, page, &menu);
            template.error = Some(message);
            return (StatusCode::BAD_REQUEST, template).into_response();
        }
    };

    add_breadcrumb("admin", "Bulk moderation", Some(&[("action", action.as_str())]));
    let (page, outcome) = bulk_on_page(
        &session,
        session_keys::LIST_ADMIN_PRODUCTS,
        &mut list,
        action,
        &ids,
        |q| async move { api.admin_products(caller, &q).await },
        |id| async move { api.admin_bulk_action(caller, &id, action).await },
    )
    .await;

    let mut template = ModerationTemplate::new(nav, &list, page, &menu);
    let status = if outcome.failure_count() > 0 {
        template.error = Some(outcome.summary(action));
        StatusCode::MULTI_STATUS
    } else {
        template.notice = Some(outcome.summary(action));
        StatusCode::OK
    };
    (status, template).into_response()
}

/// Redirect to the queue at the moderator's last page and filter.
async fn back_to_queue(state: &AppState, session: &Session, extra: (&'static str, &str)) -> Redirect {
    let href = back_to_list::<ModerationFilter>(
        session,
        session_keys::LIST_ADMIN_PRODUCTS,
        state.config().list_per_page,
        "/admin/products",
        extra,
    )
    .await;
    Redirect::to(&href)
}

/// Approve one product.
#[instrument(skip(state, session, user))]
pub async fn approve(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    let id = ProductId::new(id);
    let extra = match state.api().approve_product(&user.caller(), &id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product approved");
            ("notice", "approved")
        }
        Err(e) => {
            tracing::error!(product_id = %id, "Failed to approve product: {e}");
            ("error", "moderation")
        }
    };
    back_to_queue(&state, &session, extra).await
}

/// Reject one product, passing the reason on to the vendor.
#[instrument(skip(state, session, user, form))]
pub async fn reject(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<RejectForm>,
) -> Redirect {
    let id = ProductId::new(id);
    let reason = Some(form.reason.trim()).filter(|r| !r.is_empty());
    let extra = match state.api().reject_product(&user.caller(), &id, reason).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product rejected");
            ("notice", "rejected")
        }
        Err(e) => {
            tracing::error!(product_id = %id, "Failed to reject product: {e}");
            ("error", "moderation")
        }
    };
    back_to_queue(&state, &session, extra).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Query;

    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_filter_view_defaults_to_pending() {
        let view = ModerationFilterView::new(&ModerationFilter::default(), &CategoryMenu::default());
        let selected: Vec<&str> = view
            .statuses
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["pending"]);
    }

    #[test]
    fn test_list_params_default_to_pending_queue() {
        let params: ListParams<ModerationFilter> =
            Query::try_from_uri(&"/admin/products".parse().unwrap()).unwrap().0;
        assert_eq!(params.filter.status, Some(ProductStatus::Pending));

        let params: ListParams<ModerationFilter> =
            Query::try_from_uri(&"/admin/products?status=all&vendor=v9".parse().unwrap())
                .unwrap()
                .0;
        assert_eq!(params.filter.status, None);
        assert_eq!(params.filter.vendor.as_deref(), Some("v9"));
    }

    #[test]
    fn test_bulk_actions_are_moderation_only() {
        let form = BulkForm {
            action: "delete".to_string(),
            ids: "p1".to_string(),
        };
        assert!(form.action_in(MODERATION_BULK_ACTIONS).is_err());
    }

    #[test]
    fn test_template_surfaces_fetch_error() {
        let list: ListState<ModerationFilter> = ListState::new(20);
        let template = ModerationTemplate::new(
            NavView::default(),
            &list,
            Err(ApiError::Unauthorized),
            &CategoryMenu::default(),
        );
        assert!(template.error.is_some());
        assert_eq!(template.bulk_actions.len(), 2);
    }
}
