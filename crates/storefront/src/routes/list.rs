//! Request plumbing shared by the list pages.

use std::future::Future;

use bazaar_core::filters::empty_as_none;
use bazaar_core::{
    BulkAction, BulkOutcome, ListChange, ListFilter, ListQuery, ListState, Product, ProductId,
    Selection, apply_bulk_outcome,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use crate::api::{ApiResult, Paginated};
use crate::services::{load_list, resolve_list, run_bulk, save_list};
use crate::views::{SelectOption, href_with};

/// Filter fields plus the page number, as sent by filter forms and pager links.
#[derive(Debug, Deserialize)]
pub struct ListParams<F> {
    #[serde(flatten)]
    pub filter: F,
    /// Read through a string since flattened fields lose their types.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u32>,
}

/// Bulk action form: the action and a comma-separated id list.
#[derive(Debug, Deserialize)]
pub struct BulkForm {
    pub action: String,
    #[serde(default)]
    pub ids: String,
}

impl BulkForm {
    /// Selected ids, deduplicated.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        Selection::from_csv(&self.ids)
            .iter()
            .map(ProductId::new)
            .collect()
    }

    /// The action, if it is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns a visitor-facing message for unknown or disallowed actions.
    pub fn action_in(&self, allowed: &[BulkAction]) -> Result<BulkAction, String> {
        self.action
            .parse::<BulkAction>()
            .ok()
            .filter(|action| allowed.contains(action))
            .ok_or_else(|| format!("Unsupported bulk action: {}", self.action))
    }
}

/// `<option>`s for a bulk action picker.
pub fn bulk_action_options(actions: &[BulkAction]) -> Vec<SelectOption> {
    actions
        .iter()
        .map(|action| {
            let verb = action.as_str();
            let label = format!(
                "{}{}",
                verb.get(..1).unwrap_or_default().to_uppercase(),
                verb.get(1..).unwrap_or_default()
            );
            SelectOption::new(verb, label, false)
        })
        .collect()
}

/// Load a list's stored state, fold in the request, persist it and return
/// what to fetch.
pub async fn open_list<F>(
    session: &Session,
    key: &str,
    per_page: u32,
    params: ListParams<F>,
) -> (ListState<F>, ListQuery<F>)
where
    F: ListFilter + Serialize + DeserializeOwned,
{
    let mut state = load_list(session, key, per_page).await;
    let query = resolve_list(&mut state, params.filter, params.page);
    persist(session, key, &state).await;
    (state, query)
}

/// Fetch the page for `query`. When the backend reports fewer pages than the
/// stored page (rows were deleted, say), clamp to the last page and fetch
/// again once.
///
/// # Errors
///
/// Returns the first failing fetch.
pub async fn fetch_list<F, T, Fetch, Fut>(
    session: &Session,
    key: &str,
    list: &mut ListState<F>,
    query: ListQuery<F>,
    fetch: Fetch,
) -> ApiResult<Paginated<T>>
where
    F: ListFilter + Serialize,
    Fetch: Fn(ListQuery<F>) -> Fut,
    Fut: Future<Output = ApiResult<Paginated<T>>>,
{
    let page = fetch(query).await?;
    match list.clamp_to(page.total_pages) {
        Some(refetch) => {
            persist(session, key, list).await;
            fetch(refetch).await
        }
        None => Ok(page),
    }
}

/// Run a bulk action against the visitor's current page.
///
/// The page is fetched before the mutations run; each successful row is then
/// updated in place (or dropped on delete) while failed rows keep their prior
/// state. Afterwards the selection holds exactly the failed rows, so the
/// re-rendered table has them checked for a retry.
pub async fn bulk_on_page<F, Load, LoadFut, Mutate, MutateFut>(
    session: &Session,
    key: &str,
    list: &mut ListState<F>,
    action: BulkAction,
    ids: &[ProductId],
    load: Load,
    mutate: Mutate,
) -> (ApiResult<Paginated<Product>>, BulkOutcome)
where
    F: ListFilter + Serialize,
    Load: FnOnce(ListQuery<F>) -> LoadFut,
    LoadFut: Future<Output = ApiResult<Paginated<Product>>>,
    Mutate: Fn(ProductId) -> MutateFut,
    MutateFut: Future<Output = ApiResult<()>>,
{
    let mut page = load(list.query()).await;
    let outcome = run_bulk(action, ids, mutate).await;

    if let Ok(page) = page.as_mut() {
        apply_bulk_outcome(&mut page.data, action, &outcome);
    }
    list.apply(ListChange::ClearSelection);
    list.apply(ListChange::SelectAll(
        outcome.failed().map(|(id, _)| id.to_string()).collect(),
    ));
    persist(session, key, list).await;
    (page, outcome)
}

/// Link back to a list at its stored page and filter, plus one extra pair
/// such as `("notice", "deleted")`.
pub async fn back_to_list<F>(
    session: &Session,
    key: &str,
    per_page: u32,
    path: &str,
    extra: (&'static str, &str),
) -> String
where
    F: ListFilter + Serialize + DeserializeOwned,
{
    let list: ListState<F> = load_list(session, key, per_page).await;
    let mut pairs = list.link_pairs(list.page());
    pairs.push((extra.0, extra.1.to_string()));
    href_with(path, &pairs)
}

/// Save list state; a failure only costs the visitor their page position.
pub async fn persist<F>(session: &Session, key: &str, state: &ListState<F>)
where
    F: ListFilter + Serialize,
{
    if let Err(e) = save_list(session, key, state).await {
        tracing::warn!(key, error = %e, "Failed to save list state");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::extract::Query;
    use bazaar_core::{ProductStatus, VendorId, VendorProductFilter};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::api::ApiError;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Decimal::from(5),
            sale_price: None,
            category_id: None,
            vendor_id: VendorId::new("v1"),
            vendor_name: None,
            inventory: 10,
            is_active: true,
            status: ProductStatus::Pending,
            images: Vec::new(),
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn parse(uri: &str) -> ListParams<VendorProductFilter> {
        Query::try_from_uri(&uri.parse().unwrap()).unwrap().0
    }

    #[test]
    fn test_list_params_from_query_string() {
        let params = parse("/vendor/products?status=pending&search=&low_stock=on&page=4");
        assert_eq!(params.page, Some(4));
        assert_eq!(params.filter.status, Some(ProductStatus::Pending));
        assert_eq!(params.filter.search, None);
        assert!(params.filter.low_stock);
    }

    #[test]
    fn test_list_params_without_page() {
        let params = parse("/vendor/products?status=all&page=");
        assert_eq!(params.page, None);
        assert_eq!(params.filter.status, None);
    }

    #[test]
    fn test_bulk_form_action_must_be_allowed() {
        let form = BulkForm {
            action: "approve".to_string(),
            ids: String::new(),
        };
        assert_eq!(
            form.action_in(&[BulkAction::Approve, BulkAction::Reject]),
            Ok(BulkAction::Approve)
        );
        assert!(form.action_in(&[BulkAction::Delete]).is_err());
    }

    #[tokio::test]
    async fn test_back_to_list_keeps_position() {
        let session = session();
        let mut list: ListState<VendorProductFilter> = ListState::new(10);
        list.apply(ListChange::Filter(VendorProductFilter {
            low_stock: true,
            ..VendorProductFilter::default()
        }));
        list.apply(ListChange::Page(3));
        persist(&session, "list:test", &list).await;

        let href = back_to_list::<VendorProductFilter>(
            &session,
            "list:test",
            10,
            "/vendor/products",
            ("notice", "deleted"),
        )
        .await;
        assert_eq!(href, "/vendor/products?low_stock=true&page=3&notice=deleted");
    }

    #[test]
    fn test_bulk_form_ids() {
        let form = BulkForm {
            action: "approve".to_string(),
            ids: "p1, p2,,p1".to_string(),
        };
        let ids: Vec<String> = form.product_ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_bulk_on_page_keeps_failed_rows_selected() {
        let session = session();
        let mut list: ListState<VendorProductFilter> = ListState::new(10);
        let ids = vec![ProductId::new("a"), ProductId::new("b")];

        let (page, outcome) = bulk_on_page(
            &session,
            "list:test",
            &mut list,
            BulkAction::Approve,
            &ids,
            |_| async {
                Ok(Paginated {
                    data: vec![product("a"), product("b"), product("c")],
                    total_pages: 1,
                    total_items: 3,
                })
            },
            |id| async move {
                if id.as_str() == "b" {
                    Err(ApiError::Forbidden)
                } else {
                    Ok(())
                }
            },
        )
        .await;

        let page = page.unwrap();
        assert_eq!(page.data[0].status, ProductStatus::Approved);
        assert_eq!(page.data[1].status, ProductStatus::Pending);
        assert_eq!(page.data[2].status, ProductStatus::Pending);
        assert_eq!(outcome.failure_count(), 1);
        assert!(list.selection().contains("b"));
        assert!(!list.selection().contains("a"));
        assert_eq!(list.selection().len(), 1);

        let stored: ListState<VendorProductFilter> = load_list(&session, "list:test", 10).await;
        assert!(stored.selection().is_empty());
    }
}
