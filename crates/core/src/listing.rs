//! State of paginated, filterable list pages.
//!
//! Every list page (storefront products, vendor products, vendor orders, admin
//! moderation) owns a [`ListState`]: the current page, a fixed page size, a
//! filter value and the set of rows selected for bulk actions.
//!
//! Rules:
//!
//! - changing the filter resets the page to 1, clears the selection and
//!   requests exactly one refetch;
//! - changing the page refetches without touching the filter;
//! - selection changes never refetch.
//!
//! Bulk actions run one mutation per selected row with no batch guarantee;
//! [`apply_bulk_outcome`] folds the per-row results back into the local list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{ProductId, ProductStatus};

/// A filter that can be rendered as query parameters.
pub trait ListFilter: Clone + PartialEq + Default {
    /// Active filter values as `(key, value)` pairs. Empty values are omitted.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Pairs for links back to this filter. Same as [`ListFilter::query_pairs`]
    /// unless an unset value differs from the default and must be spelled out.
    fn link_pairs(&self) -> Vec<(&'static str, String)> {
        self.query_pairs()
    }

    /// Whether no filter value is set.
    fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Ids selected for a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    /// Parse a comma-separated id list, ignoring blanks.
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        Self {
            ids: csv
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Comma-separated rendering, the inverse of [`Selection::from_csv`].
    #[must_use]
    pub fn to_csv(&self) -> String {
        self.ids.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }

    /// Flip membership of `id`.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Select every id in `ids`.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// An input to a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<F> {
    /// Replace the filter.
    Filter(F),
    /// Go to a page (1-based; 0 is treated as 1).
    Page(u32),
    /// Toggle one row's selection.
    Toggle(String),
    /// Select the given rows.
    SelectAll(Vec<String>),
    /// Deselect all rows.
    ClearSelection,
}

/// What to ask the backend for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery<F> {
    pub page: u32,
    pub per_page: u32,
    pub filter: F,
}

impl<F: ListFilter> ListQuery<F> {
    /// Filter pairs followed by `page` and `limit`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter.query_pairs();
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.per_page.to_string()));
        pairs
    }
}

/// Page, page size, filter and selection of one list page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListState<F> {
    page: u32,
    per_page: u32,
    filter: F,
    /// Lives for one render only; never written to the session.
    #[serde(skip)]
    selection: Selection,
}

impl<F: ListFilter> ListState<F> {
    /// Fresh state on page 1 with the default filter.
    #[must_use]
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            filter: F::default(),
            selection: Selection::default(),
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub const fn filter(&self) -> &F {
        &self.filter
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The query for the current state.
    #[must_use]
    pub fn query(&self) -> ListQuery<F> {
        ListQuery {
            page: self.page,
            per_page: self.per_page,
            filter: self.filter.clone(),
        }
    }

    /// Apply a change and return the refetch it requires, if any.
    pub fn apply(&mut self, change: ListChange<F>) -> Option<ListQuery<F>> {
        match change {
            ListChange::Filter(filter) => {
                if filter == self.filter {
                    return None;
                }
                self.filter = filter;
                self.page = 1;
                self.selection.clear();
                Some(self.query())
            }
            ListChange::Page(page) => {
                let page = page.max(1);
                if page == self.page {
                    return None;
                }
                self.page = page;
                Some(self.query())
            }
            ListChange::Toggle(id) => {
                self.selection.toggle(&id);
                None
            }
            ListChange::SelectAll(ids) => {
                self.selection.select_all(ids);
                None
            }
            ListChange::ClearSelection => {
                self.selection.clear();
                None
            }
        }
    }

    /// Clamp the page after the backend reports how many pages exist.
    ///
    /// Returns the refetch needed when the current page fell off the end.
    pub fn clamp_to(&mut self, total_pages: u32) -> Option<ListQuery<F>> {
        let last = total_pages.max(1);
        if self.page > last {
            self.page = last;
            Some(self.query())
        } else {
            None
        }
    }

    /// Query pairs for a link to `page` that keeps the current filter.
    #[must_use]
    pub fn link_pairs(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter.link_pairs();
        pairs.push(("page", page.max(1).to_string()));
        pairs
    }
}

/// Page navigation derived from the backend's page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(current: u32, total_pages: u32, total_items: u64) -> Self {
        Self {
            current,
            total_pages,
            total_items,
        }
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    #[must_use]
    pub const fn prev(&self) -> u32 {
        if self.current > 1 { self.current - 1 } else { 1 }
    }

    #[must_use]
    pub const fn next(&self) -> u32 {
        if self.has_next() {
            self.current + 1
        } else {
            self.current
        }
    }

    /// Page numbers within `radius` of the current page.
    #[must_use]
    pub fn window(&self, radius: u32) -> Vec<u32> {
        if self.total_pages == 0 {
            return Vec::new();
        }
        let start = self.current.saturating_sub(radius).max(1);
        let end = self.current.saturating_add(radius).min(self.total_pages);
        (start..=end).collect()
    }
}

/// Actions offered on selected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Approve,
    Reject,
    Activate,
    Deactivate,
    Delete,
}

impl BulkAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Delete => "delete",
        }
    }

    /// Past-tense verb for result messages.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Activate => "activated",
            Self::Deactivate => "deactivated",
            Self::Delete => "deleted",
        }
    }

    /// Apply a successful action to a local product.
    ///
    /// Returns `false` when the product should be removed from the list.
    pub fn apply_to(self, product: &mut Product) -> bool {
        match self {
            Self::Approve => product.status = ProductStatus::Approved,
            Self::Reject => product.status = ProductStatus::Rejected,
            Self::Activate => {
                product.status = ProductStatus::Active;
                product.is_active = true;
            }
            Self::Deactivate => {
                product.status = ProductStatus::Inactive;
                product.is_active = false;
            }
            Self::Delete => return false,
        }
        true
    }
}

impl std::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "activate" => Ok(Self::Activate),
            "deactivate" => Ok(Self::Deactivate),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("invalid bulk action: {s}")),
        }
    }
}

/// Per-row results of a bulk action, in no particular order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    pub results: Vec<(ProductId, Result<(), String>)>,
}

impl BulkOutcome {
    /// Ids whose mutation succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &ProductId> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| id)
    }

    /// Ids whose mutation failed, with the error message.
    pub fn failed(&self) -> impl Iterator<Item = (&ProductId, &str)> {
        self.results.iter().filter_map(|(id, r)| match r {
            Ok(()) => None,
            Err(e) => Some((id, e.as_str())),
        })
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// User-facing summary such as `"Approved 2 of 3 products. Failed: p3 (timeout)"`.
    #[must_use]
    pub fn summary(&self, action: BulkAction) -> String {
        let total = self.results.len();
        let ok = self.success_count();
        let verb = action.past_tense();
        let mut message = format!(
            "{}{} {ok} of {total} products.",
            verb.get(..1).unwrap_or_default().to_uppercase(),
            verb.get(1..).unwrap_or_default()
        );
        let failures: Vec<String> = self
            .failed()
            .map(|(id, e)| format!("{id} ({e})"))
            .collect();
        if !failures.is_empty() {
            message.push_str(" Failed: ");
            message.push_str(&failures.join(", "));
        }
        message
    }
}

/// Fold bulk results into the local list.
///
/// Rows whose mutation succeeded take their new state (or disappear on
/// delete); failed and untouched rows keep what they had.
pub fn apply_bulk_outcome(products: &mut Vec<Product>, action: BulkAction, outcome: &BulkOutcome) {
    let succeeded: BTreeSet<&ProductId> = outcome.succeeded().collect();
    products.retain_mut(|product| {
        if succeeded.contains(&product.id) {
            action.apply_to(product)
        } else {
            true
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::VendorId;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct StatusFilter {
        status: Option<String>,
    }

    impl ListFilter for StatusFilter {
        fn query_pairs(&self) -> Vec<(&'static str, String)> {
            self.status
                .iter()
                .map(|s| ("status", s.clone()))
                .collect()
        }
    }

    fn pending() -> StatusFilter {
        StatusFilter {
            status: Some("pending".to_string()),
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Decimal::from(10),
            sale_price: None,
            category_id: None,
            vendor_id: VendorId::new("v1"),
            vendor_name: None,
            inventory: 1,
            is_active: false,
            status: ProductStatus::Pending,
            images: Vec::new(),
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_filter_change_resets_page_and_refetches_once() {
        let mut state: ListState<StatusFilter> = ListState::new(20);
        assert!(state.apply(ListChange::Page(3)).is_some());
        assert_eq!(state.page(), 3);

        let refetch = state.apply(ListChange::Filter(pending())).unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(refetch.page, 1);
        assert_eq!(refetch.filter, pending());
        assert_eq!(
            refetch.query_pairs(),
            vec![
                ("status", "pending".to_string()),
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
            ]
        );

        // Same filter again is not a change.
        assert!(state.apply(ListChange::Filter(pending())).is_none());
    }

    #[test]
    fn test_page_change_keeps_filter() {
        let mut state: ListState<StatusFilter> = ListState::new(10);
        state.apply(ListChange::Filter(pending()));

        let refetch = state.apply(ListChange::Page(2)).unwrap();
        assert_eq!(refetch.page, 2);
        assert_eq!(refetch.filter, pending());
        assert!(state.apply(ListChange::Page(2)).is_none());
        assert_eq!(state.apply(ListChange::Page(0)).unwrap().page, 1);
    }

    #[test]
    fn test_selection_never_refetches_and_filter_clears_it() {
        let mut state: ListState<StatusFilter> = ListState::new(10);
        assert!(state.apply(ListChange::Toggle("a".into())).is_none());
        assert!(
            state
                .apply(ListChange::SelectAll(vec!["b".into(), "c".into()]))
                .is_none()
        );
        assert_eq!(state.selection().len(), 3);

        state.apply(ListChange::Toggle("a".into()));
        assert!(!state.selection().contains("a"));

        state.apply(ListChange::Filter(pending()));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_clamp_to() {
        let mut state: ListState<StatusFilter> = ListState::new(10);
        state.apply(ListChange::Page(5));
        assert_eq!(state.clamp_to(2).unwrap().page, 2);
        assert!(state.clamp_to(2).is_none());
        assert_eq!(state.clamp_to(0).unwrap().page, 1);
    }

    #[test]
    fn test_link_pairs_preserve_filter() {
        let mut state: ListState<StatusFilter> = ListState::new(10);
        state.apply(ListChange::Filter(pending()));
        assert_eq!(
            state.link_pairs(4),
            vec![("status", "pending".to_string()), ("page", "4".to_string())]
        );
    }

    #[test]
    fn test_selection_is_not_stored() {
        let mut state: ListState<StatusFilter> = ListState::new(10);
        state.apply(ListChange::Filter(pending()));
        state.apply(ListChange::SelectAll(vec!["a".into()]));

        let stored = serde_json::to_string(&state).unwrap();
        assert!(!stored.contains("selection"));
        let restored: ListState<StatusFilter> = serde_json::from_str(&stored).unwrap();
        assert!(restored.selection().is_empty());
        assert_eq!(restored.filter(), &pending());
    }

    #[test]
    fn test_selection_csv() {
        let selection = Selection::from_csv(" p2, p1,,p2 ");
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.to_csv(), "p1,p2");
    }

    #[test]
    fn test_pagination_window() {
        let p = Pagination::new(5, 9, 180);
        assert_eq!(p.window(2), vec![3, 4, 5, 6, 7]);
        assert!(p.has_prev() && p.has_next());
        assert_eq!((p.prev(), p.next()), (4, 6));

        let first = Pagination::new(1, 2, 30);
        assert_eq!(first.window(2), vec![1, 2]);
        assert!(!first.has_prev());

        assert!(Pagination::new(1, 0, 0).window(2).is_empty());
    }

    #[test]
    fn test_bulk_partial_failure_keeps_failed_row() {
        let mut products = vec![product("p1"), product("p2"), product("p3")];
        let outcome = BulkOutcome {
            results: vec![
                (ProductId::new("p3"), Ok(())),
                (ProductId::new("p2"), Err("timeout".to_string())),
                (ProductId::new("p1"), Ok(())),
            ],
        };

        apply_bulk_outcome(&mut products, BulkAction::Approve, &outcome);

        assert_eq!(products[0].status, ProductStatus::Approved);
        assert_eq!(products[1].status, ProductStatus::Pending);
        assert_eq!(products[2].status, ProductStatus::Approved);
        assert_eq!(outcome.success_count(), 2);
        assert_eq!(
            outcome.summary(BulkAction::Approve),
            "Approved 2 of 3 products. Failed: p2 (timeout)"
        );
    }

    #[test]
    fn test_bulk_delete_removes_only_succeeded_rows() {
        let mut products = vec![product("p1"), product("p2")];
        let outcome = BulkOutcome {
            results: vec![
                (ProductId::new("p1"), Ok(())),
                (ProductId::new("p2"), Err("forbidden".to_string())),
            ],
        };

        apply_bulk_outcome(&mut products, BulkAction::Delete, &outcome);

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new("p2"));
    }

    #[test]
    fn test_bulk_activate_sets_flag() {
        let mut p = product("p1");
        assert!(BulkAction::Activate.apply_to(&mut p));
        assert!(p.is_active);
        assert_eq!(p.status, ProductStatus::Active);
        assert_eq!("deactivate".parse::<BulkAction>(), Ok(BulkAction::Deactivate));
    }
}
