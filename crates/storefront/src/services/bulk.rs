//! Bulk actions: one backend mutation per selected row, run concurrently.
//!
//! There is no batch endpoint and no atomicity. Each row succeeds or fails on
//! its own and [`BulkOutcome`] keeps the per-row result.

use std::future::Future;

use bazaar_core::{BulkAction, BulkOutcome, ProductId};
use futures::future::join_all;

use crate::api::ApiResult;

/// Run `mutate` once per id and collect the results.
///
/// Mutations resolve in any order; results are keyed by id.
pub async fn run_bulk<F, Fut>(action: BulkAction, ids: &[ProductId], mutate: F) -> BulkOutcome
where
    F: Fn(ProductId) -> Fut,
    Fut: Future<Output = ApiResult<()>>,
{
    let results = join_all(ids.iter().map(|id| {
        let pending = mutate(id.clone());
        async move { (id.clone(), pending.await.map_err(|err| err.user_message())) }
    }))
    .await;

    let outcome = BulkOutcome { results };
    if outcome.failure_count() > 0 {
        let failed: Vec<String> = outcome.failed().map(|(id, _)| id.to_string()).collect();
        tracing::warn!(
            action = %action,
            succeeded = outcome.success_count(),
            failed = ?failed,
            "Bulk action partially failed"
        );
    } else {
        tracing::info!(action = %action, count = outcome.success_count(), "Bulk action completed");
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use bazaar_core::{Product, ProductStatus, VendorId, apply_bulk_outcome};
    use rust_decimal::Decimal;

    use super::*;
    use crate::api::ApiError;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            description: String::new(),
            price: Decimal::from(12),
            sale_price: None,
            category_id: None,
            vendor_id: VendorId::new("v1"),
            vendor_name: None,
            inventory: 3,
            is_active: false,
            status: ProductStatus::Pending,
            images: Vec::new(),
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_one_call_per_selected_item() {
        let ids: Vec<ProductId> = ["a", "b", "c", "d"].map(ProductId::new).to_vec();
        let calls = Mutex::new(Vec::new());

        let outcome = run_bulk(BulkAction::Approve, &ids, |id| {
            calls.lock().unwrap().push(id);
            async { Ok(()) }
        })
        .await;

        assert_eq!(calls.lock().unwrap().len(), 4);
        assert_eq!(outcome.success_count(), 4);
        assert_eq!(outcome.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_item_keeps_prior_state() {
        let ids: Vec<ProductId> = ["a", "b", "c"].map(ProductId::new).to_vec();
        let mut products: Vec<Product> = ["a", "b", "c"].map(product).to_vec();

        let outcome = run_bulk(BulkAction::Approve, &ids, |id| async move {
            if id.as_str() == "b" {
                Err(ApiError::Validation("missing images".to_string()))
            } else {
                Ok(())
            }
        })
        .await;

        apply_bulk_outcome(&mut products, BulkAction::Approve, &outcome);

        let statuses: Vec<(&str, ProductStatus)> = products
            .iter()
            .map(|p| (p.id.as_str(), p.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("a", ProductStatus::Approved),
                ("b", ProductStatus::Pending),
                ("c", ProductStatus::Approved),
            ]
        );
        assert_eq!(
            outcome.summary(BulkAction::Approve),
            "Approved 2 of 3 products. Failed: b (missing images)"
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_removes_only_succeeded_rows() {
        let ids: Vec<ProductId> = ["a", "b"].map(ProductId::new).to_vec();
        let mut products: Vec<Product> = ["a", "b", "c"].map(product).to_vec();

        let outcome = run_bulk(BulkAction::Delete, &ids, |id| async move {
            if id.as_str() == "a" {
                Ok(())
            } else {
                Err(ApiError::Forbidden)
            }
        })
        .await;

        apply_bulk_outcome(&mut products, BulkAction::Delete, &outcome);
        let remaining: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(remaining, vec!["b", "c"]);
    }
}
