//! List page state kept in the session, one entry per list.
//!
//! Filter forms and pagination links arrive as plain GETs. Comparing them with
//! the stored state is what lets a filter change reset the page even when the
//! form still carried the old page number, and lets bulk actions refetch the
//! page the visitor is looking at.

use bazaar_core::{ListChange, ListFilter, ListQuery, ListState};
use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

/// Load a list's state, or a fresh one on page 1.
///
/// A stored state with a different page size (after a config change) is
/// discarded, as is one that no longer deserializes.
pub async fn load_list<F>(session: &Session, key: &str, per_page: u32) -> ListState<F>
where
    F: ListFilter + Serialize + DeserializeOwned,
{
    let stored = session.get::<ListState<F>>(key).await.unwrap_or_else(|err| {
        tracing::debug!(key, error = %err, "Discarding unreadable list state");
        None
    });

    stored
        .filter(|state| state.per_page() == per_page)
        .unwrap_or_else(|| ListState::new(per_page))
}

/// Persist a list's state.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_list<F>(
    session: &Session,
    key: &str,
    state: &ListState<F>,
) -> Result<(), tower_sessions::session::Error>
where
    F: ListFilter + Serialize,
{
    session.insert(key, state).await
}

/// Fold a request's filter and page into the state and return what to fetch.
///
/// A changed filter wins over the requested page.
pub fn resolve_list<F: ListFilter>(
    state: &mut ListState<F>,
    filter: F,
    page: Option<u32>,
) -> ListQuery<F> {
    if state.apply(ListChange::Filter(filter)).is_none() {
        state.apply(ListChange::Page(page.unwrap_or(1)));
    }
    state.query()
}
