//! Category administration: the full tree, create/edit forms and moderation
//! of vendor-proposed categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::category::flatten_tree;
use bazaar_core::{Category, CategoryId, CategoryStatus, build_category_tree};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::AdminNotice;
use crate::api::ApiError;
use crate::api::admin::CategoryInput;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::ErrorTemplate;
use crate::state::AppState;
use crate::views::{CategoryRowView, NavView, SelectOption, category_id_from_form, category_rows};

/// Category tree template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/index.html")]
pub struct CategoriesAdminTemplate {
    pub nav: NavView,
    pub rows: Vec<CategoryRowView>,
    pub pending_count: usize,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Category form fields as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl CategoryForm {
    /// Validate into an API payload.
    ///
    /// # Errors
    ///
    /// Returns a visitor-facing message when the name is blank or the parent
    /// is the category itself.
    pub fn to_input(&self, editing: Option<&CategoryId>) -> Result<CategoryInput, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Category name is required.".to_string());
        }
        let parent_id = category_id_from_form(Some(&self.parent_id));
        if parent_id.is_some() && parent_id.as_ref() == editing {
            return Err("A category cannot be its own parent.".to_string());
        }
        Ok(CategoryInput {
            name: name.to_string(),
            parent_id,
            description: non_blank(&self.description),
            image_url: non_blank(&self.image_url),
        })
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        let input = CategoryInput::from(category);
        Self {
            name: input.name,
            parent_id: input.parent_id.map(|id| id.to_string()).unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            image_url: input.image_url.unwrap_or_default(),
        }
    }
}

/// Parent picker options, indented by depth.
///
/// When editing, the category and everything below it are left out so the
/// tree cannot be turned into a cycle.
#[must_use]
pub fn parent_options(
    categories: &[Category],
    editing: Option<&CategoryId>,
    current: Option<&str>,
) -> Vec<SelectOption> {
    let tree = build_category_tree(categories);
    let mut excluded_depth: Option<usize> = None;
    let mut options = vec![SelectOption::new("", "(top level)", current.is_none())];

    for (depth, category) in flatten_tree(&tree) {
        if let Some(limit) = excluded_depth {
            if depth > limit {
                continue;
            }
            excluded_depth = None;
        }
        if Some(&category.id) == editing {
            excluded_depth = Some(depth);
            continue;
        }
        let label = format!("{}{}", "\u{2003}".repeat(depth), category.name);
        let selected = current == Some(category.id.as_str());
        options.push(SelectOption::new(category.id.to_string(), label, selected));
    }
    options
}

/// Category create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/form.html")]
pub struct CategoryFormTemplate {
    pub nav: NavView,
    pub title: String,
    pub action: String,
    pub form: CategoryForm,
    pub parents: Vec<SelectOption>,
    pub error: Option<String>,
}

impl CategoryFormTemplate {
    fn new(
        nav: NavView,
        editing: Option<&CategoryId>,
        form: CategoryForm,
        categories: &[Category],
    ) -> Self {
        let (title, action) = editing.map_or_else(
            || ("New category".to_string(), "/admin/categories".to_string()),
            |id| {
                (
                    "Edit category".to_string(),
                    format!("/admin/categories/{}", urlencoding::encode(id.as_str())),
                )
            },
        );
        let current = Some(form.parent_id.as_str()).filter(|id| !id.is_empty());
        let parents = parent_options(categories, editing, current);
        Self {
            nav,
            title,
            action,
            form,
            parents,
            error: None,
        }
    }
}

async fn all_categories(state: &AppState, user: &CurrentUser) -> Result<Vec<Category>, ApiError> {
    state.api().admin_categories(&user.caller()).await
}

/// Category tree, every status included.
#[instrument(skip(state, session, user, notice))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Query(notice): Query<AdminNotice>,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, Some(&user)).await;
    let (rows, pending_count, error) = match all_categories(&state, &user).await {
        Ok(categories) => {
            let pending = categories
                .iter()
                .filter(|c| c.status == CategoryStatus::Pending)
                .count();
            (category_rows(&build_category_tree(&categories)), pending, None)
        }
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            (Vec::new(), 0, Some(e.user_message()))
        }
    };

    CategoriesAdminTemplate {
        nav,
        rows,
        pending_count,
        notice: notice.notice_message(),
        error: error.or_else(|| notice.error_message()),
    }
}

/// Empty category form.
#[instrument(skip(state, session, user))]
pub async fn new_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> impl IntoResponse {
    let nav = NavView::load(&state, &session, Some(&user)).await;
    let categories = all_categories(&state, &user).await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories for parent picker: {e}");
        Vec::new()
    });
    CategoryFormTemplate::new(nav, None, CategoryForm::default(), &categories)
}

/// Create a category.
#[instrument(skip(state, session, user, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = match form.to_input(None) {
        Ok(input) => state
            .api()
            .create_category(&user.caller(), &input)
            .await
            .map_err(|e| e.user_message()),
        Err(message) => Err(message),
    };

    match result {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            Redirect::to("/admin/categories?notice=category_created").into_response()
        }
        Err(message) => form_error(&state, &session, &user, None, form, message).await,
    }
}

/// Category form pre-filled for editing.
#[instrument(skip(state, session, user))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    let nav = NavView::load(&state, &session, Some(&user)).await;
    let id = CategoryId::new(id);
    match all_categories(&state, &user).await {
        Ok(categories) => match categories.iter().find(|c| c.id == id) {
            Some(category) => {
                let form = CategoryForm::from(category);
                CategoryFormTemplate::new(nav, Some(&id), form, &categories).into_response()
            }
            None => ErrorTemplate::not_found(nav, "Category").into_response(),
        },
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            ErrorTemplate::new(nav, StatusCode::BAD_GATEWAY, e.user_message()).into_response()
        }
    }
}

/// Save an edited category.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let id = CategoryId::new(id);
    let result = match form.to_input(Some(&id)) {
        Ok(input) => state
            .api()
            .update_category(&user.caller(), &id, &input)
            .await
            .map_err(|e| e.user_message()),
        Err(message) => Err(message),
    };

    match result {
        Ok(_) => Redirect::to("/admin/categories?notice=category_updated").into_response(),
        Err(message) => form_error(&state, &session, &user, Some(&id), form, message).await,
    }
}

async fn form_error(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    editing: Option<&CategoryId>,
    form: CategoryForm,
    message: String,
) -> Response {
    let nav = NavView::load(state, session, Some(user)).await;
    let categories = all_categories(state, user).await.unwrap_or_default();
    let mut template = CategoryFormTemplate::new(nav, editing, form, &categories);
    template.error = Some(message);
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Delete a category.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    let id = CategoryId::new(id);
    match state.api().delete_category(&user.caller(), &id).await {
        Ok(()) => Redirect::to("/admin/categories?notice=category_deleted"),
        Err(e) => {
            tracing::error!(category_id = %id, "Failed to delete category: {e}");
            Redirect::to("/admin/categories?error=category_delete")
        }
    }
}

/// Approve a proposed category.
#[instrument(skip(state, user))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    moderate(&state, &user, CategoryId::new(id), true).await
}

/// Reject a proposed category.
#[instrument(skip(state, user))]
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Redirect {
    moderate(&state, &user, CategoryId::new(id), false).await
}

async fn moderate(
    state: &AppState,
    user: &CurrentUser,
    id: CategoryId,
    approve: bool,
) -> Redirect {
    match state.api().moderate_category(&user.caller(), &id, approve).await {
        Ok(()) if approve => Redirect::to("/admin/categories?notice=category_approved"),
        Ok(()) => Redirect::to("/admin/categories?notice=category_rejected"),
        Err(e) => {
            tracing::error!(category_id = %id, approve, "Failed to moderate category: {e}");
            Redirect::to("/admin/categories?error=category_moderation")
        }
    }
}
