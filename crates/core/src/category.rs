//! Categories and the category tree.
//!
//! The backend returns categories as a flat list where each entry optionally
//! names its parent. Navigation needs two shapes of that list:
//!
//! - a nested tree ([`build_category_tree`]) for the category index and the
//!   admin tree view, and
//! - a flat parent/child lookup ([`CategoryMenu`]) for dropdown menus.
//!
//! A category whose parent id is not present in the list is an *orphan*. Orphans
//! and everything below them are left out of both shapes without error.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, CategoryStatus};

/// A product category as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Parent category; `None` for top-level categories.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: CategoryStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    /// Whether this category is top-level.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A category together with its nested subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<Self>,
}

impl CategoryNode {
    /// Number of categories in this subtree, including the node itself.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always false: a node contains at least itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order walk of the subtree as `(depth, category)` rows.
    ///
    /// The node itself is at `depth`, its children at `depth + 1`, and so on.
    #[must_use]
    pub fn flatten(&self, depth: usize) -> Vec<(usize, &Category)> {
        let mut rows = Vec::with_capacity(self.len());
        self.push_rows(depth, &mut rows);
        rows
    }

    fn push_rows<'a>(&'a self, depth: usize, rows: &mut Vec<(usize, &'a Category)>) {
        rows.push((depth, &self.category));
        for child in &self.children {
            child.push_rows(depth + 1, rows);
        }
    }
}

/// Flatten a whole forest in pre-order, roots at depth 0.
#[must_use]
pub fn flatten_tree(roots: &[CategoryNode]) -> Vec<(usize, &Category)> {
    roots.iter().flat_map(|root| root.flatten(0)).collect()
}

/// Build the category forest from a flat list.
///
/// Roots are the categories without a parent. Each node's children are exactly
/// the categories whose `parent_id` equals the node's id, in input order.
/// Orphans (dangling parent ids) are dropped with their descendants, and so are
/// categories caught in a parent cycle since no root can reach them.
#[must_use]
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let by_parent = group_by_parent(categories);
    let mut path = HashSet::new();

    categories
        .iter()
        .filter(|c| c.is_root())
        .map(|root| build_node(root, &by_parent, &mut path))
        .collect()
}

fn group_by_parent(categories: &[Category]) -> HashMap<&CategoryId, Vec<&Category>> {
    let mut by_parent: HashMap<&CategoryId, Vec<&Category>> = HashMap::new();
    for category in categories {
        if let Some(parent) = &category.parent_id {
            by_parent.entry(parent).or_default().push(category);
        }
    }
    by_parent
}

fn build_node<'a>(
    category: &'a Category,
    by_parent: &HashMap<&CategoryId, Vec<&'a Category>>,
    path: &mut HashSet<&'a CategoryId>,
) -> CategoryNode {
    // Duplicate ids in the input could otherwise make a node its own child.
    path.insert(&category.id);

    let mut children = Vec::new();
    if let Some(kids) = by_parent.get(&category.id) {
        for &kid in kids {
            if !path.contains(&kid.id) {
                children.push(build_node(kid, by_parent, path));
            }
        }
    }

    path.remove(&category.id);

    CategoryNode {
        category: category.clone(),
        children,
    }
}

/// Flat parent/child lookup used by dropdown menus.
#[derive(Debug, Clone, Default)]
pub struct CategoryMenu {
    parents: Vec<Category>,
    children: HashMap<CategoryId, Vec<Category>>,
}

impl CategoryMenu {
    /// Build the lookup, keeping input order within each level.
    #[must_use]
    pub fn from_categories(categories: &[Category]) -> Self {
        let mut menu = Self::default();
        for category in categories {
            match &category.parent_id {
                None => menu.parents.push(category.clone()),
                Some(parent) => menu
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(category.clone()),
            }
        }
        menu
    }

    /// Top-level categories.
    #[must_use]
    pub fn parents(&self) -> &[Category] {
        &self.parents
    }

    /// Direct children of a category (empty when it has none).
    #[must_use]
    pub fn children_of(&self, id: &CategoryId) -> &[Category] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Whether the menu has no top-level entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// `(id, label)` options for a `<select>` in tree order, each label
    /// prefixed with one `- ` per level below the root. Only categories
    /// reachable from a root appear, so orphans and cycles are skipped.
    #[must_use]
    pub fn select_options(&self) -> Vec<(CategoryId, String)> {
        let mut options = Vec::new();
        let mut seen: HashSet<&CategoryId> = HashSet::new();
        let mut stack: Vec<(usize, &Category)> =
            self.parents.iter().rev().map(|c| (0, c)).collect();
        while let Some((depth, category)) = stack.pop() {
            // Duplicate ids would otherwise revisit a subtree forever.
            if !seen.insert(&category.id) {
                continue;
            }
            options.push((
                category.id.clone(),
                format!("{}{}", "- ".repeat(depth), category.name),
            ));
            stack.extend(
                self.children_of(&category.id)
                    .iter()
                    .rev()
                    .map(|child| (depth + 1, child)),
            );
        }
        options
    }
}

/// Path from the root down to `id`, inclusive.
///
/// Stops early at a missing parent and never loops on a parent cycle. Returns
/// an empty path when `id` is unknown.
#[must_use]
pub fn breadcrumbs<'a>(categories: &'a [Category], id: &CategoryId) -> Vec<&'a Category> {
    let by_id: HashMap<&CategoryId, &Category> = categories.iter().map(|c| (&c.id, c)).collect();

    let mut trail = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = by_id.get(id).copied();

    while let Some(category) = cursor {
        if !seen.insert(&category.id) {
            break;
        }
        trail.push(category);
        cursor = category
            .parent_id
            .as_ref()
            .and_then(|parent| by_id.get(parent).copied());
    }

    trail.reverse();
    trail
}

/// Find a category by slug.
#[must_use]
pub fn find_by_slug<'a>(categories: &'a [Category], slug: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.slug == slug)
}

/// Keep only categories customers may see.
#[must_use]
pub fn approved(categories: Vec<Category>) -> Vec<Category> {
    categories
        .into_iter()
        .filter(|c| c.status == CategoryStatus::Approved)
        .collect()
}
