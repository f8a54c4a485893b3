//! Display data for templates.
//!
//! Templates only see pre-formatted strings and flags; all money formatting,
//! status labels and link building happens here.

use bazaar_core::category::{CategoryNode, flatten_tree};
use bazaar_core::{
    Cart, CartItem, Category, CategoryId, CategoryMenu, ListFilter, ListState, Order, OrderStatus,
    Pagination, Product, format_money,
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::services::CartContext;
use crate::state::AppState;

/// Pages shown on either side of the current page in a pager.
const PAGER_RADIUS: u32 = 2;

/// Deepest category level with its own indentation style.
const MAX_INDENT_DEPTH: usize = 5;

// =============================================================================
// Links
// =============================================================================

/// `path?k=v&...`, or just `path` without pairs.
#[must_use]
pub fn href_with(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}

/// Public page of a category. Falls back to the id when no slug is set.
#[must_use]
pub fn category_href(category: &Category) -> String {
    let key = if category.slug.is_empty() {
        category.id.as_str()
    } else {
        category.slug.as_str()
    };
    format!("/categories/{}", urlencoding::encode(key))
}

/// Public page of a product.
#[must_use]
pub fn product_href(id: &impl ToString) -> String {
    format!("/products/{}", urlencoding::encode(&id.to_string()))
}

// =============================================================================
// Navigation
// =============================================================================

/// A link in the navigation menu.
#[derive(Clone)]
pub struct MenuLinkView {
    pub name: String,
    pub href: String,
}

/// A top-level category with its direct children.
#[derive(Clone)]
pub struct MenuEntryView {
    pub name: String,
    pub href: String,
    pub children: Vec<MenuLinkView>,
}

/// Header data shared by every page.
#[derive(Clone, Default)]
pub struct NavView {
    pub user_name: Option<String>,
    pub is_vendor: bool,
    pub is_admin: bool,
    pub cart_count: u32,
    pub menu: Vec<MenuEntryView>,
}

impl NavView {
    /// Build the header from the category menu and the visitor's session data.
    #[must_use]
    pub fn new(menu: &CategoryMenu, user: Option<&CurrentUser>, cart_count: u32) -> Self {
        let menu = menu
            .parents()
            .iter()
            .map(|parent| MenuEntryView {
                name: parent.name.clone(),
                href: category_href(parent),
                children: menu
                    .children_of(&parent.id)
                    .iter()
                    .map(|child| MenuLinkView {
                        name: child.name.clone(),
                        href: category_href(child),
                    })
                    .collect(),
            })
            .collect();

        Self {
            user_name: user.map(|u| u.display_name().to_string()),
            is_vendor: user.is_some_and(CurrentUser::is_vendor),
            is_admin: user.is_some_and(CurrentUser::is_admin),
            cart_count,
            menu,
        }
    }

    /// Load everything the header needs.
    ///
    /// Neither a category fetch failure nor a session error breaks the page:
    /// the menu is left empty and the badge shows zero.
    pub async fn load(state: &AppState, session: &Session, user: Option<&CurrentUser>) -> Self {
        let menu = match state.api().categories().await {
            Ok(categories) => {
                CategoryMenu::from_categories(&bazaar_core::category::approved(
                    categories.as_ref().clone(),
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load navigation categories");
                CategoryMenu::default()
            }
        };

        let cart_count = CartContext::load(session)
            .await
            .map(|context| context.item_count())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read cart context");
                0
            });

        Self::new(&menu, user, cart_count)
    }
}

// =============================================================================
// Forms
// =============================================================================

/// An `<option>` in a `<select>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// Options for a status filter, led by an "All" entry.
#[must_use]
pub fn status_options<T>(all: &[T], current: Option<T>, label: fn(T) -> &'static str) -> Vec<SelectOption>
where
    T: Copy + PartialEq + std::fmt::Display,
{
    std::iter::once(SelectOption::new("all", "All", current.is_none()))
        .chain(
            all.iter()
                .map(|s| SelectOption::new(s.to_string(), label(*s), current == Some(*s))),
        )
        .collect()
}

/// Category options for filters and product forms, led by a blank entry.
#[must_use]
pub fn category_options(
    menu: &CategoryMenu,
    current: Option<&str>,
    blank_label: &str,
) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", blank_label, current.is_none()))
        .chain(menu.select_options().into_iter().map(|(id, label)| {
            let selected = current == Some(id.as_str());
            SelectOption::new(id.to_string(), label, selected)
        }))
        .collect()
}

// =============================================================================
// Products
// =============================================================================

/// Product tile on public pages.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub vendor_name: Option<String>,
    pub price: String,
    /// Original price when on sale.
    pub compare_at_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            href: product_href(&product.id),
            name: product.name.clone(),
            vendor_name: product.vendor_name.clone(),
            price: format_money(product.effective_price()),
            compare_at_price: product
                .is_on_sale()
                .then(|| format_money(product.price)),
            discount_percent: product.discount_percent(),
            image: product.primary_image().map(String::from),
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub images: Vec<String>,
    pub inventory: u32,
    pub low_stock: bool,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            images: product.images.clone(),
            inventory: product.inventory,
            low_stock: product.in_stock() && product.is_low_stock(),
        }
    }
}

/// Row in the vendor and admin product tables.
#[derive(Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub vendor_name: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub inventory: u32,
    pub low_stock: bool,
    pub is_active: bool,
    pub status: String,
    pub status_label: String,
    pub rejection_reason: Option<String>,
    pub selected: bool,
}

impl ProductRowView {
    /// Build a row, marking it selected when its id is in the list selection.
    #[must_use]
    pub fn new<F: ListFilter>(product: &Product, list: &ListState<F>) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            vendor_name: product
                .vendor_name
                .clone()
                .unwrap_or_else(|| product.vendor_id.to_string()),
            price: format_money(product.price),
            sale_price: product.sale_price.map(format_money),
            inventory: product.inventory,
            low_stock: product.is_low_stock(),
            is_active: product.is_active,
            status: product.status.to_string(),
            status_label: product.status.label().to_string(),
            rejection_reason: product.rejection_reason.clone(),
            selected: list.selection().contains(product.id.as_str()),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub product_href: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_href: product_href(&item.product_id),
            name: item.name.clone(),
            quantity: item.quantity,
            price: format_money(item.price),
            line_price: format_money(item.line_total()),
            image: item.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: format_money(cart.total_price),
            item_count: cart.total_items,
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// One row of a rendered category tree.
#[derive(Clone)]
pub struct CategoryRowView {
    pub id: String,
    pub name: String,
    pub href: String,
    pub depth: usize,
    /// CSS class for the nesting level; deeper levels share the last one.
    pub indent: String,
    pub description: Option<String>,
    pub status: String,
    pub status_label: String,
}

impl CategoryRowView {
    fn new(depth: usize, category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            href: category_href(category),
            depth,
            indent: format!("depth-{}", depth.min(MAX_INDENT_DEPTH)),
            description: category.description.clone(),
            status: category.status.to_string(),
            status_label: category.status.label().to_string(),
        }
    }
}

/// Pre-order rows for a category tree.
#[must_use]
pub fn category_rows(roots: &[CategoryNode]) -> Vec<CategoryRowView> {
    flatten_tree(roots)
        .into_iter()
        .map(|(depth, category)| CategoryRowView::new(depth, category))
        .collect()
}

/// A breadcrumb link.
#[derive(Clone)]
pub struct CrumbView {
    pub name: String,
    pub href: String,
}

impl From<&Category> for CrumbView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            href: category_href(category),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Row in the vendor order table.
#[derive(Clone)]
pub struct OrderRowView {
    pub id: String,
    pub href: String,
    pub customer: String,
    pub item_count: u32,
    pub total: String,
    pub status: String,
    pub status_label: String,
    pub payment_label: String,
    pub created_at: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            href: format!("/vendor/orders/{}", urlencoding::encode(order.id.as_str())),
            customer: order
                .customer_name
                .clone()
                .unwrap_or_else(|| order.shipping_address.full_name.clone()),
            item_count: order.item_count(),
            total: format_money(order.total),
            status: order.status.to_string(),
            status_label: order.status.label().to_string(),
            payment_label: order.payment_status.label().to_string(),
            created_at: order
                .created_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Statuses offered in the order status form: only valid next steps.
#[must_use]
pub fn next_status_options(status: OrderStatus) -> Vec<SelectOption> {
    status
        .next_statuses()
        .iter()
        .map(|s| SelectOption::new(s.to_string(), s.label(), false))
        .collect()
}

// =============================================================================
// Pagination
// =============================================================================

/// A numbered page link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLinkView {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Pager under a list. Links keep the list's filter.
#[derive(Clone, Debug, Default)]
pub struct PagerView {
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub pages: Vec<PageLinkView>,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PagerView {
    #[must_use]
    pub fn new<F: ListFilter>(path: &str, list: &ListState<F>, pagination: Pagination) -> Self {
        let link = |page: u32| href_with(path, &list.link_pairs(page));
        Self {
            prev_href: pagination.has_prev().then(|| link(pagination.prev())),
            next_href: pagination.has_next().then(|| link(pagination.next())),
            pages: pagination
                .window(PAGER_RADIUS)
                .into_iter()
                .map(|number| PageLinkView {
                    number,
                    href: link(number),
                    current: number == pagination.current,
                })
                .collect(),
            total_items: pagination.total_items,
            total_pages: pagination.total_pages,
        }
    }

    /// Whether there is more than one page to navigate.
    #[must_use]
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}

/// `CategoryId` from an optional form value, blank meaning none.
#[must_use]
pub fn category_id_from_form(value: Option<&str>) -> Option<CategoryId> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(CategoryId::new)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use bazaar_core::{
        CategoryStatus, ListChange, ProductFilter, ProductId, ProductStatus, VendorId,
        build_category_tree,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn category(id: &str, parent: Option<&str>, slug: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("Cat {id}"),
            parent_id: parent.map(CategoryId::new),
            image_url: None,
            description: None,
            slug: slug.to_string(),
            status: CategoryStatus::Approved,
            created_at: None,
            updated_at: None,
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("p 1"),
            name: "Mug".to_string(),
            description: String::new(),
            price: Decimal::new(2000, 2),
            sale_price: Some(Decimal::new(1500, 2)),
            category_id: None,
            vendor_id: VendorId::new("v1"),
            vendor_name: None,
            inventory: 2,
            is_active: true,
            status: ProductStatus::Active,
            images: vec!["https://img.example/mug.jpg".to_string()],
            rejection_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_product_card_formats_sale() {
        let card = ProductCardView::from(&product());
        assert_eq!(card.price, "$15.00");
        assert_eq!(card.compare_at_price.as_deref(), Some("$20.00"));
        assert_eq!(card.discount_percent, Some(25));
        assert_eq!(card.href, "/products/p%201");
    }

    #[test]
    fn test_product_row_reflects_selection() {
        let mut list: ListState<ProductFilter> = ListState::new(10);
        list.apply(ListChange::Toggle("p 1".to_string()));
        let row = ProductRowView::new(&product(), &list);
        assert!(row.selected);
        assert!(row.low_stock);
        assert_eq!(row.vendor_name, "v1");
        assert_eq!(row.status_label, "Active");
    }

    #[test]
    fn test_nav_menu_groups_children() {
        let categories = vec![
            category("1", None, "home"),
            category("2", Some("1"), "kitchen"),
            category("3", None, ""),
        ];
        let nav = NavView::new(&CategoryMenu::from_categories(&categories), None, 3);
        assert_eq!(nav.menu.len(), 2);
        assert_eq!(nav.menu[0].children[0].href, "/categories/kitchen");
        assert_eq!(nav.menu[1].href, "/categories/3");
        assert_eq!(nav.cart_count, 3);
        assert!(nav.user_name.is_none());
    }

    #[test]
    fn test_category_rows_are_indented_pre_order() {
        let categories = vec![
            category("1", None, "a"),
            category("2", Some("1"), "b"),
            category("3", Some("2"), "c"),
        ];
        let rows = category_rows(&build_category_tree(&categories));
        let depths: Vec<usize> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(rows[2].indent, "depth-2");
    }

    #[test]
    fn test_pager_links_keep_filter() {
        let mut list: ListState<ProductFilter> = ListState::new(10);
        list.apply(ListChange::Filter(ProductFilter {
            search: Some("red mug".to_string()),
            ..ProductFilter::default()
        }));
        list.apply(ListChange::Page(2));

        let pager = PagerView::new("/products", &list, Pagination::new(2, 3, 25));
        assert_eq!(
            pager.prev_href.as_deref(),
            Some("/products?search=red+mug&page=1")
        );
        assert_eq!(
            pager.next_href.as_deref(),
            Some("/products?search=red+mug&page=3")
        );
        assert_eq!(pager.pages.len(), 3);
        assert!(pager.pages[1].current);
    }

    #[test]
    fn test_status_options_mark_current() {
        let options = status_options(
            ProductStatus::ALL,
            Some(ProductStatus::Pending),
            ProductStatus::label,
        );
        assert_eq!(options[0], SelectOption::new("all", "All", false));
        assert!(options.iter().any(|o| o.value == "pending" && o.selected));
    }

    #[test]
    fn test_next_status_options_follow_transitions() {
        let values: Vec<String> = next_status_options(OrderStatus::Processing)
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec!["shipped", "cancelled"]);
        assert!(next_status_options(OrderStatus::Delivered).is_empty());
    }

    #[test]
    fn test_category_id_from_form() {
        assert_eq!(category_id_from_form(Some("  ")), None);
        assert_eq!(category_id_from_form(Some("c9")), Some(CategoryId::new("c9")));
    }
}
