//! Menu page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use mcd_calories_core::{Cart, ItemFilter, MenuItem};

use crate::db::acquire;
use crate::error::Result;
use crate::filters;
use crate::routes::layout::{SummaryView, format_grams};
use crate::services::cart as cart_service;
use crate::services::menu::{MenuPage, load_menu};
use crate::state::AppState;

/// Menu query parameters.
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Category link in the filter bar.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub name: String,
    pub href: String,
    pub active: bool,
}

/// Menu item card data.
#[derive(Debug, Clone)]
pub struct MenuItemView {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub serving_label: String,
    pub kcal: i64,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub salt: String,
    pub quantity: u32,
    pub in_cart: bool,
}

impl MenuItemView {
    fn new(item: &MenuItem, cart: &Cart) -> Self {
        let quantity = cart.quantity(item.slug.as_str());
        Self {
            slug: item.slug.to_string(),
            name: item.name.clone(),
            category: item.category.clone(),
            serving_label: item.serving_label.clone(),
            kcal: item.energy_kcal,
            protein: format_grams(item.protein_g),
            fat: format_grams(item.fat_g),
            carbs: format_grams(item.carbs_g),
            salt: format_grams(item.salt_g),
            quantity,
            in_cart: quantity > 0,
        }
    }
}

/// Build a `/menu` link that keeps the text query.
fn menu_href(category: Option<&str>, query: Option<&str>) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if let Some(category) = category {
        params.append_pair("category", category);
    }
    if let Some(query) = query {
        params.append_pair("q", query);
    }
    let params = params.finish();

    if params.is_empty() {
        "/menu".to_string()
    } else {
        format!("/menu?{params}")
    }
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub summary: SummaryView,
    pub all_href: String,
    pub all_active: bool,
    pub categories: Vec<CategoryView>,
    pub selected_category: String,
    pub query: String,
    pub items: Vec<MenuItemView>,
}

impl MenuTemplate {
    fn new(page: &MenuPage, filter: &ItemFilter, summary: SummaryView) -> Self {
        let selected = filter.category();
        let query = filter.query();

        let categories = page
            .categories
            .iter()
            .map(|name| CategoryView {
                name: name.clone(),
                href: menu_href(Some(name), query),
                active: selected == Some(name.as_str()),
            })
            .collect();

        Self {
            summary,
            all_href: menu_href(None, query),
            all_active: selected.is_none(),
            categories,
            selected_category: selected.unwrap_or_default().to_string(),
            query: query.unwrap_or_default().to_string(),
            items: page
                .items
                .iter()
                .map(|item| MenuItemView::new(item, &page.cart))
                .collect(),
        }
    }
}

/// Redirect the bare root to the menu.
pub async fn root() -> Redirect {
    Redirect::to("/menu")
}

/// Display the menu, optionally filtered by category and name.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<MenuQuery>,
) -> Result<MenuTemplate> {
    let filter = ItemFilter::new(params.category.as_deref(), params.q.as_deref());

    // Session first: the store may share the database pool.
    let cart = cart_service::load_cart(&session).await?;

    let mut conn = acquire(state.pool()).await?;
    let summary = cart_service::summary(&mut conn, &cart).await?;
    let page = load_menu(&mut conn, &filter, cart).await?;

    Ok(MenuTemplate::new(&page, &filter, summary.into()))
}
