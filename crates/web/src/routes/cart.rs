//! Cart route handlers.
//!
//! Cart mutations are plain form posts answered with a 303 back to the page
//! the visitor came from. The cart itself lives in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::REFERER},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use mcd_calories_core::{
    CartSummary, Checkout, CheckoutLine, Quantity, QuantityError, Slug, SlugError,
};

use crate::db::acquire;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::routes::layout::{SummaryView, format_grams};
use crate::services::cart as cart_service;
use crate::state::AppState;

/// Where cart actions land when there is no usable referrer.
const FALLBACK_REDIRECT: &str = "/menu";

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: Option<String>,
    pub qty: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub slug: Option<String>,
}

/// Parse the submitted slug. Missing or empty means "nothing to do".
fn parse_slug(raw: Option<&str>) -> std::result::Result<Option<Slug>, SlugError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => Slug::parse(raw).map(Some),
    }
}

/// Parse the submitted quantity, defaulting to one when absent or blank.
fn parse_qty(raw: Option<&str>) -> std::result::Result<Quantity, QuantityError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Quantity::ONE),
        Some(raw) => Quantity::parse(raw),
    }
}

// =============================================================================
// Redirects
// =============================================================================

/// Reduce a referrer URL to a same-site path and query.
///
/// Anything that is not an absolute http(s) URL, or whose path could be
/// read as protocol-relative, is rejected.
fn local_path(referer: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let path = url.path();
    if !path.starts_with('/') || path.starts_with("//") {
        return None;
    }

    Some(match url.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    })
}

/// Redirect target for a cart action: the referring page, or the menu.
fn redirect_target(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(local_path)
        .unwrap_or_else(|| FALLBACK_REDIRECT.to_string())
}

// =============================================================================
// Views
// =============================================================================

/// One resolved cart line with line totals.
#[derive(Debug, Clone)]
pub struct CheckLineView {
    pub slug: String,
    pub name: String,
    pub serving_label: String,
    pub quantity: u32,
    pub kcal: i64,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub salt: String,
}

impl From<&CheckoutLine> for CheckLineView {
    fn from(line: &CheckoutLine) -> Self {
        let factor = f64::from(line.quantity.get());
        Self {
            slug: line.item.slug.to_string(),
            name: line.item.name.clone(),
            serving_label: line.item.serving_label.clone(),
            quantity: line.quantity.get(),
            kcal: line.energy_kcal(),
            protein: format_grams(line.item.protein_g * factor),
            fat: format_grams(line.item.fat_g * factor),
            carbs: format_grams(line.item.carbs_g * factor),
            salt: format_grams(line.item.salt_g * factor),
        }
    }
}

/// Nutrition totals row.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub kcal: i64,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub salt: String,
}

/// Cart check page template.
#[derive(Template, WebTemplate)]
#[template(path = "check.html")]
pub struct CheckTemplate {
    pub summary: SummaryView,
    pub lines: Vec<CheckLineView>,
    pub totals: TotalsView,
}

impl From<&Checkout> for CheckTemplate {
    fn from(checkout: &Checkout) -> Self {
        let total = &checkout.total;
        Self {
            summary: CartSummary::from(checkout).into(),
            lines: checkout.lines.iter().map(CheckLineView::from).collect(),
            totals: TotalsView {
                kcal: total.energy_kcal,
                protein: format_grams(total.protein_g),
                fat: format_grams(total.fat_g),
                carbs: format_grams(total.carbs_g),
                salt: format_grams(total.salt_g),
            },
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Add an item to the cart.
///
/// A bad `qty` is rejected before the cart is touched; a missing slug is a
/// no-op. The slug is not checked against the menu.
#[instrument(skip(session, headers))]
pub async fn add(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let back = redirect_target(&headers);
    let qty = parse_qty(form.qty.as_deref())?;
    let Some(slug) = parse_slug(form.slug.as_deref())? else {
        return Ok(Redirect::to(&back));
    };

    let mut cart = cart_service::load_cart(&session).await?;
    let total = cart.add(slug.clone(), qty)?;
    cart_service::save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", &[("slug", slug.as_str())]);
    tracing::info!(%slug, %qty, %total, "Added to cart");

    Ok(Redirect::to(&back))
}

/// Take one unit of an item out of the cart.
///
/// A slug that could never have been added is treated like any other
/// absent slug.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let back = redirect_target(&headers);
    let slug = match parse_slug(form.slug.as_deref()) {
        Ok(Some(slug)) => slug,
        Ok(None) => return Ok(Redirect::to(&back)),
        Err(err) => {
            tracing::debug!(error = %err, "Remove for slug that cannot be in cart");
            return Ok(Redirect::to(&back));
        }
    };

    let mut cart = cart_service::load_cart(&session).await?;
    match cart.remove(slug.as_str()) {
        Some(left) => {
            cart_service::save_cart(&session, &cart).await?;
            add_breadcrumb("cart", "Removed from cart", &[("slug", slug.as_str())]);
            tracing::info!(%slug, left, "Removed from cart");
        }
        None => tracing::debug!(%slug, "Remove for item not in cart"),
    }

    Ok(Redirect::to(&back))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    cart_service::clear_cart(&session).await?;
    add_breadcrumb("cart", "Cleared cart", &[]);
    tracing::info!("Cleared cart");
    Ok(Redirect::to(FALLBACK_REDIRECT))
}

/// Display the cart with per-line and total nutrition.
#[instrument(skip(state, session))]
pub async fn check(State(state): State<AppState>, session: Session) -> Result<CheckTemplate> {
    let cart = cart_service::load_cart(&session).await?;

    let mut conn = acquire(state.pool()).await?;
    let checkout = cart_service::checkout(&mut conn, &cart).await?;

    Ok(CheckTemplate::from(&checkout))
}
