//! Integration tests for McD Calories.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mcd-calories-integration-tests
//! ```
//!
//! Each test builds the full application router over a fresh in-memory
//! `SQLite` database and drives it in-process with `tower::ServiceExt`, so
//! no server or external database is needed.
//!
//! # Test Categories
//!
//! - `menu` - Menu listing, filters, health endpoints
//! - `cart` - Cart mutations, redirects, session round trip, check totals

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;

use mcd_calories_core::{MenuItem, Slug};
use mcd_calories_web::config::{AppConfig, SentryConfig};
use mcd_calories_web::db::{self, items::upsert_items};
use mcd_calories_web::middleware::SESSION_COOKIE_NAME;
use mcd_calories_web::routes;
use mcd_calories_web::state::AppState;

/// Session secret used by every test app.
const TEST_SECRET: &str = "q8Z!t2vR#pL6wXk9@Jm4sB7&nC1yH5dF";

/// Base URL the test app believes it is served from.
pub const BASE_URL: &str = "http://localhost:3000";

/// Build a menu item with the given energy and protein; other values are
/// scaled from the cheeseburger fixture.
#[must_use]
pub fn menu_item(slug: &str, name: &str, category: &str, kcal: i64, protein: f64) -> MenuItem {
    MenuItem {
        slug: Slug::parse(slug).unwrap(),
        name: name.to_string(),
        category: category.to_string(),
        energy_kcal: kcal,
        fat_g: 12.0,
        sat_fat_g: 6.0,
        carbs_g: 33.0,
        sugars_g: 7.0,
        fiber_g: 2.0,
        protein_g: protein,
        salt_g: 1.5,
        serving_label: "1 szt.".to_string(),
    }
}

/// Menu loaded into every test app.
#[must_use]
pub fn fixture_menu() -> Vec<MenuItem> {
    vec![
        menu_item("cheeseburger", "Cheeseburger", "classic", 300, 15.0),
        menu_item("big-mac", "Big Mac", "classic", 503, 26.0),
        menu_item("fries-m", "Frytki średnie", "fries", 337, 3.9),
        menu_item("cola", "Coca-Cola", "beverages", 170, 0.0),
    ]
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: BASE_URL.to_string(),
        session_secret: SecretString::from(TEST_SECRET),
        sentry: SentryConfig::default(),
    }
}

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `name=value` pair of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_string)
    }
}

/// The application under test plus a one-cookie jar.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
    cookie: Option<String>,
}

impl TestApp {
    /// App seeded with [`fixture_menu`].
    pub async fn new() -> Self {
        Self::with_menu(&fixture_menu()).await
    }

    /// App seeded with the given items.
    pub async fn with_menu(items: &[MenuItem]) -> Self {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();

        let store = SqliteStore::new(pool.clone());
        store.migrate().await.unwrap();

        let state = AppState::new(test_config(), pool.clone());

        let app = Self {
            router: routes::app(state, store),
            pool,
            cookie: None,
        };
        app.reseed(items).await;
        app
    }

    /// The database behind the app.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run raw SQL against the app's database, bypassing the repositories.
    pub async fn execute_sql(&self, sql: &str) {
        sqlx::raw_sql(sql).execute(&self.pool).await.unwrap();
    }

    /// Recreate the `items` table and load `items` into it.
    pub async fn reseed(&self, items: &[MenuItem]) {
        let mut conn = db::acquire(&self.pool).await.unwrap();
        db::ensure_schema(&mut conn).await.unwrap();
        upsert_items(&mut conn, items).await.unwrap();
    }

    /// Forget the session cookie, as a new visitor would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Send a request, attaching and then updating the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        };
        if let Some(cookie) = response.session_cookie() {
            self.cookie = Some(cookie);
        }
        response
    }

    /// `GET uri`.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// `POST uri` with a url-encoded form body and no referrer.
    pub async fn post_form(&mut self, uri: &str, body: &str) -> TestResponse {
        self.post_form_from(uri, body, None).await
    }

    /// `POST uri` with a url-encoded form body, sent from `referer`.
    pub async fn post_form_from(
        &mut self,
        uri: &str,
        body: &str,
        referer: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(referer) = referer {
            builder = builder.header(header::REFERER, referer);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Add `qty` of `slug` to the cart and expect the redirect.
    pub async fn add(&mut self, slug: &str, qty: u32) -> TestResponse {
        let response = self
            .post_form("/cart/add", &format!("slug={slug}&qty={qty}"))
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response
    }
}
