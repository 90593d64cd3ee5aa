//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness + database check
//!
//! # Auth (public)
//! POST   /api/auth/register                   - Create an account
//! POST   /api/auth/login                      - Exchange credentials for a token
//!
//! # Users
//! GET    /api/users/me                        - Own profile (authenticated)
//! GET    /api/users[?new=true]                - All / five newest (admin)
//! GET    /api/users/find/{id}                 - One profile (admin)
//! GET    /api/users/stats                     - Sign-ups per month (admin)
//! PUT    /api/users/{id}                      - Update (self or admin)
//! DELETE /api/users/{id}                      - Delete (self or admin)
//!
//! # Products
//! GET    /api/products                        - Catalog (public)
//! GET    /api/products/{id}                   - One product (public)
//! POST   /api/products                        - Create (vendor)
//! PUT    /api/products/{id}                   - Update (owning vendor)
//! DELETE /api/products/{id}                   - Delete (owning vendor)
//!
//! # Orders
//! POST   /api/orders                          - Checkout (authenticated)
//! GET    /api/orders                          - All orders (admin)
//! GET    /api/orders/find/{userId}            - Order history (self or admin)
//! PUT    /api/orders/{id}                     - Update status/address (admin)
//! DELETE /api/orders/{id}                     - Delete (admin)
//!
//! # Analytics (admin)
//! GET    /api/analytics/revenue-per-vendor
//! GET    /api/analytics/top-products
//! GET    /api/analytics/avg-order-value
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::SharedState;

pub mod analytics;
pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

/// All routes, state not yet attached.
pub fn router() -> Router<SharedState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // Users
        .route("/api/users", get(users::list))
        .route("/api/users/me", get(users::me))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users/find/{id}", get(users::find))
        .route("/api/users/{id}", put(users::update).delete(users::delete))
        // Products
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        // Orders
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/find/{user_id}", get(orders::find_by_user))
        .route("/api/orders/{id}", put(orders::update).delete(orders::delete))
        // Analytics
        .route(
            "/api/analytics/revenue-per-vendor",
            get(analytics::revenue_per_vendor),
        )
        .route("/api/analytics/top-products", get(analytics::top_products))
        .route(
            "/api/analytics/avg-order-value",
            get(analytics::avg_order_value),
        )
}

/// Plain confirmation body for deletes.
#[derive(Debug, Clone, serde::Serialize, ts_rs::TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
