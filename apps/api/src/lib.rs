//! # Bazaar API
//!
//! JSON REST server for the marketplace.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bazaar API Server                              │
//! │                                                                         │
//! │  HTTP ──► TraceLayer ──► CorsLayer ──► Router                           │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                         AuthUser extractor (bearer JWT)                 │
//! │                                          │                              │
//! │                                          ▼                              │
//! │   routes/*  ──►  services/* (policy + orchestration)  ──►  bazaar-db     │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                 bazaar-core (split, policy, analytics)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is built by [`build_router`] so tests can drive it in-process.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use bazaar_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

/// State handle passed to every handler.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.token_lifetime_secs);
        AppState { db, jwt, config }
    }
}

/// Builds the full application router.
pub fn build_router(state: SharedState) -> Router {
    routes::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
