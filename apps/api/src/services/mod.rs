//! # Services
//!
//! Orchestration between the HTTP layer, the pure core and the store.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ accounts     │ register, login, profile reads and updates, sign-up stats│
//! │ catalog      │ vendor-owned product CRUD                                │
//! │ checkout     │ cart ──► split per vendor ──► batch persistence          │
//! │ orders       │ admin order management, per-user order history          │
//! │ analytics    │ admin reports over the trailing 30 days                  │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service takes the caller's [`Identity`](bazaar_core::Identity) and
//! evaluates its policy before touching the store.

pub mod accounts;
pub mod analytics;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use accounts::AccountService;
pub use analytics::AnalyticsService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
