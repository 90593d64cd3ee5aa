//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (bazaar-api)                                                  │
//! │       │                                                                 │
//! │       │  db.orders().insert_batch(&orders)                             │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, order)          one transaction                     │
//! │  ├── insert_batch(&self, orders)   one transaction per order           │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── list_by_user(&self, user_id)                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and sign-up statistics
//! - [`product::ProductRepository`] - Vendor catalog
//! - [`order::OrderRepository`] - Vendor sub-orders and their items

pub mod order;
pub mod product;
pub mod user;
