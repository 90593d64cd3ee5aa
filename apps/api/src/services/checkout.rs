//! # Checkout Service
//!
//! Turns one cart into one pending order per vendor.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest { userId?, address, items }                            │
//! │       │                                                                 │
//! │       ├── SelfOrAdmin(userId)           ──► 403                         │
//! │       ├── address / items present       ──► 400                         │
//! │       ├── validate_line_items           ──► 400 EMPTY_ORDER / QUANTITY  │
//! │       ├── users.get_by_id(userId)       ──► 404 unknown account         │
//! │       ├── products.get_many(ids)                                        │
//! │       ├── split_order(.., now)          ──► 404 first unknown product   │
//! │       └── orders.insert_batch           ──► 500 PARTIAL_ORDER_BATCH     │
//! │                                                                         │
//! │  201 { message, orders }                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written until every product resolved. Stock is not decremented.

use bazaar_core::split::{split_order, validate_line_items};
use bazaar_core::validation::validate_address;
use bazaar_core::{Address, CoreError, Identity, LineItem, Order, Policy, ValidationError};
use bazaar_db::{Database, OrderRepository, ProductRepository, UserRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiResult;

/// Checkout request body.
///
/// `userId` defaults to the caller. Naming someone else requires admin.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: Option<String>,
    pub address: Option<Address>,
    pub items: Option<Vec<LineItem>>,
}

/// Checkout response body.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    /// One order per vendor, in order of first appearance in the cart.
    pub orders: Vec<Order>,
}

/// Order placement.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    users: UserRepository,
    products: ProductRepository,
    orders: OrderRepository,
}

impl CheckoutService {
    pub fn new(db: &Database) -> Self {
        CheckoutService {
            users: db.users(),
            products: db.products(),
            orders: db.orders(),
        }
    }

    /// Places an order for the cart in `request`.
    pub async fn place_order(
        &self,
        caller: &Identity,
        request: CheckoutRequest,
    ) -> ApiResult<CheckoutResponse> {
        let user_id = request.user_id.unwrap_or_else(|| caller.user_id.clone());
        caller.authorize(Policy::SelfOrAdmin { owner_id: &user_id })?;

        let address = request
            .address
            .ok_or_else(|| ValidationError::required("address"))?;
        let items = request
            .items
            .ok_or_else(|| ValidationError::required("items"))?;

        validate_address(&address)?;
        validate_line_items(&items)?;

        if self.users.get_by_id(&user_id).await?.is_none() {
            return Err(CoreError::UserNotFound(user_id).into());
        }

        let mut ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        ids.sort();
        ids.dedup();
        let catalog = self.products.get_many(&ids).await?;

        let orders = split_order(&user_id, &address, &items, &catalog, Utc::now())?;
        let orders = self.orders.insert_batch(&orders).await?;

        for order in &orders {
            debug!(
                id = %order.id,
                vendor_id = %order.vendor_id,
                subtotal = %order.subtotal(),
                "Vendor order created"
            );
        }
        info!(
            user_id = %user_id,
            orders = orders.len(),
            total = %orders.first().map(Order::amount).unwrap_or_default(),
            "Order placed"
        );

        Ok(CheckoutResponse {
            message: "Order placed successfully".to_string(),
            orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{Money, Product, ProductDraft, Role, User};
    use bazaar_db::DbConfig;

    struct Fixture {
        db: Database,
        checkout: CheckoutService,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        add_user(&db, "buyer").await;
        let checkout = CheckoutService::new(&db);
        Fixture { db, checkout }
    }

    async fn add_user(db: &Database, id: &str) {
        let now = Utc::now();
        let user = User {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{}@example.com", id),
            password_hash: "unused".to_string(),
            role: Role::Customer,
            created_at: now,
            updated_at: now,
        };
        db.users().insert(&user).await.unwrap();
    }

    async fn add_product(db: &Database, vendor: &str, price_cents: i64) -> Product {
        let product = Product::new(
            ProductDraft {
                name: format!("Item from {}", vendor),
                price: Money::from_cents(price_cents),
                stock: 10,
                category: "general".to_string(),
            },
            vendor,
            Utc::now(),
        );
        db.products().insert(&product).await.unwrap()
    }

    fn address() -> Address {
        Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
        }
    }

    fn request(items: Vec<LineItem>) -> CheckoutRequest {
        CheckoutRequest {
            user_id: None,
            address: Some(address()),
            items: Some(items),
        }
    }

    #[tokio::test]
    async fn test_two_vendor_cart_creates_two_orders() {
        let f = fixture().await;
        let a = add_product(&f.db, "v1", 1000).await;
        let b = add_product(&f.db, "v2", 2000).await;
        let buyer = Identity::new("buyer", Role::Customer);

        let response = f
            .checkout
            .place_order(
                &buyer,
                request(vec![LineItem::new(&a.id, 2), LineItem::new(&b.id, 1)]),
            )
            .await
            .unwrap();

        assert_eq!(response.orders.len(), 2);
        assert_eq!(response.orders[0].vendor_id, "v1");
        assert_eq!(response.orders[0].total_quantity(), 2);
        assert_eq!(response.orders[1].total_quantity(), 1);
        assert!(response.orders.iter().all(|o| o.amount_cents == 4000));
        assert!(response.orders.iter().all(|o| o.user_id == "buyer"));
        assert_eq!(f.db.orders().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_persists_nothing() {
        let f = fixture().await;
        let a = add_product(&f.db, "v1", 1000).await;
        let buyer = Identity::new("buyer", Role::Customer);

        let err = f
            .checkout
            .place_order(
                &buyer,
                request(vec![LineItem::new(&a.id, 1), LineItem::new("ghost", 1)]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(f.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_and_missing_fields() {
        let f = fixture().await;
        let buyer = Identity::new("buyer", Role::Customer);

        let err = f.checkout.place_order(&buyer, request(vec![])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyOrder);

        let err = f
            .checkout
            .place_order(&buyer, CheckoutRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(f.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ordering_for_someone_else_requires_admin() {
        let f = fixture().await;
        let a = add_product(&f.db, "v1", 500).await;
        let mut req = request(vec![LineItem::new(&a.id, 1)]);
        req.user_id = Some("victim".to_string());

        let err = f
            .checkout
            .place_order(&Identity::new("mallory", Role::Customer), req.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRole);

        // the named account has to exist
        let admin = Identity::new("root", Role::Admin);
        let err = f.checkout.place_order(&admin, req.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(f.db.orders().count().await.unwrap(), 0);

        add_user(&f.db, "victim").await;
        let response = f.checkout.place_order(&admin, req).await.unwrap();
        assert_eq!(response.orders[0].user_id, "victim");
    }
}
