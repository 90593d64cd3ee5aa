//! Order management after checkout.
//!
//! Admins see and edit every order; customers only read their own history.

use bazaar_core::validation::validate_address;
use bazaar_core::{CoreError, Identity, Order, OrderPatch, Policy};
use bazaar_db::{Database, OrderRepository};
use chrono::Utc;
use tracing::info;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct OrderService {
    orders: OrderRepository,
}

impl OrderService {
    pub fn new(db: &Database) -> Self {
        OrderService {
            orders: db.orders(),
        }
    }

    /// Every order in the store. Admin only.
    pub async fn list_all(&self, caller: &Identity) -> ApiResult<Vec<Order>> {
        caller.authorize(Policy::AdminOnly)?;
        Ok(self.orders.list_all().await?)
    }

    /// Orders placed by `user_id`. Self or admin.
    pub async fn list_for_user(&self, caller: &Identity, user_id: &str) -> ApiResult<Vec<Order>> {
        caller.authorize(Policy::SelfOrAdmin { owner_id: user_id })?;
        Ok(self.orders.list_by_user(user_id).await?)
    }

    /// Changes status and/or address. Admin only.
    pub async fn update(&self, caller: &Identity, id: &str, patch: OrderPatch) -> ApiResult<Order> {
        caller.authorize(Policy::AdminOnly)?;

        if patch.is_empty() {
            return Err(ApiError::validation("Nothing to update: provide status or address"));
        }
        if let Some(address) = &patch.address {
            validate_address(address)?;
        }

        let mut order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(address) = patch.address {
            order.address = address;
        }
        order.updated_at = Utc::now();

        self.orders.update(&order).await?;

        info!(id = %order.id, status = ?order.status, "Order updated");
        Ok(order)
    }

    /// Deletes an order and its items. Admin only.
    pub async fn delete(&self, caller: &Identity, id: &str) -> ApiResult<()> {
        caller.authorize(Policy::AdminOnly)?;

        self.orders.delete(id).await?;

        info!(id = %id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{new_id, Address, OrderItem, OrderStatus, Role};
    use bazaar_db::DbConfig;

    async fn seeded() -> (OrderService, Order) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let order = Order {
            id: new_id(),
            user_id: "alice".to_string(),
            vendor_id: "v1".to_string(),
            items: vec![OrderItem {
                product_id: "p1".to_string(),
                vendor_id: "v1".to_string(),
                quantity: 1,
            }],
            amount_cents: 500,
            subtotal_cents: 500,
            address: Address {
                street: "1 Main St".to_string(),
                city: "Town".to_string(),
                zip: "1".to_string(),
            },
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        db.orders().insert(&order).await.unwrap();
        (OrderService::new(&db), order)
    }

    #[tokio::test]
    async fn test_history_is_self_or_admin() {
        let (service, _) = seeded().await;

        let own = service
            .list_for_user(&Identity::new("alice", Role::Customer), "alice")
            .await
            .unwrap();
        assert_eq!(own.len(), 1);

        let err = service
            .list_for_user(&Identity::new("bob", Role::Customer), "alice")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRole);

        let seen_by_admin = service
            .list_for_user(&Identity::new("root", Role::Admin), "alice")
            .await
            .unwrap();
        assert_eq!(seen_by_admin.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_updates_status() {
        let (service, order) = seeded().await;
        let admin = Identity::new("root", Role::Admin);

        let patch = OrderPatch {
            status: Some(OrderStatus::Shipped),
            address: None,
        };
        let updated = service.update(&admin, &order.id, patch).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.items, order.items);

        let err = service
            .update(&admin, &order.id, OrderPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let patch = OrderPatch {
            status: Some(OrderStatus::Cancelled),
            address: None,
        };
        let err = service.update(&admin, "ghost", patch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_customers_cannot_manage_orders() {
        let (service, order) = seeded().await;
        let alice = Identity::new("alice", Role::Customer);

        assert!(service.list_all(&alice).await.is_err());
        let err = service.delete(&alice, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRole);

        service
            .delete(&Identity::new("root", Role::Admin), &order.id)
            .await
            .unwrap();
        let err = service
            .delete(&Identity::new("root", Role::Admin), &order.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
