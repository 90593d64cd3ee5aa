//! Admin analytics.
//!
//! Loads the orders of the trailing window and the names they reference,
//! then hands them to `bazaar_core::analytics` with the same instant the
//! window was computed from.

use bazaar_core::analytics::{
    average_order_value, revenue_per_vendor, top_products, window_start, AverageOrderValue,
    ProductSales, VendorRevenue,
};
use bazaar_core::{Identity, Order, Policy};
use bazaar_db::{Database, OrderRepository, ProductRepository, UserRepository};
use chrono::{DateTime, Utc};

use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    orders: OrderRepository,
    products: ProductRepository,
    users: UserRepository,
}

impl AnalyticsService {
    pub fn new(db: &Database) -> Self {
        AnalyticsService {
            orders: db.orders(),
            products: db.products(),
            users: db.users(),
        }
    }

    pub async fn revenue_per_vendor(&self, caller: &Identity) -> ApiResult<Vec<VendorRevenue>> {
        let (orders, now) = self.load(caller).await?;

        let mut vendor_ids: Vec<String> = orders.iter().map(|o| o.vendor_id.clone()).collect();
        vendor_ids.sort();
        vendor_ids.dedup();
        let names = self.users.usernames_for(&vendor_ids).await?;

        Ok(revenue_per_vendor(&orders, &names, now))
    }

    pub async fn top_products(&self, caller: &Identity) -> ApiResult<Vec<ProductSales>> {
        let (orders, now) = self.load(caller).await?;

        let mut product_ids: Vec<String> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id.clone()))
            .collect();
        product_ids.sort();
        product_ids.dedup();
        let names = self.products.names_for(&product_ids).await?;

        Ok(top_products(&orders, &names, now))
    }

    /// `None` when no order falls in the window.
    pub async fn average_order_value(
        &self,
        caller: &Identity,
    ) -> ApiResult<Option<AverageOrderValue>> {
        let (orders, now) = self.load(caller).await?;
        Ok(average_order_value(&orders, now))
    }

    /// In-window orders plus the instant the window ends at.
    async fn load(&self, caller: &Identity) -> ApiResult<(Vec<Order>, DateTime<Utc>)> {
        caller.authorize(Policy::AdminOnly)?;

        let now = Utc::now();
        let orders = self.orders.list_since(window_start(now)).await?;
        Ok((orders, now))
    }
}
