//! # Analytics Aggregator
//!
//! Admin dashboard figures computed over in-memory records.
//!
//! ## Window
//! ```text
//!      now − 30 days                                   now
//!  ────────┼────────────────────────────────────────────┼────────► time
//!          │◄──────────── in-window (inclusive) ───────►│
//! ```
//!
//! The evaluation instant is always passed in, so every report is
//! reproducible in tests. Name lookups (vendor username, product name) are
//! plain maps filled by the caller; a missing entry yields `None` rather
//! than dropping the row.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Order;
use crate::{ANALYTICS_WINDOW_DAYS, TOP_PRODUCTS_LIMIT};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VendorRevenue {
    pub vendor_id: String,
    pub vendor_name: Option<String>,
    /// Sum of `amount_cents` over the vendor's in-window orders.
    pub total_revenue_cents: i64,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: Option<String>,
    pub total_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AverageOrderValue {
    pub average_cents: i64,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySignups {
    /// Calendar month, 1-12.
    pub month: u32,
    pub total: i64,
}

// =============================================================================
// Window
// =============================================================================

/// Start of the trailing analytics window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ANALYTICS_WINDOW_DAYS)
}

/// True when `at` lies in `[now − 30d, now]`.
pub fn in_window(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at >= window_start(now) && at <= now
}

fn orders_in_window<'a>(
    orders: &'a [Order],
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a Order> + 'a {
    orders.iter().filter(move |o| in_window(o.created_at, now))
}

// =============================================================================
// Reports
// =============================================================================

/// Revenue per vendor over the window, vendors in first-occurrence order.
///
/// Each sub-order contributes its `amount_cents`, which is the grand total of
/// the checkout it came from.
pub fn revenue_per_vendor(
    orders: &[Order],
    vendor_names: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> Vec<VendorRevenue> {
    let mut rows: Vec<VendorRevenue> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for order in orders_in_window(orders, now) {
        let idx = *slot.entry(order.vendor_id.as_str()).or_insert_with(|| {
            rows.push(VendorRevenue {
                vendor_id: order.vendor_id.clone(),
                vendor_name: vendor_names.get(&order.vendor_id).cloned(),
                total_revenue_cents: 0,
                order_count: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[idx];
        row.total_revenue_cents = row.total_revenue_cents.saturating_add(order.amount_cents);
        row.order_count += 1;
    }

    rows
}

/// Top five products by quantity sold over the window.
///
/// Ties keep first-occurrence order (the sort is stable).
pub fn top_products(
    orders: &[Order],
    product_names: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> Vec<ProductSales> {
    let mut rows: Vec<ProductSales> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for item in orders_in_window(orders, now).flat_map(|o| o.items.iter()) {
        let idx = *slot.entry(item.product_id.as_str()).or_insert_with(|| {
            rows.push(ProductSales {
                product_id: item.product_id.clone(),
                product_name: product_names.get(&item.product_id).cloned(),
                total_sold: 0,
            });
            rows.len() - 1
        });
        rows[idx].total_sold = rows[idx].total_sold.saturating_add(item.quantity);
    }

    rows.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    rows.truncate(TOP_PRODUCTS_LIMIT);
    rows
}

/// Mean order amount over the window, or `None` when no order qualifies.
pub fn average_order_value(orders: &[Order], now: DateTime<Utc>) -> Option<AverageOrderValue> {
    let (total, count) = orders_in_window(orders, now).fold((0i64, 0usize), |(sum, n), o| {
        (sum.saturating_add(o.amount_cents), n + 1)
    });

    Money::from_cents(total)
        .average_over(count)
        .map(|avg| AverageOrderValue {
            average_cents: avg.cents(),
            order_count: count,
        })
}

/// Sign-ups per calendar month over the trailing year, months ascending.
///
/// Months with no sign-up are omitted.
pub fn signups_by_month<I>(created: I, now: DateTime<Utc>) -> Vec<MonthlySignups>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let since = now
        .checked_sub_months(Months::new(12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut per_month = [0i64; 12];
    for at in created {
        if at >= since && at <= now {
            per_month[at.month0() as usize] += 1;
        }
    }

    per_month
        .iter()
        .enumerate()
        .filter(|(_, total)| **total > 0)
        .map(|(i, total)| MonthlySignups {
            month: i as u32 + 1,
            total: *total,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, OrderItem, OrderStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn order(vendor: &str, amount: i64, items: &[(&str, i64)], days_ago: i64) -> Order {
        let at = now() - Duration::days(days_ago);
        Order {
            id: format!("o-{}-{}", vendor, days_ago),
            user_id: "buyer".to_string(),
            vendor_id: vendor.to_string(),
            items: items
                .iter()
                .map(|(p, q)| OrderItem {
                    product_id: p.to_string(),
                    vendor_id: vendor.to_string(),
                    quantity: *q,
                })
                .collect(),
            amount_cents: amount,
            subtotal_cents: amount,
            address: Address {
                street: "1 Main".to_string(),
                city: "Town".to_string(),
                zip: "1".to_string(),
            },
            status: OrderStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_window_bounds() {
        assert!(in_window(now(), now()));
        assert!(in_window(now() - Duration::days(30), now()));
        assert!(!in_window(now() - Duration::days(31), now()));
        assert!(!in_window(now() + Duration::seconds(1), now()));
    }

    #[test]
    fn test_revenue_per_vendor() {
        let orders = vec![
            order("V2", 4000, &[("B", 1)], 1),
            order("V1", 4000, &[("A", 2)], 1),
            order("V1", 1500, &[("A", 1)], 10),
            order("V1", 9999, &[("A", 1)], 45), // outside the window
        ];
        let names = HashMap::from([("V1".to_string(), "acme".to_string())]);

        let report = revenue_per_vendor(&orders, &names, now());

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].vendor_id, "V2");
        assert_eq!(report[0].vendor_name, None);
        assert_eq!(report[1].vendor_name.as_deref(), Some("acme"));
        assert_eq!(report[1].total_revenue_cents, 5500);
        assert_eq!(report[1].order_count, 2);
    }

    #[test]
    fn test_top_products_limit_and_ties() {
        let orders = vec![
            order("V1", 100, &[("A", 3), ("B", 5)], 1),
            order("V2", 100, &[("C", 5), ("D", 1), ("E", 2)], 2),
            order("V1", 100, &[("F", 4), ("G", 1)], 3),
            order("V1", 100, &[("Z", 50)], 60),
        ];
        let names = HashMap::from([("B".to_string(), "Blender".to_string())]);

        let top = top_products(&orders, &names, now());

        let ids: Vec<_> = top.iter().map(|p| p.product_id.as_str()).collect();
        // B and C tie at 5: B was seen first
        assert_eq!(ids, vec!["B", "C", "F", "A", "E"]);
        assert_eq!(top[0].product_name.as_deref(), Some("Blender"));
        assert_eq!(top[0].total_sold, 5);
    }

    #[test]
    fn test_average_order_value() {
        assert_eq!(average_order_value(&[], now()), None);

        let old_only = vec![order("V1", 500, &[("A", 1)], 90)];
        assert_eq!(average_order_value(&old_only, now()), None);

        let orders = vec![
            order("V1", 1000, &[("A", 1)], 1),
            order("V2", 1001, &[("B", 1)], 2),
        ];
        assert_eq!(
            average_order_value(&orders, now()),
            Some(AverageOrderValue {
                average_cents: 1001,
                order_count: 2
            })
        );
    }

    #[test]
    fn test_signups_by_month() {
        let dates = vec![
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap(), // older than a year
        ];

        let stats = signups_by_month(dates, now());

        assert_eq!(
            stats,
            vec![
                MonthlySignups { month: 1, total: 2 },
                MonthlySignups { month: 9, total: 1 },
            ]
        );
    }
}
