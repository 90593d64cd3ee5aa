//! # Order Splitting Engine
//!
//! Turns one checkout (a cart spanning several vendors) into one order per
//! vendor.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart: [A×2 (V1), C×1 (V2), B×1 (V1)]                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_line_items()   empty? quantity ≤ 0? quantity > 999?          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve products        first missing id → ProductNotFound            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  group by vendor         V1: [A×2, B×1]   V2: [C×1]                    │
//! │       │                  (first-occurrence order, input order inside)   │
//! │       ▼                                                                 │
//! │  totals                  subtotal(V1), subtotal(V2), grand total       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SplitPlan::into_orders  Order(V1), Order(V2)                          │
//! │                          amount = grand total on every order           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches the store. The caller loads the referenced products,
//! hands them in as a map, and persists the resulting orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{new_id, Address, LineItem, Order, OrderItem, OrderStatus, Product};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Plan Types
// =============================================================================

/// Items of one vendor, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorGroup {
    pub vendor_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
}

/// The result of splitting a cart, before timestamps and ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Groups in order of each vendor's first appearance in the cart.
    pub groups: Vec<VendorGroup>,
    /// Sum of every group's subtotal.
    pub grand_total: Money,
}

impl SplitPlan {
    /// Number of sub-orders this plan produces.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Materializes one pending order per vendor group.
    pub fn into_orders(self, user_id: &str, address: &Address, now: DateTime<Utc>) -> Vec<Order> {
        let grand_total = self.grand_total;
        self.groups
            .into_iter()
            .map(|group| Order {
                id: new_id(),
                user_id: user_id.to_string(),
                vendor_id: group.vendor_id,
                items: group.items,
                amount_cents: grand_total.cents(),
                subtotal_cents: group.subtotal.cents(),
                address: address.clone(),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Checks the cart shape before any product is looked up.
///
/// ## Order of checks
/// 1. Empty cart → `EmptyOrder`
/// 2. Any quantity ≤ 0 → `InvalidQuantity` (first offending line)
/// 3. Any quantity > 999 → `QuantityTooLarge` (first offending line)
pub fn validate_line_items(items: &[LineItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }

    if let Some(bad) = items.iter().find(|item| item.quantity <= 0) {
        return Err(CoreError::InvalidQuantity {
            product_id: bad.product_id.clone(),
            quantity: bad.quantity,
        });
    }

    if let Some(big) = items.iter().find(|item| item.quantity > MAX_ITEM_QUANTITY) {
        return Err(CoreError::QuantityTooLarge {
            requested: big.quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Splitting
// =============================================================================

/// Groups a cart by vendor and computes subtotals and the grand total.
///
/// `catalog` must contain every product the caller could resolve; a line
/// whose product is absent fails the whole split with `ProductNotFound`
/// for the first such line in input order.
pub fn plan_split(items: &[LineItem], catalog: &HashMap<String, Product>) -> CoreResult<SplitPlan> {
    validate_line_items(items)?;

    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = catalog
            .get(&item.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;
        resolved.push((item, product));
    }

    let overflow = || CoreError::Validation(ValidationError::Overflow {
        field: "amount".to_string(),
    });

    let mut groups: Vec<VendorGroup> = Vec::new();
    let mut slot_by_vendor: HashMap<&str, usize> = HashMap::new();

    for (item, product) in resolved {
        let line_total = product
            .price()
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(overflow)?;

        let slot = *slot_by_vendor
            .entry(product.vendor_id.as_str())
            .or_insert_with(|| {
                groups.push(VendorGroup {
                    vendor_id: product.vendor_id.clone(),
                    items: Vec::new(),
                    subtotal: Money::zero(),
                });
                groups.len() - 1
            });

        let group = &mut groups[slot];
        group.subtotal = group.subtotal.checked_add(line_total).ok_or_else(overflow)?;
        group.items.push(OrderItem {
            product_id: item.product_id.clone(),
            vendor_id: product.vendor_id.clone(),
            quantity: item.quantity,
        });
    }

    let grand_total = groups
        .iter()
        .try_fold(Money::zero(), |acc, g| acc.checked_add(g.subtotal))
        .ok_or_else(overflow)?;

    Ok(SplitPlan {
        groups,
        grand_total,
    })
}

/// Splits a cart into pending vendor sub-orders stamped with `now`.
///
/// ```rust
/// use std::collections::HashMap;
/// use chrono::Utc;
/// use bazaar_core::split::split_order;
/// use bazaar_core::{Address, LineItem, Product};
///
/// let now = Utc::now();
/// let mug = Product {
///     id: "mug".into(), vendor_id: "v1".into(), name: "Mug".into(),
///     price_cents: 1000, stock: 5, category: "kitchen".into(),
///     created_at: now, updated_at: now,
/// };
/// let catalog = HashMap::from([(mug.id.clone(), mug)]);
/// let address = Address { street: "1 Main".into(), city: "Town".into(), zip: "1".into() };
///
/// let orders = split_order("u1", &address, &[LineItem::new("mug", 2)], &catalog, now).unwrap();
/// assert_eq!(orders.len(), 1);
/// assert_eq!(orders[0].amount_cents, 2000);
/// ```
pub fn split_order(
    user_id: &str,
    address: &Address,
    items: &[LineItem],
    catalog: &HashMap<String, Product>,
    now: DateTime<Utc>,
) -> CoreResult<Vec<Order>> {
    let plan = plan_split(items, catalog)?;
    Ok(plan.into_orders(user_id, address, now))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn product(id: &str, vendor: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            vendor_id: vendor.to_string(),
            name: format!("Product {}", id),
            price_cents,
            stock: 100,
            category: "general".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<String, Product> {
        products.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    fn address() -> Address {
        Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
        }
    }

    #[test]
    fn test_two_vendors_produce_two_orders_with_grand_total() {
        // V1: A at $10 × 2, V2: B at $20 × 1
        let catalog = catalog(vec![product("A", "V1", 1000), product("B", "V2", 2000)]);
        let items = vec![LineItem::new("A", 2), LineItem::new("B", 1)];
        let now = Utc::now();

        let orders = split_order("buyer", &address(), &items, &catalog, now).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].vendor_id, "V1");
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].subtotal_cents, 2000);
        assert_eq!(orders[1].vendor_id, "V2");
        assert_eq!(orders[1].items[0].quantity, 1);
        assert_eq!(orders[1].subtotal_cents, 2000);

        for order in &orders {
            assert_eq!(order.amount_cents, 4000);
            assert_eq!(order.status, OrderStatus::Pending);
            assert_eq!(order.user_id, "buyer");
            assert_eq!(order.created_at, now);
            assert_eq!(order.address, address());
        }
        assert_ne!(orders[0].id, orders[1].id);
    }

    #[test]
    fn test_single_vendor_keeps_input_order() {
        let catalog = catalog(vec![
            product("A", "V1", 100),
            product("B", "V1", 200),
            product("C", "V1", 300),
        ]);
        let items = vec![
            LineItem::new("C", 1),
            LineItem::new("A", 2),
            LineItem::new("B", 3),
        ];

        let orders = split_order("u", &address(), &items, &catalog, Utc::now()).unwrap();

        assert_eq!(orders.len(), 1);
        let ids: Vec<_> = orders[0].items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(orders[0].amount_cents, 300 + 400 + 600);
        assert_eq!(orders[0].amount_cents, orders[0].subtotal_cents);
    }

    #[test]
    fn test_groups_follow_first_occurrence() {
        let catalog = catalog(vec![
            product("A", "V1", 100),
            product("B", "V2", 100),
            product("C", "V1", 100),
            product("D", "V3", 100),
        ]);
        let items = vec![
            LineItem::new("B", 1),
            LineItem::new("A", 1),
            LineItem::new("D", 1),
            LineItem::new("C", 1),
        ];

        let plan = plan_split(&items, &catalog).unwrap();
        let vendors: Vec<_> = plan.groups.iter().map(|g| g.vendor_id.as_str()).collect();
        assert_eq!(vendors, vec!["V2", "V1", "V3"]);

        let v1_items: Vec<_> = plan.groups[1].items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(v1_items, vec!["A", "C"]);
    }

    #[test]
    fn test_order_count_matches_distinct_vendors() {
        let catalog = catalog(vec![
            product("A", "V1", 150),
            product("B", "V2", 275),
            product("C", "V1", 999),
            product("D", "V3", 1),
            product("E", "V2", 50),
        ]);
        let items: Vec<LineItem> = ["A", "B", "C", "D", "E", "A"]
            .iter()
            .enumerate()
            .map(|(i, id)| LineItem::new(*id, i as i64 + 1))
            .collect();

        let orders = split_order("u", &address(), &items, &catalog, Utc::now()).unwrap();

        let distinct: HashSet<_> = items
            .iter()
            .map(|i| catalog[&i.product_id].vendor_id.clone())
            .collect();
        assert_eq!(orders.len(), distinct.len());

        let subtotal_sum: i64 = orders.iter().map(|o| o.subtotal_cents).sum();
        for order in &orders {
            assert_eq!(order.amount_cents, subtotal_sum);
            assert!(order.items.iter().all(|i| i.vendor_id == order.vendor_id));
        }

        let quantity_sum: i64 = orders.iter().map(|o| o.total_quantity()).sum();
        assert_eq!(quantity_sum, items.iter().map(|i| i.quantity).sum::<i64>());
    }

    #[test]
    fn test_empty_cart() {
        let result = plan_split(&[], &HashMap::new());
        assert!(matches!(result, Err(CoreError::EmptyOrder)));
    }

    #[test]
    fn test_invalid_quantity_checked_before_lookup() {
        // "ghost" is missing, but the zero quantity is reported first
        let items = vec![LineItem::new("ghost", 1), LineItem::new("A", 0)];
        let result = plan_split(&items, &catalog(vec![product("A", "V1", 100)]));
        assert!(matches!(
            result,
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));

        let negative = vec![LineItem::new("A", -3)];
        assert!(matches!(
            validate_line_items(&negative),
            Err(CoreError::InvalidQuantity { quantity: -3, .. })
        ));
    }

    #[test]
    fn test_quantity_too_large() {
        let items = vec![LineItem::new("A", MAX_ITEM_QUANTITY + 1)];
        assert!(matches!(
            validate_line_items(&items),
            Err(CoreError::QuantityTooLarge { requested: 1000, max: 999 })
        ));
        assert!(validate_line_items(&[LineItem::new("A", MAX_ITEM_QUANTITY)]).is_ok());
    }

    #[test]
    fn test_first_missing_product_is_reported() {
        let catalog = catalog(vec![product("A", "V1", 100)]);
        let items = vec![
            LineItem::new("A", 1),
            LineItem::new("missing-1", 1),
            LineItem::new("missing-2", 1),
        ];

        match plan_split(&items, &catalog) {
            Err(CoreError::ProductNotFound(id)) => assert_eq!(id, "missing-1"),
            other => panic!("expected ProductNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_overflow_is_a_validation_error() {
        let catalog = catalog(vec![product("A", "V1", i64::MAX / 2), product("B", "V2", i64::MAX / 2)]);
        let too_much = vec![LineItem::new("A", 3)];
        assert!(matches!(
            plan_split(&too_much, &catalog),
            Err(CoreError::Validation(ValidationError::Overflow { .. }))
        ));

        let grand_overflow = vec![LineItem::new("A", 2), LineItem::new("B", 2)];
        assert!(plan_split(&grand_overflow, &catalog).is_err());
    }
}
