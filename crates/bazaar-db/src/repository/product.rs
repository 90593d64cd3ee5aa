//! # Product Repository
//!
//! Database operations for the vendor catalog.
//!
//! ## Checkout Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart: [p1, p7, p1, p9]                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_many(["p1", "p7", "p9"])   one query: WHERE id IN (?, ?, ?)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { p1 → Product, p9 → Product }   p7 missing → split reports it         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership is never checked here; the catalog service does that before it
//! calls `update` or `delete`.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, vendor_id, name, price_cents, stock, category, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY created_at, rowid",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Loads every product in `ids` with a single query.
    ///
    /// Duplicate ids are fine; unknown ids are simply absent from the map.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!(requested = ids.len(), "Resolving products");

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM products WHERE id IN (",
            PRODUCT_COLUMNS
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Maps product ids to names. Unknown ids are simply absent.
    pub async fn names_for(&self, ids: &[String]) -> DbResult<HashMap<String, String>> {
        Ok(self
            .get_many(ids)
            .await?
            .into_iter()
            .map(|(id, product)| (id, product.name))
            .collect())
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, vendor_id = %product.vendor_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, vendor_id, name, price_cents, stock, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.vendor_id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates an existing product.
    ///
    /// `vendor_id` and `created_at` are never written.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                stock = ?4,
                category = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Orders that reference it keep their items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bazaar_core::{new_id, Money, ProductDraft};
    use chrono::Utc;

    fn product(name: &str, vendor: &str, price_cents: i64) -> Product {
        Product::new(
            ProductDraft {
                name: name.to_string(),
                price: Money::from_cents(price_cents),
                stock: 10,
                category: "general".to_string(),
            },
            vendor,
            Utc::now(),
        )
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let mug = product("Mug", "v1", 1299);
        repo.insert(&mug).await.unwrap();

        let found = repo.get_by_id(&mug.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Mug");
        assert_eq!(found.price(), Money::from_cents(1299));
        assert_eq!(found.vendor_id, "v1");

        assert!(repo.get_by_id(&new_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown() {
        let repo = repo().await;
        let a = product("A", "v1", 100);
        let b = product("B", "v2", 200);
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let ids = vec![a.id.clone(), "ghost".to_string(), b.id.clone(), a.id.clone()];
        let found = repo.get_many(&ids).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[&b.id].vendor_id, "v2");
        assert!(!found.contains_key("ghost"));

        let names = repo.names_for(&ids).await.unwrap();
        assert_eq!(names[&a.id], "A");
    }

    #[tokio::test]
    async fn test_update_keeps_vendor() {
        let repo = repo().await;
        let mut mug = product("Mug", "v1", 500);
        repo.insert(&mug).await.unwrap();

        mug.vendor_id = "v2".to_string();
        mug.stock = 0;
        repo.update(&mug).await.unwrap();

        let stored = repo.get_by_id(&mug.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 0);
        assert_eq!(stored.vendor_id, "v1");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let mug = product("Mug", "v1", 500);
        repo.insert(&mug).await.unwrap();
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        repo.delete(&mug.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(matches!(
            repo.delete(&mug.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
