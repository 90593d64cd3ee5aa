//! # Catalog Service
//!
//! Vendor-owned product management.
//!
//! ## Mutation Checks
//! ```text
//! caller ──► VendorOnly ──► product exists? ──► ensure_owner ──► validate ──► store
//!              │ 403            │ 404              │ 403            │ 400
//! ```
//!
//! Reads are public.

use bazaar_core::validation::validate_new_product;
use bazaar_core::{
    ensure_owner, CoreError, Identity, NewProduct, Policy, Product, ProductPatch, ResourceKind,
};
use bazaar_db::{Database, ProductRepository};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::ApiResult;

/// Product CRUD with ownership enforcement.
#[derive(Debug, Clone)]
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(db: &Database) -> Self {
        CatalogService {
            products: db.products(),
        }
    }

    /// Lists the whole catalog.
    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        Ok(self.products.list_all().await?)
    }

    /// Gets one product.
    pub async fn get(&self, id: &str) -> ApiResult<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Creates a product owned by the caller.
    pub async fn create(&self, caller: &Identity, input: &NewProduct) -> ApiResult<Product> {
        caller.authorize(Policy::VendorOnly)?;

        let draft = validate_new_product(input)?;
        let product = Product::new(draft, &caller.user_id, Utc::now());
        let product = self.products.insert(&product).await?;

        info!(
            id = %product.id,
            vendor_id = %product.vendor_id,
            price = %product.price(),
            "Product created"
        );
        Ok(product)
    }

    /// Applies `patch` to a product the caller owns.
    pub async fn update(
        &self,
        caller: &Identity,
        id: &str,
        patch: &ProductPatch,
    ) -> ApiResult<Product> {
        let mut product = self.owned_product(caller, id).await?;

        patch.apply(&mut product, Utc::now())?;
        self.products.update(&product).await?;

        info!(id = %product.id, "Product updated");
        Ok(product)
    }

    /// Deletes a product the caller owns.
    pub async fn delete(&self, caller: &Identity, id: &str) -> ApiResult<()> {
        let product = self.owned_product(caller, id).await?;

        self.products.delete(&product.id).await?;

        info!(id = %product.id, "Product deleted");
        Ok(())
    }

    async fn owned_product(&self, caller: &Identity, id: &str) -> ApiResult<Product> {
        caller.authorize(Policy::VendorOnly)?;

        let product = self.get(id).await?;

        ensure_owner(ResourceKind::Product, &product.id, &product.vendor_id, caller).inspect_err(
            |_| {
                warn!(id = %product.id, caller = %caller.user_id, "Product mutation by non-owner");
            },
        )?;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::Role;
    use bazaar_db::DbConfig;

    async fn service() -> CatalogService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogService::new(&db)
    }

    fn mug() -> NewProduct {
        NewProduct {
            name: Some("Mug".to_string()),
            price_cents: Some(1299),
            stock: Some(4),
            category: Some("kitchen".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_uses_caller_as_vendor() {
        let catalog = service().await;
        let vendor = Identity::new("vendor-1", Role::Vendor);

        let product = catalog.create(&vendor, &mug()).await.unwrap();
        assert_eq!(product.vendor_id, "vendor-1");
        assert_eq!(catalog.get(&product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_create_requires_vendor_role() {
        let catalog = service().await;
        let customer = Identity::new("c", Role::Customer);

        let err = catalog.create(&customer, &mug()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientRole);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let catalog = service().await;
        let vendor = Identity::new("v", Role::Vendor);
        let input = NewProduct {
            price_cents: Some(-1),
            ..mug()
        };

        let err = catalog.create(&vendor, &input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_other_vendor_cannot_update_or_delete() {
        let catalog = service().await;
        let owner = Identity::new("v1", Role::Vendor);
        let rival = Identity::new("v2", Role::Vendor);
        let product = catalog.create(&owner, &mug()).await.unwrap();

        let patch = ProductPatch {
            stock: Some(0),
            ..ProductPatch::default()
        };
        let err = catalog.update(&rival, &product.id, &patch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);

        let err = catalog.delete(&rival, &product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotOwner);

        assert_eq!(catalog.get(&product.id).await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found_before_ownership() {
        let catalog = service().await;
        let vendor = Identity::new("v1", Role::Vendor);

        let err = catalog.delete(&vendor, "ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_owner_update() {
        let catalog = service().await;
        let owner = Identity::new("v1", Role::Vendor);
        let product = catalog.create(&owner, &mug()).await.unwrap();

        let patch = ProductPatch {
            name: Some("Big Mug".to_string()),
            price_cents: Some(1599),
            ..ProductPatch::default()
        };
        let updated = catalog.update(&owner, &product.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Big Mug");
        assert_eq!(updated.price_cents, 1599);
        assert_eq!(updated.vendor_id, "v1");
        assert_eq!(catalog.get(&product.id).await.unwrap().name, "Big Mug");
    }
}
