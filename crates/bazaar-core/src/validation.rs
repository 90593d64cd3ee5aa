//! # Validation Module
//!
//! Input validation utilities for Bazaar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Malformed JSON is rejected before any handler runs                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, non-negative amounts                    │
//! │  └── Produces field-level ValidationError (HTTP 400)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE username and email (HTTP 409)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_price_cents, validate_username};
//!
//! validate_username("alice").unwrap();
//! assert!(validate_price_cents(-1).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Address, NewProduct, Product, ProductDraft, ProductPatch, UserPatch};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use bazaar_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Ceramic Mug").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, 200)
}

/// Validates a product category.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required_text("category", category, 100)
}

/// Validates a username.
///
/// ## Rules
/// - Between 3 and 50 characters after trimming
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();
    let len = username.chars().count();

    if len == 0 {
        return Err(ValidationError::required("username"));
    }

    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: USERNAME_MIN_LEN,
        });
    }

    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: USERNAME_MAX_LEN,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a
/// dotted domain without whitespace.
///
/// ```rust
/// use bazaar_core::validation::validate_email;
///
/// assert!(validate_email("bob@shop.io").is_ok());
/// assert!(validate_email("bob@localhost").is_err());
/// assert!(validate_email("bob").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be of the form name@domain"));
    }

    let dotted = domain
        .split('.')
        .collect::<Vec<_>>();
    if dotted.len() < 2 || dotted.iter().any(|part| part.is_empty()) {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

/// Validates a plain-text password before hashing.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: PASSWORD_MIN_LEN,
        });
    }

    if len > PASSWORD_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: PASSWORD_MAX_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ```rust
/// use bazaar_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a shipping address. All three parts are required.
pub fn validate_address(address: &Address) -> ValidationResult<()> {
    required_text("address.street", &address.street, 200)?;
    required_text("address.city", &address.city, 100)?;
    required_text("address.zip", &address.zip, 20)?;
    Ok(())
}

/// Validates a product creation request and returns its normalized form.
///
/// Fields are checked in declaration order; the first failure wins.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<ProductDraft> {
    let name = input
        .name
        .as_deref()
        .ok_or_else(|| ValidationError::required("name"))?;
    validate_product_name(name)?;

    let price_cents = input
        .price_cents
        .ok_or_else(|| ValidationError::required("price"))?;
    validate_price_cents(price_cents)?;

    let stock = input
        .stock
        .ok_or_else(|| ValidationError::required("stock"))?;
    validate_stock(stock)?;

    let category = input
        .category
        .as_deref()
        .ok_or_else(|| ValidationError::required("category"))?;
    validate_category(category)?;

    Ok(ProductDraft {
        name: name.trim().to_string(),
        price: Money::from_cents(price_cents),
        stock,
        category: category.trim().to_string(),
    })
}

impl ProductPatch {
    /// Validates every present field.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        Ok(())
    }

    /// Validates and applies the patch. `product` is left untouched on error.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) -> ValidationResult<()> {
        self.validate()?;

        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_string();
        }
        product.updated_at = now;

        Ok(())
    }
}

impl UserPatch {
    /// Validates every present field. Role is a closed enum and needs no check.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            vendor_id: "v-1".to_string(),
            name: "Mug".to_string(),
            price_cents: 500,
            stock: 10,
            category: "kitchen".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Ceramic Mug").is_ok());
        assert_eq!(
            validate_product_name(""),
            Err(ValidationError::required("name"))
        );
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob").is_ok());
        assert!(matches!(
            validate_username("bo"),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("alice @example.com").is_err());
        assert!(validate_email("alice@example.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_stock(0).is_ok());
        assert_eq!(
            validate_stock(-1),
            Err(ValidationError::Negative {
                field: "stock".to_string()
            })
        );
    }

    #[test]
    fn test_validate_new_product() {
        let input = NewProduct {
            name: Some("  Mug ".to_string()),
            price_cents: Some(500),
            stock: Some(3),
            category: Some("kitchen".to_string()),
        };
        let draft = validate_new_product(&input).unwrap();
        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.price.cents(), 500);

        let missing_price = NewProduct {
            price_cents: None,
            ..input.clone()
        };
        assert_eq!(
            validate_new_product(&missing_price),
            Err(ValidationError::required("price"))
        );

        let missing_stock = NewProduct {
            stock: None,
            ..input.clone()
        };
        assert_eq!(
            validate_new_product(&missing_stock),
            Err(ValidationError::required("stock"))
        );

        let negative = NewProduct {
            price_cents: Some(-5),
            ..input
        };
        assert!(validate_new_product(&negative).is_err());
    }

    #[test]
    fn test_product_patch_apply() {
        let mut product = sample_product();
        let patch = ProductPatch {
            stock: Some(42),
            ..Default::default()
        };
        patch.apply(&mut product, Utc::now()).unwrap();
        assert_eq!(product.stock, 42);
        assert_eq!(product.name, "Mug");
        assert_eq!(product.vendor_id, "v-1");
    }

    #[test]
    fn test_product_patch_rejects_invalid_without_mutation() {
        let mut product = sample_product();
        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            price_cents: Some(-1),
            ..Default::default()
        };
        assert!(patch.apply(&mut product, Utc::now()).is_err());
        assert_eq!(product.name, "Mug");
    }

    #[test]
    fn test_validate_address() {
        let address = Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
        };
        assert!(validate_address(&address).is_ok());

        let blank_zip = Address {
            zip: " ".to_string(),
            ..address
        };
        assert_eq!(
            validate_address(&blank_zip),
            Err(ValidationError::required("address.zip"))
        );
    }

    #[test]
    fn test_user_patch_validate() {
        let patch = UserPatch {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(UserPatch::default().validate().is_ok());
    }
}
