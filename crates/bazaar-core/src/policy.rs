//! # Access Policies
//!
//! The three-tier permission model, independent of HTTP.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unauthenticated                                                        │
//! │       │  extract_bearer_token()        ──► MissingToken     (401)       │
//! │       ▼                                                                 │
//! │  TokenChecked (Identity)                                                │
//! │       │  JwtManager::verify_token()    ──► InvalidToken     (403)       │
//! │       ▼                                                                 │
//! │  PolicyEvaluated                                                        │
//! │       │  Identity::authorize(policy)   ──► InsufficientRole (403)       │
//! │       │  ensure_owner(kind, owner, me) ──► NotOwner         (403)       │
//! │       ▼                                                                 │
//! │  Allowed ──► handler runs                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Token signing and verification live in the API crate; this module only
//! decides what a verified identity may do.

use std::fmt;

use crate::error::AuthError;
use crate::types::Role;

// =============================================================================
// Identity
// =============================================================================

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

/// Named access-control predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy<'a> {
    /// Any valid identity.
    Authenticated,
    /// The caller is `owner_id`, or an admin.
    SelfOrAdmin { owner_id: &'a str },
    AdminOnly,
    VendorOnly,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Identity {
            user_id: user_id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Evaluates `policy` against this identity.
    ///
    /// ```rust
    /// use bazaar_core::{Identity, Policy, Role};
    ///
    /// let bob = Identity::new("bob", Role::Customer);
    /// assert!(bob.authorize(Policy::SelfOrAdmin { owner_id: "bob" }).is_ok());
    /// assert!(bob.authorize(Policy::SelfOrAdmin { owner_id: "eve" }).is_err());
    /// assert!(bob.authorize(Policy::AdminOnly).is_err());
    /// ```
    pub fn authorize(&self, policy: Policy<'_>) -> Result<(), AuthError> {
        let allowed = match policy {
            Policy::Authenticated => true,
            Policy::SelfOrAdmin { owner_id } => self.user_id == owner_id || self.is_admin(),
            Policy::AdminOnly => self.is_admin(),
            Policy::VendorOnly => self.role == Role::Vendor,
        };

        if allowed {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole {
                required: policy.required_label().to_string(),
            })
        }
    }
}

impl Policy<'_> {
    /// Who the policy admits, for error messages.
    fn required_label(&self) -> &'static str {
        match self {
            Policy::Authenticated => "authenticated users",
            Policy::SelfOrAdmin { .. } => "the account owner or admin",
            Policy::AdminOnly => "admin",
            Policy::VendorOnly => "vendor",
        }
    }
}

// =============================================================================
// Ownership
// =============================================================================

/// Kinds of owned resources. Only catalog entries have an owner separate
/// from the account that addresses them; accounts and orders go through
/// [`Policy::SelfOrAdmin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Product,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Product => "product",
        })
    }
}

/// Fails with `NotOwner` unless `caller` owns the resource.
///
/// Role is not consulted: an admin does not own other vendors' products.
pub fn ensure_owner(
    kind: ResourceKind,
    resource_id: &str,
    owner_id: &str,
    caller: &Identity,
) -> Result<(), AuthError> {
    if caller.user_id == owner_id {
        Ok(())
    } else {
        Err(AuthError::NotOwner {
            resource: kind.to_string(),
            id: resource_id.to_string(),
        })
    }
}

// =============================================================================
// Bearer Token Extraction
// =============================================================================

/// Pulls the token out of an `Authorization` header value.
///
/// A missing header, a non-`Bearer` scheme and an empty token are all
/// `MissingToken`.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::MissingToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_admits_everyone() {
        for role in [Role::Customer, Role::Vendor, Role::Admin] {
            assert!(Identity::new("x", role).authorize(Policy::Authenticated).is_ok());
        }
    }

    #[test]
    fn test_self_or_admin() {
        let alice = Identity::new("alice", Role::Customer);
        let admin = Identity::new("root", Role::Admin);

        assert!(alice.authorize(Policy::SelfOrAdmin { owner_id: "alice" }).is_ok());
        assert!(admin.authorize(Policy::SelfOrAdmin { owner_id: "alice" }).is_ok());
        assert!(matches!(
            alice.authorize(Policy::SelfOrAdmin { owner_id: "bob" }),
            Err(AuthError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_role_policies() {
        let vendor = Identity::new("v", Role::Vendor);
        let admin = Identity::new("a", Role::Admin);

        assert!(vendor.authorize(Policy::VendorOnly).is_ok());
        assert!(vendor.authorize(Policy::AdminOnly).is_err());
        assert!(admin.authorize(Policy::AdminOnly).is_ok());
        // admin is not a vendor
        assert_eq!(
            admin.authorize(Policy::VendorOnly),
            Err(AuthError::InsufficientRole {
                required: "vendor".to_string()
            })
        );
    }

    #[test]
    fn test_ensure_owner() {
        let v1 = Identity::new("v1", Role::Vendor);
        assert!(ensure_owner(ResourceKind::Product, "p-1", "v1", &v1).is_ok());

        let err = ensure_owner(ResourceKind::Product, "p-1", "v2", &v1).unwrap_err();
        assert_eq!(
            err,
            AuthError::NotOwner {
                resource: "product".to_string(),
                id: "p-1".to_string()
            }
        );
        assert_eq!(err.to_string(), "Not authorized to modify product p-1");
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer_token(Some("Bearer")), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer_token(Some("Bearer   ")), Err(AuthError::MissingToken));
        assert_eq!(
            extract_bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MissingToken)
        );
    }
}
