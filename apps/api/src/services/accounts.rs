//! # Account Service
//!
//! Registration, login and user management.
//!
//! ## Policies
//! ```text
//! ┌──────────────────────────┬─────────────────────────────────────────────┐
//! │ register / login         │ public                                      │
//! │ me                       │ authenticated                               │
//! │ list / find / stats      │ admin only                                  │
//! │ update / delete          │ self or admin (role changes: admin only)    │
//! └──────────────────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Stored credentials never leave this module; everything returned is a
//! [`UserProfile`].

use bazaar_core::analytics::{signups_by_month, MonthlySignups};
use bazaar_core::validation::{validate_email, validate_password, validate_username};
use bazaar_core::{
    new_id, AuthError, CoreError, Identity, Policy, Role, User, UserPatch, UserProfile,
    ValidationError,
};
use bazaar_db::{Database, UserRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use crate::auth::{hash_password, verify_password, JwtManager};
use crate::error::{ApiError, ApiResult, ErrorCode};

/// How many accounts `GET /api/users?new=true` returns.
pub const NEWEST_USERS_LIMIT: u32 = 5;

/// Registration request body.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `customer`.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Login request body. Either `email` or `username` identifies the account;
/// `email` wins when both are given.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Account operations.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: UserRepository,
}

impl AccountService {
    pub fn new(db: &Database) -> Self {
        AccountService { users: db.users() }
    }

    /// Creates an account.
    ///
    /// Admin accounts can only be registered when `allow_admin` is set.
    pub async fn register(
        &self,
        request: RegisterRequest,
        allow_admin: bool,
    ) -> ApiResult<RegisterResponse> {
        let username = request
            .username
            .ok_or_else(|| ValidationError::required("username"))?;
        let email = request
            .email
            .ok_or_else(|| ValidationError::required("email"))?;
        let password = request
            .password
            .ok_or_else(|| ValidationError::required("password"))?;

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&password)?;

        let role = request.role.unwrap_or_default();
        if role == Role::Admin && !allow_admin {
            warn!(username = %username, "Admin self-registration refused");
            return Err(ApiError::new(
                ErrorCode::AdminRegistrationDisabled,
                "Registering admin accounts is disabled",
            ));
        }

        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password_hash: hash_password(&password)?,
            role,
            created_at: now,
            updated_at: now,
        };
        let user = self.users.insert(&user).await?;

        info!(id = %user.id, role = %user.role, "User registered");
        Ok(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        })
    }

    /// Checks credentials and issues a session token.
    pub async fn login(&self, request: LoginRequest, jwt: &JwtManager) -> ApiResult<LoginResponse> {
        let password = request
            .password
            .ok_or_else(|| ValidationError::required("password"))?;

        let (user, login) = match (request.email, request.username) {
            (Some(email), _) => (self.users.get_by_email(email.trim()).await?, email),
            (None, Some(username)) => {
                (self.users.get_by_username(username.trim()).await?, username)
            }
            (None, None) => return Err(ValidationError::required("email").into()),
        };
        let user = user.ok_or_else(|| CoreError::UserNotFound(login.trim().to_string()))?;

        if !verify_password(&password, &user.password_hash) {
            warn!(id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = jwt.issue_token(&user.id, user.role)?;

        info!(id = %user.id, "User logged in");
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// The caller's own profile.
    pub async fn me(&self, caller: &Identity) -> ApiResult<UserProfile> {
        caller.authorize(Policy::Authenticated)?;
        self.profile(&caller.user_id).await
    }

    /// All accounts, or only the newest few. Admin only.
    pub async fn list(&self, caller: &Identity, newest_only: bool) -> ApiResult<Vec<UserProfile>> {
        caller.authorize(Policy::AdminOnly)?;

        let users = if newest_only {
            self.users.list_newest(NEWEST_USERS_LIMIT).await?
        } else {
            self.users.list_all().await?
        };

        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// One account by id. Admin only.
    pub async fn find(&self, caller: &Identity, id: &str) -> ApiResult<UserProfile> {
        caller.authorize(Policy::AdminOnly)?;
        self.profile(id).await
    }

    /// Sign-ups per month over the trailing year. Admin only.
    pub async fn stats(&self, caller: &Identity) -> ApiResult<Vec<MonthlySignups>> {
        caller.authorize(Policy::AdminOnly)?;

        let dates = self.users.signup_dates().await?;
        Ok(signups_by_month(dates, Utc::now()))
    }

    /// Updates an account. Self or admin; changing the role needs admin.
    pub async fn update(
        &self,
        caller: &Identity,
        id: &str,
        patch: UserPatch,
    ) -> ApiResult<UserProfile> {
        caller.authorize(Policy::SelfOrAdmin { owner_id: id })?;
        patch.validate()?;

        let mut user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(id.to_string()))?;

        if let Some(role) = patch.role {
            if role != user.role {
                caller.authorize(Policy::AdminOnly)?;
                user.role = role;
            }
        }
        if let Some(username) = patch.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = patch.email {
            user.email = email.trim().to_string();
        }
        if let Some(password) = patch.password {
            user.password_hash = hash_password(&password)?;
        }
        user.updated_at = Utc::now();

        self.users.update(&user).await?;

        info!(id = %user.id, by = %caller.user_id, "User updated");
        Ok(user.into())
    }

    /// Deletes an account. Self or admin.
    pub async fn delete(&self, caller: &Identity, id: &str) -> ApiResult<()> {
        caller.authorize(Policy::SelfOrAdmin { owner_id: id })?;

        self.users.delete(id).await?;

        info!(id = %id, by = %caller.user_id, "User deleted");
        Ok(())
    }

    async fn profile(&self, id: &str) -> ApiResult<UserProfile> {
        self.users
            .get_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| CoreError::UserNotFound(id.to_string()).into())
    }
}
