//! User management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use bazaar_core::analytics::MonthlySignups;
use bazaar_core::{UserPatch, UserProfile};
use serde::Deserialize;

use super::MessageResponse;
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::services::AccountService;
use crate::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `?new=<anything but false>` returns only the newest accounts.
    pub new: Option<String>,
}

impl ListQuery {
    fn newest_only(&self) -> bool {
        self.new
            .as_deref()
            .is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
    }
}

pub async fn me(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(AccountService::new(&state.db).me(&caller).await?))
}

pub async fn list(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = AccountService::new(&state.db)
        .list(&caller, query.newest_only())
        .await?;
    Ok(Json(users))
}

pub async fn find(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(AccountService::new(&state.db).find(&caller, &id).await?))
}

pub async fn stats(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<MonthlySignups>>> {
    Ok(Json(AccountService::new(&state.db).stats(&caller).await?))
}

pub async fn update(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Json<UserProfile>> {
    let user = AccountService::new(&state.db)
        .update(&caller, &id, patch)
        .await?;
    Ok(Json(user))
}

pub async fn delete(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    AccountService::new(&state.db).delete(&caller, &id).await?;
    Ok(Json(MessageResponse::new("User has been deleted")))
}
