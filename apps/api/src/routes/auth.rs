//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::services::accounts::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::services::AccountService;
use crate::SharedState;

pub async fn register(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let response = AccountService::new(&state.db)
        .register(request, state.config.allow_admin_registration)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = AccountService::new(&state.db)
        .login(request, &state.jwt)
        .await?;
    Ok(Json(response))
}
