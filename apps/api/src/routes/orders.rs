//! Checkout and order management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bazaar_core::{Order, OrderPatch};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::services::checkout::{CheckoutRequest, CheckoutResponse};
use crate::services::{CheckoutService, OrderService};
use crate::SharedState;

pub async fn create(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let response = CheckoutService::new(&state.db)
        .place_order(&caller, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(OrderService::new(&state.db).list_all(&caller).await?))
}

pub async fn find_by_user(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = OrderService::new(&state.db)
        .list_for_user(&caller, &user_id)
        .await?;
    Ok(Json(orders))
}

pub async fn update(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<OrderPatch>,
) -> ApiResult<Json<Order>> {
    let order = OrderService::new(&state.db)
        .update(&caller, &id, patch)
        .await?;
    Ok(Json(order))
}

pub async fn delete(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    OrderService::new(&state.db).delete(&caller, &id).await?;
    Ok(Json(MessageResponse::new("Order has been deleted")))
}
