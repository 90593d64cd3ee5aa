//! Catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bazaar_core::{NewProduct, Product, ProductPatch};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::services::CatalogService;
use crate::SharedState;

pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(CatalogService::new(&state.db).list().await?))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(CatalogService::new(&state.db).get(&id).await?))
}

pub async fn create(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = CatalogService::new(&state.db)
        .create(&caller, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let product = CatalogService::new(&state.db)
        .update(&caller, &id, &patch)
        .await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    CatalogService::new(&state.db).delete(&caller, &id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
