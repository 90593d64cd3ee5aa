//! Admin analytics handlers.

use axum::extract::State;
use axum::Json;
use bazaar_core::analytics::{AverageOrderValue, ProductSales, VendorRevenue};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::services::AnalyticsService;
use crate::SharedState;

pub async fn revenue_per_vendor(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<VendorRevenue>>> {
    let rows = AnalyticsService::new(&state.db)
        .revenue_per_vendor(&caller)
        .await?;
    Ok(Json(rows))
}

pub async fn top_products(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<ProductSales>>> {
    let rows = AnalyticsService::new(&state.db)
        .top_products(&caller)
        .await?;
    Ok(Json(rows))
}

/// Serializes to `null` when there are no orders in the window.
pub async fn avg_order_value(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Option<AverageOrderValue>>> {
    let value = AnalyticsService::new(&state.db)
        .average_order_value(&caller)
        .await?;
    Ok(Json(value))
}
