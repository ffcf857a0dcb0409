//! Dashboard statistics and listing cache control

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::application::DashboardStats;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse};
use crate::interfaces::http::modules::products::{CatalogState, ProductDto};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub total_categories: u64,
    pub total_products: u64,
    /// Newest first
    pub recent_products: Vec<ProductDto>,
}

impl From<DashboardStats> for DashboardDto {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_categories: s.total_categories,
            total_products: s.total_products,
            recent_products: s.recent_products.into_iter().map(Into::into).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Catalog totals and recent products", body = ApiResponse<DashboardDto>)
    )
)]
pub async fn get_dashboard(
    State(state): State<CatalogState>,
) -> Result<Json<ApiResponse<DashboardDto>>, ApiError> {
    let stats = state.catalog.dashboard().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/cache/invalidate",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cached listing pages dropped", body = ApiResponse<String>)
    )
)]
pub async fn invalidate_cache(State(state): State<CatalogState>) -> Json<ApiResponse<String>> {
    state.catalog.invalidate_listing();
    info!("Listing cache cleared on request");
    Json(ApiResponse::success("Listing cache cleared".to_string()))
}
