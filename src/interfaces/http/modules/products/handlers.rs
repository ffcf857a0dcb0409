//! Product REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{ListProductsParams, ProductDto, ProductRequest};
use crate::application::CatalogService;
use crate::domain::listing::{CategorySelector, ListingRequest, DEFAULT_PAGE_SIZE};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, PaginatedResponse, ValidatedJson,
};

/// Page size bounds applied to listing queries.
#[derive(Debug, Clone, Copy)]
pub struct ListingLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

impl ListingLimits {
    /// Missing means default; oversized is capped. Zero and negative values
    /// are left for `ListingRequest` to reject.
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        match requested {
            None => self.default_page_size as i64,
            Some(size) => size.min(self.max_page_size as i64),
        }
    }
}

/// State shared by the catalog routes (products, categories, dashboard).
#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<CatalogService>,
    pub limits: ListingLimits,
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "Listing page", body = ApiResponse<PaginatedResponse<ProductDto>>),
        (status = 400, description = "Invalid page size")
    )
)]
pub async fn list_products(
    State(state): State<CatalogState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ProductDto>>>, ApiError> {
    let request = ListingRequest::new(
        params.page.unwrap_or(1),
        state.limits.page_size(params.per_page),
        CategorySelector::parse(params.category.as_deref()),
        params.seed,
    )
    .map_err(domain_error)?;

    let page = state
        .catalog
        .list_products(request)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_product(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state.catalog.get_product(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(product.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<ProductDto>),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn create_product(
    State(state): State<CatalogState>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    let product = state
        .catalog
        .create_product(req.into())
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<ProductDto>),
        (status = 404, description = "Product or category not found"),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn update_product(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state
        .catalog
        .update_product(id, req.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(product.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<String>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_product(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state
        .catalog
        .delete_product(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(format!("Product {} deleted", id))))
}
