//! Category REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CategoryDto, CategoryRequest};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::modules::products::{CatalogState, PageParams, ProductDto};

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categories with product counts", body = ApiResponse<Vec<CategoryDto>>)
    )
)]
pub async fn list_categories(
    State(state): State<CatalogState>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state
        .catalog
        .list_categories()
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        categories.into_iter().map(CategoryDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = ApiResponse<CategoryDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_category(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let category = state.catalog.get_category(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/products",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category ID"), PageParams),
    responses(
        (status = 200, description = "Products in the category, by id", body = ApiResponse<PaginatedResponse<ProductDto>>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn list_category_products(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ProductDto>>>, ApiError> {
    let limit = state.limits.page_size(params.per_page);
    if limit <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "page size must be positive, got {}",
                limit
            ))),
        ));
    }
    let page = params.page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;

    let result = state
        .catalog
        .products_in_category(id, page, limit as u32)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CategoryDto>),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn create_category(
    State(state): State<CatalogState>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    let category = state
        .catalog
        .create_category(req.into())
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<CategoryDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn update_category(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let category = state
        .catalog
        .update_category(id, req.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<String>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Category still has products")
    )
)]
pub async fn delete_category(
    State(state): State<CatalogState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state
        .catalog
        .delete_category(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(format!("Category {} deleted", id))))
}
