//! robots.txt and sitemap handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::application::{CatalogService, SitemapBuilder};
use crate::domain::DomainResult;
use crate::interfaces::http::common::status_for;

const XML: &str = "application/xml; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
pub struct SeoState {
    pub catalog: Arc<CatalogService>,
    pub sitemap: SitemapBuilder,
}

fn document(content_type: &'static str, body: DomainResult<String>) -> Response {
    match body {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render SEO document");
            (status_for(&e), [(header::CONTENT_TYPE, TEXT)], "Unavailable").into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/robots.txt",
    tag = "SEO",
    responses((status = 200, description = "Crawler rules", body = String, content_type = "text/plain"))
)]
pub async fn robots_txt(State(state): State<SeoState>) -> Response {
    document(TEXT, Ok(state.sitemap.robots_txt()))
}

#[utoipa::path(
    get,
    path = "/sitemap.xml",
    tag = "SEO",
    responses((status = 200, description = "Sitemap index", body = String, content_type = "application/xml"))
)]
pub async fn sitemap_index(State(state): State<SeoState>) -> Response {
    document(XML, Ok(state.sitemap.sitemap_index(Utc::now())))
}

#[utoipa::path(
    get,
    path = "/sitemap_pages.xml",
    tag = "SEO",
    responses((status = 200, description = "Static pages sitemap", body = String, content_type = "application/xml"))
)]
pub async fn sitemap_pages(State(state): State<SeoState>) -> Response {
    document(XML, Ok(state.sitemap.pages(Utc::now())))
}

#[utoipa::path(
    get,
    path = "/sitemap_products.xml",
    tag = "SEO",
    responses((status = 200, description = "Product sitemap", body = String, content_type = "application/xml"))
)]
pub async fn sitemap_products(State(state): State<SeoState>) -> Response {
    let body = state
        .catalog
        .all_products()
        .await
        .map(|products| state.sitemap.products(&products));
    document(XML, body)
}

#[utoipa::path(
    get,
    path = "/sitemap_categories.xml",
    tag = "SEO",
    responses((status = 200, description = "Category sitemap", body = String, content_type = "application/xml"))
)]
pub async fn sitemap_categories(State(state): State<SeoState>) -> Response {
    let body = state
        .catalog
        .all_categories()
        .await
        .map(|categories| state.sitemap.categories(&categories));
    document(XML, body)
}
