//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CatalogService, SitemapBuilder};
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse};
use crate::interfaces::http::modules::categories::{self, CategoryDto, CategoryRequest};
use crate::interfaces::http::modules::dashboard::{self, DashboardDto};
use crate::interfaces::http::modules::health::{self, ComponentHealth, HealthResponse};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::products::{
    self, CatalogState, ListingLimits, ProductDto, ProductRequest,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::seo::{self, SeoState};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::list_category_products,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        dashboard::get_dashboard,
        dashboard::invalidate_cache,
        seo::robots_txt,
        seo::sitemap_index,
        seo::sitemap_pages,
        seo::sitemap_products,
        seo::sitemap_categories,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginatedResponse<ProductDto>,
            HealthResponse,
            ComponentHealth,
            ProductDto,
            ProductRequest,
            CategoryDto,
            CategoryRequest,
            DashboardDto,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Products", description = "Storefront listing and product management"),
        (name = "Categories", description = "Category management"),
        (name = "Dashboard", description = "Admin statistics and cache control"),
        (name = "SEO", description = "robots.txt and XML sitemaps"),
    ),
    info(
        title = "Storefront Catalog API",
        version = "1.0.0",
        description = "Product catalog with a category-balanced storefront listing",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the router needs from the running service.
pub struct RouterDeps {
    pub catalog: Arc<CatalogService>,
    pub sitemap: SitemapBuilder,
    pub limits: ListingLimits,
    pub db: DatabaseConnection,
    pub prometheus: PrometheusHandle,
}

pub fn create_api_router(deps: RouterDeps) -> Router {
    let catalog_state = CatalogState {
        catalog: deps.catalog.clone(),
        limits: deps.limits,
    };

    let product_routes = Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .with_state(catalog_state.clone());

    let category_routes = Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/{id}/products", get(categories::list_category_products))
        .with_state(catalog_state.clone());

    let admin_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/cache/invalidate", post(dashboard::invalidate_cache))
        .with_state(catalog_state);

    let seo_routes = Router::new()
        .route("/robots.txt", get(seo::robots_txt))
        .route("/sitemap.xml", get(seo::sitemap_index))
        .route("/sitemap_pages.xml", get(seo::sitemap_pages))
        .route("/sitemap_products.xml", get(seo::sitemap_products))
        .route("/sitemap_categories.xml", get(seo::sitemap_categories))
        .with_state(SeoState {
            catalog: deps.catalog,
            sitemap: deps.sitemap,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: deps.db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: deps.prometheus,
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(seo_routes)
        .nest("/api/v1/products", product_routes)
        .nest("/api/v1/categories", category_routes)
        .nest("/api/v1", admin_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sea_orm_migration::MigratorTrait;
    use serde_json::{json, Value};
    use tower::Service;

    use super::*;
    use crate::application::{BalancedSampler, NoopNotifier};
    use crate::domain::{NewCategory, NewProduct, RepositoryProvider};
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
    use crate::interfaces::http::modules::request_id::REQUEST_ID_HEADER;

    struct TestApp {
        router: Router,
        repos: Arc<SeaOrmRepositoryProvider>,
    }

    async fn test_app() -> TestApp {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let repos = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let shared: Arc<dyn RepositoryProvider> = repos.clone();
        let catalog = Arc::new(CatalogService::new(
            shared.clone(),
            Arc::new(BalancedSampler::new(shared)),
            Arc::new(NoopNotifier),
        ));

        let router = create_api_router(RouterDeps {
            catalog,
            sitemap: SitemapBuilder::new("https://shop.example"),
            limits: ListingLimits::default(),
            db,
            prometheus: PrometheusBuilder::new().build_recorder().handle(),
        });
        TestApp { router, repos }
    }

    /// Categories named A, B, C... with the given product counts.
    async fn seed(repos: &SeaOrmRepositoryProvider, counts: &[usize]) -> Vec<i32> {
        let mut ids = Vec::new();
        for (i, &count) in counts.iter().enumerate() {
            let category = repos
                .categories()
                .save(NewCategory {
                    name: format!("{}", (b'A' + i as u8) as char),
                    description: None,
                    image: None,
                })
                .await
                .unwrap();
            for n in 0..count {
                repos
                    .products()
                    .save(NewProduct {
                        name: format!("Item {}{}", i, n),
                        description: None,
                        price: 2500,
                        category_id: category.id,
                        image: None,
                    })
                    .await
                    .unwrap();
            }
            ids.push(category.id);
        }
        ids
    }

    async fn call(app: &TestApp, req: Request<Body>) -> Response<Body> {
        let mut svc = app.router.clone().into_service();
        svc.call(req).await.unwrap()
    }

    async fn get(app: &TestApp, uri: &str) -> Response<Body> {
        call(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send_json(app: &TestApp, method: &str, uri: &str, body: Value) -> Response<Body> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        call(app, req).await
    }

    async fn body_json(resp: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(resp: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn balanced_listing_over_http() {
        let app = test_app().await;
        seed(&app.repos, &[10, 3, 1, 1]).await;

        let resp = get(&app, "/api/v1/products?per_page=20&seed=42").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);
        assert_eq!(body["data"]["total"], 15);
        assert_eq!(body["data"]["total_pages"], 1);
        assert_eq!(body["data"]["has_next"], false);
    }

    #[tokio::test]
    async fn same_seed_same_page() {
        let app = test_app().await;
        seed(&app.repos, &[12, 9, 7]).await;

        let first = body_json(get(&app, "/api/v1/products?per_page=9&seed=7").await).await;
        let second = body_json(get(&app, "/api/v1/products?per_page=9&seed=7").await).await;
        assert_eq!(first["data"]["items"], second["data"]["items"]);
    }

    #[tokio::test]
    async fn zero_page_size_is_bad_request() {
        let app = test_app().await;
        let resp = get(&app, "/api/v1/products?per_page=0").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn category_filter_pages_by_id() {
        let app = test_app().await;
        let ids = seed(&app.repos, &[2, 5]).await;

        let uri = format!("/api/v1/products?category={}&per_page=2&page=3", ids[1]);
        let body = body_json(get(&app, &uri).await).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Item 14");
        assert_eq!(body["data"]["has_prev"], true);
        assert_eq!(body["data"]["has_next"], false);
    }

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let app = test_app().await;
        let body = body_json(get(&app, "/api/v1/products").await).await;
        assert_eq!(body["data"]["items"], json!([]));
        assert_eq!(body["data"]["total_pages"], 0);
    }

    #[tokio::test]
    async fn product_crud_flow() {
        let app = test_app().await;
        let ids = seed(&app.repos, &[0]).await;

        let resp = send_json(
            &app,
            "POST",
            "/api/v1/products",
            json!({"name": "Premium Ceramic Wall Tiles", "price": 4500, "category_id": ids[0]}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let id = created["data"]["id"].as_i64().unwrap();
        assert_eq!(created["data"]["price_display"], "45.00");

        let resp = send_json(
            &app,
            "PUT",
            &format!("/api/v1/products/{}", id),
            json!({"name": "Matte Wall Tiles", "price": 3900, "category_id": ids[0]}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["name"], "Matte Wall Tiles");

        let resp = call(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/products/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get(&app, &format!("/api/v1/products/{}", id)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_product_body_is_unprocessable() {
        let app = test_app().await;
        let resp = send_json(
            &app,
            "POST",
            "/api/v1/products",
            json!({"name": "", "price": 0, "category_id": 1}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn product_in_missing_category_is_not_found() {
        let app = test_app().await;
        let resp = send_json(
            &app,
            "POST",
            "/api/v1/products",
            json!({"name": "Orphan", "price": 100, "category_id": 999}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn category_conflicts() {
        let app = test_app().await;
        let ids = seed(&app.repos, &[1]).await;

        let resp = send_json(&app, "POST", "/api/v1/categories", json!({"name": "A"})).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = call(
            &app,
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/categories/{}", ids[0]))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn categories_report_counts() {
        let app = test_app().await;
        seed(&app.repos, &[3, 0]).await;

        let body = body_json(get(&app, "/api/v1/categories").await).await;
        let list = body["data"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["product_count"], 3);
        assert_eq!(list[1]["product_count"], 0);
    }

    #[tokio::test]
    async fn category_products_endpoint() {
        let app = test_app().await;
        let ids = seed(&app.repos, &[4]).await;

        let uri = format!("/api/v1/categories/{}/products?per_page=3", ids[0]);
        let body = body_json(get(&app, &uri).await).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"]["total_pages"], 2);

        let resp = get(&app, "/api/v1/categories/999/products").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_and_cache_endpoints() {
        let app = test_app().await;
        seed(&app.repos, &[6, 2]).await;

        let body = body_json(get(&app, "/api/v1/dashboard").await).await;
        assert_eq!(body["data"]["total_categories"], 2);
        assert_eq!(body["data"]["total_products"], 8);
        assert_eq!(body["data"]["recent_products"].as_array().unwrap().len(), 5);

        let resp = call(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/v1/cache/invalidate")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn seo_documents() {
        let app = test_app().await;
        seed(&app.repos, &[1]).await;

        let resp = get(&app, "/robots.txt").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert!(body_text(resp)
            .await
            .contains("Sitemap: https://shop.example/sitemap.xml"));

        let resp = get(&app, "/sitemap_products.xml").await;
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/xml"));
        assert!(body_text(resp)
            .await
            .contains("<loc>https://shop.example/product/1</loc>"));

        let xml = body_text(get(&app, "/sitemap.xml").await).await;
        assert!(xml.contains("sitemap_categories.xml"));
    }

    #[tokio::test]
    async fn health_metrics_and_request_id() {
        let app = test_app().await;

        let resp = get(&app, "/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "ok");

        let resp = get(&app, "/metrics").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
