//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::category::CategoryRepository;
use crate::domain::product::ProductRepository;
use crate::domain::repositories::RepositoryProvider;

use super::category_repository::SeaOrmCategoryRepository;
use super::product_repository::SeaOrmProductRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    categories: SeaOrmCategoryRepository,
    products: SeaOrmProductRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            categories: SeaOrmCategoryRepository::new(db.clone()),
            products: SeaOrmProductRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn categories(&self) -> &dyn CategoryRepository {
        &self.categories
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::domain::{DomainError, NewCategory, NewProduct};
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn provider() -> SeaOrmRepositoryProvider {
        let db = init_database(&DatabaseConfig::in_memory())
            .await
            .expect("connect");
        Migrator::up(&db, None).await.expect("migrate");
        SeaOrmRepositoryProvider::new(db)
    }

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            description: None,
            image: None,
        }
    }

    fn product(name: &str, category_id: i32) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: Some("tile".into()),
            price: 4500,
            category_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn counts_are_grouped_by_category() {
        let repos = provider().await;
        let wall = repos.categories().save(category("Wall")).await.unwrap();
        let floor = repos.categories().save(category("Floor")).await.unwrap();
        repos.categories().save(category("Empty")).await.unwrap();

        for i in 0..3 {
            repos
                .products()
                .save(product(&format!("Wall {}", i), wall.id))
                .await
                .unwrap();
        }
        repos.products().save(product("Floor 0", floor.id)).await.unwrap();

        let counts = repos.products().count_by_category().await.unwrap();
        let pairs: Vec<(i32, u64)> = counts
            .iter()
            .map(|c| (c.category_id, c.product_count))
            .collect();
        assert_eq!(pairs, vec![(wall.id, 3), (floor.id, 1)]);
        assert_eq!(repos.products().count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn ids_and_pages_are_ordered_by_id() {
        let repos = provider().await;
        let wall = repos.categories().save(category("Wall")).await.unwrap();
        let floor = repos.categories().save(category("Floor")).await.unwrap();

        let mut wall_ids = Vec::new();
        for i in 0..5 {
            let p = repos
                .products()
                .save(product(&format!("Wall {}", i), wall.id))
                .await
                .unwrap();
            wall_ids.push(p.id);
            repos
                .products()
                .save(product(&format!("Floor {}", i), floor.id))
                .await
                .unwrap();
        }

        assert_eq!(repos.products().ids_by_category(wall.id).await.unwrap(), wall_ids);

        let (page, total) = repos
            .products()
            .find_page(Some(wall.id), 2, 2)
            .await
            .unwrap();
        assert_eq!(total, 5);
        let ids: Vec<i32> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, wall_ids[2..4].to_vec());

        let (_, all_total) = repos.products().find_page(None, 0, 3).await.unwrap();
        assert_eq!(all_total, 10);
    }

    #[tokio::test]
    async fn find_by_ids_skips_unknown() {
        let repos = provider().await;
        let wall = repos.categories().save(category("Wall")).await.unwrap();
        let a = repos.products().save(product("A", wall.id)).await.unwrap();
        let found = repos.products().find_by_ids(&[a.id, 9999]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(repos.products().find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repos = provider().await;
        let err = repos
            .products()
            .update(77, product("Ghost", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = repos.categories().delete(77).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn category_update_keeps_created_at() {
        let repos = provider().await;
        let saved = repos.categories().save(category("Mosaic")).await.unwrap();
        let updated = repos
            .categories()
            .update(
                saved.id,
                NewCategory {
                    name: "Mosaic Tiles".into(),
                    description: Some("Accent walls".into()),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Mosaic Tiles");
        assert_eq!(updated.created_at, saved.created_at);
        assert!(repos
            .categories()
            .find_by_name("Mosaic Tiles")
            .await
            .unwrap()
            .is_some());
    }
}
