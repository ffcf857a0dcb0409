//! SeaORM implementation of CategoryRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use super::db_err;
use crate::domain::category::{Category, CategoryRepository, NewCategory};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::category;

fn entity_to_domain(c: category::Model) -> Category {
    Category {
        id: c.id,
        name: c.name,
        description: c.description,
        image: c.image,
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

pub struct SeaOrmCategoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Category>> {
        let model = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Category>> {
        let model = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        category::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn save(&self, c: NewCategory) -> DomainResult<Category> {
        let now = Utc::now();
        let model = category::ActiveModel {
            name: Set(c.name),
            description: Set(c.description),
            image: Set(c.image),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!(category_id = result.id, name = %result.name, "Category saved");
        Ok(entity_to_domain(result))
    }

    async fn update(&self, id: i32, c: NewCategory) -> DomainResult<Category> {
        let existing = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Category", id))?;

        let mut model: category::ActiveModel = existing.into();
        model.name = Set(c.name);
        model.description = Set(c.description);
        model.image = Set(c.image);
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.db).await.map_err(db_err)?;
        Ok(entity_to_domain(result))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = category::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Category", id));
        }
        Ok(())
    }
}
