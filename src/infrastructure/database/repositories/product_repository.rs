//! SeaORM implementation of ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use super::db_err;
use crate::domain::category::CategoryCount;
use crate::domain::product::{NewProduct, Product, ProductRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::product;

fn entity_to_domain(p: product::Model) -> Product {
    Product {
        id: p.id,
        name: p.name,
        description: p.description,
        price: p.price,
        category_id: p.category_id,
        image: p.image,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

#[derive(Debug, FromQueryResult)]
struct CategoryCountRow {
    category_id: i32,
    product_count: i64,
}

pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>> {
        let model = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn count_by_category(&self) -> DomainResult<Vec<CategoryCount>> {
        let rows = product::Entity::find()
            .select_only()
            .column(product::Column::CategoryId)
            .column_as(Expr::col(product::Column::Id).count(), "product_count")
            .group_by(product::Column::CategoryId)
            .order_by_asc(product::Column::CategoryId)
            .into_model::<CategoryCountRow>()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter(|r| r.product_count > 0)
            .map(|r| CategoryCount {
                category_id: r.category_id,
                product_count: r.product_count as u64,
            })
            .collect())
    }

    async fn ids_by_category(&self, category_id: i32) -> DomainResult<Vec<i32>> {
        product::Entity::find()
            .select_only()
            .column(product::Column::Id)
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_asc(product::Column::Id)
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_page(
        &self,
        category_id: Option<i32>,
        offset: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Product>, u64)> {
        let mut query = product::Entity::find();
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(product::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok((models.into_iter().map(entity_to_domain).collect(), total))
    }

    async fn find_recent(&self, limit: u64) -> DomainResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        product::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn count_in_category(&self, category_id: i32) -> DomainResult<u64> {
        product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn save(&self, p: NewProduct) -> DomainResult<Product> {
        let now = Utc::now();
        let model = product::ActiveModel {
            name: Set(p.name),
            description: Set(p.description),
            price: Set(p.price),
            category_id: Set(p.category_id),
            image: Set(p.image),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!(
            product_id = result.id,
            category_id = result.category_id,
            "Product saved"
        );
        Ok(entity_to_domain(result))
    }

    async fn update(&self, id: i32, p: NewProduct) -> DomainResult<Product> {
        let existing = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Product", id))?;

        let mut model: product::ActiveModel = existing.into();
        model.name = Set(p.name);
        model.description = Set(p.description);
        model.price = Set(p.price);
        model.category_id = Set(p.category_id);
        model.image = Set(p.image);
        model.updated_at = Set(Utc::now());
        let result = model.update(&self.db).await.map_err(db_err)?;
        Ok(entity_to_domain(result))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = product::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }
}
