use async_trait::async_trait;

use crate::application::repos::{
    CreateProductParams, ListScope, ProductsRepo, RepoError, UpdateProductParams,
};
use crate::domain::entities::ProductRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, name, description, cost, is_active, created_at, updated_at";

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_products(&self, scope: ListScope) -> Result<Vec<ProductRecord>, RepoError> {
        let sql = match scope {
            ListScope::ActiveOnly => {
                format!("SELECT {COLUMNS} FROM products WHERE is_active ORDER BY name")
            }
            ListScope::All => format!("SELECT {COLUMNS} FROM products ORDER BY name"),
        };
        sqlx::query_as::<_, ProductRecord>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_product(
        &self,
        params: CreateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        sqlx::query_as::<_, ProductRecord>(&format!(
            "INSERT INTO products (name, description, cost) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.description)
        .bind(params.cost)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        sqlx::query_as::<_, ProductRecord>(&format!(
            "UPDATE products \
             SET name = $2, description = $3, cost = $4, is_active = $5, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.cost)
        .bind(params.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
