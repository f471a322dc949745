use async_trait::async_trait;

use crate::application::repos::{
    CreateCustomerParams, CustomersRepo, RepoError, UpdateCustomerParams,
};
use crate::domain::entities::CustomerRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, lead_id, contract_id, created_at, updated_at";

#[async_trait]
impl CustomersRepo for PostgresRepositories {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, RepoError> {
        sqlx::query_as::<_, CustomerRecord>(&format!(
            "SELECT {COLUMNS} FROM customers ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CustomerRecord>, RepoError> {
        sqlx::query_as::<_, CustomerRecord>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<CustomerRecord, RepoError> {
        sqlx::query_as::<_, CustomerRecord>(&format!(
            "INSERT INTO customers (lead_id, contract_id) \
             VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(params.lead_id)
        .bind(params.contract_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_customer(
        &self,
        params: UpdateCustomerParams,
    ) -> Result<CustomerRecord, RepoError> {
        sqlx::query_as::<_, CustomerRecord>(&format!(
            "UPDATE customers SET lead_id = $2, contract_id = $3, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.lead_id)
        .bind(params.contract_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_customer(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
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
