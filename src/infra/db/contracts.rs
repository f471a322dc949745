use async_trait::async_trait;

use crate::application::repos::{
    ContractsRepo, CreateContractParams, RepoError, UpdateContractParams,
};
use crate::domain::entities::ContractRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, name, product_id, start_date, end_date, cost, created_at, updated_at";

#[async_trait]
impl ContractsRepo for PostgresRepositories {
    async fn list_contracts(&self) -> Result<Vec<ContractRecord>, RepoError> {
        sqlx::query_as::<_, ContractRecord>(&format!(
            "SELECT {COLUMNS} FROM contracts ORDER BY start_date DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContractRecord>, RepoError> {
        sqlx::query_as::<_, ContractRecord>(&format!(
            "SELECT {COLUMNS} FROM contracts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_contract(
        &self,
        params: CreateContractParams,
    ) -> Result<ContractRecord, RepoError> {
        sqlx::query_as::<_, ContractRecord>(&format!(
            "INSERT INTO contracts (name, product_id, start_date, end_date, cost) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.product_id)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(params.cost)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_contract(
        &self,
        params: UpdateContractParams,
    ) -> Result<ContractRecord, RepoError> {
        sqlx::query_as::<_, ContractRecord>(&format!(
            "UPDATE contracts \
             SET name = $2, product_id = $3, start_date = $4, end_date = $5, cost = $6, \
                 updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.product_id)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(params.cost)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_contract(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn campaigns_for_contract(&self, id: i64) -> Result<Vec<i64>, RepoError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT DISTINCT leads.advertisement_id \
             FROM customers \
             JOIN leads ON leads.id = customers.lead_id \
             WHERE customers.contract_id = $1 AND leads.advertisement_id IS NOT NULL",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(|(ad_id,)| ad_id).collect())
    }
}
