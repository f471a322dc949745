use async_trait::async_trait;

use crate::application::repos::{CreateLeadParams, LeadsRepo, RepoError, UpdateLeadParams};
use crate::domain::entities::LeadRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, first_name, last_name, middle_name, phone, email, \
                       advertisement_id, created_at, updated_at";

#[async_trait]
impl LeadsRepo for PostgresRepositories {
    async fn list_leads(&self) -> Result<Vec<LeadRecord>, RepoError> {
        sqlx::query_as::<_, LeadRecord>(&format!(
            "SELECT {COLUMNS} FROM leads ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LeadRecord>, RepoError> {
        sqlx::query_as::<_, LeadRecord>(&format!("SELECT {COLUMNS} FROM leads WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_lead(&self, params: CreateLeadParams) -> Result<LeadRecord, RepoError> {
        sqlx::query_as::<_, LeadRecord>(&format!(
            "INSERT INTO leads (first_name, last_name, middle_name, phone, email, advertisement_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.middle_name)
        .bind(params.phone)
        .bind(params.email)
        .bind(params.advertisement_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_lead(&self, params: UpdateLeadParams) -> Result<LeadRecord, RepoError> {
        sqlx::query_as::<_, LeadRecord>(&format!(
            "UPDATE leads \
             SET first_name = $2, last_name = $3, middle_name = $4, phone = $5, email = $6, \
                 advertisement_id = $7, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.middle_name)
        .bind(params.phone)
        .bind(params.email)
        .bind(params.advertisement_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_lead(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
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
