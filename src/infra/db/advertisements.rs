use async_trait::async_trait;

use crate::application::repos::{
    AdAggregateRow, AdvertisementsRepo, CreateAdvertisementParams, ListScope, RepoError,
    UpdateAdvertisementParams,
};
use crate::domain::entities::AdvertisementRecord;
use crate::domain::metrics::AdAggregates;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, name, channel, cost, product_id, is_active, created_at, updated_at";

// One row per advertisement; each joined lead row carries at most one
// customer and one contract, so the income sum counts every contract once.
const AGGREGATE_QUERY: &str = "\
    SELECT a.id AS ad_id, a.name, a.cost, \
           COUNT(DISTINCT l.id) AS leads, \
           COUNT(DISTINCT cu.id) AS customers, \
           COALESCE(SUM(co.cost), 0)::double precision AS income \
    FROM advertisements a \
    LEFT JOIN leads l ON l.advertisement_id = a.id \
    LEFT JOIN customers cu ON cu.lead_id = l.id \
    LEFT JOIN contracts co ON co.id = cu.contract_id";

#[async_trait]
impl AdvertisementsRepo for PostgresRepositories {
    async fn list_ads(&self, scope: ListScope) -> Result<Vec<AdvertisementRecord>, RepoError> {
        let sql = match scope {
            ListScope::ActiveOnly => {
                format!("SELECT {COLUMNS} FROM advertisements WHERE is_active ORDER BY name")
            }
            ListScope::All => format!("SELECT {COLUMNS} FROM advertisements ORDER BY name"),
        };
        sqlx::query_as::<_, AdvertisementRecord>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdvertisementRecord>, RepoError> {
        sqlx::query_as::<_, AdvertisementRecord>(&format!(
            "SELECT {COLUMNS} FROM advertisements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_ad(
        &self,
        params: CreateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError> {
        sqlx::query_as::<_, AdvertisementRecord>(&format!(
            "INSERT INTO advertisements (name, channel, cost, product_id) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.channel)
        .bind(params.cost)
        .bind(params.product_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_ad(
        &self,
        params: UpdateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError> {
        sqlx::query_as::<_, AdvertisementRecord>(&format!(
            "UPDATE advertisements \
             SET name = $2, channel = $3, cost = $4, product_id = $5, is_active = $6, \
                 updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.channel)
        .bind(params.cost)
        .bind(params.product_id)
        .bind(params.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_ad(&self, id: i64) -> Result<(), RepoError> {
        // leads.advertisement_id is ON DELETE SET NULL, so leads survive.
        let result = sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_aggregates(&self) -> Result<Vec<AdAggregateRow>, RepoError> {
        let sql = format!(
            "{AGGREGATE_QUERY} WHERE a.is_active GROUP BY a.id, a.name, a.cost ORDER BY a.name"
        );
        sqlx::query_as::<_, AdAggregateRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn aggregates_for(&self, id: i64) -> Result<AdAggregates, RepoError> {
        let sql = format!("{AGGREGATE_QUERY} WHERE a.id = $1 GROUP BY a.id, a.name, a.cost");
        let row = sqlx::query_as::<_, AdAggregateRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(|row| row.aggregates()).unwrap_or_default())
    }
}
