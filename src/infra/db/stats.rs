use async_trait::async_trait;

use crate::application::repos::{DashboardCounts, RepoError, StatsRepo};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CountsRow {
    products: i64,
    advertisements: i64,
    leads: i64,
    contracts: i64,
    customers: i64,
}

impl From<CountsRow> for DashboardCounts {
    fn from(row: CountsRow) -> Self {
        Self {
            products: row.products.max(0) as u64,
            advertisements: row.advertisements.max(0) as u64,
            leads: row.leads.max(0) as u64,
            contracts: row.contracts.max(0) as u64,
            customers: row.customers.max(0) as u64,
        }
    }
}

#[async_trait]
impl StatsRepo for PostgresRepositories {
    async fn dashboard_counts(&self) -> Result<DashboardCounts, RepoError> {
        let row = sqlx::query_as::<_, CountsRow>(
            "SELECT \
                (SELECT COUNT(*) FROM products) AS products, \
                (SELECT COUNT(*) FROM advertisements) AS advertisements, \
                (SELECT COUNT(*) FROM leads) AS leads, \
                (SELECT COUNT(*) FROM contracts) AS contracts, \
                (SELECT COUNT(*) FROM customers) AS customers",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }
}
