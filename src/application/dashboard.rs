//! Entity counts for the index page.

use std::sync::Arc;

use crate::application::error::ServiceError;
use crate::application::repos::{DashboardCounts, StatsRepo};

#[derive(Clone)]
pub struct DashboardService {
    repo: Arc<dyn StatsRepo>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn StatsRepo>) -> Self {
        Self { repo }
    }

    pub async fn counts(&self) -> Result<DashboardCounts, ServiceError> {
        Ok(self.repo.dashboard_counts().await?)
    }
}
