//! Advertisement campaign operations and derived statistics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::caches::{CrmCaches, METHOD_AD_METRICS, QS_ACTIVE, QS_ALL, QS_STATISTICS};
use crate::application::error::ServiceError;
use crate::application::products::list_suffix;
use crate::application::repos::{
    AdvertisementsRepo, CreateAdvertisementParams, ListScope, UpdateAdvertisementParams,
};
use crate::domain::entities::AdvertisementRecord;
use crate::domain::metrics::AdMetrics;
use crate::domain::types::EntityKind;

const KIND: EntityKind = EntityKind::Advertisement;

/// One advertisement with its derived metrics, as served by the statistics
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdStatistics {
    pub id: i64,
    pub name: String,
    pub leads_count: u64,
    pub customers_count: u64,
    pub conversion_rate: f64,
    pub profit: Option<f64>,
}

#[derive(Clone)]
pub struct AdvertisementService {
    repo: Arc<dyn AdvertisementsRepo>,
    caches: CrmCaches,
}

impl AdvertisementService {
    pub fn new(repo: Arc<dyn AdvertisementsRepo>, caches: CrmCaches) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self, scope: ListScope) -> Result<Vec<AdvertisementRecord>, ServiceError> {
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let ads = self
            .caches
            .querysets
            .get_cached_queryset(KIND, list_suffix(scope), ttl, || async move {
                repo.list_ads(scope).await
            })
            .await?;
        Ok(ads)
    }

    pub async fn get(&self, id: i64) -> Result<AdvertisementRecord, ServiceError> {
        let ttl = self.caches.objects.default_ttl();
        let repo = self.repo.clone();
        self.caches
            .objects
            .get_or_set_cached(KIND, id, ttl, || async move { repo.find_by_id(id).await })
            .await?
            .ok_or_else(|| ServiceError::not_found("advertisement"))
    }

    pub async fn create(
        &self,
        params: CreateAdvertisementParams,
    ) -> Result<AdvertisementRecord, ServiceError> {
        validate_ad(&params.name, params.cost)?;

        let ad = self.repo.create_ad(params).await?;
        self.caches
            .objects
            .set_cache(KIND, ad.id, &ad, self.caches.objects.default_ttl());
        self.invalidate_querysets();
        Ok(ad)
    }

    pub async fn update(
        &self,
        params: UpdateAdvertisementParams,
    ) -> Result<AdvertisementRecord, ServiceError> {
        validate_ad(&params.name, params.cost)?;

        let ad = self.repo.update_ad(params).await?;
        self.caches.objects.invalidate_cache(KIND, ad.id);
        self.caches
            .objects
            .set_cache(KIND, ad.id, &ad, self.caches.objects.default_ttl());
        self.caches.invalidate_ad_metrics(ad.id);
        self.invalidate_querysets();
        Ok(ad)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_ad(id).await?;
        self.caches.objects.invalidate_cache(KIND, id);
        self.caches.invalidate_ad_metrics(id);
        self.invalidate_querysets();
        Ok(())
    }

    /// Per-campaign statistics across all active advertisements. The whole
    /// result set is cached under one queryset key; any CRM write that can
    /// move the numbers drops it.
    pub async fn statistics(&self) -> Result<Vec<AdStatistics>, ServiceError> {
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let stats = self
            .caches
            .querysets
            .get_cached_queryset(KIND, QS_STATISTICS, ttl, || async move {
                let rows = repo.list_aggregates().await?;
                Ok::<_, ServiceError>(
                    rows.into_iter()
                        .map(|row| {
                            let metrics = AdMetrics::from_aggregates(row.aggregates(), row.cost);
                            AdStatistics {
                                id: row.ad_id,
                                name: row.name,
                                leads_count: metrics.leads_count,
                                customers_count: metrics.customers_count,
                                conversion_rate: metrics.conversion_rate,
                                profit: metrics.profit,
                            }
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .await?;
        Ok(stats)
    }

    /// Memoized metrics for one advertisement.
    pub async fn metrics_for(&self, id: i64) -> Result<AdMetrics, ServiceError> {
        let ad = self.get(id).await?;
        let ttl = self.caches.methods.default_ttl();
        let repo = self.repo.clone();
        let metrics = self
            .caches
            .methods
            .get_or_compute(KIND, METHOD_AD_METRICS, id, &[], ttl, || async move {
                let aggregates = repo.aggregates_for(id).await?;
                Ok::<_, ServiceError>(AdMetrics::from_aggregates(aggregates, ad.cost))
            })
            .await?;
        Ok(metrics)
    }

    fn invalidate_querysets(&self) {
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ALL);
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ACTIVE);
        self.caches.invalidate_ad_statistics();
    }
}

fn validate_ad(name: &str, cost: f64) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation(
            "advertisement name must not be empty",
        ));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(ServiceError::validation(
            "advertisement cost must be a non-negative number",
        ));
    }
    Ok(())
}
