//! Lead intake operations.
//!
//! Leads feed the advertisement statistics, so every write here also drops
//! the cached statistics and the memoized metrics of the campaigns involved.

use std::sync::Arc;

use crate::application::caches::{CrmCaches, QS_ALL};
use crate::application::error::ServiceError;
use crate::application::repos::{CreateLeadParams, LeadsRepo, UpdateLeadParams};
use crate::domain::entities::LeadRecord;
use crate::domain::types::EntityKind;

const KIND: EntityKind = EntityKind::Lead;

#[derive(Clone)]
pub struct LeadService {
    repo: Arc<dyn LeadsRepo>,
    caches: CrmCaches,
}

impl LeadService {
    pub fn new(repo: Arc<dyn LeadsRepo>, caches: CrmCaches) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self) -> Result<Vec<LeadRecord>, ServiceError> {
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let leads = self
            .caches
            .querysets
            .get_cached_queryset(KIND, QS_ALL, ttl, || async move { repo.list_leads().await })
            .await?;
        Ok(leads)
    }

    pub async fn get(&self, id: i64) -> Result<LeadRecord, ServiceError> {
        let ttl = self.caches.objects.default_ttl();
        let repo = self.repo.clone();
        self.caches
            .objects
            .get_or_set_cached(KIND, id, ttl, || async move { repo.find_by_id(id).await })
            .await?
            .ok_or_else(|| ServiceError::not_found("lead"))
    }

    pub async fn create(&self, params: CreateLeadParams) -> Result<LeadRecord, ServiceError> {
        validate_lead(&params.first_name, &params.last_name, &params.phone, &params.email)?;

        let lead = self.repo.create_lead(params).await?;
        self.caches
            .objects
            .set_cache(KIND, lead.id, &lead, self.caches.objects.default_ttl());
        self.invalidate_after_write(lead.advertisement_id, None);
        Ok(lead)
    }

    pub async fn update(&self, params: UpdateLeadParams) -> Result<LeadRecord, ServiceError> {
        validate_lead(&params.first_name, &params.last_name, &params.phone, &params.email)?;

        // The previous campaign's metrics go stale when the lead is moved.
        let previous = self.repo.find_by_id(params.id).await?;
        let previous_ad = previous.and_then(|lead| lead.advertisement_id);

        let lead = self.repo.update_lead(params).await?;
        self.caches.objects.invalidate_cache(KIND, lead.id);
        self.caches
            .objects
            .set_cache(KIND, lead.id, &lead, self.caches.objects.default_ttl());
        self.invalidate_after_write(lead.advertisement_id, previous_ad);
        Ok(lead)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let previous = self.repo.find_by_id(id).await?;
        let previous_ad = previous.and_then(|lead| lead.advertisement_id);

        self.repo.delete_lead(id).await?;
        self.caches.objects.invalidate_cache(KIND, id);
        self.invalidate_after_write(previous_ad, None);
        Ok(())
    }

    fn invalidate_after_write(&self, ad: Option<i64>, previous_ad: Option<i64>) {
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ALL);
        self.caches.invalidate_ad_statistics();
        for ad_id in [ad, previous_ad].into_iter().flatten() {
            self.caches.invalidate_ad_metrics(ad_id);
        }
    }
}

fn validate_lead(
    first_name: &str,
    last_name: &str,
    phone: &str,
    email: &str,
) -> Result<(), ServiceError> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ServiceError::validation("lead name must not be empty"));
    }
    if phone.trim().is_empty() {
        return Err(ServiceError::validation("lead phone must not be empty"));
    }
    if !email.contains('@') {
        return Err(ServiceError::validation("lead email must be an address"));
    }
    Ok(())
}
