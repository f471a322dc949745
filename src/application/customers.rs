//! Customer conversion operations.
//!
//! A customer is a converted lead tied to a contract. Conversions move both
//! the conversion rate and the income of the originating campaign, so writes
//! here invalidate that campaign's cached numbers as well.

use std::sync::Arc;

use crate::application::caches::{CrmCaches, QS_ALL};
use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateCustomerParams, CustomersRepo, LeadsRepo, UpdateCustomerParams,
};
use crate::domain::entities::CustomerRecord;
use crate::domain::types::EntityKind;

const KIND: EntityKind = EntityKind::Customer;

#[derive(Clone)]
pub struct CustomerService {
    repo: Arc<dyn CustomersRepo>,
    leads: Arc<dyn LeadsRepo>,
    caches: CrmCaches,
}

impl CustomerService {
    pub fn new(
        repo: Arc<dyn CustomersRepo>,
        leads: Arc<dyn LeadsRepo>,
        caches: CrmCaches,
    ) -> Self {
        Self { repo, leads, caches }
    }

    pub async fn list(&self) -> Result<Vec<CustomerRecord>, ServiceError> {
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let customers = self
            .caches
            .querysets
            .get_cached_queryset(KIND, QS_ALL, ttl, || async move {
                repo.list_customers().await
            })
            .await?;
        Ok(customers)
    }

    pub async fn get(&self, id: i64) -> Result<CustomerRecord, ServiceError> {
        let ttl = self.caches.objects.default_ttl();
        let repo = self.repo.clone();
        self.caches
            .objects
            .get_or_set_cached(KIND, id, ttl, || async move { repo.find_by_id(id).await })
            .await?
            .ok_or_else(|| ServiceError::not_found("customer"))
    }

    pub async fn create(&self, params: CreateCustomerParams) -> Result<CustomerRecord, ServiceError> {
        let source_ad = self.campaign_of(params.lead_id).await?;

        let customer = self.repo.create_customer(params).await?;
        self.caches.objects.set_cache(
            KIND,
            customer.id,
            &customer,
            self.caches.objects.default_ttl(),
        );
        self.invalidate_querysets(source_ad);
        Ok(customer)
    }

    pub async fn update(&self, params: UpdateCustomerParams) -> Result<CustomerRecord, ServiceError> {
        let new_ad = self.campaign_of(params.lead_id).await?;
        let previous_ad = match self.repo.find_by_id(params.id).await? {
            Some(existing) if existing.lead_id != params.lead_id => {
                self.campaign_of(existing.lead_id).await.unwrap_or(None)
            }
            _ => None,
        };

        let customer = self.repo.update_customer(params).await?;
        self.caches.objects.invalidate_cache(KIND, customer.id);
        self.caches.objects.set_cache(
            KIND,
            customer.id,
            &customer,
            self.caches.objects.default_ttl(),
        );
        self.invalidate_querysets(new_ad);
        if let Some(ad_id) = previous_ad {
            self.caches.invalidate_ad_metrics(ad_id);
        }
        Ok(customer)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let source_ad = match self.repo.find_by_id(id).await? {
            Some(existing) => self.campaign_of(existing.lead_id).await.unwrap_or(None),
            None => None,
        };

        self.repo.delete_customer(id).await?;
        self.caches.objects.invalidate_cache(KIND, id);
        self.invalidate_querysets(source_ad);
        Ok(())
    }

    /// Advertisement the lead came through, if the lead exists and was
    /// attributed to one.
    async fn campaign_of(&self, lead_id: i64) -> Result<Option<i64>, ServiceError> {
        let lead = self
            .leads
            .find_by_id(lead_id)
            .await?
            .ok_or_else(|| ServiceError::validation("customer lead does not exist"))?;
        Ok(lead.advertisement_id)
    }

    fn invalidate_querysets(&self, source_ad: Option<i64>) {
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ALL);
        self.caches.invalidate_ad_statistics();
        if let Some(ad_id) = source_ad {
            self.caches.invalidate_ad_metrics(ad_id);
        }
    }
}
