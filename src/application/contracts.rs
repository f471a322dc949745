//! Contract operations.
//!
//! Contract costs are the income side of campaign profit, so contract
//! writes also drop the cached advertisement statistics.

use std::sync::Arc;

use crate::application::caches::{CrmCaches, QS_ALL};
use crate::application::error::ServiceError;
use crate::application::repos::{ContractsRepo, CreateContractParams, UpdateContractParams};
use crate::domain::entities::ContractRecord;
use crate::domain::types::EntityKind;

const KIND: EntityKind = EntityKind::Contract;

#[derive(Clone)]
pub struct ContractService {
    repo: Arc<dyn ContractsRepo>,
    caches: CrmCaches,
}

impl ContractService {
    pub fn new(repo: Arc<dyn ContractsRepo>, caches: CrmCaches) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self) -> Result<Vec<ContractRecord>, ServiceError> {
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let contracts = self
            .caches
            .querysets
            .get_cached_queryset(KIND, QS_ALL, ttl, || async move {
                repo.list_contracts().await
            })
            .await?;
        Ok(contracts)
    }

    pub async fn get(&self, id: i64) -> Result<ContractRecord, ServiceError> {
        let ttl = self.caches.objects.default_ttl();
        let repo = self.repo.clone();
        self.caches
            .objects
            .get_or_set_cached(KIND, id, ttl, || async move { repo.find_by_id(id).await })
            .await?
            .ok_or_else(|| ServiceError::not_found("contract"))
    }

    pub async fn create(&self, params: CreateContractParams) -> Result<ContractRecord, ServiceError> {
        validate_contract(&params.name, params.cost, params.start_date, params.end_date)?;

        let contract = self.repo.create_contract(params).await?;
        self.caches.objects.set_cache(
            KIND,
            contract.id,
            &contract,
            self.caches.objects.default_ttl(),
        );
        self.invalidate_querysets();
        Ok(contract)
    }

    pub async fn update(&self, params: UpdateContractParams) -> Result<ContractRecord, ServiceError> {
        validate_contract(&params.name, params.cost, params.start_date, params.end_date)?;

        let contract = self.repo.update_contract(params).await?;
        self.caches.objects.invalidate_cache(KIND, contract.id);
        self.caches.objects.set_cache(
            KIND,
            contract.id,
            &contract,
            self.caches.objects.default_ttl(),
        );
        self.invalidate_querysets();

        // A cost change moves the profit of every campaign this contract's
        // customers came through. Delete needs no such fan-out: a contract
        // with customers refuses deletion.
        for ad_id in self.repo.campaigns_for_contract(contract.id).await? {
            self.caches.invalidate_ad_metrics(ad_id);
        }
        Ok(contract)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_contract(id).await?;
        self.caches.objects.invalidate_cache(KIND, id);
        self.invalidate_querysets();
        Ok(())
    }

    fn invalidate_querysets(&self) {
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ALL);
        self.caches.invalidate_ad_statistics();
    }
}

fn validate_contract(
    name: &str,
    cost: f64,
    start_date: time::Date,
    end_date: time::Date,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("contract name must not be empty"));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(ServiceError::validation(
            "contract cost must be a non-negative number",
        ));
    }
    if end_date < start_date {
        return Err(ServiceError::validation(
            "contract end date must not precede its start date",
        ));
    }
    Ok(())
}
