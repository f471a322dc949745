//! Shared in-memory fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use time::{OffsetDateTime, macros::date};

use kontur::application::repos::{
    AdAggregateRow, AdvertisementsRepo, ContractsRepo, CreateAdvertisementParams,
    CreateContractParams, CreateCustomerParams, CreateLeadParams, CreateProductParams,
    CustomersRepo, DashboardCounts, LeadsRepo, ListScope, ProductsRepo, RepoError, StatsRepo,
    UpdateAdvertisementParams, UpdateContractParams, UpdateCustomerParams, UpdateLeadParams,
    UpdateProductParams,
};
use kontur::application::{
    AdvertisementService, ContractService, CrmCaches, CustomerService, DashboardService,
    LeadService, ProductService,
};
use kontur::cache::{CacheConfig, MemoryBackend, ViewCacheInvalidator};
use kontur::domain::entities::{
    AdvertisementRecord, ContractRecord, CustomerRecord, LeadRecord, ProductRecord,
};
use kontur::domain::metrics::AdAggregates;
use kontur::domain::permissions::StaticGate;
use kontur::domain::types::AdChannel;
use kontur::infra::http::{AppState, build_router};

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// In-memory stand-in for the Postgres repositories, with call counters so
/// tests can observe whether a read reached persistence or a cache.
#[derive(Default)]
pub struct FakeRepos {
    products: Mutex<Vec<ProductRecord>>,
    ads: Mutex<Vec<AdvertisementRecord>>,
    leads: Mutex<Vec<LeadRecord>>,
    contracts: Mutex<Vec<ContractRecord>>,
    customers: Mutex<Vec<CustomerRecord>>,
    next_id: AtomicI64,
    pub product_list_calls: AtomicUsize,
    pub aggregate_calls: AtomicUsize,
}

pub struct SeedIds {
    pub product: i64,
    pub ad: i64,
    pub leads: Vec<i64>,
    pub contracts: Vec<i64>,
    pub customers: Vec<i64>,
}

impl FakeRepos {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// One campaign with four leads and two conversions worth 300 total
    /// against a 100 budget: conversion rate 0.5, profit 3.0.
    pub fn seed_campaign(&self) -> SeedIds {
        let product = self.next_id();
        self.products.lock().unwrap().push(ProductRecord {
            id: product,
            name: "Fiber 100".to_string(),
            description: Some("Entry plan".to_string()),
            cost: 49.0,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        });

        let ad = self.next_id();
        self.ads.lock().unwrap().push(AdvertisementRecord {
            id: ad,
            name: "Spring push".to_string(),
            channel: AdChannel::Social,
            cost: 100.0,
            product_id: product,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        });

        let mut lead_ids = Vec::new();
        for n in 0..4 {
            let id = self.next_id();
            self.leads.lock().unwrap().push(LeadRecord {
                id,
                first_name: format!("Lead{n}"),
                last_name: "Person".to_string(),
                middle_name: None,
                phone: "+100000000".to_string(),
                email: format!("lead{n}@example.com"),
                advertisement_id: Some(ad),
                created_at: now(),
                updated_at: now(),
            });
            lead_ids.push(id);
        }

        let mut contract_ids = Vec::new();
        for cost in [120.0, 180.0] {
            let id = self.next_id();
            self.contracts.lock().unwrap().push(ContractRecord {
                id,
                name: format!("Contract {id}"),
                product_id: product,
                start_date: date!(2026 - 01 - 01),
                end_date: date!(2026 - 12 - 31),
                cost,
                created_at: now(),
                updated_at: now(),
            });
            contract_ids.push(id);
        }

        let mut customer_ids = Vec::new();
        for (lead_id, contract_id) in lead_ids.iter().take(2).zip(contract_ids.iter()) {
            let id = self.next_id();
            self.customers.lock().unwrap().push(CustomerRecord {
                id,
                lead_id: *lead_id,
                contract_id: *contract_id,
                created_at: now(),
                updated_at: now(),
            });
            customer_ids.push(id);
        }

        SeedIds {
            product,
            ad,
            leads: lead_ids,
            contracts: contract_ids,
            customers: customer_ids,
        }
    }

    fn aggregates_snapshot(&self, ad_id: i64) -> AdAggregates {
        let leads = self.leads.lock().unwrap();
        let customers = self.customers.lock().unwrap();
        let contracts = self.contracts.lock().unwrap();

        let lead_ids: Vec<i64> = leads
            .iter()
            .filter(|lead| lead.advertisement_id == Some(ad_id))
            .map(|lead| lead.id)
            .collect();
        let converted: Vec<&CustomerRecord> = customers
            .iter()
            .filter(|customer| lead_ids.contains(&customer.lead_id))
            .collect();
        let income = converted
            .iter()
            .filter_map(|customer| {
                contracts
                    .iter()
                    .find(|contract| contract.id == customer.contract_id)
            })
            .map(|contract| contract.cost)
            .sum();

        AdAggregates {
            leads: lead_ids.len() as u64,
            customers: converted.len() as u64,
            income,
        }
    }
}

#[async_trait]
impl ProductsRepo for FakeRepos {
    async fn list_products(&self, scope: ListScope) -> Result<Vec<ProductRecord>, RepoError> {
        self.product_list_calls.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|product| scope == ListScope::All || product.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn create_product(
        &self,
        params: CreateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let record = ProductRecord {
            id: self.next_id(),
            name: params.name,
            description: params.description,
            cost: params.cost,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        };
        self.products.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|product| product.id == params.id)
            .ok_or(RepoError::NotFound)?;
        product.name = params.name;
        product.description = params.description;
        product.cost = params.cost;
        product.is_active = params.is_active;
        product.updated_at = now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        if self
            .ads
            .lock()
            .unwrap()
            .iter()
            .any(|ad| ad.product_id == id)
        {
            return Err(RepoError::Integrity {
                message: "advertisements still reference this product".to_string(),
            });
        }
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|product| product.id != id);
        if products.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AdvertisementsRepo for FakeRepos {
    async fn list_ads(&self, scope: ListScope) -> Result<Vec<AdvertisementRecord>, RepoError> {
        let ads = self.ads.lock().unwrap();
        Ok(ads
            .iter()
            .filter(|ad| scope == ListScope::All || ad.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdvertisementRecord>, RepoError> {
        Ok(self
            .ads
            .lock()
            .unwrap()
            .iter()
            .find(|ad| ad.id == id)
            .cloned())
    }

    async fn create_ad(
        &self,
        params: CreateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError> {
        let record = AdvertisementRecord {
            id: self.next_id(),
            name: params.name,
            channel: params.channel,
            cost: params.cost,
            product_id: params.product_id,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        };
        self.ads.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_ad(
        &self,
        params: UpdateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError> {
        let mut ads = self.ads.lock().unwrap();
        let ad = ads
            .iter_mut()
            .find(|ad| ad.id == params.id)
            .ok_or(RepoError::NotFound)?;
        ad.name = params.name;
        ad.channel = params.channel;
        ad.cost = params.cost;
        ad.product_id = params.product_id;
        ad.is_active = params.is_active;
        ad.updated_at = now();
        Ok(ad.clone())
    }

    async fn delete_ad(&self, id: i64) -> Result<(), RepoError> {
        let mut ads = self.ads.lock().unwrap();
        let before = ads.len();
        ads.retain(|ad| ad.id != id);
        if ads.len() == before {
            return Err(RepoError::NotFound);
        }
        drop(ads);
        for lead in self.leads.lock().unwrap().iter_mut() {
            if lead.advertisement_id == Some(id) {
                lead.advertisement_id = None;
            }
        }
        Ok(())
    }

    async fn list_aggregates(&self) -> Result<Vec<AdAggregateRow>, RepoError> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        let campaigns: Vec<AdvertisementRecord> = self
            .ads
            .lock()
            .unwrap()
            .iter()
            .filter(|ad| ad.is_active)
            .cloned()
            .collect();
        Ok(campaigns
            .into_iter()
            .map(|ad| {
                let aggregates = self.aggregates_snapshot(ad.id);
                AdAggregateRow {
                    ad_id: ad.id,
                    name: ad.name,
                    cost: ad.cost,
                    leads: aggregates.leads as i64,
                    customers: aggregates.customers as i64,
                    income: aggregates.income,
                }
            })
            .collect())
    }

    async fn aggregates_for(&self, id: i64) -> Result<AdAggregates, RepoError> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.aggregates_snapshot(id))
    }
}

#[async_trait]
impl LeadsRepo for FakeRepos {
    async fn list_leads(&self) -> Result<Vec<LeadRecord>, RepoError> {
        Ok(self.leads.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LeadRecord>, RepoError> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .iter()
            .find(|lead| lead.id == id)
            .cloned())
    }

    async fn create_lead(&self, params: CreateLeadParams) -> Result<LeadRecord, RepoError> {
        let record = LeadRecord {
            id: self.next_id(),
            first_name: params.first_name,
            last_name: params.last_name,
            middle_name: params.middle_name,
            phone: params.phone,
            email: params.email,
            advertisement_id: params.advertisement_id,
            created_at: now(),
            updated_at: now(),
        };
        self.leads.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_lead(&self, params: UpdateLeadParams) -> Result<LeadRecord, RepoError> {
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .iter_mut()
            .find(|lead| lead.id == params.id)
            .ok_or(RepoError::NotFound)?;
        lead.first_name = params.first_name;
        lead.last_name = params.last_name;
        lead.middle_name = params.middle_name;
        lead.phone = params.phone;
        lead.email = params.email;
        lead.advertisement_id = params.advertisement_id;
        lead.updated_at = now();
        Ok(lead.clone())
    }

    async fn delete_lead(&self, id: i64) -> Result<(), RepoError> {
        if self
            .customers
            .lock()
            .unwrap()
            .iter()
            .any(|customer| customer.lead_id == id)
        {
            return Err(RepoError::Integrity {
                message: "a customer still references this lead".to_string(),
            });
        }
        let mut leads = self.leads.lock().unwrap();
        let before = leads.len();
        leads.retain(|lead| lead.id != id);
        if leads.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ContractsRepo for FakeRepos {
    async fn list_contracts(&self) -> Result<Vec<ContractRecord>, RepoError> {
        Ok(self.contracts.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContractRecord>, RepoError> {
        Ok(self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .find(|contract| contract.id == id)
            .cloned())
    }

    async fn create_contract(
        &self,
        params: CreateContractParams,
    ) -> Result<ContractRecord, RepoError> {
        let record = ContractRecord {
            id: self.next_id(),
            name: params.name,
            product_id: params.product_id,
            start_date: params.start_date,
            end_date: params.end_date,
            cost: params.cost,
            created_at: now(),
            updated_at: now(),
        };
        self.contracts.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_contract(
        &self,
        params: UpdateContractParams,
    ) -> Result<ContractRecord, RepoError> {
        let mut contracts = self.contracts.lock().unwrap();
        let contract = contracts
            .iter_mut()
            .find(|contract| contract.id == params.id)
            .ok_or(RepoError::NotFound)?;
        contract.name = params.name;
        contract.product_id = params.product_id;
        contract.start_date = params.start_date;
        contract.end_date = params.end_date;
        contract.cost = params.cost;
        contract.updated_at = now();
        Ok(contract.clone())
    }

    async fn delete_contract(&self, id: i64) -> Result<(), RepoError> {
        if self
            .customers
            .lock()
            .unwrap()
            .iter()
            .any(|customer| customer.contract_id == id)
        {
            return Err(RepoError::Integrity {
                message: "a customer still references this contract".to_string(),
            });
        }
        let mut contracts = self.contracts.lock().unwrap();
        let before = contracts.len();
        contracts.retain(|contract| contract.id != id);
        if contracts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn campaigns_for_contract(&self, id: i64) -> Result<Vec<i64>, RepoError> {
        let leads = self.leads.lock().unwrap();
        let mut ads: Vec<i64> = self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|customer| customer.contract_id == id)
            .filter_map(|customer| {
                leads
                    .iter()
                    .find(|lead| lead.id == customer.lead_id)
                    .and_then(|lead| lead.advertisement_id)
            })
            .collect();
        ads.sort_unstable();
        ads.dedup();
        Ok(ads)
    }
}

#[async_trait]
impl CustomersRepo for FakeRepos {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, RepoError> {
        Ok(self.customers.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CustomerRecord>, RepoError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|customer| customer.id == id)
            .cloned())
    }

    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<CustomerRecord, RepoError> {
        let record = CustomerRecord {
            id: self.next_id(),
            lead_id: params.lead_id,
            contract_id: params.contract_id,
            created_at: now(),
            updated_at: now(),
        };
        self.customers.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_customer(
        &self,
        params: UpdateCustomerParams,
    ) -> Result<CustomerRecord, RepoError> {
        let mut customers = self.customers.lock().unwrap();
        let customer = customers
            .iter_mut()
            .find(|customer| customer.id == params.id)
            .ok_or(RepoError::NotFound)?;
        customer.lead_id = params.lead_id;
        customer.contract_id = params.contract_id;
        customer.updated_at = now();
        Ok(customer.clone())
    }

    async fn delete_customer(&self, id: i64) -> Result<(), RepoError> {
        let mut customers = self.customers.lock().unwrap();
        let before = customers.len();
        customers.retain(|customer| customer.id != id);
        if customers.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl StatsRepo for FakeRepos {
    async fn dashboard_counts(&self) -> Result<DashboardCounts, RepoError> {
        Ok(DashboardCounts {
            products: self.products.lock().unwrap().len() as u64,
            advertisements: self.ads.lock().unwrap().len() as u64,
            leads: self.leads.lock().unwrap().len() as u64,
            contracts: self.contracts.lock().unwrap().len() as u64,
            customers: self.customers.lock().unwrap().len() as u64,
        })
    }
}

pub fn build_app(repos: &Arc<FakeRepos>) -> Router {
    build_app_with_backend(repos, Arc::new(MemoryBackend::new()))
}

pub fn build_app_with_backend(repos: &Arc<FakeRepos>, backend: Arc<MemoryBackend>) -> Router {
    let config = CacheConfig::default();
    let caches = CrmCaches::new(backend.clone(), &config);

    build_router(AppState {
        dashboard: DashboardService::new(repos.clone()),
        products: ProductService::new(repos.clone(), caches.clone()),
        ads: AdvertisementService::new(repos.clone(), caches.clone()),
        leads: LeadService::new(repos.clone(), caches.clone()),
        contracts: ContractService::new(repos.clone(), caches.clone()),
        customers: CustomerService::new(repos.clone(), repos.clone(), caches),
        gate: Arc::new(StaticGate),
        cache_backend: backend.clone(),
        cache_config: config,
        view_invalidator: ViewCacheInvalidator::new(backend),
    })
}

pub fn get_anonymous(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, user: i64, role: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("x-user-role", role)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    user: i64,
    role: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("x-user-role", role)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete_as(uri: &str, user: i64, role: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("x-user-id", user.to_string())
        .header("x-user-role", role)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
