//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::domain::entities::{
    AdvertisementRecord, ContractRecord, CustomerRecord, LeadRecord, ProductRecord,
};
use crate::domain::metrics::AdAggregates;
use crate::domain::types::AdChannel;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Listing scope for entities carrying an `is_active` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListScope {
    #[default]
    ActiveOnly,
    All,
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct UpdateProductParams {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct CreateAdvertisementParams {
    pub name: String,
    pub channel: AdChannel,
    pub cost: f64,
    pub product_id: i64,
}

#[derive(Debug, Clone)]
pub struct UpdateAdvertisementParams {
    pub id: i64,
    pub name: String,
    pub channel: AdChannel,
    pub cost: f64,
    pub product_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct CreateLeadParams {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub advertisement_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UpdateLeadParams {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub advertisement_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateContractParams {
    pub name: String,
    pub product_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub cost: f64,
}

#[derive(Debug, Clone)]
pub struct UpdateContractParams {
    pub id: i64,
    pub name: String,
    pub product_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateCustomerParams {
    pub lead_id: i64,
    pub contract_id: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateCustomerParams {
    pub id: i64,
    pub lead_id: i64,
    pub contract_id: i64,
}

/// One advertisement with its raw aggregate inputs, as read in a single
/// statistics query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdAggregateRow {
    pub ad_id: i64,
    pub name: String,
    pub cost: f64,
    pub leads: i64,
    pub customers: i64,
    pub income: f64,
}

impl AdAggregateRow {
    pub fn aggregates(&self) -> AdAggregates {
        AdAggregates {
            leads: self.leads.max(0) as u64,
            customers: self.customers.max(0) as u64,
            income: self.income,
        }
    }
}

/// Entity counts shown on the dashboard index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub products: u64,
    pub advertisements: u64,
    pub leads: u64,
    pub contracts: u64,
    pub customers: u64,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_products(&self, scope: ListScope) -> Result<Vec<ProductRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;

    async fn create_product(&self, params: CreateProductParams)
    -> Result<ProductRecord, RepoError>;

    async fn update_product(&self, params: UpdateProductParams)
    -> Result<ProductRecord, RepoError>;

    /// Returns [`RepoError::Integrity`] when advertisements or contracts
    /// still reference the product.
    async fn delete_product(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AdvertisementsRepo: Send + Sync {
    async fn list_ads(&self, scope: ListScope) -> Result<Vec<AdvertisementRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AdvertisementRecord>, RepoError>;

    async fn create_ad(
        &self,
        params: CreateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError>;

    async fn update_ad(
        &self,
        params: UpdateAdvertisementParams,
    ) -> Result<AdvertisementRecord, RepoError>;

    /// Leads referencing the advertisement are detached, not deleted.
    async fn delete_ad(&self, id: i64) -> Result<(), RepoError>;

    /// One row per active advertisement with its aggregate inputs.
    async fn list_aggregates(&self) -> Result<Vec<AdAggregateRow>, RepoError>;

    /// Aggregate inputs for a single advertisement.
    async fn aggregates_for(&self, id: i64) -> Result<AdAggregates, RepoError>;
}

#[async_trait]
pub trait LeadsRepo: Send + Sync {
    async fn list_leads(&self) -> Result<Vec<LeadRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<LeadRecord>, RepoError>;

    async fn create_lead(&self, params: CreateLeadParams) -> Result<LeadRecord, RepoError>;

    async fn update_lead(&self, params: UpdateLeadParams) -> Result<LeadRecord, RepoError>;

    /// Returns [`RepoError::Integrity`] when a customer still references
    /// the lead.
    async fn delete_lead(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ContractsRepo: Send + Sync {
    async fn list_contracts(&self) -> Result<Vec<ContractRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ContractRecord>, RepoError>;

    async fn create_contract(
        &self,
        params: CreateContractParams,
    ) -> Result<ContractRecord, RepoError>;

    async fn update_contract(
        &self,
        params: UpdateContractParams,
    ) -> Result<ContractRecord, RepoError>;

    /// Returns [`RepoError::Integrity`] when a customer still references
    /// the contract.
    async fn delete_contract(&self, id: i64) -> Result<(), RepoError>;

    /// Campaigns whose income includes this contract, resolved through the
    /// contract's customers and their source leads.
    async fn campaigns_for_contract(&self, id: i64) -> Result<Vec<i64>, RepoError>;
}

#[async_trait]
pub trait CustomersRepo: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<CustomerRecord>, RepoError>;

    async fn create_customer(
        &self,
        params: CreateCustomerParams,
    ) -> Result<CustomerRecord, RepoError>;

    async fn update_customer(
        &self,
        params: UpdateCustomerParams,
    ) -> Result<CustomerRecord, RepoError>;

    async fn delete_customer(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn dashboard_counts(&self) -> Result<DashboardCounts, RepoError>;
}
