use std::sync::Arc;

use crate::application::{
    AdvertisementService, ContractService, CustomerService, DashboardService, LeadService,
    ProductService,
};
use crate::cache::{CacheBackend, CacheConfig, ViewCacheInvalidator};
use crate::domain::permissions::PermissionGate;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub products: ProductService,
    pub ads: AdvertisementService,
    pub leads: LeadService,
    pub contracts: ContractService,
    pub customers: CustomerService,
    pub gate: Arc<dyn PermissionGate>,
    pub cache_backend: Arc<dyn CacheBackend>,
    pub cache_config: CacheConfig,
    pub view_invalidator: ViewCacheInvalidator,
}
