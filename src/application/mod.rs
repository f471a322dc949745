//! Application services: CRUD orchestration, cache maintenance and derived
//! statistics on top of the repository traits.

pub mod advertisements;
pub mod caches;
pub mod contracts;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod leads;
pub mod products;
pub mod repos;

pub use advertisements::{AdStatistics, AdvertisementService};
pub use caches::CrmCaches;
pub use contracts::ContractService;
pub use customers::CustomerService;
pub use dashboard::DashboardService;
pub use error::ServiceError;
pub use leads::LeadService;
pub use products::ProductService;
