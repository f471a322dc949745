//! JSON CRUD handlers.
//!
//! Write handlers finish by fanning out view-cache invalidation for the
//! views that render the touched entity, scoped to the acting identity.

mod advertisements;
mod contracts;
mod customers;
mod dashboard;
mod leads;
mod products;

pub use advertisements::{
    ad_statistics, create_ad, delete_ad, get_ad, list_ads, update_ad,
};
pub use contracts::{create_contract, delete_contract, get_contract, list_contracts, update_contract};
pub use customers::{create_customer, delete_customer, get_customer, list_customers, update_customer};
pub use dashboard::index;
pub use leads::{create_lead, delete_lead, get_lead, list_leads, update_lead};
pub use products::{create_product, delete_product, get_product, list_products, update_product};
