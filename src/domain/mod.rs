pub mod entities;
pub mod error;
pub mod metrics;
pub mod permissions;
pub mod types;
