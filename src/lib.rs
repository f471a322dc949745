//! Kontur is a small self-hosted CRM server. It tracks products, advertising
//! campaigns, leads, contracts, and converted customers, serves them over an
//! HTTP API, and keeps hot reads fast with a layered cache (object, queryset,
//! per-method, and whole-response view caching) that is invalidated on writes.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
