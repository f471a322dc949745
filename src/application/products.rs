//! Product catalogue operations.

use std::sync::Arc;

use crate::application::caches::{CrmCaches, QS_ACTIVE, QS_ALL};
use crate::application::error::ServiceError;
use crate::application::repos::{
    CreateProductParams, ListScope, ProductsRepo, UpdateProductParams,
};
use crate::domain::entities::ProductRecord;
use crate::domain::types::EntityKind;

const KIND: EntityKind = EntityKind::Product;

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductsRepo>,
    caches: CrmCaches,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductsRepo>, caches: CrmCaches) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self, scope: ListScope) -> Result<Vec<ProductRecord>, ServiceError> {
        let suffix = list_suffix(scope);
        let ttl = self.caches.querysets.default_ttl();
        let repo = self.repo.clone();
        let products = self
            .caches
            .querysets
            .get_cached_queryset(KIND, suffix, ttl, || async move {
                repo.list_products(scope).await
            })
            .await?;
        Ok(products)
    }

    pub async fn get(&self, id: i64) -> Result<ProductRecord, ServiceError> {
        let ttl = self.caches.objects.default_ttl();
        let repo = self.repo.clone();
        self.caches
            .objects
            .get_or_set_cached(KIND, id, ttl, || async move { repo.find_by_id(id).await })
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    pub async fn create(&self, params: CreateProductParams) -> Result<ProductRecord, ServiceError> {
        validate_product(&params.name, params.cost)?;

        let product = self.repo.create_product(params).await?;
        self.caches
            .objects
            .set_cache(KIND, product.id, &product, self.caches.objects.default_ttl());
        self.invalidate_querysets();
        Ok(product)
    }

    pub async fn update(&self, params: UpdateProductParams) -> Result<ProductRecord, ServiceError> {
        validate_product(&params.name, params.cost)?;

        let product = self.repo.update_product(params).await?;
        // Drop the stale entry first, then repopulate from the saved row.
        self.caches.objects.invalidate_cache(KIND, product.id);
        self.caches
            .objects
            .set_cache(KIND, product.id, &product, self.caches.objects.default_ttl());
        self.invalidate_querysets();
        Ok(product)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_product(id).await?;
        self.caches.objects.invalidate_cache(KIND, id);
        self.invalidate_querysets();
        Ok(())
    }

    fn invalidate_querysets(&self) {
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ALL);
        self.caches.querysets.invalidate_queryset_cache(KIND, QS_ACTIVE);
    }
}

pub(crate) fn list_suffix(scope: ListScope) -> &'static str {
    match scope {
        ListScope::ActiveOnly => QS_ACTIVE,
        ListScope::All => QS_ALL,
    }
}

fn validate_product(name: &str, cost: f64) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("product name must not be empty"));
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(ServiceError::validation(
            "product cost must be a non-negative number",
        ));
    }
    Ok(())
}
