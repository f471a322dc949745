use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::application::repos::{CreateProductParams, ListScope, UpdateProductParams};
use crate::domain::permissions::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;
use crate::infra::http::views;

const TOUCHED_BY_CREATE: &[&str] = &[views::PRODUCTS_LIST];
const TOUCHED_BY_WRITE: &[&str] = &[views::PRODUCTS_LIST, views::PRODUCTS_DETAIL];

#[derive(Debug, Deserialize)]
pub struct CreateProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub cost: f64,
    pub is_active: bool,
}

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state.products.list(ListScope::ActiveOnly).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.get(id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products
        .create(CreateProductParams {
            name: payload.name,
            description: payload.description,
            cost: payload.cost,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_CREATE));
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products
        .update(UpdateProductParams {
            id,
            name: payload.name,
            description: payload.description,
            cost: payload.cost,
            is_active: payload.is_active,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.products.delete(id).await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(StatusCode::NO_CONTENT)
}
