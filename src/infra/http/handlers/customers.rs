use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::application::repos::{CreateCustomerParams, UpdateCustomerParams};
use crate::domain::permissions::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;
use crate::infra::http::views;

// Conversions move both the conversion rate and the income.
const TOUCHED_BY_CREATE: &[&str] = &[views::CUSTOMERS_LIST, views::ADS_STATISTICS];
const TOUCHED_BY_WRITE: &[&str] = &[
    views::CUSTOMERS_LIST,
    views::CUSTOMERS_DETAIL,
    views::ADS_STATISTICS,
];

#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub lead_id: i64,
    pub contract_id: i64,
}

pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let customers = state.customers.list().await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state.customers.get(id).await?;
    Ok(Json(customer))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .customers
        .create(CreateCustomerParams {
            lead_id: payload.lead_id,
            contract_id: payload.contract_id,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_CREATE));
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .customers
        .update(UpdateCustomerParams {
            id,
            lead_id: payload.lead_id,
            contract_id: payload.contract_id,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.customers.delete(id).await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(StatusCode::NO_CONTENT)
}
