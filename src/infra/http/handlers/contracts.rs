use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use time::Date;

use crate::application::repos::{CreateContractParams, UpdateContractParams};
use crate::domain::permissions::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;
use crate::infra::http::views;

// Contract costs are campaign income, hence the statistics view as well.
const TOUCHED_BY_CREATE: &[&str] = &[views::CONTRACTS_LIST, views::ADS_STATISTICS];
const TOUCHED_BY_WRITE: &[&str] = &[
    views::CONTRACTS_LIST,
    views::CONTRACTS_DETAIL,
    views::ADS_STATISTICS,
];

#[derive(Debug, Deserialize)]
pub struct ContractPayload {
    pub name: String,
    pub product_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub cost: f64,
}

pub async fn list_contracts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let contracts = state.contracts.list().await?;
    Ok(Json(contracts))
}

pub async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = state.contracts.get(id).await?;
    Ok(Json(contract))
}

pub async fn create_contract(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = state
        .contracts
        .create(CreateContractParams {
            name: payload.name,
            product_id: payload.product_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            cost: payload.cost,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_CREATE));
    Ok((StatusCode::CREATED, Json(contract)))
}

pub async fn update_contract(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<ContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = state
        .contracts
        .update(UpdateContractParams {
            id,
            name: payload.name,
            product_id: payload.product_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            cost: payload.cost,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(Json(contract))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.contracts.delete(id).await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(StatusCode::NO_CONTENT)
}
