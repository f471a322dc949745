use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::application::repos::{CreateLeadParams, UpdateLeadParams};
use crate::domain::permissions::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;
use crate::infra::http::views;

// Leads feed the campaign statistics, so their cached view goes stale too.
const TOUCHED_BY_CREATE: &[&str] = &[views::LEADS_LIST, views::ADS_STATISTICS];
const TOUCHED_BY_WRITE: &[&str] = &[
    views::LEADS_LIST,
    views::LEADS_DETAIL,
    views::ADS_STATISTICS,
];

#[derive(Debug, Deserialize)]
pub struct LeadPayload {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub advertisement_id: Option<i64>,
}

pub async fn list_leads(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let leads = state.leads.list().await?;
    Ok(Json(leads))
}

pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = state.leads.get(id).await?;
    Ok(Json(lead))
}

pub async fn create_lead(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = state
        .leads
        .create(CreateLeadParams {
            first_name: payload.first_name,
            last_name: payload.last_name,
            middle_name: payload.middle_name,
            phone: payload.phone,
            email: payload.email,
            advertisement_id: payload.advertisement_id,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_CREATE));
    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn update_lead(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = state
        .leads
        .update(UpdateLeadParams {
            id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            middle_name: payload.middle_name,
            phone: payload.phone,
            email: payload.email,
            advertisement_id: payload.advertisement_id,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(Json(lead))
}

pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.leads.delete(id).await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(StatusCode::NO_CONTENT)
}
