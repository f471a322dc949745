use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::application::repos::{CreateAdvertisementParams, ListScope, UpdateAdvertisementParams};
use crate::domain::entities::AdvertisementRecord;
use crate::domain::metrics::AdMetrics;
use crate::domain::permissions::Identity;
use crate::domain::types::AdChannel;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;
use crate::infra::http::views;

const TOUCHED_BY_CREATE: &[&str] = &[views::ADS_LIST, views::ADS_STATISTICS];
const TOUCHED_BY_WRITE: &[&str] = &[views::ADS_LIST, views::ADS_DETAIL, views::ADS_STATISTICS];

#[derive(Debug, Deserialize)]
pub struct CreateAdPayload {
    pub name: String,
    pub channel: AdChannel,
    pub cost: f64,
    pub product_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdPayload {
    pub name: String,
    pub channel: AdChannel,
    pub cost: f64,
    pub product_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
struct AdDetailResponse {
    #[serde(flatten)]
    ad: AdvertisementRecord,
    metrics: AdMetrics,
}

pub async fn list_ads(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let ads = state.ads.list(ListScope::ActiveOnly).await?;
    Ok(Json(ads))
}

pub async fn get_ad(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state.ads.get(id).await?;
    let metrics = state.ads.metrics_for(id).await?;
    Ok(Json(AdDetailResponse { ad, metrics }))
}

pub async fn ad_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.ads.statistics().await?;
    Ok(Json(stats))
}

pub async fn create_ad(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateAdPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state
        .ads
        .create(CreateAdvertisementParams {
            name: payload.name,
            channel: payload.channel,
            cost: payload.cost,
            product_id: payload.product_id,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_CREATE));
    Ok((StatusCode::CREATED, Json(ad)))
}

pub async fn update_ad(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAdPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = state
        .ads
        .update(UpdateAdvertisementParams {
            id,
            name: payload.name,
            channel: payload.channel,
            cost: payload.cost,
            product_id: payload.product_id,
            is_active: payload.is_active,
        })
        .await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(Json(ad))
}

pub async fn delete_ad(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.ads.delete(id).await?;
    state
        .view_invalidator
        .invalidate_view_cache(&identity, Some(TOUCHED_BY_WRITE));
    Ok(StatusCode::NO_CONTENT)
}
