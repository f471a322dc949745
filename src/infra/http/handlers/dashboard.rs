use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};

use crate::domain::permissions::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AppState;

/// Entity counts for the landing page. Requires any authenticated role.
pub async fn index(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    if identity.role.is_none() {
        return Err(ApiError::unauthorized());
    }
    let counts = state.dashboard.counts().await?;
    Ok(Json(counts))
}
