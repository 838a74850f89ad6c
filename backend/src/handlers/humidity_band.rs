//! Humidity band HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::humidity_band::{
    CreateHumidityBandInput, HumidityBandRecord, HumidityBandService, UpdateHumidityBandInput,
};
use crate::AppState;

/// List every humidity band
pub async fn list_humidity_bands(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<HumidityBandRecord>>> {
    let bands = HumidityBandService::new(state.db).list_bands(None).await?;
    Ok(Json(bands))
}

/// Get a specific band
pub async fn get_humidity_band(
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
) -> AppResult<Json<HumidityBandRecord>> {
    let band = HumidityBandService::new(state.db).get_band(band_id).await?;
    Ok(Json(band))
}

/// Create a band
pub async fn create_humidity_band(
    State(state): State<AppState>,
    Json(input): Json<CreateHumidityBandInput>,
) -> AppResult<impl IntoResponse> {
    let band = HumidityBandService::new(state.db).create_band(input).await?;
    Ok((StatusCode::CREATED, Json(band)))
}

/// Update a band
pub async fn update_humidity_band(
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
    Json(input): Json<UpdateHumidityBandInput>,
) -> AppResult<Json<HumidityBandRecord>> {
    let band = HumidityBandService::new(state.db)
        .update_band(band_id, input)
        .await?;
    Ok(Json(band))
}

/// Delete a band
pub async fn delete_humidity_band(
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    HumidityBandService::new(state.db).delete_band(band_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
