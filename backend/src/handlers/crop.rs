//! Crop HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::crop::{CreateCropInput, CropService, UpdateCropInput};
use crate::services::humidity_band::{HumidityBandRecord, HumidityBandService};
use crate::AppState;
use shared::Crop;

#[derive(Debug, Deserialize)]
pub struct CropBandsQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// List all crops
pub async fn list_crops(State(state): State<AppState>) -> AppResult<Json<Vec<Crop>>> {
    let crops = CropService::new(state.db).list_crops().await?;
    Ok(Json(crops))
}

/// Get a specific crop
pub async fn get_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
) -> AppResult<Json<Crop>> {
    let crop = CropService::new(state.db).get_crop(crop_id).await?;
    Ok(Json(crop))
}

/// Create a crop
pub async fn create_crop(
    State(state): State<AppState>,
    Json(input): Json<CreateCropInput>,
) -> AppResult<impl IntoResponse> {
    let crop = CropService::new(state.db).create_crop(input).await?;
    Ok((StatusCode::CREATED, Json(crop)))
}

/// Update a crop
pub async fn update_crop(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
    Json(input): Json<UpdateCropInput>,
) -> AppResult<Json<Crop>> {
    let crop = CropService::new(state.db).update_crop(crop_id, input).await?;
    Ok(Json(crop))
}

/// List the humidity bands of a crop
pub async fn list_crop_humidity_bands(
    State(state): State<AppState>,
    Path(crop_id): Path<Uuid>,
    Query(query): Query<CropBandsQuery>,
) -> AppResult<Json<Vec<HumidityBandRecord>>> {
    CropService::new(state.db.clone()).get_crop(crop_id).await?;

    let mut bands = HumidityBandService::new(state.db)
        .list_bands(Some(crop_id))
        .await?;
    if query.active_only {
        bands.retain(|band| band.active);
    }
    Ok(Json(bands))
}
