//! Harvest load HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::harvest::{
    HarvestLoadFilter, HarvestLoadRecord, RecordHarvestLoadInput, UpdateHarvestLoadInput,
};
use crate::AppState;
use shared::{HarvestLoad, HarvestLoadDraft, PaginatedResponse, Pagination, PaginationMeta};

/// Query parameters for load listings
#[derive(Debug, Deserialize)]
pub struct ListLoadsQuery {
    pub season: Option<String>,
    pub crop_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListLoadsQuery {
    fn filter(&self) -> HarvestLoadFilter {
        HarvestLoadFilter {
            season: self.season.clone(),
            crop_id: self.crop_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Recompute a draft load without saving it
pub async fn preview_harvest_load(
    State(state): State<AppState>,
    Json(draft): Json<HarvestLoadDraft>,
) -> AppResult<Json<HarvestLoad>> {
    let load = state.harvest_load_service().preview_load(&draft).await?;
    Ok(Json(load))
}

/// List loads with filters and pagination
pub async fn list_harvest_loads(
    State(state): State<AppState>,
    Query(query): Query<ListLoadsQuery>,
) -> AppResult<Json<PaginatedResponse<HarvestLoadRecord>>> {
    let harvest = &state.config.harvest;
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(harvest.default_page_size),
    }
    .clamped(harvest.max_page_size);

    let (data, total) = state
        .harvest_load_service()
        .list_loads(&query.filter(), &pagination)
        .await?;

    Ok(Json(PaginatedResponse {
        data,
        pagination: PaginationMeta::new(&pagination, total),
    }))
}

/// Get a specific load
pub async fn get_harvest_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
) -> AppResult<Json<HarvestLoadRecord>> {
    let record = state.harvest_load_service().get_load(load_id).await?;
    Ok(Json(record))
}

/// Record a confirmed load
pub async fn record_harvest_load(
    State(state): State<AppState>,
    Json(input): Json<RecordHarvestLoadInput>,
) -> AppResult<impl IntoResponse> {
    let record = state.harvest_load_service().record_load(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update a load and recompute it
pub async fn update_harvest_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
    Json(input): Json<UpdateHarvestLoadInput>,
) -> AppResult<Json<HarvestLoadRecord>> {
    let record = state
        .harvest_load_service()
        .update_load(load_id, input)
        .await?;
    Ok(Json(record))
}

/// Delete a load
pub async fn delete_harvest_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.harvest_load_service().delete_load(load_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
