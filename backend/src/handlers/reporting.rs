//! Reporting handlers for fleet summaries and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::services::harvest::HarvestLoadFilter;
use crate::services::reporting::{FleetSummaryReport, ReportingService};
use crate::AppState;

/// Get the fleet summary for a season, crop and/or date range
pub async fn get_fleet_summary(
    State(state): State<AppState>,
    Query(filter): Query<HarvestLoadFilter>,
) -> AppResult<Json<FleetSummaryReport>> {
    let service = ReportingService::new(state.harvest_load_service());
    let report = service.get_fleet_summary(&filter).await?;
    Ok(Json(report))
}

/// Export loads as CSV
pub async fn export_harvest_loads_csv(
    State(state): State<AppState>,
    Query(filter): Query<HarvestLoadFilter>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.harvest_load_service());
    let csv = service.export_loads_csv(&filter).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"harvest_loads.csv\"",
            ),
        ],
        csv,
    ))
}
