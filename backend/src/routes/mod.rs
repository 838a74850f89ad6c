//! Route definitions for the Harvest Control platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/crops", crop_routes())
        .nest("/humidity-bands", humidity_band_routes())
        .nest("/harvest-loads", harvest_load_routes())
        .nest("/reports", report_routes())
}

/// Crop routes
fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_crops).post(handlers::create_crop))
        .route(
            "/:crop_id",
            get(handlers::get_crop).put(handlers::update_crop),
        )
        .route(
            "/:crop_id/humidity-bands",
            get(handlers::list_crop_humidity_bands),
        )
}

/// Humidity band routes
fn humidity_band_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_humidity_bands).post(handlers::create_humidity_band),
        )
        .route(
            "/:band_id",
            get(handlers::get_humidity_band)
                .put(handlers::update_humidity_band)
                .delete(handlers::delete_humidity_band),
        )
}

/// Harvest load routes
fn harvest_load_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_harvest_loads).post(handlers::record_harvest_load),
        )
        .route("/preview", post(handlers::preview_harvest_load))
        .route(
            "/:load_id",
            get(handlers::get_harvest_load)
                .put(handlers::update_harvest_load)
                .delete(handlers::delete_harvest_load),
        )
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/fleet-summary", get(handlers::get_fleet_summary))
        .route("/harvest-loads.csv", get(handlers::export_harvest_loads_csv))
}
