//! Reporting service for harvest-control sessions
//! Provides fleet summaries and CSV export of weighed loads

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use super::harvest::{HarvestLoadFilter, HarvestLoadRecord, HarvestLoadService};
use shared::{summarize_fleet, FleetSummary, HarvestLoad};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    loads: HarvestLoadService,
}

/// Fleet summary together with the filter it was computed for
#[derive(Debug, Serialize)]
pub struct FleetSummaryReport {
    pub season: Option<String>,
    pub crop_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub summary: FleetSummary,
}

/// One CSV line per load
#[derive(Debug, Serialize)]
pub struct HarvestLoadCsvRow {
    pub id: Uuid,
    pub harvest_date: NaiveDate,
    pub season: String,
    pub field_name: String,
    pub silo_name: String,
    pub ticket_number: String,
    pub truck_plate: String,
    pub harvest_kind: String,
    pub gross_weight_kg: Decimal,
    pub tare_weight_kg: Decimal,
    pub total_weight_kg: Decimal,
    pub impurity_percent: Decimal,
    pub impurity_kg: Decimal,
    pub moisture_percent: Decimal,
    pub moisture_discount_percent: Decimal,
    pub moisture_kg: Decimal,
    pub damaged_percent: Decimal,
    pub damaged_kg: Decimal,
    pub other_discount_percent: Decimal,
    pub other_kg: Decimal,
    pub total_discount_kg: Decimal,
    pub net_weight_kg: Decimal,
    pub bag_count: Decimal,
    pub area_harvested_ha: Decimal,
    pub productivity_bags_per_ha: Decimal,
    pub hectoliter_weight: Decimal,
}

impl From<&HarvestLoadRecord> for HarvestLoadCsvRow {
    fn from(record: &HarvestLoadRecord) -> Self {
        let load = &record.load;
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        Self {
            id: record.id,
            harvest_date: record.harvest_date,
            season: text(&record.season),
            field_name: text(&record.field_name),
            silo_name: text(&record.silo_name),
            ticket_number: text(&record.ticket_number),
            truck_plate: text(&record.truck_plate),
            harvest_kind: load.input.harvest_kind.to_string(),
            gross_weight_kg: load.input.gross_weight_kg,
            tare_weight_kg: load.input.tare_weight_kg,
            total_weight_kg: load.total_weight_kg,
            impurity_percent: load.input.impurity_percent,
            impurity_kg: load.impurity_kg.round_dp(2),
            moisture_percent: load.input.moisture_percent,
            moisture_discount_percent: load.moisture_discount_percent,
            moisture_kg: load.moisture_kg.round_dp(2),
            damaged_percent: load.input.damaged_percent,
            damaged_kg: load.damaged_kg.round_dp(2),
            other_discount_percent: load.input.other_discount_percent,
            other_kg: load.other_kg.round_dp(2),
            total_discount_kg: load.total_discount_kg.round_dp(2),
            net_weight_kg: load.net_weight_kg.round_dp(2),
            bag_count: load.bag_count.round_dp(2),
            area_harvested_ha: load.input.area_harvested_ha,
            productivity_bags_per_ha: load.productivity_bags_per_ha.round_dp(2),
            hectoliter_weight: load.input.hectoliter_weight,
        }
    }
}

impl ReportingService {
    pub fn new(loads: HarvestLoadService) -> Self {
        Self { loads }
    }

    /// Summarize every load matching the filter
    pub async fn get_fleet_summary(
        &self,
        filter: &HarvestLoadFilter,
    ) -> AppResult<FleetSummaryReport> {
        let records = self.loads.find_loads(filter).await?;
        let loads: Vec<HarvestLoad> = records.into_iter().map(|r| r.load).collect();

        tracing::debug!("Summarizing {} harvest loads", loads.len());

        Ok(FleetSummaryReport {
            season: filter.season.clone(),
            crop_id: filter.crop_id,
            start_date: filter.start_date,
            end_date: filter.end_date,
            summary: summarize_fleet(&loads),
        })
    }

    /// Export every load matching the filter as CSV
    pub async fn export_loads_csv(&self, filter: &HarvestLoadFilter) -> AppResult<String> {
        let records = self.loads.find_loads(filter).await?;
        let rows: Vec<HarvestLoadCsvRow> = records.iter().map(HarvestLoadCsvRow::from).collect();
        Self::export_to_csv(&rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
