//! Harvest load service: truck weighings, their discount cascade and storage
//!
//! Derived weights are never written directly. Every create and update runs
//! the shared engine against the crop's active humidity bands and stores the
//! result next to the raw scale and lab values.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use super::crop::CropService;
use super::humidity_band::HumidityBandService;
use shared::{
    compute_harvest_load_with, validate_load_input, validate_truck_plate, BagWeights,
    HarvestKind, HarvestLoad, HarvestLoadDraft, HarvestLoadInput, Pagination,
};

/// Harvest load service
#[derive(Clone)]
pub struct HarvestLoadService {
    db: PgPool,
    default_bag_weights: BagWeights,
}

/// Stored load with its bookkeeping fields
#[derive(Debug, Clone, Serialize)]
pub struct HarvestLoadRecord {
    pub id: Uuid,
    pub harvest_date: NaiveDate,
    pub season: Option<String>,
    pub field_name: Option<String>,
    pub silo_name: Option<String>,
    pub ticket_number: Option<String>,
    pub truck_plate: Option<String>,
    pub notes: Option<String>,
    pub load: HarvestLoad,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a harvest load
#[derive(Debug, Clone, sqlx::FromRow)]
struct HarvestLoadRow {
    id: Uuid,
    crop_id: Option<Uuid>,
    harvest_date: NaiveDate,
    season: Option<String>,
    field_name: Option<String>,
    silo_name: Option<String>,
    ticket_number: Option<String>,
    truck_plate: Option<String>,
    notes: Option<String>,
    harvest_kind: String,
    gross_weight_kg: Decimal,
    tare_weight_kg: Decimal,
    impurity_percent: Decimal,
    moisture_percent: Decimal,
    damaged_percent: Decimal,
    other_discount_percent: Decimal,
    hectoliter_weight: Decimal,
    area_harvested_ha: Decimal,
    total_weight_kg: Decimal,
    impurity_kg: Decimal,
    moisture_discount_percent: Decimal,
    moisture_kg: Decimal,
    damaged_kg: Decimal,
    other_kg: Decimal,
    total_discount_kg: Decimal,
    net_weight_kg: Decimal,
    bag_weight_kg: Decimal,
    bag_count: Decimal,
    productivity_bags_per_ha: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HarvestLoadRow> for HarvestLoadRecord {
    fn from(row: HarvestLoadRow) -> Self {
        let input = HarvestLoadInput {
            gross_weight_kg: row.gross_weight_kg,
            tare_weight_kg: row.tare_weight_kg,
            impurity_percent: row.impurity_percent,
            moisture_percent: row.moisture_percent,
            damaged_percent: row.damaged_percent,
            other_discount_percent: row.other_discount_percent,
            hectoliter_weight: row.hectoliter_weight,
            harvest_kind: row.harvest_kind.parse().unwrap_or_default(),
            crop_id: row.crop_id,
            area_harvested_ha: row.area_harvested_ha,
        };

        // Remaining bases are not stored; they follow from the stored discounts
        let base_after_impurity_kg = row.total_weight_kg.saturating_sub(row.impurity_kg);
        let base_after_moisture_kg = base_after_impurity_kg.saturating_sub(row.moisture_kg);
        let base_after_damaged_kg = base_after_moisture_kg.saturating_sub(row.damaged_kg);

        HarvestLoadRecord {
            id: row.id,
            harvest_date: row.harvest_date,
            season: row.season,
            field_name: row.field_name,
            silo_name: row.silo_name,
            ticket_number: row.ticket_number,
            truck_plate: row.truck_plate,
            notes: row.notes,
            load: HarvestLoad {
                input,
                total_weight_kg: row.total_weight_kg,
                impurity_kg: row.impurity_kg,
                base_after_impurity_kg,
                moisture_discount_percent: row.moisture_discount_percent,
                moisture_kg: row.moisture_kg,
                base_after_moisture_kg,
                damaged_kg: row.damaged_kg,
                base_after_damaged_kg,
                other_kg: row.other_kg,
                total_discount_kg: row.total_discount_kg,
                net_weight_kg: row.net_weight_kg,
                bag_weight_kg: row.bag_weight_kg,
                bag_count: row.bag_count,
                productivity_bags_per_ha: row.productivity_bags_per_ha,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for recording a load
#[derive(Debug, Deserialize, Validate)]
pub struct RecordHarvestLoadInput {
    pub harvest_date: NaiveDate,
    #[validate(length(max = 20))]
    pub season: Option<String>,
    #[validate(length(max = 100))]
    pub field_name: Option<String>,
    #[validate(length(max = 100))]
    pub silo_name: Option<String>,
    #[validate(length(max = 30))]
    pub ticket_number: Option<String>,
    pub truck_plate: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Scale and lab values; missing numbers count as zero
    #[serde(default)]
    pub load: HarvestLoadDraft,
}

/// Input for updating a load; only given fields change
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHarvestLoadInput {
    pub harvest_date: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub season: Option<String>,
    #[validate(length(max = 100))]
    pub field_name: Option<String>,
    #[validate(length(max = 100))]
    pub silo_name: Option<String>,
    #[validate(length(max = 30))]
    pub ticket_number: Option<String>,
    pub truck_plate: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Only the given fields change; a missing `crop_id` keeps the current crop
    #[serde(default)]
    pub load: HarvestLoadDraft,
    /// Detach the load from its crop. Takes precedence over `load.crop_id`.
    #[serde(default)]
    pub clear_crop: bool,
}

/// Filter for load listings and reports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarvestLoadFilter {
    pub season: Option<String>,
    pub crop_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HarvestLoadFilter {
    /// Reject inverted date ranges before they reach the database
    pub fn validate(&self) -> AppResult<()> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AppError::ValidationError(format!(
                "start_date {} is after end_date {}",
                start, end
            ))),
            _ => Ok(()),
        }
    }
}

const LOAD_COLUMNS: &str = "id, crop_id, harvest_date, season, field_name, silo_name, \
     ticket_number, truck_plate, notes, harvest_kind, gross_weight_kg, tare_weight_kg, \
     impurity_percent, moisture_percent, damaged_percent, other_discount_percent, \
     hectoliter_weight, area_harvested_ha, total_weight_kg, impurity_kg, \
     moisture_discount_percent, moisture_kg, damaged_kg, other_kg, total_discount_kg, \
     net_weight_kg, bag_weight_kg, bag_count, productivity_bags_per_ha, created_at, updated_at";

const FILTER_CLAUSE: &str = "($1::text IS NULL OR season = $1) \
     AND ($2::uuid IS NULL OR crop_id = $2) \
     AND ($3::date IS NULL OR harvest_date >= $3) \
     AND ($4::date IS NULL OR harvest_date <= $4)";

impl HarvestLoadService {
    pub fn new(db: PgPool, default_bag_weights: BagWeights) -> Self {
        Self {
            db,
            default_bag_weights,
        }
    }

    /// Compute a draft without saving it.
    ///
    /// Nothing is validated: partially typed values are expected while an
    /// operator is still filling the form, and an unknown crop simply has
    /// no bands and the default bag weights.
    pub async fn preview_load(&self, draft: &HarvestLoadDraft) -> AppResult<HarvestLoad> {
        let input = draft.normalize();
        let bag_weights = CropService::new(self.db.clone())
            .bag_weights_or_default(input.crop_id, &self.default_bag_weights)
            .await?;
        let bands = HumidityBandService::new(self.db.clone())
            .active_bands_for_crop(input.crop_id)
            .await?;

        Ok(compute_harvest_load_with(&input, &bands, &bag_weights))
    }

    /// List loads matching a filter, one page at a time
    pub async fn list_loads(
        &self,
        filter: &HarvestLoadFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<HarvestLoadRecord>, u64)> {
        filter.validate()?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM harvest_loads WHERE {FILTER_CLAUSE}"
        ))
        .bind(&filter.season)
        .bind(filter.crop_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let query = format!(
            r#"
            SELECT {LOAD_COLUMNS}
            FROM harvest_loads
            WHERE {FILTER_CLAUSE}
            ORDER BY harvest_date DESC, created_at DESC
            LIMIT $5 OFFSET $6
            "#
        );

        let rows = sqlx::query_as::<_, HarvestLoadRow>(&query)
            .bind(&filter.season)
            .bind(filter.crop_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(i64::from(pagination.per_page))
            .bind(pagination.offset() as i64)
            .fetch_all(&self.db)
            .await?;

        Ok((
            rows.into_iter().map(HarvestLoadRecord::from).collect(),
            total.max(0) as u64,
        ))
    }

    /// All loads matching a filter, oldest first
    pub async fn find_loads(
        &self,
        filter: &HarvestLoadFilter,
    ) -> AppResult<Vec<HarvestLoadRecord>> {
        filter.validate()?;

        let query = format!(
            r#"
            SELECT {LOAD_COLUMNS}
            FROM harvest_loads
            WHERE {FILTER_CLAUSE}
            ORDER BY harvest_date ASC, created_at ASC
            "#
        );

        let rows = sqlx::query_as::<_, HarvestLoadRow>(&query)
            .bind(&filter.season)
            .bind(filter.crop_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(HarvestLoadRecord::from).collect())
    }

    /// Get a load by ID
    pub async fn get_load(&self, load_id: Uuid) -> AppResult<HarvestLoadRecord> {
        fetch_load(&self.db, load_id, false).await
    }

    /// Compute and persist a confirmed load
    pub async fn record_load(&self, input: RecordHarvestLoadInput) -> AppResult<HarvestLoadRecord> {
        input.validate()?;
        validate_plate(input.truck_plate.as_deref())?;

        let values = input.load.normalize();
        let load = self.compute_validated(&values).await?;

        let query = format!(
            r#"
            INSERT INTO harvest_loads (
                crop_id, harvest_date, season, field_name, silo_name, ticket_number,
                truck_plate, notes, harvest_kind, gross_weight_kg, tare_weight_kg,
                impurity_percent, moisture_percent, damaged_percent, other_discount_percent,
                hectoliter_weight, area_harvested_ha, total_weight_kg, impurity_kg,
                moisture_discount_percent, moisture_kg, damaged_kg, other_kg,
                total_discount_kg, net_weight_kg, bag_weight_kg, bag_count,
                productivity_bags_per_ha
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
            RETURNING {LOAD_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, HarvestLoadRow>(&query)
            .bind(load.input.crop_id)
            .bind(input.harvest_date)
            .bind(&input.season)
            .bind(&input.field_name)
            .bind(&input.silo_name)
            .bind(&input.ticket_number)
            .bind(input.truck_plate.as_deref().map(normalize_plate))
            .bind(&input.notes)
            .bind(load.input.harvest_kind.as_str())
            .bind(load.input.gross_weight_kg)
            .bind(load.input.tare_weight_kg)
            .bind(load.input.impurity_percent)
            .bind(load.input.moisture_percent)
            .bind(load.input.damaged_percent)
            .bind(load.input.other_discount_percent)
            .bind(load.input.hectoliter_weight)
            .bind(load.input.area_harvested_ha)
            .bind(load.total_weight_kg)
            .bind(load.impurity_kg)
            .bind(load.moisture_discount_percent)
            .bind(load.moisture_kg)
            .bind(load.damaged_kg)
            .bind(load.other_kg)
            .bind(load.total_discount_kg)
            .bind(load.net_weight_kg)
            .bind(load.bag_weight_kg)
            .bind(load.bag_count)
            .bind(load.productivity_bags_per_ha)
            .fetch_one(&self.db)
            .await?;

        tracing::info!(
            "Recorded harvest load {}: net {} kg, {} bags",
            row.id,
            row.net_weight_kg.round_dp(2),
            row.bag_count.round_dp(2)
        );
        Ok(HarvestLoadRecord::from(row))
    }

    /// Apply changes to a load and recompute its derived fields
    pub async fn update_load(
        &self,
        load_id: Uuid,
        input: UpdateHarvestLoadInput,
    ) -> AppResult<HarvestLoadRecord> {
        input.validate()?;
        validate_plate(input.truck_plate.as_deref())?;

        let mut tx = self.db.begin().await?;

        let existing = fetch_load(&mut *tx, load_id, true).await?;
        let values = merge_draft(&existing.load.input, &input.load, input.clear_crop);
        let load = self.compute_validated(&values).await?;

        let harvest_date = input.harvest_date.unwrap_or(existing.harvest_date);
        let season = input.season.or(existing.season);
        let field_name = input.field_name.or(existing.field_name);
        let silo_name = input.silo_name.or(existing.silo_name);
        let ticket_number = input.ticket_number.or(existing.ticket_number);
        let truck_plate = input
            .truck_plate
            .as_deref()
            .map(normalize_plate)
            .or(existing.truck_plate);
        let notes = input.notes.or(existing.notes);

        let query = format!(
            r#"
            UPDATE harvest_loads
            SET crop_id = $1, harvest_date = $2, season = $3, field_name = $4,
                silo_name = $5, ticket_number = $6, truck_plate = $7, notes = $8,
                harvest_kind = $9, gross_weight_kg = $10, tare_weight_kg = $11,
                impurity_percent = $12, moisture_percent = $13, damaged_percent = $14,
                other_discount_percent = $15, hectoliter_weight = $16,
                area_harvested_ha = $17, total_weight_kg = $18, impurity_kg = $19,
                moisture_discount_percent = $20, moisture_kg = $21, damaged_kg = $22,
                other_kg = $23, total_discount_kg = $24, net_weight_kg = $25,
                bag_weight_kg = $26, bag_count = $27, productivity_bags_per_ha = $28,
                updated_at = NOW()
            WHERE id = $29
            RETURNING {LOAD_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, HarvestLoadRow>(&query)
            .bind(load.input.crop_id)
            .bind(harvest_date)
            .bind(&season)
            .bind(&field_name)
            .bind(&silo_name)
            .bind(&ticket_number)
            .bind(&truck_plate)
            .bind(&notes)
            .bind(load.input.harvest_kind.as_str())
            .bind(load.input.gross_weight_kg)
            .bind(load.input.tare_weight_kg)
            .bind(load.input.impurity_percent)
            .bind(load.input.moisture_percent)
            .bind(load.input.damaged_percent)
            .bind(load.input.other_discount_percent)
            .bind(load.input.hectoliter_weight)
            .bind(load.input.area_harvested_ha)
            .bind(load.total_weight_kg)
            .bind(load.impurity_kg)
            .bind(load.moisture_discount_percent)
            .bind(load.moisture_kg)
            .bind(load.damaged_kg)
            .bind(load.other_kg)
            .bind(load.total_discount_kg)
            .bind(load.net_weight_kg)
            .bind(load.bag_weight_kg)
            .bind(load.bag_count)
            .bind(load.productivity_bags_per_ha)
            .bind(load_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!("Recomputed harvest load {}", load_id);
        Ok(HarvestLoadRecord::from(row))
    }

    /// Delete a load
    pub async fn delete_load(&self, load_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM harvest_loads WHERE id = $1")
            .bind(load_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Harvest load".to_string()));
        }

        tracing::info!("Deleted harvest load {}", load_id);
        Ok(())
    }

    /// Validate values for persistence, then run the engine with the crop's
    /// bag weights and active bands
    async fn compute_validated(&self, values: &HarvestLoadInput) -> AppResult<HarvestLoad> {
        validate_load_input(values).map_err(|(field, msg)| AppError::invalid_field(field, msg))?;

        let bag_weights = CropService::new(self.db.clone())
            .bag_weights(values.crop_id, &self.default_bag_weights)
            .await?;
        let bands = HumidityBandService::new(self.db.clone())
            .active_bands_for_crop(values.crop_id)
            .await?;

        Ok(compute_harvest_load_with(values, &bands, &bag_weights))
    }
}

/// Fetch one load, optionally locking its row until the transaction ends
async fn fetch_load<'e, E: PgExecutor<'e>>(
    executor: E,
    load_id: Uuid,
    for_update: bool,
) -> AppResult<HarvestLoadRecord> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let query = format!("SELECT {LOAD_COLUMNS} FROM harvest_loads WHERE id = $1{lock}");

    let row = sqlx::query_as::<_, HarvestLoadRow>(&query)
        .bind(load_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Harvest load".to_string()))?;

    Ok(HarvestLoadRecord::from(row))
}

/// Overlay the given draft fields on top of stored values
fn merge_draft(
    existing: &HarvestLoadInput,
    patch: &HarvestLoadDraft,
    clear_crop: bool,
) -> HarvestLoadInput {
    let crop_id = if clear_crop {
        None
    } else {
        patch.crop_id.or(existing.crop_id)
    };

    HarvestLoadInput {
        gross_weight_kg: patch.gross_weight_kg.unwrap_or(existing.gross_weight_kg),
        tare_weight_kg: patch.tare_weight_kg.unwrap_or(existing.tare_weight_kg),
        impurity_percent: patch.impurity_percent.unwrap_or(existing.impurity_percent),
        moisture_percent: patch.moisture_percent.unwrap_or(existing.moisture_percent),
        damaged_percent: patch.damaged_percent.unwrap_or(existing.damaged_percent),
        other_discount_percent: patch
            .other_discount_percent
            .unwrap_or(existing.other_discount_percent),
        hectoliter_weight: patch.hectoliter_weight.unwrap_or(existing.hectoliter_weight),
        harvest_kind: patch.harvest_kind.unwrap_or(existing.harvest_kind),
        crop_id,
        area_harvested_ha: patch.area_harvested_ha.unwrap_or(existing.area_harvested_ha),
    }
}

fn validate_plate(plate: Option<&str>) -> AppResult<()> {
    match plate {
        Some(plate) => {
            validate_truck_plate(plate).map_err(|msg| AppError::invalid_field("truck_plate", msg))
        }
        None => Ok(()),
    }
}

fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
