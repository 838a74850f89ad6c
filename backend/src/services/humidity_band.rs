//! Humidity band administration
//!
//! Bands are the reference table the discount engine reads. Active bands of
//! a crop are kept non-overlapping here so lookups never depend on order:
//! writes lock the crop row before checking for overlaps, and the
//! `humidity_bands_no_overlap` exclusion constraint backs this up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{find_overlapping_band, validate_humidity_band, HumidityBand};

/// Humidity band service
#[derive(Clone)]
pub struct HumidityBandService {
    db: PgPool,
}

/// Stored humidity band with audit timestamps
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HumidityBandRecord {
    pub id: Uuid,
    pub crop_id: Uuid,
    pub min_moisture_percent: Decimal,
    pub max_moisture_percent: Decimal,
    pub discount_percent: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HumidityBandRecord> for HumidityBand {
    fn from(record: HumidityBandRecord) -> Self {
        HumidityBand {
            id: record.id,
            crop_id: record.crop_id,
            min_moisture_percent: record.min_moisture_percent,
            max_moisture_percent: record.max_moisture_percent,
            discount_percent: record.discount_percent,
            active: record.active,
        }
    }
}

/// Input for creating a band
#[derive(Debug, Deserialize)]
pub struct CreateHumidityBandInput {
    pub crop_id: Uuid,
    pub min_moisture_percent: Decimal,
    pub max_moisture_percent: Decimal,
    pub discount_percent: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Input for updating a band
#[derive(Debug, Deserialize)]
pub struct UpdateHumidityBandInput {
    pub min_moisture_percent: Option<Decimal>,
    pub max_moisture_percent: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub active: Option<bool>,
}

const BAND_COLUMNS: &str = "id, crop_id, min_moisture_percent, max_moisture_percent, \
     discount_percent, active, created_at, updated_at";

impl HumidityBandService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List bands, optionally restricted to one crop
    pub async fn list_bands(&self, crop_id: Option<Uuid>) -> AppResult<Vec<HumidityBandRecord>> {
        let query = format!(
            r#"
            SELECT {BAND_COLUMNS}
            FROM humidity_bands
            WHERE ($1::uuid IS NULL OR crop_id = $1)
            ORDER BY crop_id, min_moisture_percent ASC
            "#
        );

        let bands = sqlx::query_as::<_, HumidityBandRecord>(&query)
            .bind(crop_id)
            .fetch_all(&self.db)
            .await?;

        Ok(bands)
    }

    /// Snapshot of the active bands of a crop, ready for the engine
    pub async fn active_bands_for_crop(
        &self,
        crop_id: Option<Uuid>,
    ) -> AppResult<Vec<HumidityBand>> {
        match crop_id {
            Some(crop_id) => fetch_active_bands(&self.db, crop_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Get a band by ID
    pub async fn get_band(&self, band_id: Uuid) -> AppResult<HumidityBandRecord> {
        let query = format!("SELECT {BAND_COLUMNS} FROM humidity_bands WHERE id = $1");

        sqlx::query_as::<_, HumidityBandRecord>(&query)
            .bind(band_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Humidity band".to_string()))
    }

    /// Create a band
    pub async fn create_band(
        &self,
        input: CreateHumidityBandInput,
    ) -> AppResult<HumidityBandRecord> {
        validate_band_values(
            input.min_moisture_percent,
            input.max_moisture_percent,
            input.discount_percent,
        )?;

        let mut tx = self.db.begin().await?;
        lock_crop(&mut *tx, input.crop_id).await?;

        if input.active {
            let bands = fetch_active_bands(&mut *tx, input.crop_id).await?;
            check_overlap(
                &bands,
                input.crop_id,
                input.min_moisture_percent,
                input.max_moisture_percent,
                None,
            )?;
        }

        let query = format!(
            r#"
            INSERT INTO humidity_bands
                (crop_id, min_moisture_percent, max_moisture_percent, discount_percent, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BAND_COLUMNS}
            "#
        );

        let band = sqlx::query_as::<_, HumidityBandRecord>(&query)
            .bind(input.crop_id)
            .bind(input.min_moisture_percent)
            .bind(input.max_moisture_percent)
            .bind(input.discount_percent)
            .bind(input.active)
            .fetch_one(&mut *tx)
            .await
            .map_err(band_write_error)?;
        tx.commit().await?;

        tracing::info!(
            "Created humidity band {} for crop {}: {}-{}% -> {}%",
            band.id,
            band.crop_id,
            band.min_moisture_percent,
            band.max_moisture_percent,
            band.discount_percent
        );
        Ok(band)
    }

    /// Update a band
    pub async fn update_band(
        &self,
        band_id: Uuid,
        input: UpdateHumidityBandInput,
    ) -> AppResult<HumidityBandRecord> {
        let existing = self.get_band(band_id).await?;

        let min = input.min_moisture_percent.unwrap_or(existing.min_moisture_percent);
        let max = input.max_moisture_percent.unwrap_or(existing.max_moisture_percent);
        let discount = input.discount_percent.unwrap_or(existing.discount_percent);
        let active = input.active.unwrap_or(existing.active);

        validate_band_values(min, max, discount)?;

        let mut tx = self.db.begin().await?;
        lock_crop(&mut *tx, existing.crop_id).await?;

        if active {
            let bands = fetch_active_bands(&mut *tx, existing.crop_id).await?;
            check_overlap(&bands, existing.crop_id, min, max, Some(band_id))?;
        }

        let query = format!(
            r#"
            UPDATE humidity_bands
            SET min_moisture_percent = $1, max_moisture_percent = $2,
                discount_percent = $3, active = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {BAND_COLUMNS}
            "#
        );

        let band = sqlx::query_as::<_, HumidityBandRecord>(&query)
            .bind(min)
            .bind(max)
            .bind(discount)
            .bind(active)
            .bind(band_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(band_write_error)?;
        tx.commit().await?;

        tracing::info!("Updated humidity band {}", band_id);
        Ok(band)
    }

    /// Delete a band
    pub async fn delete_band(&self, band_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM humidity_bands WHERE id = $1")
            .bind(band_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Humidity band".to_string()));
        }

        tracing::info!("Deleted humidity band {}", band_id);
        Ok(())
    }
}

/// Lock the crop row so band writes for one crop run one at a time
async fn lock_crop<'e, E: PgExecutor<'e>>(executor: E, crop_id: Uuid) -> AppResult<()> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM crops WHERE id = $1 FOR UPDATE")
        .bind(crop_id)
        .fetch_optional(executor)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Crop".to_string()))
}

async fn fetch_active_bands<'e, E: PgExecutor<'e>>(
    executor: E,
    crop_id: Uuid,
) -> AppResult<Vec<HumidityBand>> {
    let query = format!(
        r#"
        SELECT {BAND_COLUMNS}
        FROM humidity_bands
        WHERE crop_id = $1 AND active = true
        ORDER BY min_moisture_percent ASC, created_at ASC
        "#
    );

    let bands = sqlx::query_as::<_, HumidityBandRecord>(&query)
        .bind(crop_id)
        .fetch_all(executor)
        .await?;

    Ok(bands.into_iter().map(HumidityBand::from).collect())
}

/// Postgres SQLSTATE for exclusion constraint violations
const EXCLUSION_VIOLATION: &str = "23P01";

fn is_exclusion_violation(code: Option<&str>) -> bool {
    code == Some(EXCLUSION_VIOLATION)
}

/// Report a write rejected by the overlap constraint as a conflict
fn band_write_error(err: sqlx::Error) -> AppError {
    let code = err.as_database_error().and_then(|e| e.code());
    if is_exclusion_violation(code.as_deref()) {
        return AppError::Conflict {
            resource: "humidity_band".to_string(),
            message: "Moisture range overlaps another active band of this crop".to_string(),
            message_pt: "A faixa de umidade se sobrepõe a outra faixa ativa desta cultura"
                .to_string(),
        };
    }
    AppError::DatabaseError(err)
}

fn validate_band_values(min: Decimal, max: Decimal, discount: Decimal) -> AppResult<()> {
    validate_humidity_band(min, max, discount)
        .map_err(|msg| AppError::invalid_field("humidity_band", msg))
}

fn check_overlap(
    bands: &[HumidityBand],
    crop_id: Uuid,
    min: Decimal,
    max: Decimal,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    match find_overlapping_band(bands, crop_id, min, max, exclude_id) {
        Some(other) => Err(AppError::Conflict {
            resource: "humidity_band".to_string(),
            message: format!(
                "Moisture range {}-{}% overlaps band {}-{}%",
                min, max, other.min_moisture_percent, other.max_moisture_percent
            ),
            message_pt: format!(
                "A faixa de umidade {}-{}% se sobrepõe à faixa {}-{}%",
                min, max, other.min_moisture_percent, other.max_moisture_percent
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_check_overlap_conflict() {
        let crop_id = Uuid::new_v4();
        let bands = vec![HumidityBand {
            id: Uuid::new_v4(),
            crop_id,
            min_moisture_percent: dec("14"),
            max_moisture_percent: dec("15"),
            discount_percent: dec("1.5"),
            active: true,
        }];

        let err = check_overlap(&bands, crop_id, dec("14.5"), dec("16"), None).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(check_overlap(&bands, crop_id, dec("15.1"), dec("16"), None).is_ok());
        assert!(check_overlap(&bands, crop_id, dec("14.5"), dec("16"), Some(bands[0].id)).is_ok());
    }

    #[test]
    fn test_validate_band_values() {
        assert!(validate_band_values(dec("14"), dec("15"), dec("1")).is_ok());
        assert!(matches!(
            validate_band_values(dec("15"), dec("14"), dec("1")),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_create_input_defaults_to_active() {
        let input: CreateHumidityBandInput = serde_json::from_str(&format!(
            r#"{{"crop_id":"{}","min_moisture_percent":"14","max_moisture_percent":"15","discount_percent":"1.5"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(input.active);
    }

    #[test]
    fn test_exclusion_violation_code() {
        assert!(is_exclusion_violation(Some("23P01")));
        assert!(!is_exclusion_violation(Some("23505")));
        assert!(!is_exclusion_violation(None));
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        let err = band_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
