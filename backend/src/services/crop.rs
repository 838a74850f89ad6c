//! Crop management service, including per-crop bag weight overrides

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{validate_bag_weight, BagWeights, Crop};

/// Crop service
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
}

/// Database row for a crop
#[derive(Debug, sqlx::FromRow)]
struct CropRow {
    id: Uuid,
    name: String,
    industrial_bag_kg: Option<Decimal>,
    seed_bag_kg: Option<Decimal>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<CropRow> for Crop {
    fn from(row: CropRow) -> Self {
        Crop {
            id: row.id,
            name: row.name,
            industrial_bag_kg: row.industrial_bag_kg,
            seed_bag_kg: row.seed_bag_kg,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Input for creating a crop
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCropInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub industrial_bag_kg: Option<Decimal>,
    pub seed_bag_kg: Option<Decimal>,
}

/// Input for updating a crop
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCropInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub industrial_bag_kg: Option<Decimal>,
    pub seed_bag_kg: Option<Decimal>,
    pub active: Option<bool>,
}

impl CropService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all crops
    pub async fn list_crops(&self) -> AppResult<Vec<Crop>> {
        let rows = sqlx::query_as::<_, CropRow>(
            r#"
            SELECT id, name, industrial_bag_kg, seed_bag_kg, active, created_at
            FROM crops
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Crop::from).collect())
    }

    /// Get a crop by ID
    pub async fn get_crop(&self, crop_id: Uuid) -> AppResult<Crop> {
        self.find_crop(crop_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Crop".to_string()))
    }

    /// Look up a crop by ID without treating absence as an error
    pub async fn find_crop(&self, crop_id: Uuid) -> AppResult<Option<Crop>> {
        let row = sqlx::query_as::<_, CropRow>(
            r#"
            SELECT id, name, industrial_bag_kg, seed_bag_kg, active, created_at
            FROM crops
            WHERE id = $1
            "#,
        )
        .bind(crop_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Crop::from))
    }

    /// Create a crop
    pub async fn create_crop(&self, input: CreateCropInput) -> AppResult<Crop> {
        input.validate()?;
        validate_overrides(input.industrial_bag_kg, input.seed_bag_kg)?;
        self.ensure_unique_name(&input.name, None).await?;

        let row = sqlx::query_as::<_, CropRow>(
            r#"
            INSERT INTO crops (name, industrial_bag_kg, seed_bag_kg)
            VALUES ($1, $2, $3)
            RETURNING id, name, industrial_bag_kg, seed_bag_kg, active, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.industrial_bag_kg)
        .bind(input.seed_bag_kg)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created crop {} ({})", row.name, row.id);
        Ok(Crop::from(row))
    }

    /// Update a crop
    pub async fn update_crop(&self, crop_id: Uuid, input: UpdateCropInput) -> AppResult<Crop> {
        input.validate()?;
        validate_overrides(input.industrial_bag_kg, input.seed_bag_kg)?;

        let existing = self.get_crop(crop_id).await?;
        if let Some(name) = &input.name {
            self.ensure_unique_name(name, Some(crop_id)).await?;
        }

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let industrial_bag_kg = input.industrial_bag_kg.or(existing.industrial_bag_kg);
        let seed_bag_kg = input.seed_bag_kg.or(existing.seed_bag_kg);
        let active = input.active.unwrap_or(existing.active);

        let row = sqlx::query_as::<_, CropRow>(
            r#"
            UPDATE crops
            SET name = $1, industrial_bag_kg = $2, seed_bag_kg = $3, active = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, industrial_bag_kg, seed_bag_kg, active, created_at
            "#,
        )
        .bind(&name)
        .bind(industrial_bag_kg)
        .bind(seed_bag_kg)
        .bind(active)
        .bind(crop_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Crop::from(row))
    }

    /// Resolve bag weights for a crop, or the defaults when there is none.
    ///
    /// An unknown crop is an error; use `bag_weights_or_default` for drafts.
    pub async fn bag_weights(
        &self,
        crop_id: Option<Uuid>,
        defaults: &BagWeights,
    ) -> AppResult<BagWeights> {
        match crop_id {
            Some(id) => Ok(self.get_crop(id).await?.bag_weights(defaults)),
            None => Ok(*defaults),
        }
    }

    /// Resolve bag weights, falling back to the defaults for unknown crops
    pub async fn bag_weights_or_default(
        &self,
        crop_id: Option<Uuid>,
        defaults: &BagWeights,
    ) -> AppResult<BagWeights> {
        let Some(id) = crop_id else {
            return Ok(*defaults);
        };
        Ok(self
            .find_crop(id)
            .await?
            .map(|crop| crop.bag_weights(defaults))
            .unwrap_or(*defaults))
    }

    async fn ensure_unique_name(&self, name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM crops
            WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(name.trim())
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if count > 0 {
            return Err(AppError::Conflict {
                resource: "crop".to_string(),
                message: format!("A crop named '{}' already exists", name.trim()),
                message_pt: format!("Já existe uma cultura chamada '{}'", name.trim()),
            });
        }
        Ok(())
    }
}

fn validate_overrides(industrial: Option<Decimal>, seed: Option<Decimal>) -> AppResult<()> {
    if let Some(kg) = industrial {
        validate_bag_weight(kg).map_err(|msg| AppError::invalid_field("industrial_bag_kg", msg))?;
    }
    if let Some(kg) = seed {
        validate_bag_weight(kg).map_err(|msg| AppError::invalid_field("seed_bag_kg", msg))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_overrides() {
        assert!(validate_overrides(None, None).is_ok());
        assert!(validate_overrides(Some(Decimal::from(60)), Some(Decimal::from(40))).is_ok());
        assert!(validate_overrides(Some(Decimal::ZERO), None).is_err());
        assert!(validate_overrides(None, Some(Decimal::from(-40))).is_err());
    }

    #[test]
    fn test_create_crop_input_name_length() {
        let input = CreateCropInput {
            name: String::new(),
            industrial_bag_kg: None,
            seed_bag_kg: None,
        };
        assert!(input.validate().is_err());

        let input = CreateCropInput {
            name: "Milho".to_string(),
            industrial_bag_kg: None,
            seed_bag_kg: None,
        };
        assert!(input.validate().is_ok());
    }
}
