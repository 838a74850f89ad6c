//! Crop models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HarvestKind;

/// Standard industrial bag (saca) weight in kg
pub const DEFAULT_INDUSTRIAL_BAG_KG: u32 = 60;

/// Standard seed bag weight in kg
pub const DEFAULT_SEED_BAG_KG: u32 = 40;

/// A cultivated crop (soybean, corn, wheat...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    pub id: Uuid,
    pub name: String,
    /// Overrides the configured industrial bag weight
    pub industrial_bag_kg: Option<Decimal>,
    /// Overrides the configured seed bag weight
    pub seed_bag_kg: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Crop {
    /// Resolve the bag weights for this crop, falling back to `defaults`
    pub fn bag_weights(&self, defaults: &BagWeights) -> BagWeights {
        BagWeights {
            industrial_kg: self.industrial_bag_kg.unwrap_or(defaults.industrial_kg),
            seed_kg: self.seed_bag_kg.unwrap_or(defaults.seed_kg),
        }
    }
}

/// Bag weight divisors used to express net weight in bags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BagWeights {
    pub industrial_kg: Decimal,
    pub seed_kg: Decimal,
}

impl BagWeights {
    pub fn new(industrial_kg: Decimal, seed_kg: Decimal) -> Self {
        Self {
            industrial_kg,
            seed_kg,
        }
    }

    /// Bag weight for the given harvest kind
    pub fn for_kind(&self, kind: HarvestKind) -> Decimal {
        match kind {
            HarvestKind::Industrial => self.industrial_kg,
            HarvestKind::Seed => self.seed_kg,
        }
    }
}

impl Default for BagWeights {
    fn default() -> Self {
        Self {
            industrial_kg: Decimal::from(DEFAULT_INDUSTRIAL_BAG_KG),
            seed_kg: Decimal::from(DEFAULT_SEED_BAG_KG),
        }
    }
}
