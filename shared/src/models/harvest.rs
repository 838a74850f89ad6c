//! Harvest load models and the discount cascade

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lookup_moisture_discount, BagWeights, HumidityBand};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Destination of the harvested grain, which decides the bag weight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HarvestKind {
    #[default]
    Industrial,
    Seed,
}

impl HarvestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarvestKind::Industrial => "industrial",
            HarvestKind::Seed => "seed",
        }
    }
}

impl std::str::FromStr for HarvestKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "industrial" => Ok(HarvestKind::Industrial),
            "seed" => Ok(HarvestKind::Seed),
            _ => Err("Unknown harvest kind"),
        }
    }
}

impl std::fmt::Display for HarvestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw scale and lab values of one truck weighing, fully specified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HarvestLoadInput {
    pub gross_weight_kg: Decimal,
    pub tare_weight_kg: Decimal,
    pub impurity_percent: Decimal,
    pub moisture_percent: Decimal,
    pub damaged_percent: Decimal,
    pub other_discount_percent: Decimal,
    /// Hectoliter weight (PH) in kg/hl; reported only
    pub hectoliter_weight: Decimal,
    pub harvest_kind: HarvestKind,
    pub crop_id: Option<Uuid>,
    pub area_harvested_ha: Decimal,
}

impl HarvestLoadInput {
    /// Gross minus tare, saturating at the bounds of `Decimal`
    pub fn total_weight_kg(&self) -> Decimal {
        self.gross_weight_kg.saturating_sub(self.tare_weight_kg)
    }
}

/// Load values as typed by an operator; any field may still be missing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarvestLoadDraft {
    pub gross_weight_kg: Option<Decimal>,
    pub tare_weight_kg: Option<Decimal>,
    pub impurity_percent: Option<Decimal>,
    pub moisture_percent: Option<Decimal>,
    pub damaged_percent: Option<Decimal>,
    pub other_discount_percent: Option<Decimal>,
    pub hectoliter_weight: Option<Decimal>,
    pub harvest_kind: Option<HarvestKind>,
    pub crop_id: Option<Uuid>,
    pub area_harvested_ha: Option<Decimal>,
}

impl HarvestLoadDraft {
    /// Coerce missing values to zero (and the kind to industrial)
    pub fn normalize(&self) -> HarvestLoadInput {
        let or_zero = |value: Option<Decimal>| value.unwrap_or(Decimal::ZERO);

        HarvestLoadInput {
            gross_weight_kg: or_zero(self.gross_weight_kg),
            tare_weight_kg: or_zero(self.tare_weight_kg),
            impurity_percent: or_zero(self.impurity_percent),
            moisture_percent: or_zero(self.moisture_percent),
            damaged_percent: or_zero(self.damaged_percent),
            other_discount_percent: or_zero(self.other_discount_percent),
            hectoliter_weight: or_zero(self.hectoliter_weight),
            harvest_kind: self.harvest_kind.unwrap_or_default(),
            crop_id: self.crop_id,
            area_harvested_ha: or_zero(self.area_harvested_ha),
        }
    }
}

/// A load with every derived weight, discount and productivity figure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvestLoad {
    pub input: HarvestLoadInput,
    pub total_weight_kg: Decimal,
    pub impurity_kg: Decimal,
    pub base_after_impurity_kg: Decimal,
    pub moisture_discount_percent: Decimal,
    pub moisture_kg: Decimal,
    pub base_after_moisture_kg: Decimal,
    pub damaged_kg: Decimal,
    pub base_after_damaged_kg: Decimal,
    pub other_kg: Decimal,
    pub total_discount_kg: Decimal,
    pub net_weight_kg: Decimal,
    pub bag_weight_kg: Decimal,
    pub bag_count: Decimal,
    pub productivity_bags_per_ha: Decimal,
}

/// Compute a load using the standard 60 kg / 40 kg bags
pub fn compute_harvest_load(input: &HarvestLoadInput, bands: &[HumidityBand]) -> HarvestLoad {
    compute_harvest_load_with(input, bands, &BagWeights::default())
}

/// Run the discount cascade for one load.
///
/// Every discount is taken from what remains after the previous one:
/// impurity, then moisture (looked up from `bands`), then damaged grain,
/// then other discounts. Negative or out-of-range values are computed as is.
///
/// The cascade never panics. Weights that leave the range of `Decimal`
/// saturate at `Decimal::MIN`/`Decimal::MAX`, and bag count or productivity
/// fall back to zero when their quotient overflows, same as a zero divisor.
pub fn compute_harvest_load_with(
    input: &HarvestLoadInput,
    bands: &[HumidityBand],
    bag_weights: &BagWeights,
) -> HarvestLoad {
    let total_weight_kg = input.total_weight_kg();

    let impurity_kg = percent_of(total_weight_kg, input.impurity_percent);
    let base_after_impurity_kg = total_weight_kg.saturating_sub(impurity_kg);

    let moisture_discount_percent =
        lookup_moisture_discount(bands, input.crop_id, input.moisture_percent);
    let moisture_kg = percent_of(base_after_impurity_kg, moisture_discount_percent);
    let base_after_moisture_kg = base_after_impurity_kg.saturating_sub(moisture_kg);

    let damaged_kg = percent_of(base_after_moisture_kg, input.damaged_percent);
    let base_after_damaged_kg = base_after_moisture_kg.saturating_sub(damaged_kg);

    let other_kg = percent_of(base_after_damaged_kg, input.other_discount_percent);

    let total_discount_kg = impurity_kg
        .saturating_add(moisture_kg)
        .saturating_add(damaged_kg)
        .saturating_add(other_kg);
    let net_weight_kg = total_weight_kg.saturating_sub(total_discount_kg);

    let bag_weight_kg = bag_weights.for_kind(input.harvest_kind);
    let bag_count = guarded_ratio(net_weight_kg, bag_weight_kg);
    let productivity_bags_per_ha = guarded_ratio(bag_count, input.area_harvested_ha);

    HarvestLoad {
        input: input.clone(),
        total_weight_kg,
        impurity_kg,
        base_after_impurity_kg,
        moisture_discount_percent,
        moisture_kg,
        base_after_moisture_kg,
        damaged_kg,
        base_after_damaged_kg,
        other_kg,
        total_discount_kg,
        net_weight_kg,
        bag_weight_kg,
        bag_count,
        productivity_bags_per_ha,
    }
}

fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    base.saturating_mul(percent / HUNDRED)
}

/// `numerator / divisor`, or zero when the divisor is not positive or the
/// quotient does not fit in a `Decimal`
pub(crate) fn guarded_ratio(numerator: Decimal, divisor: Decimal) -> Decimal {
    if divisor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(divisor).unwrap_or(Decimal::ZERO)
}
