//! Validation utilities for Harvest Control
//!
//! These run at the entry layer, before a record is persisted. The discount
//! engine itself never validates and computes any value it is given.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{HarvestLoadInput, HumidityBand};

// ============================================================================
// Harvest Load Validations
// ============================================================================

/// Heaviest reading a truck scale can report
pub const MAX_SCALE_WEIGHT_KG: Decimal = Decimal::from_parts(200_000, 0, 0, false, 0);

/// Smallest non-zero harvested area, 0.01 ha (100 m²)
pub const MIN_AREA_HA: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest harvested area accepted for a single load
pub const MAX_AREA_HA: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Lightest bag weight accepted as a crop override
pub const MIN_BAG_WEIGHT_KG: Decimal = Decimal::ONE;

/// Validate a lab percentage is within 0-100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate gross and tare scale readings
pub fn validate_scale_weights(gross_kg: Decimal, tare_kg: Decimal) -> Result<(), &'static str> {
    if gross_kg < Decimal::ZERO || tare_kg < Decimal::ZERO {
        return Err("Scale weights cannot be negative");
    }
    if gross_kg > MAX_SCALE_WEIGHT_KG || tare_kg > MAX_SCALE_WEIGHT_KG {
        return Err("Scale weights cannot exceed 200000 kg");
    }
    if tare_kg > gross_kg {
        return Err("Tare weight cannot exceed gross weight");
    }
    Ok(())
}

/// Validate harvested area: zero (unknown) or between 0.01 and 100000 ha
pub fn validate_area(area_ha: Decimal) -> Result<(), &'static str> {
    if area_ha < Decimal::ZERO {
        return Err("Harvested area cannot be negative");
    }
    if area_ha.is_zero() {
        return Ok(());
    }
    if area_ha < MIN_AREA_HA {
        return Err("Harvested area must be at least 0.01 ha");
    }
    if area_ha > MAX_AREA_HA {
        return Err("Harvested area cannot exceed 100000 ha");
    }
    Ok(())
}

/// Validate a bag weight override
pub fn validate_bag_weight(bag_kg: Decimal) -> Result<(), &'static str> {
    if bag_kg < MIN_BAG_WEIGHT_KG {
        return Err("Bag weight must be at least 1 kg");
    }
    Ok(())
}

/// Validate a complete load before it is saved.
///
/// Returns the offending field name along with the message.
pub fn validate_load_input(input: &HarvestLoadInput) -> Result<(), (&'static str, &'static str)> {
    validate_scale_weights(input.gross_weight_kg, input.tare_weight_kg)
        .map_err(|msg| ("tare_weight_kg", msg))?;

    let percentages = [
        ("impurity_percent", input.impurity_percent),
        ("moisture_percent", input.moisture_percent),
        ("damaged_percent", input.damaged_percent),
        ("other_discount_percent", input.other_discount_percent),
    ];
    for (field, value) in percentages {
        validate_percentage(value).map_err(|msg| (field, msg))?;
    }

    if input.hectoliter_weight < Decimal::ZERO || input.hectoliter_weight > Decimal::ONE_HUNDRED {
        return Err(("hectoliter_weight", "Hectoliter weight must be between 0 and 100 kg/hl"));
    }

    validate_area(input.area_harvested_ha).map_err(|msg| ("area_harvested_ha", msg))
}

// ============================================================================
// Humidity Band Validations
// ============================================================================

/// Validate the range and discount of a humidity band
pub fn validate_humidity_band(
    min_moisture: Decimal,
    max_moisture: Decimal,
    discount: Decimal,
) -> Result<(), &'static str> {
    validate_percentage(min_moisture)?;
    validate_percentage(max_moisture)?;
    if min_moisture > max_moisture {
        return Err("Minimum moisture cannot exceed maximum moisture");
    }
    validate_percentage(discount)
}

/// Check whether two inclusive moisture ranges share any value
pub fn ranges_overlap(a_min: Decimal, a_max: Decimal, b_min: Decimal, b_max: Decimal) -> bool {
    a_min <= b_max && b_min <= a_max
}

/// Find an active band of the same crop whose range overlaps the candidate.
///
/// `exclude_id` skips the band being edited.
pub fn find_overlapping_band<'a>(
    bands: &'a [HumidityBand],
    crop_id: Uuid,
    min_moisture: Decimal,
    max_moisture: Decimal,
    exclude_id: Option<Uuid>,
) -> Option<&'a HumidityBand> {
    bands.iter().find(|band| {
        band.applies_to(crop_id)
            && Some(band.id) != exclude_id
            && ranges_overlap(
                band.min_moisture_percent,
                band.max_moisture_percent,
                min_moisture,
                max_moisture,
            )
    })
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a Brazilian vehicle plate (old ABC1234 or Mercosul ABC1D23)
pub fn validate_truck_plate(plate: &str) -> Result<(), &'static str> {
    let normalized: Vec<char> = plate
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.len() != 7 {
        return Err("Truck plate must have 7 characters");
    }
    let letters_ok = normalized[..3].iter().all(|c| c.is_ascii_uppercase());
    let digits_ok = normalized[3].is_ascii_digit()
        && normalized[5].is_ascii_digit()
        && normalized[6].is_ascii_digit();
    let fifth_ok = normalized[4].is_ascii_digit() || normalized[4].is_ascii_uppercase();

    if letters_ok && digits_ok && fifth_ok {
        Ok(())
    } else {
        Err("Invalid truck plate format")
    }
}
