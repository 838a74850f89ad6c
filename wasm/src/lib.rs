//! WebAssembly module for the Harvest Control platform
//!
//! Lets the weighing form recompute a load on every keystroke:
//! - Discount cascade over a draft load
//! - Humidity band lookup
//! - Fleet summaries
//! - Bag count and productivity helpers

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("harvest-control wasm ready"));
}

/// Compute every derived value of a draft load.
///
/// Missing draft fields count as zero, so partially filled forms still
/// produce a result. Returns the computed load as JSON.
#[wasm_bindgen]
pub fn compute_harvest_load(draft_json: &str, bands_json: &str) -> Result<String, JsValue> {
    compute_load_json(draft_json, bands_json).map_err(|e| JsValue::from_str(&e))
}

/// Resolve the moisture discount percent for a crop and reading
#[wasm_bindgen]
pub fn lookup_moisture_discount(
    bands_json: &str,
    crop_id: &str,
    moisture: f64,
) -> Result<f64, JsValue> {
    lookup_discount(bands_json, crop_id, moisture).map_err(|e| JsValue::from_str(&e))
}

/// Summarize a list of computed loads as JSON
#[wasm_bindgen]
pub fn summarize_fleet(loads_json: &str) -> Result<String, JsValue> {
    summarize_json(loads_json).map_err(|e| JsValue::from_str(&e))
}

/// Number of bags in a net weight, using the default bag weights
#[wasm_bindgen]
pub fn calculate_bag_count(net_weight_kg: f64, is_seed: bool) -> Result<f64, JsValue> {
    bag_count(net_weight_kg, is_seed).map_err(|e| JsValue::from_str(&e))
}

/// Bags per hectare, zero when no area was harvested
#[wasm_bindgen]
pub fn calculate_productivity(bag_count: f64, area_ha: f64) -> Result<f64, JsValue> {
    productivity(bag_count, area_ha).map_err(|e| JsValue::from_str(&e))
}

fn bag_count(net_weight_kg: f64, is_seed: bool) -> Result<f64, String> {
    let kind = if is_seed {
        HarvestKind::Seed
    } else {
        HarvestKind::Industrial
    };
    let bag_kg = BagWeights::default().for_kind(kind);
    let net = to_decimal("net_weight_kg", net_weight_kg)?;
    Ok(to_f64(net.checked_div(bag_kg).unwrap_or(Decimal::ZERO)))
}

fn productivity(bag_count: f64, area_ha: f64) -> Result<f64, String> {
    let bags = to_decimal("bag_count", bag_count)?;
    let area = to_decimal("area_ha", area_ha)?;
    if area <= Decimal::ZERO {
        return Ok(0.0);
    }
    Ok(to_f64(bags.checked_div(area).unwrap_or(Decimal::ZERO)))
}

fn compute_load_json(draft_json: &str, bands_json: &str) -> Result<String, String> {
    let draft: HarvestLoadDraft =
        serde_json::from_str(draft_json).map_err(|e| format!("Invalid load JSON: {}", e))?;
    let bands = parse_bands(bands_json)?;

    let load = shared::compute_harvest_load(&draft.normalize(), &bands);
    serde_json::to_string(&load).map_err(|e| e.to_string())
}

fn lookup_discount(bands_json: &str, crop_id: &str, moisture: f64) -> Result<f64, String> {
    let bands = parse_bands(bands_json)?;
    let crop_id = match crop_id.trim() {
        "" => None,
        id => Some(Uuid::parse_str(id).map_err(|e| format!("Invalid crop id: {}", e))?),
    };

    let moisture = to_decimal("moisture", moisture)?;
    let discount = shared::lookup_moisture_discount(&bands, crop_id, moisture);
    Ok(to_f64(discount))
}

fn summarize_json(loads_json: &str) -> Result<String, String> {
    let loads: Vec<HarvestLoad> =
        serde_json::from_str(loads_json).map_err(|e| format!("Invalid loads JSON: {}", e))?;
    serde_json::to_string(&shared::summarize_fleet(&loads)).map_err(|e| e.to_string())
}

fn parse_bands(bands_json: &str) -> Result<Vec<HumidityBand>, String> {
    if bands_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(bands_json).map_err(|e| format!("Invalid humidity bands JSON: {}", e))
}

/// Convert a JavaScript number, rejecting NaN, infinities and magnitudes
/// beyond what a `Decimal` can hold
fn to_decimal(name: &str, value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value)
        .map_err(|_| format!("{} is not a representable number: {}", name, value))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands_json(crop_id: Uuid) -> String {
        format!(
            r#"[{{"id":"{}","crop_id":"{}","min_moisture_percent":"14.1","max_moisture_percent":"15.0","discount_percent":"1.8","active":true}}]"#,
            Uuid::new_v4(),
            crop_id
        )
    }

    #[test]
    fn test_compute_partial_draft() {
        let json = compute_load_json(r#"{"gross_weight_kg":"10000","tare_weight_kg":"4000"}"#, "")
            .unwrap();
        let load: HarvestLoad = serde_json::from_str(&json).unwrap();
        assert_eq!(load.total_weight_kg, Decimal::from(6000));
        assert_eq!(load.bag_count, Decimal::from(100));
    }

    #[test]
    fn test_compute_applies_band() {
        let crop_id = Uuid::new_v4();
        let draft = format!(
            r#"{{"gross_weight_kg":"10000","tare_weight_kg":"4000","impurity_percent":"2","moisture_percent":"14.5","crop_id":"{}"}}"#,
            crop_id
        );
        let json = compute_load_json(&draft, &bands_json(crop_id)).unwrap();
        let load: HarvestLoad = serde_json::from_str(&json).unwrap();
        assert_eq!(load.moisture_kg, "105.84".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_compute_rejects_bad_json() {
        assert!(compute_load_json("not json", "").is_err());
        assert!(compute_load_json("{}", "[oops").is_err());
    }

    #[test]
    fn test_lookup_discount() {
        let crop_id = Uuid::new_v4();
        let bands = bands_json(crop_id);
        assert!((lookup_discount(&bands, &crop_id.to_string(), 14.5).unwrap() - 1.8).abs() < 1e-9);
        assert_eq!(lookup_discount(&bands, &crop_id.to_string(), 16.0).unwrap(), 0.0);
        assert_eq!(lookup_discount(&bands, "", 14.5).unwrap(), 0.0);
        assert!(lookup_discount(&bands, "not-a-uuid", 14.5).is_err());
    }

    #[test]
    fn test_summarize_empty_fleet() {
        let json = summarize_json("[]").unwrap();
        let summary: FleetSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, FleetSummary::default());
    }

    #[test]
    fn test_bag_count_and_productivity() {
        assert!((bag_count(6000.0, false).unwrap() - 100.0).abs() < 1e-9);
        assert!((bag_count(2000.0, true).unwrap() - 50.0).abs() < 1e-9);
        assert!((productivity(100.0, 10.0).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(productivity(100.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_unrepresentable_numbers_are_rejected() {
        assert!(bag_count(1e30, false).is_err());
        assert!(bag_count(f64::NAN, false).is_err());
        assert!(productivity(f64::INFINITY, 10.0).is_err());
        assert!(productivity(100.0, f64::NEG_INFINITY).is_err());
        assert!(lookup_discount("", "", f64::NAN).is_err());
    }

    #[test]
    fn test_productivity_overflow_falls_back_to_zero() {
        assert_eq!(productivity(1e20, 1e-20).unwrap(), 0.0);
    }
}
