//! Humidity band lookup tests
//!
//! Property-based and unit tests for:
//! - Property 3: Lookups fall back to zero discount
//! - Band table validation and overlap detection

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    find_overlapping_band, lookup_moisture_discount, ranges_overlap, validate_humidity_band,
    HumidityBand,
};
use uuid::Uuid;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Moisture readings with one decimal, 0.0% to 40.0%
fn moisture_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=400).prop_map(|n| Decimal::new(n, 1))
}

/// Contiguous non-overlapping bands starting at 13.0% moisture
fn band_table_strategy(crop_id: Uuid) -> impl Strategy<Value = Vec<HumidityBand>> {
    prop::collection::vec((1i64..=20, 0i64..=1_000), 0..8).prop_map(move |widths| {
        let mut lower = 130i64;
        widths
            .into_iter()
            .map(|(width, discount)| {
                let band = HumidityBand {
                    id: Uuid::new_v4(),
                    crop_id,
                    min_moisture_percent: Decimal::new(lower, 1),
                    max_moisture_percent: Decimal::new(lower + width, 1),
                    discount_percent: Decimal::new(discount, 2),
                    active: true,
                };
                lower += width + 1;
                band
            })
            .collect()
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property 3: A crop with no bands never gets a discount
    #[test]
    fn test_unknown_crop_gets_zero(
        moisture in moisture_strategy(),
        bands in band_table_strategy(Uuid::new_v4())
    ) {
        let other_crop = Uuid::new_v4();
        prop_assert_eq!(
            lookup_moisture_discount(&bands, Some(other_crop), moisture),
            Decimal::ZERO
        );
        prop_assert_eq!(lookup_moisture_discount(&bands, None, moisture), Decimal::ZERO);
        prop_assert_eq!(lookup_moisture_discount(&[], Some(other_crop), moisture), Decimal::ZERO);
    }

    /// Property 3: Readings outside every range get zero, inside get the band's discount
    #[test]
    fn test_lookup_matches_containing_band(
        crop_id in Just(Uuid::new_v4()),
        moisture in moisture_strategy()
    ) {
        let bands = fixed_table(crop_id);
        let expected = bands
            .iter()
            .find(|b| b.min_moisture_percent <= moisture && moisture <= b.max_moisture_percent)
            .map(|b| b.discount_percent)
            .unwrap_or(Decimal::ZERO);

        prop_assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), moisture), expected);
    }

    /// Inactive bands never match
    #[test]
    fn test_inactive_bands_ignored(
        moisture in moisture_strategy(),
        bands in band_table_strategy(Uuid::nil())
    ) {
        let inactive: Vec<HumidityBand> = bands
            .into_iter()
            .map(|b| HumidityBand { active: false, ..b })
            .collect();
        prop_assert_eq!(
            lookup_moisture_discount(&inactive, Some(Uuid::nil()), moisture),
            Decimal::ZERO
        );
    }

    /// Generated tables are non-overlapping, so no band overlaps its neighbours
    #[test]
    fn test_generated_table_has_no_overlap(bands in band_table_strategy(Uuid::nil())) {
        for band in &bands {
            let overlap = find_overlapping_band(
                &bands,
                Uuid::nil(),
                band.min_moisture_percent,
                band.max_moisture_percent,
                Some(band.id),
            );
            prop_assert!(overlap.is_none());
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn fixed_table(crop_id: Uuid) -> Vec<HumidityBand> {
    [("13.0", "14.0", "0"), ("14.1", "15.0", "1.8"), ("15.1", "18.0", "3.5")]
        .iter()
        .map(|(min, max, discount)| HumidityBand {
            id: Uuid::new_v4(),
            crop_id,
            min_moisture_percent: dec(min),
            max_moisture_percent: dec(max),
            discount_percent: dec(discount),
            active: true,
        })
        .collect()
}

// ============================================================================
// Band Table Tests
// ============================================================================

#[cfg(test)]
mod band_table_tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let crop_id = Uuid::new_v4();
        let bands = fixed_table(crop_id);
        assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), dec("14.1")), dec("1.8"));
        assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), dec("15.0")), dec("1.8"));
        assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), dec("15.05")), Decimal::ZERO);
        assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), dec("12.9")), Decimal::ZERO);
    }

    #[test]
    fn test_first_matching_band_wins() {
        let crop_id = Uuid::new_v4();
        let mut bands = fixed_table(crop_id);
        bands.insert(
            0,
            HumidityBand {
                id: Uuid::new_v4(),
                crop_id,
                min_moisture_percent: dec("14"),
                max_moisture_percent: dec("16"),
                discount_percent: dec("9"),
                active: true,
            },
        );
        assert_eq!(lookup_moisture_discount(&bands, Some(crop_id), dec("14.5")), dec("9"));
    }

    #[test]
    fn test_validate_band_values() {
        assert!(validate_humidity_band(dec("14"), dec("15"), dec("1.5")).is_ok());
        assert!(validate_humidity_band(dec("14"), dec("14"), dec("0")).is_ok());
        assert!(validate_humidity_band(dec("15"), dec("14"), dec("1.5")).is_err());
        assert!(validate_humidity_band(dec("-1"), dec("14"), dec("1.5")).is_err());
        assert!(validate_humidity_band(dec("14"), dec("15"), dec("101")).is_err());
    }

    #[test]
    fn test_ranges_overlap() {
        assert!(ranges_overlap(dec("14"), dec("15"), dec("15"), dec("16")));
        assert!(ranges_overlap(dec("14"), dec("18"), dec("15"), dec("16")));
        assert!(!ranges_overlap(dec("14"), dec("15"), dec("15.1"), dec("16")));
    }

    #[test]
    fn test_overlap_ignores_other_crops_and_inactive_bands() {
        let crop_id = Uuid::new_v4();
        let mut bands = fixed_table(crop_id);
        bands[1].active = false;

        let other_crop = Uuid::new_v4();
        assert!(find_overlapping_band(&bands, other_crop, dec("14"), dec("15"), None).is_none());
        assert!(find_overlapping_band(&bands, crop_id, dec("14.2"), dec("14.8"), None).is_none());
        assert!(find_overlapping_band(&bands, crop_id, dec("17"), dec("19"), None).is_some());
    }
}
