//! Fleet summary tests
//!
//! Property-based and unit tests for:
//! - Property 4: Zero total area never divides
//! - Totals match the per-load values they fold

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{compute_harvest_load, summarize_fleet, FleetSummary, HarvestLoad, HarvestLoadInput};

// ============================================================================
// Property Test Strategies
// ============================================================================

prop_compose! {
    fn load_strategy(max_area: i64)(
        gross in 5_000i64..=50_000,
        tare in 0i64..=4_000,
        impurity in 0i64..=500,
        moisture in 100i64..=250,
        ph in 600i64..=850,
        area in 0i64..=max_area,
    ) -> HarvestLoad {
        let input = HarvestLoadInput {
            gross_weight_kg: Decimal::from(gross),
            tare_weight_kg: Decimal::from(tare),
            impurity_percent: Decimal::new(impurity, 2),
            moisture_percent: Decimal::new(moisture, 1),
            hectoliter_weight: Decimal::new(ph, 1),
            area_harvested_ha: Decimal::new(area, 1),
            ..Default::default()
        };
        compute_harvest_load(&input, &[])
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Totals equal the sums of the folded loads
    #[test]
    fn test_totals_match_loads(loads in prop::collection::vec(load_strategy(500), 1..30)) {
        let summary = summarize_fleet(&loads);

        let net: Decimal = loads.iter().map(|l| l.net_weight_kg).sum();
        let bags: Decimal = loads.iter().map(|l| l.bag_count).sum();
        let production: Decimal = loads.iter().map(|l| l.total_weight_kg).sum();

        prop_assert_eq!(summary.load_count, loads.len() as u64);
        prop_assert_eq!(summary.total_net_kg, net);
        prop_assert_eq!(summary.total_bags, bags);
        prop_assert_eq!(summary.total_production_kg, production);
        prop_assert_eq!(
            summary.total_gross_kg - summary.total_tare_kg,
            summary.total_production_kg
        );
    }

    /// Averages stay within the range of the inputs
    #[test]
    fn test_averages_are_bounded(loads in prop::collection::vec(load_strategy(500), 1..30)) {
        let summary = summarize_fleet(&loads);

        let min_moisture = loads.iter().map(|l| l.input.moisture_percent).min().unwrap();
        let max_moisture = loads.iter().map(|l| l.input.moisture_percent).max().unwrap();
        prop_assert!(summary.avg_moisture_percent >= min_moisture);
        prop_assert!(summary.avg_moisture_percent <= max_moisture);

        let min_ph = loads.iter().map(|l| l.input.hectoliter_weight).min().unwrap();
        let max_ph = loads.iter().map(|l| l.input.hectoliter_weight).max().unwrap();
        prop_assert!(summary.avg_ph >= min_ph);
        prop_assert!(summary.avg_ph <= max_ph);
    }

    /// Property 4: Zero total area gives zero bags per hectare
    #[test]
    fn test_zero_area_fleet(loads in prop::collection::vec(load_strategy(0), 1..10)) {
        let summary = summarize_fleet(&loads);
        prop_assert_eq!(summary.total_area_ha, Decimal::ZERO);
        prop_assert_eq!(summary.avg_bags_per_ha, Decimal::ZERO);
        prop_assert!(summary.total_bags > Decimal::ZERO);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod summary_tests {
    use super::*;

    #[test]
    fn test_empty_fleet_is_all_zero() {
        let summary = summarize_fleet(&[]);
        assert_eq!(summary, FleetSummary::default());
        assert_eq!(summary.load_count, 0);
        assert_eq!(summary.avg_bags_per_ha, Decimal::ZERO);
        assert_eq!(summary.avg_ph, Decimal::ZERO);
    }

    #[test]
    fn test_bags_per_ha_uses_fleet_totals() {
        let first = compute_harvest_load(
            &HarvestLoadInput {
                gross_weight_kg: Decimal::from(12_000),
                tare_weight_kg: Decimal::from(6_000),
                area_harvested_ha: Decimal::from(4),
                ..Default::default()
            },
            &[],
        );
        let second = compute_harvest_load(
            &HarvestLoadInput {
                gross_weight_kg: Decimal::from(18_000),
                tare_weight_kg: Decimal::from(6_000),
                area_harvested_ha: Decimal::from(6),
                ..Default::default()
            },
            &[],
        );

        let summary = summarize_fleet(&[first, second]);
        assert_eq!(summary.total_bags, Decimal::from(300));
        assert_eq!(summary.total_area_ha, Decimal::from(10));
        assert_eq!(summary.avg_bags_per_ha, Decimal::from(30));
    }
}
