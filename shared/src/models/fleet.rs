//! Fleet-level summaries over computed loads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::harvest::guarded_ratio;
use super::HarvestLoad;

/// Totals and averages for a harvest-control session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FleetSummary {
    pub load_count: u64,
    pub total_gross_kg: Decimal,
    pub total_tare_kg: Decimal,
    /// Sum of total (gross - tare) weights
    pub total_production_kg: Decimal,
    pub total_net_kg: Decimal,
    pub total_bags: Decimal,
    pub total_area_ha: Decimal,
    pub avg_impurity_percent: Decimal,
    pub avg_moisture_percent: Decimal,
    pub avg_ph: Decimal,
    pub avg_bags_per_ha: Decimal,
}

/// Fold a list of computed loads into a fleet summary.
///
/// An empty list gives the all-zero summary. Sums saturate at the bounds of
/// `Decimal` rather than overflow.
pub fn summarize_fleet(loads: &[HarvestLoad]) -> FleetSummary {
    if loads.is_empty() {
        return FleetSummary::default();
    }

    let mut summary = FleetSummary::default();
    let mut impurity_sum = Decimal::ZERO;
    let mut moisture_sum = Decimal::ZERO;
    let mut ph_sum = Decimal::ZERO;

    for load in loads {
        summary.total_gross_kg = summary.total_gross_kg.saturating_add(load.input.gross_weight_kg);
        summary.total_tare_kg = summary.total_tare_kg.saturating_add(load.input.tare_weight_kg);
        summary.total_production_kg =
            summary.total_production_kg.saturating_add(load.total_weight_kg);
        summary.total_net_kg = summary.total_net_kg.saturating_add(load.net_weight_kg);
        summary.total_bags = summary.total_bags.saturating_add(load.bag_count);
        summary.total_area_ha = summary.total_area_ha.saturating_add(load.input.area_harvested_ha);
        impurity_sum = impurity_sum.saturating_add(load.input.impurity_percent);
        moisture_sum = moisture_sum.saturating_add(load.input.moisture_percent);
        ph_sum = ph_sum.saturating_add(load.input.hectoliter_weight);
    }

    let count = Decimal::from(loads.len() as u64);
    summary.load_count = loads.len() as u64;
    summary.avg_impurity_percent = impurity_sum / count;
    summary.avg_moisture_percent = moisture_sum / count;
    summary.avg_ph = ph_sum / count;
    summary.avg_bags_per_ha = guarded_ratio(summary.total_bags, summary.total_area_ha);

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{compute_harvest_load, HarvestLoadInput};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn load(
        gross: &str,
        tare: &str,
        impurity: &str,
        moisture: &str,
        ph: &str,
        area: &str,
    ) -> HarvestLoad {
        let input = HarvestLoadInput {
            gross_weight_kg: dec(gross),
            tare_weight_kg: dec(tare),
            impurity_percent: dec(impurity),
            moisture_percent: dec(moisture),
            hectoliter_weight: dec(ph),
            area_harvested_ha: dec(area),
            ..Default::default()
        };
        compute_harvest_load(&input, &[])
    }

    #[test]
    fn test_empty_fleet_is_all_zero() {
        assert_eq!(summarize_fleet(&[]), FleetSummary::default());
    }

    #[test]
    fn test_fleet_totals_and_averages() {
        let loads = vec![
            load("10000", "4000", "0", "14", "78", "5"),
            load("16000", "4000", "0", "16", "80", "5"),
        ];
        let summary = summarize_fleet(&loads);

        assert_eq!(summary.load_count, 2);
        assert_eq!(summary.total_gross_kg, dec("26000"));
        assert_eq!(summary.total_tare_kg, dec("8000"));
        assert_eq!(summary.total_production_kg, dec("18000"));
        assert_eq!(summary.total_net_kg, dec("18000"));
        assert_eq!(summary.total_bags, dec("300"));
        assert_eq!(summary.total_area_ha, dec("10"));
        assert_eq!(summary.avg_impurity_percent, Decimal::ZERO);
        assert_eq!(summary.avg_moisture_percent, dec("15"));
        assert_eq!(summary.avg_ph, dec("79"));
        assert_eq!(summary.avg_bags_per_ha, dec("30"));
    }

    #[test]
    fn test_fleet_without_area_has_zero_bags_per_ha() {
        let loads = vec![load("10000", "4000", "1", "14", "78", "0")];
        let summary = summarize_fleet(&loads);
        assert!(summary.total_bags > Decimal::ZERO);
        assert_eq!(summary.avg_bags_per_ha, Decimal::ZERO);
    }

    #[test]
    fn test_fleet_totals_saturate() {
        let huge = HarvestLoadInput {
            gross_weight_kg: Decimal::MAX,
            area_harvested_ha: dec("0.0000000000000000000000000001"),
            ..Default::default()
        };
        let loads = vec![compute_harvest_load(&huge, &[]), compute_harvest_load(&huge, &[])];
        let summary = summarize_fleet(&loads);

        assert_eq!(summary.total_gross_kg, Decimal::MAX);
        assert_eq!(summary.total_production_kg, Decimal::MAX);
        assert_eq!(summary.avg_bags_per_ha, Decimal::ZERO);
    }
}
