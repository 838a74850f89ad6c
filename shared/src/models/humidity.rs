//! Humidity band reference data and moisture discount lookup

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A crop-specific moisture range mapped to a discount percentage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumidityBand {
    pub id: Uuid,
    pub crop_id: Uuid,
    /// Lower bound, inclusive
    pub min_moisture_percent: Decimal,
    /// Upper bound, inclusive
    pub max_moisture_percent: Decimal,
    pub discount_percent: Decimal,
    pub active: bool,
}

impl HumidityBand {
    /// Check whether a moisture reading falls inside this band
    pub fn contains(&self, moisture_percent: Decimal) -> bool {
        self.min_moisture_percent <= moisture_percent
            && moisture_percent <= self.max_moisture_percent
    }

    /// Check whether this band is eligible for lookups of `crop_id`
    pub fn applies_to(&self, crop_id: Uuid) -> bool {
        self.active && self.crop_id == crop_id
    }
}

/// Resolve the moisture discount percent for a crop and moisture reading.
///
/// Only active bands of the given crop are considered and the first band
/// (in input order) containing the reading wins. Returns zero when there is
/// no crop, no band for the crop, or the reading is outside every range.
pub fn lookup_moisture_discount(
    bands: &[HumidityBand],
    crop_id: Option<Uuid>,
    moisture_percent: Decimal,
) -> Decimal {
    let Some(crop_id) = crop_id else {
        return Decimal::ZERO;
    };

    bands
        .iter()
        .filter(|band| band.applies_to(crop_id))
        .find(|band| band.contains(moisture_percent))
        .map(|band| band.discount_percent)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn band(crop_id: Uuid, min: &str, max: &str, discount: &str) -> HumidityBand {
        HumidityBand {
            id: Uuid::new_v4(),
            crop_id,
            min_moisture_percent: dec(min),
            max_moisture_percent: dec(max),
            discount_percent: dec(discount),
            active: true,
        }
    }

    #[test]
    fn test_lookup_matching_band() {
        let soy = Uuid::new_v4();
        let bands = vec![
            band(soy, "0", "14", "0"),
            band(soy, "14.1", "15", "1.8"),
            band(soy, "15.1", "16", "2.5"),
        ];
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("14.5")), dec("1.8"));
    }

    #[test]
    fn test_lookup_bounds_are_inclusive() {
        let soy = Uuid::new_v4();
        let bands = vec![band(soy, "14.1", "15", "1.8")];
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("14.1")), dec("1.8"));
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("15")), dec("1.8"));
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("15.01")), Decimal::ZERO);
    }

    #[test]
    fn test_lookup_without_crop_is_zero() {
        let soy = Uuid::new_v4();
        let bands = vec![band(soy, "0", "100", "3")];
        assert_eq!(lookup_moisture_discount(&bands, None, dec("14.5")), Decimal::ZERO);
    }

    #[test]
    fn test_lookup_ignores_other_crops() {
        let soy = Uuid::new_v4();
        let corn = Uuid::new_v4();
        let bands = vec![band(soy, "0", "100", "3")];
        assert_eq!(lookup_moisture_discount(&bands, Some(corn), dec("14.5")), Decimal::ZERO);
    }

    #[test]
    fn test_lookup_ignores_inactive_bands() {
        let soy = Uuid::new_v4();
        let mut inactive = band(soy, "14", "15", "1.8");
        inactive.active = false;
        let bands = vec![inactive, band(soy, "14", "15", "2.2")];
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("14.5")), dec("2.2"));
    }

    #[test]
    fn test_lookup_overlap_first_match_wins() {
        let soy = Uuid::new_v4();
        let bands = vec![band(soy, "14", "16", "2"), band(soy, "15", "17", "3")];
        assert_eq!(lookup_moisture_discount(&bands, Some(soy), dec("15.5")), dec("2"));

        let reversed: Vec<_> = bands.into_iter().rev().collect();
        assert_eq!(lookup_moisture_discount(&reversed, Some(soy), dec("15.5")), dec("3"));
    }

    #[test]
    fn test_lookup_empty_table() {
        assert_eq!(
            lookup_moisture_discount(&[], Some(Uuid::new_v4()), dec("14.5")),
            Decimal::ZERO
        );
    }
}
