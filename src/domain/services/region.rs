use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Hyper-local wind adjustment for one coastal region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionAdjustment {
    pub multiplier: f64,
    pub label: &'static str,
}

/// Applied when a spot's region has no entry in the table.
pub const NEUTRAL: RegionAdjustment = RegionAdjustment {
    multiplier: 1.0,
    label: "no local relief data",
};

/// Region multipliers for the French Atlantic coast. Adding a region is a
/// data change here, not a code change.
static REGION_TABLE: Lazy<HashMap<&'static str, RegionAdjustment>> = Lazy::new(|| {
    HashMap::from([
        (
            "Bretagne",
            RegionAdjustment {
                multiplier: 1.10,
                label: "exposed headlands",
            },
        ),
        (
            "Landes",
            RegionAdjustment {
                multiplier: 1.05,
                label: "open beach break",
            },
        ),
        (
            "Gironde",
            RegionAdjustment {
                multiplier: 1.02,
                label: "long open sandbars",
            },
        ),
        (
            "Pays Basque",
            RegionAdjustment {
                multiplier: 0.98,
                label: "cliff shelter",
            },
        ),
        (
            "Pays de la Loire",
            RegionAdjustment {
                multiplier: 0.95,
                label: "sheltered bays",
            },
        ),
    ])
});

pub fn adjustment_for(region: &str) -> RegionAdjustment {
    REGION_TABLE.get(region).copied().unwrap_or(NEUTRAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions_have_table_multipliers() {
        assert_eq!(adjustment_for("Bretagne").multiplier, 1.10);
        assert_eq!(adjustment_for("Landes").multiplier, 1.05);
        assert_eq!(adjustment_for("Gironde").multiplier, 1.02);
        assert_eq!(adjustment_for("Pays Basque").multiplier, 0.98);
        assert_eq!(adjustment_for("Pays de la Loire").multiplier, 0.95);
    }

    #[test]
    fn test_unknown_region_is_neutral() {
        let adjustment = adjustment_for("Normandie");
        assert_eq!(adjustment, NEUTRAL);
        assert_eq!(adjustment.multiplier, 1.0);
    }

    #[test]
    fn test_all_multipliers_stay_in_design_band() {
        for (region, adjustment) in REGION_TABLE.iter() {
            assert!(
                adjustment.multiplier >= 0.95 && adjustment.multiplier <= 1.10,
                "{} out of band",
                region
            );
        }
    }
}
