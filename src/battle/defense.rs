//! Flat defense and percentage defense-rate formulas.

use crate::core::constants::{DEFENSE_CONSTANT, DEFENSE_RATE_CURVE, MAX_DEFENSE_REDUCTION};
use serde::{Deserialize, Serialize};

/// Where a penetration contribution comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenetrationKind {
    ClassTier,
    Inscription,
    Equipment,
    Skill,
    Relic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenetrationSource {
    pub kind: PenetrationKind,
    pub amount: f64,
}

impl PenetrationSource {
    pub fn new(kind: PenetrationKind, amount: f64) -> Self {
        Self { kind, amount }
    }
}

pub fn total_penetration(sources: &[PenetrationSource]) -> f64 {
    sources.iter().map(|s| s.amount.max(0.0)).sum()
}

/// Damage reduction from flat defense after percentage penetration.
///
/// `effective = defense * (1 - pen/100)`, then `effective / (effective + 500)`,
/// capped at 30%. Penetration is clamped to 0..=100.
pub fn flat_defense_reduction(defense: f64, penetration_percent: f64) -> f64 {
    let pen = penetration_percent.clamp(0.0, 100.0);
    let effective = defense.max(0.0) * (1.0 - pen / 100.0);
    if effective <= 0.0 {
        return 0.0;
    }
    (effective / (effective + DEFENSE_CONSTANT)).min(MAX_DEFENSE_REDUCTION)
}

/// Damage multiplier in (0, 1] for a percentage defense rate.
///
/// Penetration cancels defense rate point for point; whatever remains is
/// mapped through `100 / (100 + remaining)`.
pub fn defense_rate_multiplier(defense_rate: f64, total_penetration: f64) -> f64 {
    let remaining = (defense_rate - total_penetration.max(0.0)).max(0.0);
    DEFENSE_RATE_CURVE / (DEFENSE_RATE_CURVE + remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_defense_no_reduction() {
        assert_eq!(flat_defense_reduction(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_reduction_formula_below_cap() {
        // 100 / (100 + 500) = 0.1667
        let r = flat_defense_reduction(100.0, 0.0);
        assert!((r - 100.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_reduction_capped_at_thirty_percent() {
        assert_eq!(flat_defense_reduction(10_000.0, 0.0), MAX_DEFENSE_REDUCTION);
    }

    #[test]
    fn test_penetration_lowers_effective_defense() {
        let without = flat_defense_reduction(200.0, 0.0);
        let with = flat_defense_reduction(200.0, 50.0);
        assert!((with - 100.0 / 600.0).abs() < 1e-12);
        assert!(with < without);
        assert_eq!(flat_defense_reduction(200.0, 150.0), 0.0);
    }

    #[test]
    fn test_defense_rate_fully_penetrated() {
        assert_eq!(defense_rate_multiplier(40.0, 40.0), 1.0);
        assert_eq!(defense_rate_multiplier(40.0, 90.0), 1.0);
    }

    #[test]
    fn test_defense_rate_partial() {
        // 40 rate, 20 pen -> 100 / 120
        assert!((defense_rate_multiplier(40.0, 20.0) - 100.0 / 120.0).abs() < 1e-12);
    }

    #[test]
    fn test_total_penetration_ignores_negative() {
        let sources = [
            PenetrationSource::new(PenetrationKind::ClassTier, 10.0),
            PenetrationSource::new(PenetrationKind::Relic, -5.0),
            PenetrationSource::new(PenetrationKind::Skill, 2.5),
        ];
        assert_eq!(total_penetration(&sources), 12.5);
    }

    proptest! {
        #[test]
        fn prop_reduction_bounded(defense in 0.0f64..1e9, pen in -1e3f64..1e3) {
            let r = flat_defense_reduction(defense, pen);
            prop_assert!((0.0..=MAX_DEFENSE_REDUCTION).contains(&r));
        }

        #[test]
        fn prop_defense_rate_multiplier_in_unit_interval(rate in 0.0f64..1e6, pen in 0.0f64..1e6) {
            let m = defense_rate_multiplier(rate, pen);
            prop_assert!(m > 0.0 && m <= 1.0);
        }
    }
}
