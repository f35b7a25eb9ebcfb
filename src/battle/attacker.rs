//! Player-side combat profile and per-tick attacker stat assembly.

use super::damage::AttackerStats;
use super::defense::{PenetrationKind, PenetrationSource};
use super::state::{BattleState, EquipmentSlot};
use crate::data::DerivedInscription;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EquipmentStats {
    pub attack: f64,
    pub penetration: f64,
}

/// The player's stats outside the inscription loadout, read at battle start.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub attack: f64,
    pub accuracy: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub class_tier_penetration: f64,
    pub skill_penetration: f64,
    pub relic_penetration: f64,
    pub equipment: BTreeMap<EquipmentSlot, EquipmentStats>,
}

impl PlayerProfile {
    /// Equipment totals, skipping slots the boss has destroyed.
    pub fn intact_equipment(&self, state: &BattleState) -> EquipmentStats {
        self.equipment
            .iter()
            .filter(|(slot, _)| !state.is_destroyed(**slot))
            .fold(EquipmentStats::default(), |acc, (_, stats)| EquipmentStats {
                attack: acc.attack + stats.attack,
                penetration: acc.penetration + stats.penetration,
            })
    }
}

/// Combines profile, inscription and live equipment state for one attack.
pub fn build_attacker_stats(
    profile: &PlayerProfile,
    inscription: &DerivedInscription,
    state: &BattleState,
) -> AttackerStats {
    let ins = &inscription.stats;
    let equipment = profile.intact_equipment(state);

    AttackerStats {
        base_damage: profile.attack + ins.attack + equipment.attack,
        accuracy: profile.accuracy + ins.accuracy,
        crit_chance: profile.crit_chance + ins.crit_chance,
        crit_damage: profile.crit_damage + ins.crit_damage,
        penetration: ins.penetration + equipment.penetration,
        final_damage_percent: ins.final_damage_percent,
        penetration_sources: vec![
            PenetrationSource::new(PenetrationKind::ClassTier, profile.class_tier_penetration),
            PenetrationSource::new(PenetrationKind::Inscription, ins.penetration),
            PenetrationSource::new(PenetrationKind::Equipment, equipment.penetration),
            PenetrationSource::new(PenetrationKind::Skill, profile.skill_penetration),
            PenetrationSource::new(PenetrationKind::Relic, profile.relic_penetration),
        ],
    }
}
