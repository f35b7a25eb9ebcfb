//! Ability resolver: maps equipped ability ids to typed effects.
//!
//! Ids are resolved once at battle start into a [`ResolvedAbilities`] list
//! ordered by pipeline stage. Every effect folds itself into an
//! [`AbilityModifiers`] context that the damage pipeline, the pattern
//! machine and the session controller read as plain fields.

use crate::core::constants::{
    DEFAULT_HEAL_OVER_TIME_MS, SHIELD_BREAK_TIER_1_PERCENT, SHIELD_BREAK_TIER_2_PERCENT,
};
use serde::{Deserialize, Serialize};

/// Where in the battle an ability takes effect, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Damage pipeline step 1
    Invincibility,
    /// Damage pipeline step 2
    HitRoll,
    /// Damage pipeline step 3
    CritRoll,
    /// Damage pipeline step 6
    Shield,
    /// Boss pattern activation and countdowns
    Pattern,
    /// Session controller (attack count, heart recovery)
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Hit chance is forced to 100%.
    TrueHit,
    /// Extra shield-only damage; tiers do not stack, the highest wins.
    ShieldBreak { bonus_percent: f64 },
    /// All damage ignores an active shield.
    ShieldBypass,
    /// This share of damage always lands on boss HP.
    ShieldBypassPercent { percent: f64 },
    /// Attacks land through invincibility at reduced value.
    InvincibilityBreak,
    /// The first attack during invincibility ends it.
    InvincibilityDestroy,
    /// Halves invincibility windows.
    InvincibilityResist,
    /// Reduces boss regeneration heals.
    HealReduction { percent: f64 },
    /// Equipment destruction enrages the player.
    RageOnDestroy,
    /// The carrying slot attacks this many times per tick.
    ExtraHit { hits: u32 },
    /// Restores one heart on a fixed cadence.
    HealOverTime { interval_ms: u64 },
    /// Equipment cannot be destroyed.
    EquipmentImmunity,
    /// A miss guarantees the next hit of the same slot crits.
    CritAfterMiss,
}

impl AbilityEffect {
    pub fn stage(&self) -> PipelineStage {
        match self {
            AbilityEffect::InvincibilityBreak | AbilityEffect::InvincibilityDestroy => {
                PipelineStage::Invincibility
            }
            AbilityEffect::TrueHit => PipelineStage::HitRoll,
            AbilityEffect::CritAfterMiss => PipelineStage::CritRoll,
            AbilityEffect::ShieldBreak { .. }
            | AbilityEffect::ShieldBypass
            | AbilityEffect::ShieldBypassPercent { .. } => PipelineStage::Shield,
            AbilityEffect::InvincibilityResist
            | AbilityEffect::HealReduction { .. }
            | AbilityEffect::RageOnDestroy
            | AbilityEffect::EquipmentImmunity => PipelineStage::Pattern,
            AbilityEffect::ExtraHit { .. } | AbilityEffect::HealOverTime { .. } => {
                PipelineStage::Session
            }
        }
    }

    /// Folds this effect into the modifier context.
    pub fn modify(&self, mods: &mut AbilityModifiers) {
        match *self {
            AbilityEffect::TrueHit => mods.true_hit = true,
            AbilityEffect::ShieldBreak { bonus_percent } => {
                mods.shield_break_percent = mods.shield_break_percent.max(bonus_percent)
            }
            AbilityEffect::ShieldBypass => mods.shield_bypass = true,
            AbilityEffect::ShieldBypassPercent { percent } => {
                mods.shield_bypass_percent = (mods.shield_bypass_percent + percent).min(100.0)
            }
            AbilityEffect::InvincibilityBreak => mods.invincibility_break = true,
            AbilityEffect::InvincibilityDestroy => mods.invincibility_destroy = true,
            AbilityEffect::InvincibilityResist => mods.invincibility_resist = true,
            AbilityEffect::HealReduction { percent } => mods.heal_reduction_percent += percent,
            AbilityEffect::RageOnDestroy => mods.rage_on_destroy = true,
            AbilityEffect::ExtraHit { hits } => mods.hits_per_tick = mods.hits_per_tick.max(hits),
            AbilityEffect::HealOverTime { interval_ms } => {
                mods.heal_over_time_ms = Some(match mods.heal_over_time_ms {
                    Some(existing) => existing.min(interval_ms),
                    None => interval_ms,
                })
            }
            AbilityEffect::EquipmentImmunity => mods.equipment_immunity = true,
            AbilityEffect::CritAfterMiss => mods.crit_after_miss = true,
        }
    }
}

/// Looks up the effect for an ability id. Unknown ids resolve to `None`.
pub fn resolve_ability(id: &str) -> Option<AbilityEffect> {
    let effect = match id {
        "true_hit" => AbilityEffect::TrueHit,
        "shield_break" => AbilityEffect::ShieldBreak {
            bonus_percent: SHIELD_BREAK_TIER_1_PERCENT,
        },
        "shield_shatter" => AbilityEffect::ShieldBreak {
            bonus_percent: SHIELD_BREAK_TIER_2_PERCENT,
        },
        "shield_bypass" => AbilityEffect::ShieldBypass,
        "shield_pierce" => AbilityEffect::ShieldBypassPercent { percent: 30.0 },
        "invincibility_break" => AbilityEffect::InvincibilityBreak,
        "invincibility_destroy" => AbilityEffect::InvincibilityDestroy,
        "invincibility_resist" => AbilityEffect::InvincibilityResist,
        "heal_reduction" => AbilityEffect::HealReduction { percent: 30.0 },
        "heal_reduction_greater" => AbilityEffect::HealReduction { percent: 50.0 },
        "rage_on_destroy" => AbilityEffect::RageOnDestroy,
        "double_strike" => AbilityEffect::ExtraHit { hits: 2 },
        "triple_strike" => AbilityEffect::ExtraHit { hits: 3 },
        "regeneration" => AbilityEffect::HealOverTime {
            interval_ms: DEFAULT_HEAL_OVER_TIME_MS,
        },
        "equipment_immunity" => AbilityEffect::EquipmentImmunity,
        "lethal_focus" => AbilityEffect::CritAfterMiss,
        _ => return None,
    };
    Some(effect)
}

/// Flattened view of a set of effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityModifiers {
    pub true_hit: bool,
    pub shield_break_percent: f64,
    pub shield_bypass: bool,
    pub shield_bypass_percent: f64,
    pub invincibility_break: bool,
    pub invincibility_destroy: bool,
    pub invincibility_resist: bool,
    /// Uncapped sum; the regen heal applies the cap
    pub heal_reduction_percent: f64,
    pub rage_on_destroy: bool,
    pub hits_per_tick: u32,
    pub heal_over_time_ms: Option<u64>,
    pub equipment_immunity: bool,
    pub crit_after_miss: bool,
}

impl Default for AbilityModifiers {
    fn default() -> Self {
        Self {
            true_hit: false,
            shield_break_percent: 0.0,
            shield_bypass: false,
            shield_bypass_percent: 0.0,
            invincibility_break: false,
            invincibility_destroy: false,
            invincibility_resist: false,
            heal_reduction_percent: 0.0,
            rage_on_destroy: false,
            hits_per_tick: 1,
            heal_over_time_ms: None,
            equipment_immunity: false,
            crit_after_miss: false,
        }
    }
}

/// Stage-ordered effects for one slot (or a whole loadout).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAbilities {
    effects: Vec<AbilityEffect>,
    modifiers: AbilityModifiers,
}

impl ResolvedAbilities {
    pub fn resolve<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut effects = Vec::new();
        for id in ids {
            match resolve_ability(id) {
                Some(effect) => effects.push(effect),
                None => tracing::debug!(ability = id, "ignoring unknown ability id"),
            }
        }
        Self::from_effects(effects)
    }

    pub fn from_effects(mut effects: Vec<AbilityEffect>) -> Self {
        effects.sort_by_key(|e| e.stage());
        let mut modifiers = AbilityModifiers::default();
        for effect in &effects {
            effect.modify(&mut modifiers);
        }
        Self { effects, modifiers }
    }

    /// Combines several slots into one loadout-wide set.
    pub fn merged<'a>(sets: impl IntoIterator<Item = &'a ResolvedAbilities>) -> Self {
        let effects = sets
            .into_iter()
            .flat_map(|set| set.effects.iter().copied())
            .collect();
        Self::from_effects(effects)
    }

    pub fn effects(&self) -> &[AbilityEffect] {
        &self.effects
    }

    pub fn modifiers(&self) -> &AbilityModifiers {
        &self.modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_resolves_none() {
        assert_eq!(resolve_ability("moonwalk"), None);
        assert!(ResolvedAbilities::resolve(["moonwalk"]).is_empty());
    }

    #[test]
    fn test_effects_sorted_by_stage() {
        let resolved = ResolvedAbilities::resolve([
            "double_strike",
            "shield_break",
            "true_hit",
            "invincibility_destroy",
        ]);
        let stages: Vec<_> = resolved.effects().iter().map(|e| e.stage()).collect();
        assert_eq!(
            stages,
            vec![
                PipelineStage::Invincibility,
                PipelineStage::HitRoll,
                PipelineStage::Shield,
                PipelineStage::Session,
            ]
        );
    }

    #[test]
    fn test_shield_break_tiers_do_not_stack() {
        let resolved =
            ResolvedAbilities::resolve(["shield_break", "shield_shatter", "shield_break"]);
        assert_eq!(resolved.modifiers().shield_break_percent, 100.0);
    }

    #[test]
    fn test_heal_reduction_sums_uncapped() {
        let resolved = ResolvedAbilities::resolve([
            "heal_reduction_greater",
            "heal_reduction_greater",
            "heal_reduction",
        ]);
        assert_eq!(resolved.modifiers().heal_reduction_percent, 130.0);
    }

    #[test]
    fn test_extra_hit_takes_highest() {
        let resolved = ResolvedAbilities::resolve(["triple_strike", "double_strike"]);
        assert_eq!(resolved.modifiers().hits_per_tick, 3);
        assert_eq!(ResolvedAbilities::default().modifiers().hits_per_tick, 1);
    }

    #[test]
    fn test_merged_combines_slots() {
        let a = ResolvedAbilities::resolve(["equipment_immunity"]);
        let b = ResolvedAbilities::resolve(["rage_on_destroy", "heal_reduction"]);
        let merged = ResolvedAbilities::merged([&a, &b]);
        let mods = merged.modifiers();
        assert!(mods.equipment_immunity);
        assert!(mods.rage_on_destroy);
        assert_eq!(mods.heal_reduction_percent, 30.0);
        assert!(!mods.true_hit);
    }

    #[test]
    fn test_every_builtin_ability_resolves() {
        use crate::data::InscriptionCatalog;
        for def in InscriptionCatalog::builtin().iter() {
            for id in def.abilities.iter().chain(def.special_ability.iter()) {
                assert!(resolve_ability(id).is_some(), "{} on {}", id, def.id);
            }
        }
    }
}
