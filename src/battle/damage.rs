//! Damage pipeline for a single sealed zone attack.
//!
//! [`calculate_damage`] is pure apart from its random draws: it reads the
//! battle state and reports what should change (miss streaks, cleared
//! invincibility, shield routing) for the controller to apply. Stage order
//! matters, later stages multiply earlier results:
//!
//! 1. invincibility gate
//! 2. hit roll
//! 3. crit roll
//! 4. flat defense after penetration
//! 5. percentage defense rate
//! 6. shield routing
//! 7. final damage percent
//! 8. destruction rage
//! 9. partial invincibility

use super::abilities::AbilityModifiers;
use super::defense::{
    defense_rate_multiplier, flat_defense_reduction, total_penetration, PenetrationSource,
};
use super::rolls::roll_chance;
use super::state::{CombatCounters, PatternState, ShieldState};
use crate::core::constants::{
    BASE_CRIT_MULTIPLIER, MAX_HIT_CHANCE, MIN_HIT_CHANCE, PARTIAL_INVINCIBLE_MULTIPLIER,
    RAGE_DAMAGE_MULTIPLIER,
};
use crate::data::ScaledBoss;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Attack-side numbers for one ability slot, rebuilt on every attack tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttackerStats {
    pub base_damage: f64,
    pub accuracy: f64,
    pub crit_chance: f64,
    /// Bonus on top of the 150% base crit multiplier, in percent
    pub crit_damage: f64,
    /// Percent penetration against flat defense
    pub penetration: f64,
    pub final_damage_percent: f64,
    /// Every contribution counted against defense rate
    pub penetration_sources: Vec<PenetrationSource>,
}

/// Defense-side numbers, fixed for the battle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BossCombatStats {
    pub defense: f64,
    pub evasion: f64,
    pub defense_rate: f64,
    pub crit_immune: bool,
}

impl From<&ScaledBoss> for BossCombatStats {
    fn from(boss: &ScaledBoss) -> Self {
        Self {
            defense: boss.defense,
            evasion: boss.evasion,
            defense_rate: boss.defense_rate,
            crit_immune: boss.pattern.crit_immune,
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageResult {
    /// Total damage after every stage
    pub damage: f64,
    pub is_miss: bool,
    pub is_crit: bool,
    /// Damage dealt to an active shield (break bonus included)
    pub shield_damage: f64,
    /// Portion that lands on boss HP regardless of the shield
    pub shield_bypass_damage: f64,
    /// All damage ignores the shield
    pub bypass_shield: bool,
    /// Blocked by invincibility
    pub is_invincible: bool,
    /// The attack ended the invincibility window
    pub cleared_invincibility: bool,
}

impl DamageResult {
    fn miss() -> Self {
        Self {
            is_miss: true,
            ..Default::default()
        }
    }

    fn blocked() -> Self {
        Self {
            is_invincible: true,
            ..Default::default()
        }
    }

    pub fn landed(&self) -> bool {
        !self.is_miss && !self.is_invincible
    }
}

/// Chance to hit in percent, clamped to 10..=100.
pub fn hit_chance(accuracy: f64, evasion: f64, true_hit: bool) -> f64 {
    if true_hit || accuracy >= evasion {
        return MAX_HIT_CHANCE;
    }
    if evasion <= 0.0 {
        return MAX_HIT_CHANCE;
    }
    (accuracy.max(0.0) / evasion * 100.0).clamp(MIN_HIT_CHANCE, MAX_HIT_CHANCE)
}

pub fn crit_multiplier(crit_damage_bonus: f64) -> f64 {
    BASE_CRIT_MULTIPLIER + crit_damage_bonus / 100.0
}

/// How stage 6 splits damage between shield and HP.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShieldRouting {
    bypass_all: bool,
    shielded: bool,
    break_bonus: f64,
    bypass_fraction: f64,
}

impl ShieldRouting {
    fn new(shield: &ShieldState, abilities: &AbilityModifiers) -> Self {
        if !shield.active {
            return Self {
                bypass_all: false,
                shielded: false,
                break_bonus: 0.0,
                bypass_fraction: 0.0,
            };
        }
        if abilities.shield_bypass {
            // Full bypass wins over percentage bypass.
            return Self {
                bypass_all: true,
                shielded: false,
                break_bonus: 0.0,
                bypass_fraction: 0.0,
            };
        }
        Self {
            bypass_all: false,
            shielded: true,
            break_bonus: abilities.shield_break_percent.max(0.0) / 100.0,
            bypass_fraction: abilities.shield_bypass_percent.clamp(0.0, 100.0) / 100.0,
        }
    }

    fn apply(&self, result: &mut DamageResult) {
        result.bypass_shield = self.bypass_all;
        if self.shielded {
            result.shield_bypass_damage = result.damage * self.bypass_fraction;
            result.shield_damage =
                (result.damage - result.shield_bypass_damage) * (1.0 + self.break_bonus);
        }
    }
}

pub fn calculate_damage(
    attacker: &AttackerStats,
    abilities: &AbilityModifiers,
    boss: &BossCombatStats,
    pattern: &PatternState,
    shield: &ShieldState,
    counters: &CombatCounters,
    rng: &mut impl Rng,
) -> DamageResult {
    let mut cleared_invincibility = false;
    let mut partial_invincible = false;
    if pattern.is_invincible {
        if abilities.invincibility_destroy {
            cleared_invincibility = true;
        } else if abilities.invincibility_break {
            partial_invincible = true;
        } else {
            return DamageResult::blocked();
        }
    }

    let chance = hit_chance(attacker.accuracy, boss.evasion, abilities.true_hit);
    if !roll_chance(chance, rng) {
        return DamageResult {
            cleared_invincibility,
            ..DamageResult::miss()
        };
    }

    let mut damage = attacker.base_damage.max(0.0);

    let mut is_crit = false;
    if !boss.crit_immune {
        let forced = abilities.crit_after_miss && counters.guaranteed_crit_next;
        if forced || roll_chance(attacker.crit_chance, rng) {
            is_crit = true;
            damage *= crit_multiplier(attacker.crit_damage);
        }
    }

    damage *= 1.0 - flat_defense_reduction(boss.defense, attacker.penetration);

    if boss.defense_rate > 0.0 {
        let pen = total_penetration(&attacker.penetration_sources);
        damage *= defense_rate_multiplier(boss.defense_rate, pen);
    }

    let routing = ShieldRouting::new(shield, abilities);

    damage *= 1.0 + attacker.final_damage_percent / 100.0;

    if pattern.destruction_rage_active {
        damage *= RAGE_DAMAGE_MULTIPLIER;
    }

    if partial_invincible {
        damage *= PARTIAL_INVINCIBLE_MULTIPLIER;
    }

    let mut result = DamageResult {
        damage,
        is_crit,
        cleared_invincibility,
        ..Default::default()
    };
    routing.apply(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::abilities::ResolvedAbilities;
    use super::super::defense::PenetrationKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn attacker(base: f64) -> AttackerStats {
        AttackerStats {
            base_damage: base,
            accuracy: 1000.0,
            ..Default::default()
        }
    }

    fn boss() -> BossCombatStats {
        BossCombatStats {
            defense: 0.0,
            evasion: 500.0,
            defense_rate: 0.0,
            crit_immune: false,
        }
    }

    fn mods(ids: &[&str]) -> AbilityModifiers {
        ResolvedAbilities::resolve(ids.iter().copied()).modifiers().clone()
    }

    fn run(
        attacker: &AttackerStats,
        abilities: &AbilityModifiers,
        boss: &BossCombatStats,
        pattern: &PatternState,
        shield: &ShieldState,
    ) -> DamageResult {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        calculate_damage(
            attacker,
            abilities,
            boss,
            pattern,
            shield,
            &CombatCounters::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_hit_chance_full_when_accuracy_meets_evasion() {
        assert_eq!(hit_chance(500.0, 500.0, false), 100.0);
        assert_eq!(hit_chance(900.0, 500.0, false), 100.0);
    }

    #[test]
    fn test_hit_chance_ratio_and_floor() {
        assert_eq!(hit_chance(250.0, 500.0, false), 50.0);
        assert_eq!(hit_chance(10.0, 500.0, false), 10.0);
        assert_eq!(hit_chance(10.0, 500.0, true), 100.0);
    }

    #[test]
    fn test_plain_hit_is_base_damage() {
        let result = run(
            &attacker(100.0),
            &AbilityModifiers::default(),
            &boss(),
            &PatternState::default(),
            &ShieldState::default(),
        );
        assert!(result.landed());
        assert!(!result.is_crit);
        assert_eq!(result.damage, 100.0);
        assert_eq!(result.shield_damage, 0.0);
    }

    #[test]
    fn test_guaranteed_crit_with_full_chance() {
        let mut a = attacker(100.0);
        a.crit_chance = 100.0;
        a.crit_damage = 50.0;
        let result = run(
            &a,
            &AbilityModifiers::default(),
            &boss(),
            &PatternState::default(),
            &ShieldState::default(),
        );
        assert!(result.is_crit);
        assert!((result.damage - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_crit_immune_boss_never_crits() {
        let mut a = attacker(100.0);
        a.crit_chance = 100.0;
        let b = BossCombatStats {
            crit_immune: true,
            ..boss()
        };
        let result = run(
            &a,
            &AbilityModifiers::default(),
            &b,
            &PatternState::default(),
            &ShieldState::default(),
        );
        assert!(!result.is_crit);
        assert_eq!(result.damage, 100.0);
    }

    #[test]
    fn test_crit_after_miss_forces_crit() {
        let abilities = mods(&["lethal_focus"]);
        let counters = CombatCounters {
            guaranteed_crit_next: true,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = calculate_damage(
            &attacker(100.0),
            &abilities,
            &boss(),
            &PatternState::default(),
            &ShieldState::default(),
            &counters,
            &mut rng,
        );
        assert!(result.is_crit);
        assert!((result.damage - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_guaranteed_flag_ignored_without_ability() {
        let counters = CombatCounters {
            guaranteed_crit_next: true,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = calculate_damage(
            &attacker(100.0),
            &AbilityModifiers::default(),
            &boss(),
            &PatternState::default(),
            &ShieldState::default(),
            &counters,
            &mut rng,
        );
        assert!(!result.is_crit);
    }

    #[test]
    fn test_flat_defense_applied() {
        let b = BossCombatStats {
            defense: 100.0,
            ..boss()
        };
        let result = run(
            &attacker(600.0),
            &AbilityModifiers::default(),
            &b,
            &PatternState::default(),
            &ShieldState::default(),
        );
        // reduction = 100/600
        assert!((result.damage - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_defense_rate_uses_summed_penetration() {
        let mut a = attacker(100.0);
        a.penetration_sources = vec![
            PenetrationSource::new(PenetrationKind::ClassTier, 10.0),
            PenetrationSource::new(PenetrationKind::Relic, 10.0),
        ];
        let b = BossCombatStats {
            defense_rate: 40.0,
            ..boss()
        };
        let result = run(
            &a,
            &AbilityModifiers::default(),
            &b,
            &PatternState::default(),
            &ShieldState::default(),
        );
        assert!((result.damage - 100.0 * 100.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_damage_percent_and_rage() {
        let mut a = attacker(100.0);
        a.final_damage_percent = 20.0;
        let pattern = PatternState {
            destruction_rage_active: true,
            ..Default::default()
        };
        let result = run(
            &a,
            &AbilityModifiers::default(),
            &boss(),
            &pattern,
            &ShieldState::default(),
        );
        assert!((result.damage - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_invincible_blocks_without_ability() {
        let pattern = PatternState {
            is_invincible: true,
            ..Default::default()
        };
        let result = run(
            &attacker(100.0),
            &AbilityModifiers::default(),
            &boss(),
            &pattern,
            &ShieldState::default(),
        );
        assert!(result.is_invincible);
        assert!(!result.is_miss);
        assert!(!result.is_crit);
        assert_eq!(result.damage, 0.0);
    }

    #[test]
    fn test_invincibility_break_lands_at_thirty_percent() {
        let pattern = PatternState {
            is_invincible: true,
            ..Default::default()
        };
        let result = run(
            &attacker(100.0),
            &mods(&["invincibility_break"]),
            &boss(),
            &pattern,
            &ShieldState::default(),
        );
        assert!(!result.is_invincible);
        assert!(!result.cleared_invincibility);
        assert!((result.damage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invincibility_destroy_clears_and_lands_full() {
        let pattern = PatternState {
            is_invincible: true,
            ..Default::default()
        };
        let result = run(
            &attacker(100.0),
            &mods(&["invincibility_break", "invincibility_destroy"]),
            &boss(),
            &pattern,
            &ShieldState::default(),
        );
        assert!(result.cleared_invincibility);
        assert_eq!(result.damage, 100.0);
    }

    #[test]
    fn test_shield_break_bonus_only_on_shield_damage() {
        let shield = ShieldState::raised(1000.0);
        let result = run(
            &attacker(100.0),
            &mods(&["shield_shatter"]),
            &boss(),
            &PatternState::default(),
            &shield,
        );
        assert_eq!(result.damage, 100.0);
        assert_eq!(result.shield_damage, 200.0);
        assert_eq!(result.shield_bypass_damage, 0.0);
        assert!(!result.bypass_shield);
    }

    #[test]
    fn test_shield_bypass_percent_split() {
        let shield = ShieldState::raised(1000.0);
        let result = run(
            &attacker(100.0),
            &mods(&["shield_pierce", "shield_break"]),
            &boss(),
            &PatternState::default(),
            &shield,
        );
        assert!((result.shield_bypass_damage - 30.0).abs() < 1e-9);
        assert!((result.shield_damage - 70.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_full_bypass_takes_precedence() {
        let shield = ShieldState::raised(1000.0);
        let result = run(
            &attacker(100.0),
            &mods(&["shield_bypass", "shield_pierce", "shield_shatter"]),
            &boss(),
            &PatternState::default(),
            &shield,
        );
        assert!(result.bypass_shield);
        assert_eq!(result.shield_damage, 0.0);
        assert_eq!(result.shield_bypass_damage, 0.0);
        assert_eq!(result.damage, 100.0);
    }

    #[test]
    fn test_low_accuracy_can_miss() {
        let mut a = attacker(100.0);
        a.accuracy = 1.0;
        let b = BossCombatStats {
            evasion: 1000.0,
            ..boss()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let misses = (0..1000)
            .map(|_| {
                calculate_damage(
                    &a,
                    &AbilityModifiers::default(),
                    &b,
                    &PatternState::default(),
                    &ShieldState::default(),
                    &CombatCounters::default(),
                    &mut rng,
                )
            })
            .filter(|r| r.is_miss)
            .count();
        // 10% floor -> roughly 900 misses
        assert!((850..950).contains(&misses), "misses = {misses}");
    }

    proptest! {
        #[test]
        fn prop_hit_chance_bounded(acc in 0.0f64..1e6, eva in 0.0f64..1e6) {
            let chance = hit_chance(acc, eva, false);
            prop_assert!((MIN_HIT_CHANCE..=MAX_HIT_CHANCE).contains(&chance));
            if acc >= eva {
                prop_assert_eq!(chance, 100.0);
            } else {
                prop_assert_eq!(chance, (acc / eva * 100.0).max(10.0));
            }
        }
    }
}
