//! Integration tests for the staged damage pipeline.
//!
//! Exact roll sequences come from a scripted `RngCore` that replays fixed
//! 64-bit words; everything else uses seeded ChaCha8Rng.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sealed_zone::battle::defense::flat_defense_reduction;
use sealed_zone::battle::{
    apply_damage_result, calculate_damage, AbilityModifiers, AttackerStats, BattleState,
    BossCombatStats, CombatCounters, PatternState, PenetrationKind, PenetrationSource,
    ResolvedAbilities, ShieldState,
};

/// Replays a fixed list of words, cycling once exhausted.
struct ScriptedRng {
    words: Vec<u64>,
    index: usize,
}

impl ScriptedRng {
    /// Each roll is the `[0,100)` value `gen_range(0.0..100.0)` will produce.
    fn rolls(rolls: &[f64]) -> Self {
        Self {
            words: rolls.iter().map(|r| word_for_roll(*r)).collect(),
            index: 0,
        }
    }
}

fn word_for_roll(roll: f64) -> u64 {
    let fraction = roll / 100.0;
    ((fraction * (1u64 << 52) as f64) as u64) << 12
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        let word = self.words[self.index % self.words.len()];
        self.index += 1;
        word
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn attacker(base_damage: f64) -> AttackerStats {
    AttackerStats {
        base_damage,
        accuracy: 1000.0,
        ..Default::default()
    }
}

fn boss(defense: f64) -> BossCombatStats {
    BossCombatStats {
        defense,
        evasion: 500.0,
        defense_rate: 0.0,
        crit_immune: false,
    }
}

fn mods(ids: &[&str]) -> AbilityModifiers {
    ResolvedAbilities::resolve(ids.iter().copied())
        .modifiers()
        .clone()
}

fn invincible() -> PatternState {
    PatternState {
        is_invincible: true,
        invincible_remaining_ms: 5000,
        ..Default::default()
    }
}

#[test]
fn test_scenario_a_every_attack_lands_at_final_damage_scale() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let stats = AttackerStats {
        final_damage_percent: 20.0,
        penetration: 10.0,
        ..attacker(1000.0)
    };
    let b = boss(200.0);
    let expected = 1000.0 * (1.0 - flat_defense_reduction(200.0, 10.0)) * 1.2;

    for _ in 0..500 {
        let result = calculate_damage(
            &stats,
            &AbilityModifiers::default(),
            &b,
            &PatternState::default(),
            &ShieldState::default(),
            &CombatCounters::default(),
            &mut rng,
        );
        assert!(!result.is_miss);
        assert!(!result.is_crit);
        assert!((result.damage - expected).abs() < 1e-9);
    }
}

#[test]
fn test_roll_must_be_strictly_below_hit_chance() {
    let stats = AttackerStats {
        accuracy: 250.0,
        ..attacker(100.0)
    };
    let no_mods = AbilityModifiers::default();
    let run = |roll: f64| {
        let mut rng = ScriptedRng::rolls(&[roll, 99.0]);
        calculate_damage(
            &stats,
            &no_mods,
            &boss(0.0),
            &PatternState::default(),
            &ShieldState::default(),
            &CombatCounters::default(),
            &mut rng,
        )
    };
    assert!(!run(49.0).is_miss);
    assert!(run(50.0).is_miss);
}

#[test]
fn test_true_hit_ignores_evasion() {
    let stats = AttackerStats {
        accuracy: 1.0,
        ..attacker(100.0)
    };
    let mut rng = ScriptedRng::rolls(&[99.0]);
    let result = calculate_damage(
        &stats,
        &mods(&["true_hit"]),
        &boss(0.0),
        &PatternState::default(),
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!(result.landed());
}

#[test]
fn test_guaranteed_crit_needs_the_ability() {
    let counters = CombatCounters {
        total_attacks: 1,
        total_misses: 1,
        last_missed: true,
        guaranteed_crit_next: true,
    };
    let stats = AttackerStats {
        crit_damage: 50.0,
        ..attacker(100.0)
    };

    let mut rng = ScriptedRng::rolls(&[0.0, 99.0]);
    let with = calculate_damage(
        &stats,
        &mods(&["lethal_focus"]),
        &boss(0.0),
        &PatternState::default(),
        &ShieldState::default(),
        &counters,
        &mut rng,
    );
    assert!(with.is_crit);
    assert!((with.damage - 200.0).abs() < 1e-9);

    let mut rng = ScriptedRng::rolls(&[0.0, 99.0]);
    let without = calculate_damage(
        &stats,
        &AbilityModifiers::default(),
        &boss(0.0),
        &PatternState::default(),
        &ShieldState::default(),
        &counters,
        &mut rng,
    );
    assert!(!without.is_crit);
    assert_eq!(without.damage, 100.0);
}

#[test]
fn test_defense_rate_scales_with_summed_penetration() {
    let b = BossCombatStats {
        defense_rate: 40.0,
        ..boss(0.0)
    };
    let mut stats = attacker(1000.0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let bare = calculate_damage(
        &stats,
        &AbilityModifiers::default(),
        &b,
        &PatternState::default(),
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!((bare.damage - 1000.0 * 100.0 / 140.0).abs() < 1e-9);

    stats.penetration_sources = vec![
        PenetrationSource::new(PenetrationKind::ClassTier, 15.0),
        PenetrationSource::new(PenetrationKind::Relic, 25.0),
    ];
    let pierced = calculate_damage(
        &stats,
        &AbilityModifiers::default(),
        &b,
        &PatternState::default(),
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!((pierced.damage - 1000.0).abs() < 1e-9);
}

#[test]
fn test_scenario_c_shield_overflow_spills_to_hp() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = BattleState::new(10_000.0, 6, 1);
    state.shield = ShieldState::raised(1000.0);

    let result = calculate_damage(
        &attacker(800.0),
        &mods(&["shield_break"]),
        &boss(0.0),
        &state.pattern,
        &state.shield,
        &CombatCounters::default(),
        &mut rng,
    );
    assert!((result.shield_damage - 1200.0).abs() < 1e-9);
    assert!(!result.bypass_shield);

    let applied = apply_damage_result(&mut state, &result);
    assert!(applied.shield_broken);
    assert!(!state.shield.active);
    assert!((state.boss_hp - 9_800.0).abs() < 1e-9);
}

#[test]
fn test_full_bypass_wins_over_percentage() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let shield = ShieldState::raised(1000.0);
    let result = calculate_damage(
        &attacker(500.0),
        &mods(&["shield_bypass", "shield_pierce"]),
        &boss(0.0),
        &PatternState::default(),
        &shield,
        &CombatCounters::default(),
        &mut rng,
    );
    assert!(result.bypass_shield);
    assert_eq!(result.shield_damage, 0.0);
    assert_eq!(result.shield_bypass_damage, 0.0);

    let mut state = BattleState::new(10_000.0, 6, 1);
    state.shield = shield;
    apply_damage_result(&mut state, &result);
    assert_eq!(state.shield.hp, 1000.0);
    assert_eq!(state.boss_hp, 9_500.0);
}

#[test]
fn test_percentage_bypass_lands_through_shield() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut state = BattleState::new(10_000.0, 6, 1);
    state.shield = ShieldState::raised(1000.0);
    let result = calculate_damage(
        &attacker(500.0),
        &mods(&["shield_pierce"]),
        &boss(0.0),
        &state.pattern,
        &state.shield,
        &CombatCounters::default(),
        &mut rng,
    );
    assert!((result.shield_bypass_damage - 150.0).abs() < 1e-9);
    assert!((result.shield_damage - 350.0).abs() < 1e-9);

    apply_damage_result(&mut state, &result);
    assert!((state.shield.hp - 650.0).abs() < 1e-9);
    assert!((state.boss_hp - 9_850.0).abs() < 1e-9);
}

#[test]
fn test_scenario_d_invincibility_blocks_without_ability() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..20 {
        let result = calculate_damage(
            &attacker(1000.0),
            &AbilityModifiers::default(),
            &boss(0.0),
            &invincible(),
            &ShieldState::default(),
            &CombatCounters::default(),
            &mut rng,
        );
        assert!(result.is_invincible);
        assert!(!result.is_miss);
        assert_eq!(result.damage, 0.0);
    }
}

#[test]
fn test_scenario_d_destroy_clears_and_lands_in_full() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let result = calculate_damage(
        &attacker(1000.0),
        &mods(&["invincibility_destroy"]),
        &boss(0.0),
        &invincible(),
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!(result.cleared_invincibility);
    assert!(!result.is_invincible);
    assert_eq!(result.damage, 1000.0);
}

#[test]
fn test_break_lands_at_partial_rate() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let result = calculate_damage(
        &attacker(1000.0),
        &mods(&["invincibility_break"]),
        &boss(0.0),
        &invincible(),
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!(!result.cleared_invincibility);
    assert!((result.damage - 300.0).abs() < 1e-9);
}

#[test]
fn test_rage_multiplies_after_final_damage() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let stats = AttackerStats {
        final_damage_percent: 50.0,
        ..attacker(100.0)
    };
    let pattern = PatternState {
        destruction_rage_active: true,
        destruction_rage_remaining_ms: 5000,
        ..Default::default()
    };
    let result = calculate_damage(
        &stats,
        &AbilityModifiers::default(),
        &boss(0.0),
        &pattern,
        &ShieldState::default(),
        &CombatCounters::default(),
        &mut rng,
    );
    assert!((result.damage - 225.0).abs() < 1e-9);
}
