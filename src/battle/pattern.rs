//! Boss pattern state machine.
//!
//! Pattern effects are independent flags on [`PatternState`] (plus the
//! shield and destroyed-equipment map), so several can be live at once.
//! Transitions happen only on the activation tick, the regeneration tick
//! and the countdown tick. The session controller calls these while it
//! holds the battle state; nothing here keeps state of its own.

use super::abilities::AbilityModifiers;
use super::rolls::roll_chance;
use super::state::{BattleState, EquipmentSlot, ShieldState};
use crate::core::config::BattleConfig;
use crate::core::constants::{MAX_HEAL_REDUCTION_PERCENT, SHIELD_HP_RATIO};
use crate::data::ScaledBoss;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatternEvent {
    ShieldRaised { hp: f64 },
    RegenerationStarted { amount_per_tick: f64 },
    BossHealed { amount: f64 },
    RegenerationEnded,
    EquipmentDestroyed { slot: EquipmentSlot, duration_ms: u64 },
    /// Destruction was prevented by equipment immunity
    EquipmentProtected,
    EquipmentRestored { slot: EquipmentSlot },
    RageStarted { duration_ms: u64 },
    RageEnded,
    InvincibilityStarted { duration_ms: u64 },
    InvincibilityEnded,
}

/// Read-only inputs for a pattern tick.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    pub boss: &'a ScaledBoss,
    /// Loadout-wide ability modifiers
    pub loadout: &'a AbilityModifiers,
    pub config: &'a BattleConfig,
}

/// Heal applied per regeneration tick after heal reduction (capped at 95%).
pub fn regen_heal_amount(regen_amount: f64, heal_reduction_percent: f64) -> f64 {
    let reduction = heal_reduction_percent.clamp(0.0, MAX_HEAL_REDUCTION_PERCENT);
    regen_amount * (1.0 - reduction / 100.0)
}

/// Invincibility window length, halved by invincibility resistance.
pub fn invincibility_duration(base_ms: u64, resist: bool) -> u64 {
    if resist {
        base_ms / 2
    } else {
        base_ms
    }
}

/// Applies battle-start pattern state (initial shield).
pub fn seed_initial_state(boss: &ScaledBoss, state: &mut BattleState) -> Vec<PatternEvent> {
    if boss.pattern.initial_shield {
        let hp = boss.max_hp * SHIELD_HP_RATIO;
        state.shield = ShieldState::raised(hp);
        return vec![PatternEvent::ShieldRaised { hp }];
    }
    Vec::new()
}

/// Pattern activation tick: evaluates every sub-pattern the boss declares.
pub fn on_activation(
    ctx: &PatternContext<'_>,
    state: &mut BattleState,
    rng: &mut impl Rng,
) -> Vec<PatternEvent> {
    let mut events = Vec::new();
    let pattern = &ctx.boss.pattern;

    if pattern.declares_shield() && roll_chance(ctx.config.shield_spawn_chance, rng) {
        let hp = state.boss_max_hp * SHIELD_HP_RATIO;
        state.shield = ShieldState::raised(hp);
        events.push(PatternEvent::ShieldRaised { hp });
    }

    if let Some(rate) = pattern.regen_rate.filter(|r| *r > 0.0) {
        if roll_chance(ctx.config.regen_trigger_chance, rng) {
            let amount = state.boss_max_hp * rate / 100.0;
            state.pattern.is_regenerating = true;
            state.pattern.regen_amount = amount;
            state.pattern.regen_remaining_ms = pattern.duration_ms;
            events.push(PatternEvent::RegenerationStarted {
                amount_per_tick: amount,
            });
        }
    }

    if pattern.declares_equipment_destroy() {
        events.extend(destroy_equipment(ctx, state, rng));
    }

    if pattern.declares_invincibility() && !state.pattern.is_invincible {
        let duration_ms =
            invincibility_duration(pattern.duration_ms, ctx.loadout.invincibility_resist);
        if duration_ms > 0 {
            state.pattern.is_invincible = true;
            state.pattern.invincible_remaining_ms = duration_ms;
            events.push(PatternEvent::InvincibilityStarted { duration_ms });
        }
    }

    for event in &events {
        tracing::debug!(boss = %ctx.boss.id, ?event, "pattern activation");
    }
    events
}

fn destroy_equipment(
    ctx: &PatternContext<'_>,
    state: &mut BattleState,
    rng: &mut impl Rng,
) -> Vec<PatternEvent> {
    if ctx.loadout.equipment_immunity {
        return vec![PatternEvent::EquipmentProtected];
    }
    let intact = state.intact_slots();
    if intact.is_empty() {
        return Vec::new();
    }
    let slot = intact[rng.gen_range(0..intact.len())];
    let duration_ms = ctx.config.equipment_destroy_ms;
    state.destroyed_equipment.insert(slot, duration_ms);
    let mut events = vec![PatternEvent::EquipmentDestroyed { slot, duration_ms }];

    if ctx.loadout.rage_on_destroy {
        let rage_ms = ctx.config.destruction_rage_ms;
        state.pattern.destruction_rage_active = true;
        state.pattern.destruction_rage_remaining_ms = rage_ms;
        events.push(PatternEvent::RageStarted {
            duration_ms: rage_ms,
        });
    }
    events
}

/// Regeneration tick: heals the boss while a regeneration is active.
pub fn on_regen_tick(state: &mut BattleState, loadout: &AbilityModifiers) -> Vec<PatternEvent> {
    if !state.pattern.is_regenerating {
        return Vec::new();
    }
    let heal = regen_heal_amount(state.pattern.regen_amount, loadout.heal_reduction_percent);
    let amount = state.heal_boss(heal);
    vec![PatternEvent::BossHealed { amount }]
}

/// Countdowns an activation just (re)armed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmedCountdowns {
    pub destroyed: Vec<EquipmentSlot>,
    pub rage: bool,
    pub invincibility: bool,
    pub regeneration: bool,
}

impl ArmedCountdowns {
    pub fn from_events(events: &[PatternEvent]) -> Self {
        let mut armed = Self::default();
        for event in events {
            match event {
                PatternEvent::EquipmentDestroyed { slot, .. } => armed.destroyed.push(*slot),
                PatternEvent::RageStarted { .. } => armed.rage = true,
                PatternEvent::InvincibilityStarted { .. } => armed.invincibility = true,
                PatternEvent::RegenerationStarted { .. } => armed.regeneration = true,
                _ => {}
            }
        }
        armed
    }
}

/// Countdown tick: advances every running pattern timer by `elapsed_ms`.
///
/// A timer ends on the tick where its remaining time reaches zero.
pub fn on_countdown_tick(state: &mut BattleState, elapsed_ms: u64) -> Vec<PatternEvent> {
    on_countdown_tick_holding(state, elapsed_ms, &ArmedCountdowns::default())
}

/// Countdown tick that leaves the `held` timers untouched for this fire.
pub fn on_countdown_tick_holding(
    state: &mut BattleState,
    elapsed_ms: u64,
    held: &ArmedCountdowns,
) -> Vec<PatternEvent> {
    let mut events = Vec::new();

    let mut restored = Vec::new();
    for (slot, remaining) in state.destroyed_equipment.iter_mut() {
        if held.destroyed.contains(slot) {
            continue;
        }
        *remaining = remaining.saturating_sub(elapsed_ms);
        if *remaining == 0 {
            restored.push(*slot);
        }
    }
    for slot in restored {
        state.destroyed_equipment.remove(&slot);
        events.push(PatternEvent::EquipmentRestored { slot });
    }

    let pattern = &mut state.pattern;

    if pattern.destruction_rage_active && !held.rage {
        pattern.destruction_rage_remaining_ms =
            pattern.destruction_rage_remaining_ms.saturating_sub(elapsed_ms);
        if pattern.destruction_rage_remaining_ms == 0 {
            pattern.destruction_rage_active = false;
            events.push(PatternEvent::RageEnded);
        }
    }

    if pattern.is_invincible && !held.invincibility {
        pattern.invincible_remaining_ms =
            pattern.invincible_remaining_ms.saturating_sub(elapsed_ms);
        if pattern.invincible_remaining_ms == 0 {
            pattern.is_invincible = false;
            events.push(PatternEvent::InvincibilityEnded);
        }
    }

    if pattern.is_regenerating && !held.regeneration {
        pattern.regen_remaining_ms = pattern.regen_remaining_ms.saturating_sub(elapsed_ms);
        if pattern.regen_remaining_ms == 0 {
            pattern.is_regenerating = false;
            pattern.regen_amount = 0.0;
            events.push(PatternEvent::RegenerationEnded);
        }
    }

    events
}

/// Whether any countdown-driven effect is still running.
pub fn has_running_countdowns(state: &BattleState) -> bool {
    !state.destroyed_equipment.is_empty()
        || state.pattern.destruction_rage_active
        || state.pattern.is_invincible
        || state.pattern.is_regenerating
}
