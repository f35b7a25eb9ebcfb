//! Events produced by battle session steps, and the bounded battle log.
//!
//! The presentation layer maps [`BattleEvent`]s to effects and log lines;
//! the engine never touches UI types.

use super::pattern::PatternEvent;
use super::rewards::BattleRewards;
use crate::core::constants::BATTLE_LOG_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatReason {
    HeartsDepleted,
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory { rewards: BattleRewards },
    Defeat { reason: DefeatReason },
}

impl BattleOutcome {
    pub fn is_victory(&self) -> bool {
        matches!(self, BattleOutcome::Victory { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    // ── Player attacks ──────────────────────────────────────────
    AttackLanded {
        slot: usize,
        damage: f64,
        is_crit: bool,
        shield_absorbed: f64,
        hp_damage: f64,
    },
    AttackMissed {
        slot: usize,
    },
    /// Blocked by boss invincibility
    AttackBlocked {
        slot: usize,
    },
    /// The slot's inscription no longer exists in the catalog
    AttackSkipped {
        slot: usize,
        inscription_id: String,
    },
    ShieldBroken,
    InvincibilityDestroyed {
        slot: usize,
    },

    // ── Survival ────────────────────────────────────────────────
    HeartLost {
        remaining: u32,
    },
    HeartRestored {
        remaining: u32,
    },

    // ── Boss ────────────────────────────────────────────────────
    Pattern(PatternEvent),

    // ── Lifecycle ───────────────────────────────────────────────
    BattleEnded {
        outcome: BattleOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    pub at_ms: u64,
    pub message: String,
    pub is_crit: bool,
    pub is_player_action: bool,
}

/// Most recent battle log lines, oldest dropped first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleLog {
    entries: VecDeque<BattleLogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(BATTLE_LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, at_ms: u64, message: String, is_crit: bool, is_player_action: bool) {
        if self.entries.len() >= BATTLE_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(BattleLogEntry {
            at_ms,
            message,
            is_crit,
            is_player_action,
        });
    }

    pub fn record(&mut self, at_ms: u64, event: &BattleEvent) {
        let (message, is_crit, is_player_action) = describe(event);
        self.push(at_ms, message, is_crit, is_player_action);
    }

    pub fn entries(&self) -> impl Iterator<Item = &BattleLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe(event: &BattleEvent) -> (String, bool, bool) {
    match event {
        BattleEvent::AttackLanded {
            slot,
            damage,
            is_crit,
            shield_absorbed,
            ..
        } => {
            let crit = if *is_crit { " CRITICAL!" } else { "" };
            let message = if *shield_absorbed > 0.0 {
                format!(
                    "Slot {} hits for {:.0} ({:.0} into the shield){}",
                    slot + 1,
                    damage,
                    shield_absorbed,
                    crit
                )
            } else {
                format!("Slot {} hits for {:.0}{}", slot + 1, damage, crit)
            };
            (message, *is_crit, true)
        }
        BattleEvent::AttackMissed { slot } => (format!("Slot {} misses", slot + 1), false, true),
        BattleEvent::AttackBlocked { slot } => (
            format!("Slot {} glances off the invincible boss", slot + 1),
            false,
            true,
        ),
        BattleEvent::AttackSkipped {
            slot,
            inscription_id,
        } => (
            format!("Slot {} idles: {} is unavailable", slot + 1, inscription_id),
            false,
            true,
        ),
        BattleEvent::ShieldBroken => ("The shield shatters!".to_string(), false, true),
        BattleEvent::InvincibilityDestroyed { slot } => (
            format!("Slot {} tears through the boss's invincibility", slot + 1),
            false,
            true,
        ),
        BattleEvent::HeartLost { remaining } => (
            format!("The boss strikes! {} hearts left", remaining),
            false,
            false,
        ),
        BattleEvent::HeartRestored { remaining } => (
            format!("A heart mends ({} hearts)", remaining),
            false,
            true,
        ),
        BattleEvent::Pattern(pattern) => (describe_pattern(pattern), false, false),
        BattleEvent::BattleEnded { outcome } => {
            let message = match outcome {
                BattleOutcome::Victory { rewards } => format!(
                    "Victory! +{} gold, +{} seal stones",
                    rewards.gold, rewards.seal_stones
                ),
                BattleOutcome::Defeat {
                    reason: DefeatReason::HeartsDepleted,
                } => "Defeated. Your ticket has been returned".to_string(),
                BattleOutcome::Defeat {
                    reason: DefeatReason::Forfeit,
                } => "You withdrew from the sealed zone".to_string(),
            };
            (message, false, false)
        }
    }
}

fn describe_pattern(event: &PatternEvent) -> String {
    match event {
        PatternEvent::ShieldRaised { hp } => format!("The boss raises a {:.0} HP shield", hp),
        PatternEvent::RegenerationStarted { amount_per_tick } => {
            format!("The boss begins regenerating {:.0} HP", amount_per_tick)
        }
        PatternEvent::BossHealed { amount } => format!("The boss heals {:.0}", amount),
        PatternEvent::RegenerationEnded => "The boss stops regenerating".to_string(),
        PatternEvent::EquipmentDestroyed { slot, .. } => {
            format!("Your {} is destroyed!", slot.name())
        }
        PatternEvent::EquipmentProtected => "Your equipment resists destruction".to_string(),
        PatternEvent::EquipmentRestored { slot } => format!("Your {} is restored", slot.name()),
        PatternEvent::RageStarted { .. } => "Rage surges through you!".to_string(),
        PatternEvent::RageEnded => "Your rage fades".to_string(),
        PatternEvent::InvincibilityStarted { duration_ms } => format!(
            "The boss becomes invincible for {:.1}s",
            *duration_ms as f64 / 1000.0
        ),
        PatternEvent::InvincibilityEnded => "The boss is vulnerable again".to_string(),
    }
}
