//! Battle tuning configuration.
//!
//! Every field defaults to the matching constant in [`crate::core::constants`].
//! Callers may override a subset by deserializing a partial JSON object.

use super::constants::*;
use super::error::CatalogError;
use serde::{Deserialize, Serialize};

/// Cadences and chances used by a battle session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Per-slot attack cadence
    pub attack_interval_ms: u64,

    /// Boss auto-attack cadence (one heart per hit)
    pub boss_attack_interval_ms: u64,

    /// Regeneration heal cadence while a regen is active
    pub regen_tick_ms: u64,

    /// Countdown cadence for invincibility, destruction and rage timers
    pub countdown_tick_ms: u64,

    /// Starting heart pool
    pub max_hearts: u32,

    /// Chance (0-100) that a shield spawns on a pattern activation
    pub shield_spawn_chance: f64,

    /// Chance (0-100) that regeneration starts on a pattern activation
    pub regen_trigger_chance: f64,

    /// How long a destroyed equipment slot stays destroyed
    pub equipment_destroy_ms: u64,

    /// How long the destruction rage buff lasts
    pub destruction_rage_ms: u64,

    /// Chance (0-100) of a bonus inscription drop on victory
    pub bonus_drop_chance: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            attack_interval_ms: ATTACK_INTERVAL_MS,
            boss_attack_interval_ms: BOSS_ATTACK_INTERVAL_MS,
            regen_tick_ms: REGEN_TICK_MS,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            max_hearts: MAX_HEARTS,
            shield_spawn_chance: SHIELD_SPAWN_CHANCE,
            regen_trigger_chance: REGEN_TRIGGER_CHANCE,
            equipment_destroy_ms: EQUIPMENT_DESTROY_DURATION_MS,
            destruction_rage_ms: DESTRUCTION_RAGE_DURATION_MS,
            bonus_drop_chance: BONUS_DROP_CHANCE,
        }
    }
}

impl BattleConfig {
    /// Load a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let config: BattleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let cadences = [
            ("attack_interval_ms", self.attack_interval_ms),
            ("boss_attack_interval_ms", self.boss_attack_interval_ms),
            ("regen_tick_ms", self.regen_tick_ms),
            ("countdown_tick_ms", self.countdown_tick_ms),
        ];
        for (name, value) in cadences {
            if value == 0 {
                return Err(CatalogError::InvalidValue {
                    id: "config".to_string(),
                    reason: format!("{name} must be positive"),
                });
            }
        }
        if self.max_hearts == 0 || self.max_hearts > MAX_HEARTS {
            return Err(CatalogError::InvalidValue {
                id: "config".to_string(),
                reason: format!("max_hearts must be in 1..={MAX_HEARTS}"),
            });
        }
        Ok(())
    }
}
