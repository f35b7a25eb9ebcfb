//! Battle engine: damage pipeline, boss patterns, timers and the session
//! controller that ties them together.

pub mod abilities;
pub mod attacker;
pub mod damage;
pub mod defense;
pub mod events;
pub mod pattern;
pub mod rewards;
pub mod rolls;
pub mod scheduler;
pub mod session;
pub mod state;

pub use abilities::{
    resolve_ability, AbilityEffect, AbilityModifiers, PipelineStage, ResolvedAbilities,
};
pub use attacker::{build_attacker_stats, EquipmentStats, PlayerProfile};
pub use damage::{calculate_damage, AttackerStats, BossCombatStats, DamageResult};
pub use defense::{PenetrationKind, PenetrationSource};
pub use events::{BattleEvent, BattleLog, BattleLogEntry, BattleOutcome, DefeatReason};
pub use pattern::PatternEvent;
pub use rewards::BattleRewards;
pub use scheduler::{Scheduler, TimerKind};
pub use session::{
    apply_damage_result, BattleCommand, BattleRequest, BattleSession, BattleSummary,
    DamageApplication, SessionStatus,
};
pub use state::{BattleState, CombatCounters, EquipmentSlot, PatternState, ShieldState};
