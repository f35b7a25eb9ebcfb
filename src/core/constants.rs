// Tick cadences (virtual milliseconds)
pub const ATTACK_INTERVAL_MS: u64 = 1000;
pub const BOSS_ATTACK_INTERVAL_MS: u64 = 5000;
pub const PATTERN_INTERVAL_MS: u64 = 5000;
pub const REGEN_TICK_MS: u64 = 2000;
pub const COUNTDOWN_TICK_MS: u64 = 100;
pub const DEFAULT_HEAL_OVER_TIME_MS: u64 = 15_000;

// Player survival
pub const MAX_HEARTS: u32 = 6;

// Hit / crit
pub const MIN_HIT_CHANCE: f64 = 10.0;
pub const MAX_HIT_CHANCE: f64 = 100.0;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;

// Flat defense: reduction = def / (def + DEFENSE_CONSTANT), capped
pub const DEFENSE_CONSTANT: f64 = 500.0;
pub const MAX_DEFENSE_REDUCTION: f64 = 0.30;

// Percentage defense-rate curve
pub const DEFENSE_RATE_CURVE: f64 = 100.0;

// Shield abilities
pub const SHIELD_BREAK_TIER_1_PERCENT: f64 = 50.0;
pub const SHIELD_BREAK_TIER_2_PERCENT: f64 = 100.0;

// Late-pipeline multipliers
pub const RAGE_DAMAGE_MULTIPLIER: f64 = 1.5;
pub const PARTIAL_INVINCIBLE_MULTIPLIER: f64 = 0.3;

// Boss patterns
pub const SHIELD_SPAWN_CHANCE: f64 = 30.0;
pub const SHIELD_HP_RATIO: f64 = 0.2;
pub const REGEN_TRIGGER_CHANCE: f64 = 25.0;
pub const MAX_HEAL_REDUCTION_PERCENT: f64 = 95.0;
pub const EQUIPMENT_DESTROY_DURATION_MS: u64 = 5000;
pub const DESTRUCTION_RAGE_DURATION_MS: u64 = 5000;
pub const DEFAULT_INVINCIBLE_DURATION_MS: u64 = 5000;

// Difficulty
pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 20;
pub const DIFFICULTY_SCALING_BASE: f64 = 1.5;

// Rewards
pub const BONUS_DROP_CHANCE: f64 = 10.0;
// Grade weights (per mille) for bonus inscription drops: Common..Mythic
pub const BONUS_DROP_GRADE_WEIGHTS: [u32; 6] = [500, 300, 140, 45, 12, 3];

// Presentation
pub const BATTLE_LOG_CAPACITY: usize = 20;
pub const BATTLE_HISTORY_CAPACITY: usize = 50;
