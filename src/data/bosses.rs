//! Sealed zone boss definitions.

use super::difficulty::DifficultyLevel;
use crate::core::constants::{DEFAULT_INVINCIBLE_DURATION_MS, PATTERN_INTERVAL_MS};
use crate::core::error::CatalogError;
use serde::{Deserialize, Serialize};

/// Primary boss behavior driven by the pattern activation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    #[default]
    None,
    Shield,
    Regeneration,
    EquipmentDestroy,
    Invincible,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::None => "None",
            PatternKind::Shield => "Shield",
            PatternKind::Regeneration => "Regeneration",
            PatternKind::EquipmentDestroy => "Equipment Destroy",
            PatternKind::Invincible => "Invincible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossStats {
    pub hp: f64,
    pub defense: f64,
    pub evasion: f64,
    /// Percentage damage reduction countered only by summed penetration
    #[serde(default)]
    pub defense_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPattern {
    pub kind: PatternKind,
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Invincibility window length
    #[serde(default = "default_duration")]
    pub duration_ms: u64,
    /// Roll for a fresh shield on every activation
    #[serde(default)]
    pub shield_regen: bool,
    /// Start the battle with a full shield
    #[serde(default)]
    pub initial_shield: bool,
    /// Percent of max HP healed per regen tick
    #[serde(default)]
    pub regen_rate: Option<f64>,
    #[serde(default)]
    pub crit_immune: bool,
}

fn default_interval() -> u64 {
    PATTERN_INTERVAL_MS
}

fn default_duration() -> u64 {
    DEFAULT_INVINCIBLE_DURATION_MS
}

impl BossPattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            interval_ms: PATTERN_INTERVAL_MS,
            duration_ms: DEFAULT_INVINCIBLE_DURATION_MS,
            shield_regen: false,
            initial_shield: false,
            regen_rate: None,
            crit_immune: false,
        }
    }

    pub fn declares_shield(&self) -> bool {
        self.shield_regen
    }

    pub fn declares_regen(&self) -> bool {
        self.regen_rate.is_some_and(|rate| rate > 0.0)
    }

    pub fn declares_equipment_destroy(&self) -> bool {
        self.kind == PatternKind::EquipmentDestroy
    }

    pub fn declares_invincibility(&self) -> bool {
        self.kind == PatternKind::Invincible
    }

    /// Whether the activation tick has anything to evaluate.
    pub fn is_active(&self) -> bool {
        self.declares_shield()
            || self.declares_regen()
            || self.declares_equipment_destroy()
            || self.declares_invincibility()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BossRewards {
    pub gold: u64,
    pub seal_stones: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_stats: BossStats,
    pub pattern: BossPattern,
    #[serde(default)]
    pub rewards: BossRewards,
    /// Inscription ids eligible for the bonus drop
    #[serde(default)]
    pub drop_table: Vec<String>,
}

/// A boss with difficulty scaling applied. Built once at battle start.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledBoss {
    pub id: String,
    pub name: String,
    pub difficulty: DifficultyLevel,
    pub max_hp: f64,
    pub defense: f64,
    pub evasion: f64,
    pub defense_rate: f64,
    pub pattern: BossPattern,
    pub rewards: BossRewards,
    pub drop_table: Vec<String>,
}

impl BossDefinition {
    /// Applies the difficulty multiplier to hp, defense and rewards.
    pub fn scaled(&self, difficulty: DifficultyLevel) -> ScaledBoss {
        let mult = difficulty.multiplier();
        ScaledBoss {
            id: self.id.clone(),
            name: self.name.clone(),
            difficulty,
            max_hp: (self.base_stats.hp * mult).round().max(1.0),
            defense: self.base_stats.defense * mult,
            evasion: self.base_stats.evasion,
            defense_rate: self.base_stats.defense_rate,
            pattern: self.pattern.clone(),
            rewards: BossRewards {
                gold: (self.rewards.gold as f64 * mult).round() as u64,
                seal_stones: (self.rewards.seal_stones as f64 * mult).round() as u64,
            },
            drop_table: self.drop_table.clone(),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidValue {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.base_stats.hp <= 0.0 {
            return Err(invalid("hp must be positive"));
        }
        if self.base_stats.defense < 0.0 || self.base_stats.evasion < 0.0 {
            return Err(invalid("defense and evasion must not be negative"));
        }
        if !(0.0..=100.0).contains(&self.base_stats.defense_rate) {
            return Err(invalid("defense_rate must be within 0..=100"));
        }
        if self.pattern.interval_ms == 0 {
            return Err(invalid("pattern interval must be positive"));
        }
        if let Some(rate) = self.pattern.regen_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(invalid("regen_rate must be within 0..=100"));
            }
        }
        let timed = self.pattern.declares_regen() || self.pattern.declares_invincibility();
        if timed && self.pattern.duration_ms == 0 {
            return Err(invalid("pattern duration must be positive"));
        }
        Ok(())
    }
}

/// Read-only boss table, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BossCatalog {
    bosses: Vec<BossDefinition>,
}

impl BossCatalog {
    pub fn new(bosses: Vec<BossDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for boss in bosses {
            boss.validate()?;
            if catalog.get(&boss.id).is_some() {
                return Err(CatalogError::DuplicateId(boss.id));
            }
            catalog.bosses.push(boss);
        }
        Ok(catalog)
    }

    /// Parses a JSON array of boss definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let bosses: Vec<BossDefinition> = serde_json::from_str(json)?;
        Self::new(bosses)
    }

    pub fn get(&self, id: &str) -> Option<&BossDefinition> {
        self.bosses.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossDefinition> {
        self.bosses.iter()
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }

    /// The shipped sealed zone roster, one boss per pattern.
    pub fn builtin() -> Self {
        Self {
            bosses: builtin_bosses(),
        }
    }
}

fn boss(
    id: &str,
    name: &str,
    description: &str,
    base_stats: BossStats,
    pattern: BossPattern,
    rewards: BossRewards,
    drop_table: &[&str],
) -> BossDefinition {
    BossDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        base_stats,
        pattern,
        rewards,
        drop_table: drop_table.iter().map(|s| s.to_string()).collect(),
    }
}

fn builtin_bosses() -> Vec<BossDefinition> {
    vec![
        boss(
            "stone_warden",
            "Stone Warden",
            "A granite sentinel that hides behind layered wards.",
            BossStats {
                hp: 60_000.0,
                defense: 300.0,
                evasion: 300.0,
                defense_rate: 0.0,
            },
            BossPattern {
                shield_regen: true,
                initial_shield: true,
                ..BossPattern::new(PatternKind::Shield)
            },
            BossRewards {
                gold: 5_000,
                seal_stones: 20,
            },
            &["ember_sigil", "ward_splitter", "true_sight"],
        ),
        boss(
            "bloodroot_hydra",
            "Bloodroot Hydra",
            "Every severed head grows back unless its wounds are seared.",
            BossStats {
                hp: 80_000.0,
                defense: 200.0,
                evasion: 350.0,
                defense_rate: 0.0,
            },
            BossPattern {
                regen_rate: Some(3.0),
                ..BossPattern::new(PatternKind::Regeneration)
            },
            BossRewards {
                gold: 6_000,
                seal_stones: 25,
            },
            &["ember_sigil", "searing_brand", "twin_fang"],
        ),
        boss(
            "iron_devourer",
            "Iron Devourer",
            "Feeds on forged steel, tearing gear from those who stand near.",
            BossStats {
                hp: 70_000.0,
                defense: 400.0,
                evasion: 250.0,
                defense_rate: 0.0,
            },
            BossPattern::new(PatternKind::EquipmentDestroy),
            BossRewards {
                gold: 6_500,
                seal_stones: 25,
            },
            &["steadfast_rune", "berserker_mark", "twin_fang"],
        ),
        boss(
            "phantom_regent",
            "Phantom Regent",
            "Slips between planes, untouchable for long stretches.",
            BossStats {
                hp: 65_000.0,
                defense: 250.0,
                evasion: 500.0,
                defense_rate: 0.0,
            },
            BossPattern {
                duration_ms: 5_000,
                ..BossPattern::new(PatternKind::Invincible)
            },
            BossRewards {
                gold: 7_000,
                seal_stones: 30,
            },
            &["veil_piercer", "seal_breaker", "anchor_glyph"],
        ),
        boss(
            "obsidian_colossus",
            "Obsidian Colossus",
            "Its glassy hide turns aside all but the sharpest edges.",
            BossStats {
                hp: 100_000.0,
                defense: 600.0,
                evasion: 200.0,
                defense_rate: 40.0,
            },
            BossPattern {
                crit_immune: true,
                ..BossPattern::new(PatternKind::None)
            },
            BossRewards {
                gold: 9_000,
                seal_stones: 40,
            },
            &["ember_sigil", "true_sight", "seal_breaker"],
        ),
    ]
}
