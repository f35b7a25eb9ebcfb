//! The single mutable battle record.
//!
//! Only the session controller holds a `&mut BattleState`; the damage
//! pipeline and pattern machine read it and describe changes for the
//! controller to apply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Helmet,
    Gloves,
    Boots,
    Amulet,
    Ring,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 7] = [
        EquipmentSlot::Weapon,
        EquipmentSlot::Armor,
        EquipmentSlot::Helmet,
        EquipmentSlot::Gloves,
        EquipmentSlot::Boots,
        EquipmentSlot::Amulet,
        EquipmentSlot::Ring,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Helmet => "Helmet",
            EquipmentSlot::Gloves => "Gloves",
            EquipmentSlot::Boots => "Boots",
            EquipmentSlot::Amulet => "Amulet",
            EquipmentSlot::Ring => "Ring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShieldState {
    pub active: bool,
    pub hp: f64,
    pub max_hp: f64,
}

impl ShieldState {
    pub fn raised(max_hp: f64) -> Self {
        Self {
            active: true,
            hp: max_hp,
            max_hp,
        }
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.hp = 0.0;
    }
}

/// Concurrent boss pattern flags. Several may be set at once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternState {
    pub is_regenerating: bool,
    pub regen_amount: f64,
    pub regen_remaining_ms: u64,
    pub is_invincible: bool,
    pub invincible_remaining_ms: u64,
    pub destruction_rage_active: bool,
    pub destruction_rage_remaining_ms: u64,
}

/// Per-slot attack bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatCounters {
    pub total_attacks: u64,
    pub total_misses: u64,
    pub last_missed: bool,
    pub guaranteed_crit_next: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub boss_hp: f64,
    pub boss_max_hp: f64,
    pub hearts_remaining: u32,
    pub max_hearts: u32,
    pub shield: ShieldState,
    pub pattern: PatternState,
    /// Present only while the slot is destroyed; value is remaining ms
    pub destroyed_equipment: BTreeMap<EquipmentSlot, u64>,
    /// One entry per equipped ability slot
    pub combat_counters: Vec<CombatCounters>,
}

impl BattleState {
    pub fn new(boss_max_hp: f64, max_hearts: u32, slot_count: usize) -> Self {
        Self {
            boss_hp: boss_max_hp,
            boss_max_hp,
            hearts_remaining: max_hearts,
            max_hearts,
            shield: ShieldState::default(),
            pattern: PatternState::default(),
            destroyed_equipment: BTreeMap::new(),
            combat_counters: vec![CombatCounters::default(); slot_count],
        }
    }

    /// Lowers boss HP, never below zero. Returns the HP actually removed.
    pub fn damage_boss(&mut self, amount: f64) -> f64 {
        let before = self.boss_hp;
        self.boss_hp = (self.boss_hp - amount.max(0.0)).max(0.0);
        before - self.boss_hp
    }

    /// Raises boss HP, never above max. Returns the HP actually restored.
    pub fn heal_boss(&mut self, amount: f64) -> f64 {
        let before = self.boss_hp;
        self.boss_hp = (self.boss_hp + amount.max(0.0)).min(self.boss_max_hp);
        self.boss_hp - before
    }

    pub fn lose_heart(&mut self) -> u32 {
        self.hearts_remaining = self.hearts_remaining.saturating_sub(1);
        self.hearts_remaining
    }

    /// Returns true if a heart was restored (false at full pool).
    pub fn restore_heart(&mut self) -> bool {
        if self.hearts_remaining >= self.max_hearts {
            return false;
        }
        self.hearts_remaining += 1;
        true
    }

    pub fn is_boss_defeated(&self) -> bool {
        self.boss_hp <= 0.0
    }

    pub fn is_player_defeated(&self) -> bool {
        self.hearts_remaining == 0
    }

    pub fn is_destroyed(&self, slot: EquipmentSlot) -> bool {
        self.destroyed_equipment.contains_key(&slot)
    }

    pub fn intact_slots(&self) -> Vec<EquipmentSlot> {
        EquipmentSlot::ALL
            .into_iter()
            .filter(|slot| !self.is_destroyed(*slot))
            .collect()
    }

    /// Counters summed across every slot (`last_missed` and
    /// `guaranteed_crit_next` are true if any slot has them set).
    pub fn totals(&self) -> CombatCounters {
        self.combat_counters
            .iter()
            .fold(CombatCounters::default(), |acc, c| CombatCounters {
                total_attacks: acc.total_attacks + c.total_attacks,
                total_misses: acc.total_misses + c.total_misses,
                last_missed: acc.last_missed || c.last_missed,
                guaranteed_crit_next: acc.guaranteed_crit_next || c.guaranteed_crit_next,
            })
    }
}
