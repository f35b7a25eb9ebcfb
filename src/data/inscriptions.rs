//! Inscription definitions and grade scaling.

use crate::core::error::CatalogError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InscriptionGrade {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    Mythic = 5,
}

impl InscriptionGrade {
    pub const ALL: [InscriptionGrade; 6] = [
        InscriptionGrade::Common,
        InscriptionGrade::Uncommon,
        InscriptionGrade::Rare,
        InscriptionGrade::Epic,
        InscriptionGrade::Legendary,
        InscriptionGrade::Mythic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InscriptionGrade::Common => "Common",
            InscriptionGrade::Uncommon => "Uncommon",
            InscriptionGrade::Rare => "Rare",
            InscriptionGrade::Epic => "Epic",
            InscriptionGrade::Legendary => "Legendary",
            InscriptionGrade::Mythic => "Mythic",
        }
    }

    /// Stat multiplier applied to every numeric base stat.
    pub fn multiplier(&self) -> f64 {
        match self {
            InscriptionGrade::Common => 1.0,
            InscriptionGrade::Uncommon => 1.5,
            InscriptionGrade::Rare => 2.2,
            InscriptionGrade::Epic => 3.2,
            InscriptionGrade::Legendary => 4.5,
            InscriptionGrade::Mythic => 6.5,
        }
    }

    /// Special abilities only awaken from Epic upward.
    pub fn unlocks_special(&self) -> bool {
        *self >= InscriptionGrade::Epic
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InscriptionStats {
    pub attack: f64,
    pub final_damage_percent: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub accuracy: f64,
    pub penetration: f64,
}

impl InscriptionStats {
    fn scaled(&self, mult: f64) -> Self {
        Self {
            attack: self.attack * mult,
            final_damage_percent: self.final_damage_percent * mult,
            crit_chance: self.crit_chance * mult,
            crit_damage: self.crit_damage * mult,
            accuracy: self.accuracy * mult,
            penetration: self.penetration * mult,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InscriptionDefinition {
    pub id: String,
    pub name: String,
    pub base_stats: InscriptionStats,
    /// Always-on ability ids
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub special_ability: Option<String>,
}

/// An owned inscription: which definition, at which grade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InscriptionInstance {
    pub inscription_id: String,
    pub grade: InscriptionGrade,
}

impl InscriptionInstance {
    pub fn new(inscription_id: impl Into<String>, grade: InscriptionGrade) -> Self {
        Self {
            inscription_id: inscription_id.into(),
            grade,
        }
    }
}

/// Grade-scaled stats plus the abilities active at that grade.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedInscription {
    pub name: String,
    pub grade: InscriptionGrade,
    pub stats: InscriptionStats,
    pub abilities: Vec<String>,
    pub special_ability: Option<String>,
}

impl DerivedInscription {
    /// Every active ability id, always-on first, special last.
    pub fn ability_ids(&self) -> impl Iterator<Item = &str> {
        self.abilities
            .iter()
            .map(String::as_str)
            .chain(self.special_ability.as_deref())
    }
}

impl InscriptionDefinition {
    pub fn derive(&self, grade: InscriptionGrade) -> DerivedInscription {
        DerivedInscription {
            name: self.name.clone(),
            grade,
            stats: self.base_stats.scaled(grade.multiplier()),
            abilities: self.abilities.clone(),
            special_ability: if grade.unlocks_special() {
                self.special_ability.clone()
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InscriptionCatalog {
    inscriptions: Vec<InscriptionDefinition>,
}

impl InscriptionCatalog {
    pub fn new(inscriptions: Vec<InscriptionDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for def in inscriptions {
            if catalog.get(&def.id).is_some() {
                return Err(CatalogError::DuplicateId(def.id));
            }
            let s = &def.base_stats;
            let values = [
                s.attack,
                s.crit_chance,
                s.crit_damage,
                s.accuracy,
                s.penetration,
                s.final_damage_percent,
            ];
            if values.iter().any(|v| *v < 0.0)
            {
                return Err(CatalogError::InvalidValue {
                    id: def.id.clone(),
                    reason: "stats must not be negative".to_string(),
                });
            }
            catalog.inscriptions.push(def);
        }
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let inscriptions: Vec<InscriptionDefinition> = serde_json::from_str(json)?;
        Self::new(inscriptions)
    }

    pub fn get(&self, id: &str) -> Option<&InscriptionDefinition> {
        self.inscriptions.iter().find(|i| i.id == id)
    }

    pub fn derive(&self, instance: &InscriptionInstance) -> Option<DerivedInscription> {
        self.get(&instance.inscription_id)
            .map(|def| def.derive(instance.grade))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InscriptionDefinition> {
        self.inscriptions.iter()
    }

    /// Drops a definition. Sessions already running skip slots that
    /// reference it.
    pub fn remove(&mut self, id: &str) -> Option<InscriptionDefinition> {
        let index = self.inscriptions.iter().position(|i| i.id == id)?;
        Some(self.inscriptions.remove(index))
    }

    pub fn builtin() -> Self {
        Self {
            inscriptions: builtin_inscriptions(),
        }
    }
}

fn inscription(
    id: &str,
    name: &str,
    base_stats: InscriptionStats,
    abilities: &[&str],
    special_ability: Option<&str>,
) -> InscriptionDefinition {
    InscriptionDefinition {
        id: id.to_string(),
        name: name.to_string(),
        base_stats,
        abilities: abilities.iter().map(|s| s.to_string()).collect(),
        special_ability: special_ability.map(str::to_string),
    }
}

fn stats(
    attack: f64,
    final_damage_percent: f64,
    crit_chance: f64,
    crit_damage: f64,
    accuracy: f64,
    penetration: f64,
) -> InscriptionStats {
    InscriptionStats {
        attack,
        final_damage_percent,
        crit_chance,
        crit_damage,
        accuracy,
        penetration,
    }
}

fn builtin_inscriptions() -> Vec<InscriptionDefinition> {
    vec![
        inscription(
            "ember_sigil",
            "Ember Sigil",
            stats(120.0, 20.0, 8.0, 20.0, 150.0, 4.0),
            &[],
            Some("double_strike"),
        ),
        inscription(
            "ward_splitter",
            "Ward Splitter",
            stats(90.0, 10.0, 5.0, 10.0, 120.0, 2.0),
            &["shield_break"],
            Some("shield_pierce"),
        ),
        inscription(
            "true_sight",
            "True Sight",
            stats(80.0, 12.0, 10.0, 25.0, 200.0, 2.0),
            &["true_hit"],
            Some("lethal_focus"),
        ),
        inscription(
            "searing_brand",
            "Searing Brand",
            stats(100.0, 15.0, 6.0, 15.0, 130.0, 3.0),
            &["heal_reduction"],
            Some("heal_reduction_greater"),
        ),
        inscription(
            "twin_fang",
            "Twin Fang",
            stats(70.0, 8.0, 12.0, 30.0, 140.0, 2.0),
            &["double_strike"],
            Some("triple_strike"),
        ),
        inscription(
            "steadfast_rune",
            "Steadfast Rune",
            stats(85.0, 10.0, 5.0, 10.0, 120.0, 3.0),
            &["equipment_immunity"],
            Some("regeneration"),
        ),
        inscription(
            "berserker_mark",
            "Berserker Mark",
            stats(110.0, 18.0, 7.0, 20.0, 120.0, 3.0),
            &["rage_on_destroy"],
            Some("shield_shatter"),
        ),
        inscription(
            "veil_piercer",
            "Veil Piercer",
            stats(95.0, 12.0, 6.0, 15.0, 160.0, 4.0),
            &["invincibility_break"],
            Some("invincibility_resist"),
        ),
        inscription(
            "seal_breaker",
            "Seal Breaker",
            stats(100.0, 14.0, 6.0, 15.0, 150.0, 6.0),
            &["shield_bypass"],
            Some("invincibility_destroy"),
        ),
        inscription(
            "anchor_glyph",
            "Anchor Glyph",
            stats(75.0, 10.0, 5.0, 10.0, 140.0, 3.0),
            &["invincibility_resist"],
            Some("regeneration"),
        ),
    ]
}
