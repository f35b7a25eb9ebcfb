//! Error types for battle entry and definition-table loading.

use thiserror::Error;

/// Reasons a battle action was refused.
///
/// None of these mutate state: the caller can fix the precondition and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("not enough sealed zone tickets")]
    NoTicket,

    #[error("equip at least one inscription before entering")]
    NoAbilityEquipped,

    #[error("unknown boss: {0}")]
    UnknownBoss(String),

    #[error("unknown inscription: {0}")]
    UnknownInscription(String),

    #[error("difficulty {level} is outside 1..={max}")]
    InvalidDifficulty { level: u32, max: u32 },

    #[error("a sealed zone battle is already in progress")]
    BattleAlreadyActive,

    #[error("no sealed zone battle is in progress")]
    NoActiveBattle,
}

/// Errors while loading definition tables or config.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse definition JSON")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate definition id: {0}")]
    DuplicateId(String),

    #[error("invalid definition {id}: {reason}")]
    InvalidValue { id: String, reason: String },
}
