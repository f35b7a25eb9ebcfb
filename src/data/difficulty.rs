//! Difficulty scaling for sealed zone bosses.

use crate::core::constants::{DIFFICULTY_SCALING_BASE, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::core::error::BattleError;

/// A validated difficulty level (1..=MAX_DIFFICULTY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DifficultyLevel(u32);

impl DifficultyLevel {
    pub fn new(level: u32) -> Result<Self, BattleError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&level) {
            return Err(BattleError::InvalidDifficulty {
                level,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Self(level))
    }

    pub fn level(&self) -> u32 {
        self.0
    }

    /// Stat and reward multiplier: `1.5^(level-1)`.
    pub fn multiplier(&self) -> f64 {
        difficulty_multiplier(self.0)
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self(MIN_DIFFICULTY)
    }
}

/// Multiplier for a raw level. Levels below 1 are treated as 1.
pub fn difficulty_multiplier(level: u32) -> f64 {
    DIFFICULTY_SCALING_BASE.powi(level.max(1) as i32 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_is_unscaled() {
        assert_eq!(difficulty_multiplier(1), 1.0);
    }

    #[test]
    fn test_multiplier_grows_geometrically() {
        assert!((difficulty_multiplier(2) - 1.5).abs() < 1e-9);
        assert!((difficulty_multiplier(3) - 2.25).abs() < 1e-9);
        assert!((difficulty_multiplier(5) - 5.0625).abs() < 1e-9);
    }

    #[test]
    fn test_zero_level_clamped() {
        assert_eq!(difficulty_multiplier(0), 1.0);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(DifficultyLevel::new(0).is_err());
        assert!(DifficultyLevel::new(MAX_DIFFICULTY + 1).is_err());
        assert_eq!(DifficultyLevel::new(4).unwrap().level(), 4);
    }
}
