//! Victory reward computation.

use super::rolls::roll_chance;
use crate::core::config::BattleConfig;
use crate::core::constants::BONUS_DROP_GRADE_WEIGHTS;
use crate::data::{InscriptionGrade, InscriptionInstance, ScaledBoss};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleRewards {
    pub gold: u64,
    pub seal_stones: u64,
    pub bonus_item: Option<InscriptionInstance>,
}

/// Difficulty-scaled currencies plus a fixed-chance inscription drop.
pub fn roll_rewards(boss: &ScaledBoss, config: &BattleConfig, rng: &mut impl Rng) -> BattleRewards {
    let bonus_item = if !boss.drop_table.is_empty() && roll_chance(config.bonus_drop_chance, rng) {
        let id = &boss.drop_table[rng.gen_range(0..boss.drop_table.len())];
        Some(InscriptionInstance::new(id.clone(), roll_bonus_grade(rng)))
    } else {
        None
    };

    BattleRewards {
        gold: boss.rewards.gold,
        seal_stones: boss.rewards.seal_stones,
        bonus_item,
    }
}

pub fn roll_bonus_grade(rng: &mut impl Rng) -> InscriptionGrade {
    let total: u32 = BONUS_DROP_GRADE_WEIGHTS.iter().sum();
    let mut roll = rng.gen_range(0..total);
    for (index, weight) in BONUS_DROP_GRADE_WEIGHTS.iter().enumerate() {
        if roll < *weight {
            return InscriptionGrade::from_index(index).unwrap_or(InscriptionGrade::Common);
        }
        roll -= weight;
    }
    InscriptionGrade::Common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BossCatalog, DifficultyLevel};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn warden(level: u32) -> ScaledBoss {
        BossCatalog::builtin()
            .get("stone_warden")
            .unwrap()
            .scaled(DifficultyLevel::new(level).unwrap())
    }

    #[test]
    fn test_currencies_follow_difficulty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = BattleConfig {
            bonus_drop_chance: 0.0,
            ..BattleConfig::default()
        };
        let low = roll_rewards(&warden(1), &config, &mut rng);
        let high = roll_rewards(&warden(3), &config, &mut rng);
        assert_eq!(low.gold, 5_000);
        assert_eq!(high.gold, 11_250);
        assert_eq!(low.bonus_item, None);
    }

    #[test]
    fn test_bonus_drop_comes_from_drop_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = BattleConfig {
            bonus_drop_chance: 100.0,
            ..BattleConfig::default()
        };
        let boss = warden(1);
        for _ in 0..20 {
            let item = roll_rewards(&boss, &config, &mut rng).bonus_item.unwrap();
            assert!(boss.drop_table.contains(&item.inscription_id));
        }
    }

    #[test]
    fn test_bonus_drop_rate_near_ten_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = BattleConfig::default();
        let boss = warden(1);
        let drops = (0..5000)
            .filter(|_| roll_rewards(&boss, &config, &mut rng).bonus_item.is_some())
            .count();
        assert!((400..600).contains(&drops), "drops = {drops}");
    }

    #[test]
    fn test_grade_distribution_favors_common() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut counts = [0u32; 6];
        for _ in 0..10_000 {
            counts[roll_bonus_grade(&mut rng) as usize] += 1;
        }
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
        assert!(counts[5] < 100);
    }
}
