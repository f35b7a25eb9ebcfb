//! Percent rolls shared by the damage pipeline, pattern machine and rewards.
//!
//! Every random draw is an independent uniform roll in `[0, 100)` compared
//! against a threshold, so a threshold of 100 always passes and 0 never does.

use rand::Rng;

pub fn roll_percent(rng: &mut impl Rng) -> f64 {
    rng.gen_range(0.0..100.0)
}

/// True if a fresh roll lands under `chance_percent`.
pub fn roll_chance(chance_percent: f64, rng: &mut impl Rng) -> bool {
    roll_percent(rng) < chance_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_roll_percent_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let roll = roll_percent(&mut rng);
            assert!((0.0..100.0).contains(&roll));
        }
    }

    #[test]
    fn test_certain_and_impossible_chances() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(roll_chance(100.0, &mut rng));
            assert!(!roll_chance(0.0, &mut rng));
        }
    }

    #[test]
    fn test_chance_is_roughly_calibrated() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let hits = (0..10_000).filter(|_| roll_chance(30.0, &mut rng)).count();
        assert!((2_700..3_300).contains(&hits), "hits = {hits}");
    }
}
