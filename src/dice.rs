use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// DiceMode controls how CHANCE rolls. May be predictable for testing or truly random for play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceMode {
    Predictable,
    RandomUniform,
}

pub struct Dice {
    rng: Box<dyn RngCore>,
    mode: DiceMode,
}

impl Dice {
    pub fn new_uniform() -> Dice {
        Dice {
            rng: Box::new(StdRng::from_entropy()),
            mode: DiceMode::RandomUniform,
        }
    }

    pub fn new_predictable(seed: u64) -> Dice {
        Dice {
            rng: Box::new(StdRng::seed_from_u64(seed)),
            mode: DiceMode::Predictable,
        }
    }

    /// Seeded when a seed is given, uniform otherwise
    pub fn from_seed(seed: Option<u64>) -> Dice {
        match seed {
            Some(seed) => Dice::new_predictable(seed),
            None => Dice::new_uniform(),
        }
    }

    pub fn mode(&self) -> DiceMode {
        self.mode
    }

    /// roll_percent returns a value in range [1..100]
    pub fn roll_percent(&mut self) -> u8 {
        self.rng.gen_range(1..=100)
    }

    /// True with probability `percent`/100; 0 never succeeds, 100 and above always do
    pub fn chance(&mut self, percent: u8) -> bool {
        self.roll_percent() <= percent
    }
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dice").field("mode", &self.mode).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolls_stay_in_range() {
        let mut dice = Dice::new_predictable(7);
        for _ in 0..1000 {
            let roll = dice.roll_percent();
            assert!((1..=100).contains(&roll));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut dice = Dice::new_predictable(42);
        for _ in 0..200 {
            assert!(!dice.chance(0));
            assert!(dice.chance(100));
        }
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = Dice::new_predictable(3);
        let mut b = Dice::new_predictable(3);
        let ra: Vec<u8> = (0..20).map(|_| a.roll_percent()).collect();
        let rb: Vec<u8> = (0..20).map(|_| b.roll_percent()).collect();
        assert_eq!(ra, rb);
        assert_eq!(a.mode(), DiceMode::Predictable);
    }
}
