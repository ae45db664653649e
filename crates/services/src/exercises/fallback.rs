use drill_core::model::{Exercise, OPERAND_MAX, OPERAND_MIN};
use rand::{Rng, rng};

use super::drill_exercise;

/// Local substitute batch: `count` pairs with each operand uniform in `2..=9`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    #[must_use]
    pub fn generate(&self, count: usize) -> Vec<Exercise> {
        self.generate_with(&mut rng(), count)
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Exercise> {
        (0..count)
            .map(|_| {
                drill_exercise(
                    rng.random_range(OPERAND_MIN..=OPERAND_MAX),
                    rng.random_range(OPERAND_MIN..=OPERAND_MAX),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn produces_exact_count_within_operand_range() {
        let batch = FallbackGenerator.generate(10);
        assert_eq!(batch.len(), 10);
        for ex in &batch {
            assert!((OPERAND_MIN..=OPERAND_MAX).contains(&ex.a()));
            assert!((OPERAND_MIN..=OPERAND_MAX).contains(&ex.b()));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = FallbackGenerator.generate_with(&mut StdRng::seed_from_u64(7), 25);
        let second = FallbackGenerator.generate_with(&mut StdRng::seed_from_u64(7), 25);
        assert_eq!(first, second);
    }
}
