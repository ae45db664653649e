use async_trait::async_trait;
use drill_core::model::{BatchRequest, DrillMode, Exercise, OPERAND_MAX, OPERAND_MIN};
use rand::seq::IndexedRandom;
use rand::{Rng, rng};

use super::{ExerciseSource, drill_exercise};
use crate::error::ExerciseSourceError;

/// Generation strategy named by a mode token.
///
/// - `table:<n>`: the times table of `n`, then extra `n x b` items.
/// - `mixed:<n>`: random pairs with `a` in `2..=n`, `b` in `2..=9`.
/// - `easy` / `hard`: `mixed:5` / `mixed:9`.
///
/// A missing or unparseable `n` means 2; out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Table(u32),
    Mixed(u32),
}

impl Strategy {
    fn parse(mode: &DrillMode) -> Result<Self, ExerciseSourceError> {
        let token = mode.as_str();
        let (kind, number) = token.split_once(':').unwrap_or((token, ""));
        let number = number
            .trim()
            .parse::<u32>()
            .unwrap_or(OPERAND_MIN)
            .clamp(OPERAND_MIN, OPERAND_MAX);
        match kind.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table(number)),
            "mixed" => Ok(Self::Mixed(number)),
            "easy" => Ok(Self::Mixed(5)),
            "hard" => Ok(Self::Mixed(OPERAND_MAX)),
            _ => Err(ExerciseSourceError::UnknownMode(token.to_owned())),
        }
    }
}

/// In-process generator used when no remote source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExerciseSource;

impl TableExerciseSource {
    /// # Errors
    ///
    /// Returns `ExerciseSourceError::UnknownMode` for unrecognised tokens.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &BatchRequest,
    ) -> Result<Vec<Exercise>, ExerciseSourceError> {
        let count = request.count();
        let batch = match Strategy::parse(request.mode())? {
            Strategy::Table(n) => times_table(rng, n, count),
            Strategy::Mixed(n) => mixed(rng, n, count),
        };
        Ok(batch)
    }
}

fn times_table<R: Rng + ?Sized>(rng: &mut R, n: u32, count: usize) -> Vec<Exercise> {
    let mut items: Vec<Exercise> = (OPERAND_MIN..=OPERAND_MAX)
        .map(|b| drill_exercise(n, b))
        .collect();
    let others: Vec<u32> = (OPERAND_MIN..=OPERAND_MAX).filter(|b| *b != n).collect();
    while items.len() < count {
        let need = (count - items.len()).min(others.len());
        items.extend(others.choose_multiple(rng, need).map(|b| drill_exercise(n, *b)));
    }
    items.truncate(count);
    items
}

fn mixed<R: Rng + ?Sized>(rng: &mut R, n: u32, count: usize) -> Vec<Exercise> {
    let base: Vec<Exercise> = (OPERAND_MIN..=n)
        .flat_map(|a| (OPERAND_MIN..=OPERAND_MAX).map(move |b| drill_exercise(a, b)))
        .collect();
    let mut pool = base.clone();
    while pool.len() < count {
        pool.extend_from_slice(&base);
    }
    pool.choose_multiple(rng, count).copied().collect()
}

#[async_trait]
impl ExerciseSource for TableExerciseSource {
    async fn generate(&self, request: &BatchRequest) -> Result<Vec<Exercise>, ExerciseSourceError> {
        self.generate_with(&mut rng(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn request(mode: &str, count: usize) -> BatchRequest {
        BatchRequest::new(DrillMode::new(mode).unwrap(), count).unwrap()
    }

    #[test]
    fn parses_mode_tokens() {
        let parse = |t: &str| Strategy::parse(&DrillMode::new(t).unwrap());
        assert_eq!(parse("table:7").unwrap(), Strategy::Table(7));
        assert_eq!(parse("mixed:12").unwrap(), Strategy::Mixed(9));
        assert_eq!(parse("table:x").unwrap(), Strategy::Table(2));
        assert_eq!(parse("table").unwrap(), Strategy::Table(2));
        assert_eq!(parse("easy").unwrap(), Strategy::Mixed(5));
        assert!(matches!(
            parse("division"),
            Err(ExerciseSourceError::UnknownMode(_))
        ));
    }

    #[test]
    fn table_mode_starts_with_full_table_then_extras() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = TableExerciseSource
            .generate_with(&mut rng, &request("table:6", 10))
            .unwrap();

        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|ex| ex.a() == 6));
        let firsts: Vec<u32> = batch[..8].iter().map(Exercise::b).collect();
        assert_eq!(firsts, (2..=9).collect::<Vec<_>>());
        assert!(batch[8..].iter().all(|ex| ex.b() != 6));
        assert_ne!(batch[8], batch[9]);
    }

    #[test]
    fn table_mode_honours_short_and_long_counts() {
        let mut rng = StdRng::seed_from_u64(2);
        let short = TableExerciseSource
            .generate_with(&mut rng, &request("table:3", 3))
            .unwrap();
        assert_eq!(short.len(), 3);
        assert_eq!(short[0], drill_exercise(3, 2));

        let long = TableExerciseSource
            .generate_with(&mut rng, &request("table:3", 30))
            .unwrap();
        assert_eq!(long.len(), 30);
    }

    #[test]
    fn mixed_mode_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let batch = TableExerciseSource
            .generate_with(&mut rng, &request("mixed:4", 40))
            .unwrap();
        assert_eq!(batch.len(), 40);
        assert!(batch.iter().all(|ex| (2..=4).contains(&ex.a())));
        assert!(batch.iter().all(|ex| (2..=9).contains(&ex.b())));
    }
}
