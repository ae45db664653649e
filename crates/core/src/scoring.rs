//! Pure grading of a batch against the entered answers.

use crate::model::{AnswerBuffer, Exercise, ScoreResult};

/// Grades every exercise against the answer at the same index.
///
/// Unset answers, and answers missing because the buffer is shorter than the
/// batch, count as 0.
#[must_use]
pub fn score(batch: &[Exercise], answers: &AnswerBuffer) -> ScoreResult {
    let outcomes = batch
        .iter()
        .enumerate()
        .map(|(i, exercise)| exercise.is_answered_by(answers.get(i)))
        .collect();
    ScoreResult::from_outcomes(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(pairs: &[(u32, u32)]) -> Vec<Exercise> {
        pairs
            .iter()
            .map(|(a, b)| Exercise::new(*a, *b).unwrap())
            .collect()
    }

    #[test]
    fn grades_index_aligned_answers() {
        let batch = batch(&[(2, 3), (4, 5), (6, 7)]);
        let answers = AnswerBuffer::from(vec![Some(6), Some(19), Some(42)]);

        let result = score(&batch, &answers);

        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.total(), 3);
        assert_eq!(result.per_item_correct(), &[true, false, true]);
    }

    #[test]
    fn unset_answers_are_graded_as_zero() {
        let batch = batch(&[(2, 2), (3, 3)]);
        let result = score(&batch, &AnswerBuffer::unset(2));
        assert_eq!(result.correct_count(), 0);
        assert_eq!(result.per_item_correct(), &[false, false]);
    }

    #[test]
    fn correct_count_matches_product_matches() {
        // Every operand pair in 2..=9 answered either correctly or off by one.
        let mut exercises = Vec::new();
        let mut slots = Vec::new();
        let mut expected = 0;
        for a in 2..=9 {
            for b in 2..=9 {
                let ex = Exercise::new(a, b).unwrap();
                let right = (a + b) % 3 != 0;
                slots.push(Some(if right { ex.product() } else { ex.product() + 1 }));
                expected += usize::from(right);
                exercises.push(ex);
            }
        }

        let result = score(&exercises, &AnswerBuffer::from(slots));
        assert_eq!(result.correct_count(), expected);
        assert_eq!(result.total(), 64);
    }

    #[test]
    fn short_buffer_treats_missing_as_zero() {
        let batch = batch(&[(2, 5), (3, 4)]);
        let result = score(&batch, &AnswerBuffer::from(vec![Some(10)]));
        assert_eq!(result.per_item_correct(), &[true, false]);
    }
}
