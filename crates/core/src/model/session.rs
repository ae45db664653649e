use serde::{Deserialize, Serialize};

/// Position of a drill session in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No batch has been defined yet.
    #[default]
    Idle,
    /// A batch is on screen and answers may be entered.
    Collecting,
    /// The batch has been checked; the result is visible.
    Graded,
}

impl SessionPhase {
    #[must_use]
    pub fn has_batch(self) -> bool {
        matches!(self, Self::Collecting | Self::Graded)
    }
}

/// Answers entered for the current batch, index-aligned with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerBuffer {
    slots: Vec<Option<i64>>,
}

impl AnswerBuffer {
    #[must_use]
    pub fn unset(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `value` at `index`. Returns false (and changes nothing) when out of range.
    pub fn set(&mut self, index: usize, value: i64) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.slots.get(index).copied().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<i64>] {
        &self.slots
    }
}

impl From<Vec<Option<i64>>> for AnswerBuffer {
    fn from(slots: Vec<Option<i64>>) -> Self {
        Self { slots }
    }
}

/// Outcome of checking one batch. Derived on every grading, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    correct_count: usize,
    total: usize,
    per_item_correct: Vec<bool>,
}

impl ScoreResult {
    #[must_use]
    pub fn from_outcomes(per_item_correct: Vec<bool>) -> Self {
        Self {
            correct_count: per_item_correct.iter().filter(|ok| **ok).count(),
            total: per_item_correct.len(),
            per_item_correct,
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn per_item_correct(&self) -> &[bool] {
        &self.per_item_correct
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct_count == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_write_is_ignored() {
        let mut answers = AnswerBuffer::unset(2);
        assert!(answers.set(1, 12));
        assert!(!answers.set(2, 99));
        assert_eq!(answers.as_slice(), &[None, Some(12)]);
        assert_eq!(answers.answered(), 1);

        answers.clear();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.answered(), 0);
    }

    #[test]
    fn score_result_counts_true_entries() {
        let result = ScoreResult::from_outcomes(vec![true, false, true]);
        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.total(), 3);
        assert!(!result.is_perfect());
        assert!(ScoreResult::from_outcomes(vec![true]).is_perfect());
        assert!(!ScoreResult::from_outcomes(Vec::new()).is_perfect());
    }
}
