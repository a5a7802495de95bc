use rand::Rng;

use crate::bank::{Question, QuestionBank, QuestionFilter};

/// Single-question practice from the question browser: pick a random
/// question matching the filter, choose an option, then reveal.
#[derive(Clone, Debug, Default)]
pub struct DrillState {
    pub filter: QuestionFilter,
    current: Option<Question>,
    selection: Option<usize>,
    revealed: bool,
    pub attempted: usize,
    pub correct: usize,
}

impl DrillState {
    pub fn new(filter: QuestionFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn available(&self, bank: &QuestionBank) -> usize {
        bank.filtered(&self.filter).len()
    }

    /// Load a random question from the filtered pool. Clears the current
    /// question and returns false when the pool is empty.
    pub fn next_question<R: Rng + ?Sized>(&mut self, bank: &QuestionBank, rng: &mut R) -> bool {
        self.current = bank.random_pick(&self.filter, rng).cloned();
        self.selection = None;
        self.revealed = false;
        self.current.is_some()
    }

    pub fn select(&mut self, index: usize) -> bool {
        let Some(question) = self.current.as_ref() else {
            return false;
        };
        if self.revealed || index >= question.options.len() {
            return false;
        }
        self.selection = Some(index);
        true
    }

    /// Show the answer. Needs a selection; counts toward the running tally once.
    pub fn reveal(&mut self) -> bool {
        if self.revealed || self.selection.is_none() || self.current.is_none() {
            return false;
        }
        self.revealed = true;
        self.attempted += 1;
        if self.is_correct() == Some(true) {
            self.correct += 1;
        }
        true
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// `None` until the answer is revealed.
    pub fn is_correct(&self) -> Option<bool> {
        if !self.revealed {
            return None;
        }
        let question = self.current.as_ref()?;
        Some(self.selection.is_some_and(|s| question.is_correct(s)))
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.selection = None;
        self.revealed = false;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::bank::{Difficulty, Section};

    fn drill_with(filter: QuestionFilter) -> (DrillState, SmallRng) {
        (DrillState::new(filter), SmallRng::seed_from_u64(17))
    }

    #[test]
    fn picks_from_filtered_pool() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) =
            drill_with(QuestionFilter::new(Some(Section::Math), Some(Difficulty::Hard)));
        assert_eq!(drill.available(bank), 1);
        assert!(drill.next_question(bank, &mut rng));
        assert_eq!(drill.current().map(|q| q.id.as_str()), Some("math_3"));
    }

    #[test]
    fn reveal_requires_selection() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        drill.next_question(bank, &mut rng);
        assert!(!drill.reveal());
        assert!(drill.select(0));
        assert!(drill.reveal());
        assert!(drill.is_correct().is_some());
        assert_eq!(drill.attempted, 1);
        assert!(!drill.reveal());
        assert_eq!(drill.attempted, 1);
    }

    #[test]
    fn selection_locked_after_reveal() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        drill.next_question(bank, &mut rng);
        drill.select(1);
        drill.reveal();
        assert!(!drill.select(2));
        assert_eq!(drill.selection(), Some(1));
    }

    #[test]
    fn correct_answer_is_tallied() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        drill.next_question(bank, &mut rng);
        let correct = drill.current().unwrap().correct_answer;
        drill.select(correct);
        drill.reveal();
        assert_eq!(drill.is_correct(), Some(true));
        assert_eq!(drill.correct, 1);
    }

    #[test]
    fn out_of_range_selection_rejected() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        assert!(!drill.select(0));
        drill.next_question(bank, &mut rng);
        assert!(!drill.select(7));
        assert_eq!(drill.selection(), None);
    }

    #[test]
    fn next_question_resets_state() {
        let bank = QuestionBank::bundled();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        drill.next_question(bank, &mut rng);
        drill.select(0);
        drill.reveal();
        drill.next_question(bank, &mut rng);
        assert_eq!(drill.selection(), None);
        assert!(!drill.is_revealed());
        assert_eq!(drill.is_correct(), None);
    }

    #[test]
    fn empty_pool_clears_question() {
        let bank = QuestionBank::new(Vec::new()).unwrap();
        let (mut drill, mut rng) = drill_with(QuestionFilter::default());
        assert!(!drill.next_question(&bank, &mut rng));
        assert!(drill.current().is_none());
    }
}
