pub mod filter;
pub mod question;
pub mod shuffle;

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use thiserror::Error;

pub use filter::QuestionFilter;
pub use question::{Difficulty, OPTION_COUNT, Question, Section, option_index, option_letter};

const QUESTIONS_JSON: &str = include_str!("../../assets/questions.json");

static BUNDLED: LazyLock<QuestionBank> = LazyLock::new(|| {
    QuestionBank::from_json(QUESTIONS_JSON).unwrap_or_else(|err| {
        tracing::error!(%err, "bundled question table is invalid");
        QuestionBank::default()
    })
});

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to parse question table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate question id `{0}`")]
    DuplicateId(String),
    #[error("question `{id}` has {found} options, expected {OPTION_COUNT}")]
    OptionCount { id: String, found: usize },
    #[error("question `{id}` marks option {index} correct but has only {len} options")]
    CorrectOutOfRange { id: String, index: usize, len: usize },
}

/// Read-only question table. Queries never mutate and preserve definition order.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// The table compiled into the binary, parsed once per process.
    pub fn bundled() -> &'static QuestionBank {
        &BUNDLED
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut ids = HashSet::new();
        for q in &questions {
            if !ids.insert(q.id.as_str()) {
                return Err(BankError::DuplicateId(q.id.clone()));
            }
            if q.options.len() != OPTION_COUNT {
                return Err(BankError::OptionCount {
                    id: q.id.clone(),
                    found: q.options.len(),
                });
            }
            if q.correct_answer >= q.options.len() {
                return Err(BankError::CorrectOutOfRange {
                    id: q.id.clone(),
                    index: q.correct_answer,
                    len: q.options.len(),
                });
            }
        }
        Ok(Self { questions })
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn by_section(&self, section: Section) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.section == section)
            .collect()
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect()
    }

    pub fn filtered(&self, filter: &QuestionFilter) -> Vec<&Question> {
        self.questions.iter().filter(|q| filter.matches(q)).collect()
    }

    pub fn section_count(&self, section: Section) -> usize {
        self.questions.iter().filter(|q| q.section == section).count()
    }

    /// Up to `count` distinct questions in random order, drawn from `section`
    /// when given. An empty pool gives an empty sample.
    pub fn random_sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        section: Option<Section>,
        rng: &mut R,
    ) -> Vec<&Question> {
        let pool = match section {
            Some(s) => self.by_section(s),
            None => self.questions.iter().collect(),
        };
        shuffle::shuffle_take(pool, count, rng)
    }

    /// Number of questions `random_sample` would return for these arguments.
    pub fn sample_size(&self, count: usize, section: Option<Section>) -> usize {
        let pool = section.map_or(self.len(), |s| self.section_count(s));
        count.min(pool)
    }

    pub fn random_pick<R: Rng + ?Sized>(
        &self,
        filter: &QuestionFilter,
        rng: &mut R,
    ) -> Option<&Question> {
        let pool = self.filtered(filter);
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.gen_range(0..pool.len())])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    pub(crate) fn question(id: &str, section: Section, correct: usize) -> Question {
        Question {
            id: id.to_string(),
            section,
            difficulty: Difficulty::Medium,
            topic: "Topic".to_string(),
            question: format!("Question {id}?"),
            options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            correct_answer: correct,
            explanation: format!("Because {id}."),
        }
    }

    #[test]
    fn bundled_table_has_documented_shape() {
        let bank = QuestionBank::bundled();
        assert_eq!(bank.len(), 11);
        assert_eq!(bank.section_count(Section::Math), 4);
        assert_eq!(bank.section_count(Section::Reading), 3);
        assert_eq!(bank.section_count(Section::Writing), 4);
    }

    #[test]
    fn by_section_math_returns_four_in_order() {
        let math = QuestionBank::bundled().by_section(Section::Math);
        assert_eq!(math.len(), 4);
        assert!(math.iter().all(|q| q.section == Section::Math));
        let ids: Vec<&str> = math.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["math_1", "math_2", "math_3", "math_4"]);
    }

    #[test]
    fn by_difficulty_filters() {
        let hard = QuestionBank::bundled().by_difficulty(Difficulty::Hard);
        assert_eq!(hard.len(), 3);
        assert!(hard.iter().all(|q| q.difficulty == Difficulty::Hard));
    }

    #[test]
    fn random_sample_respects_section_and_uniqueness() {
        let bank = QuestionBank::bundled();
        let mut rng = SmallRng::seed_from_u64(99);
        for n in 0..8 {
            let sample = bank.random_sample(n, Some(Section::Writing), &mut rng);
            assert!(sample.len() <= n);
            assert_eq!(sample.len(), n.min(4));
            assert!(sample.iter().all(|q| q.section == Section::Writing));
            let ids: HashSet<&str> = sample.iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids.len(), sample.len());
        }
    }

    #[test]
    fn random_sample_is_deterministic_for_seed() {
        let bank = QuestionBank::bundled();
        let a: Vec<&str> = bank
            .random_sample(10, None, &mut SmallRng::seed_from_u64(5))
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        let b: Vec<&str> = bank
            .random_sample(10, None, &mut SmallRng::seed_from_u64(5))
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn sample_size_is_capped_by_section_pool() {
        let bank = QuestionBank::bundled();
        assert_eq!(bank.sample_size(10, Some(Section::Reading)), 3);
        assert_eq!(bank.sample_size(10, None), 10);
        assert_eq!(bank.sample_size(50, None), 11);
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(
            bank.random_sample(10, Some(Section::Reading), &mut rng).len(),
            bank.sample_size(10, Some(Section::Reading))
        );
    }

    #[test]
    fn empty_pool_yields_empty_sample() {
        let bank = QuestionBank::new(vec![question("m1", Section::Math, 0)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(bank.random_sample(3, Some(Section::Reading), &mut rng).is_empty());
        let filter = QuestionFilter::new(Some(Section::Reading), None);
        assert!(bank.random_pick(&filter, &mut rng).is_none());
    }

    #[test]
    fn filtered_combines_section_and_difficulty() {
        let bank = QuestionBank::bundled();
        let filter = QuestionFilter::new(Some(Section::Math), Some(Difficulty::Medium));
        let ids: Vec<&str> = bank.filtered(&filter).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["math_2", "math_4"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = QuestionBank::new(vec![
            question("a", Section::Math, 0),
            question("a", Section::Reading, 1),
        ])
        .unwrap_err();
        assert!(matches!(err, BankError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let err = QuestionBank::new(vec![question("a", Section::Math, 4)]).unwrap_err();
        assert!(matches!(err, BankError::CorrectOutOfRange { index: 4, .. }));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut q = question("a", Section::Math, 0);
        q.options.pop();
        let err = QuestionBank::new(vec![q]).unwrap_err();
        assert!(matches!(err, BankError::OptionCount { found: 3, .. }));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        assert!(matches!(
            QuestionBank::from_json("{not json"),
            Err(BankError::Parse(_))
        ));
    }
}
