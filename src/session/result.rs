use chrono::{DateTime, Utc};

use crate::bank::Question;
use crate::session::practice_test::{SessionError, SubmitReason, TestSession};

pub const NO_ANSWER: &str = "No answer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
    /// Rounded percentage, 0 for an empty test.
    pub percent: u32,
    pub per_question: Vec<bool>,
}

impl ScoreReport {
    pub fn compute(questions: &[Question], answers: &[Option<usize>]) -> Self {
        let per_question: Vec<bool> = questions
            .iter()
            .zip(answers)
            .map(|(q, a)| a.is_some_and(|a| q.is_correct(a)))
            .collect();
        let correct = per_question.iter().filter(|&&c| c).count();
        let total = questions.len();
        let percent = if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            correct,
            total,
            percent,
            per_question,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItem {
    pub question: String,
    pub chosen: Option<String>,
    pub correct_option: String,
    pub explanation: String,
    pub is_correct: bool,
}

impl ReviewItem {
    pub fn chosen_text(&self) -> &str {
        self.chosen.as_deref().unwrap_or(NO_ANSWER)
    }
}

#[derive(Clone, Debug)]
pub struct TestResult {
    pub score: ScoreReport,
    pub review: Vec<ReviewItem>,
    pub submit_reason: SubmitReason,
    pub elapsed_secs: u32,
    pub remaining_secs: u32,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    pub fn from_session(session: &TestSession) -> Result<Self, SessionError> {
        let score = session.score()?;
        let review = session
            .questions()
            .iter()
            .zip(session.answers())
            .zip(&score.per_question)
            .map(|((q, answer), &is_correct)| ReviewItem {
                question: q.question.clone(),
                chosen: answer.and_then(|a| q.option(a)).map(str::to_string),
                correct_option: q.correct_option().to_string(),
                explanation: q.explanation.clone(),
                is_correct,
            })
            .collect();

        Ok(Self {
            score,
            review,
            submit_reason: session.submit_reason().unwrap_or(SubmitReason::Manual),
            elapsed_secs: session.elapsed_secs(),
            remaining_secs: session.remaining_secs(),
            timestamp: Utc::now(),
        })
    }

    pub fn timed_out(&self) -> bool {
        self.submit_reason == SubmitReason::TimeExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Section;
    use crate::bank::tests::question;
    use crate::session::practice_test::TestPlan;

    #[test]
    fn rounding_follows_half_up() {
        let qs: Vec<Question> = (0..3)
            .map(|i| question(&format!("q{i}"), Section::Math, 0))
            .collect();
        let report = ScoreReport::compute(&qs, &[Some(0), Some(0), None]);
        assert_eq!(report.percent, 67);
        let report = ScoreReport::compute(&qs, &[Some(0), None, None]);
        assert_eq!(report.percent, 33);
    }

    #[test]
    fn empty_report_is_zero() {
        let report = ScoreReport::compute(&[], &[]);
        assert_eq!(report.percent, 0);
        assert_eq!(report.total, 0);
    }

    #[test]
    fn review_projects_each_question() {
        let mut session = TestSession::new(TestPlan::default());
        session
            .begin_with(vec![
                question("a", Section::Math, 1),
                question("b", Section::Reading, 2),
            ])
            .unwrap();
        session.select_answer(1).unwrap();
        session.submit(SubmitReason::Manual).unwrap();

        let result = TestResult::from_session(&session).unwrap();
        assert_eq!(result.review.len(), 2);

        let first = &result.review[0];
        assert!(first.is_correct);
        assert_eq!(first.chosen_text(), "x");
        assert_eq!(first.correct_option, "x");
        assert_eq!(first.question, "Question a?");

        let second = &result.review[1];
        assert!(!second.is_correct);
        assert_eq!(second.chosen_text(), NO_ANSWER);
        assert_eq!(second.correct_option, "y");
        assert_eq!(second.explanation, "Because b.");

        assert!(!result.timed_out());
        assert_eq!(result.score.percent, 50);
    }

    #[test]
    fn projection_is_repeatable() {
        let mut session = TestSession::new(TestPlan::default());
        session.begin_with(vec![question("a", Section::Math, 0)]).unwrap();
        session.submit(SubmitReason::Manual).unwrap();
        let a = TestResult::from_session(&session).unwrap();
        let b = TestResult::from_session(&session).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.review, b.review);
    }

    #[test]
    fn projection_requires_completed_session() {
        let mut session = TestSession::new(TestPlan::default());
        session.begin_with(vec![question("a", Section::Math, 0)]).unwrap();
        assert!(TestResult::from_session(&session).is_err());
    }
}
