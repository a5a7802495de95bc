use chrono::NaiveDate;

use crate::bank::Section;
use crate::session::result::TestResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

/// Tier of a total SAT score (400-1600).
pub fn score_tier(score: u32) -> ScoreTier {
    if score >= 1500 {
        ScoreTier::Excellent
    } else if score >= 1400 {
        ScoreTier::Good
    } else if score >= 1300 {
        ScoreTier::Fair
    } else {
        ScoreTier::NeedsWork
    }
}

#[derive(Clone, Debug)]
pub struct OverviewStats {
    pub tests_completed: u32,
    pub average_score: u32,
    pub improvement_percent: u32,
    pub study_hours: u32,
}

#[derive(Clone, Debug)]
pub struct ScoreEntry {
    pub date: NaiveDate,
    pub total: u32,
    pub math: u32,
    pub reading_writing: u32,
}

#[derive(Clone, Debug)]
pub struct SectionProgress {
    pub section: Section,
    pub current: u32,
    pub target: u32,
    pub improvement: u32,
}

impl SectionProgress {
    pub fn ratio(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (self.current as f64 / self.target as f64).min(1.0)
    }

    pub fn points_to_go(&self) -> u32 {
        self.target.saturating_sub(self.current)
    }
}

/// Dashboard content. The figures are demonstration data, not derived from
/// any stored history.
#[derive(Clone, Debug)]
pub struct ProgressReport {
    pub overview: OverviewStats,
    /// Newest first.
    pub history: Vec<ScoreEntry>,
    pub sections: Vec<SectionProgress>,
    pub strengths: Vec<&'static str>,
    pub weaknesses: Vec<&'static str>,
    pub focus_areas: Vec<&'static str>,
    pub next_steps: Vec<&'static str>,
    pub target_total: u32,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl ProgressReport {
    pub fn sample() -> Self {
        let entry = |date, total, math, reading_writing| ScoreEntry {
            date,
            total,
            math,
            reading_writing,
        };
        Self {
            overview: OverviewStats {
                tests_completed: 12,
                average_score: 1420,
                improvement_percent: 15,
                study_hours: 42,
            },
            history: vec![
                entry(date(2024, 1, 20), 1450, 720, 730),
                entry(date(2024, 1, 15), 1420, 700, 720),
                entry(date(2024, 1, 10), 1390, 680, 710),
                entry(date(2024, 1, 5), 1360, 660, 700),
                entry(date(2023, 12, 30), 1320, 640, 680),
            ],
            sections: vec![
                SectionProgress {
                    section: Section::Math,
                    current: 720,
                    target: 750,
                    improvement: 80,
                },
                SectionProgress {
                    section: Section::Reading,
                    current: 730,
                    target: 760,
                    improvement: 50,
                },
                SectionProgress {
                    section: Section::Writing,
                    current: 690,
                    target: 720,
                    improvement: 70,
                },
            ],
            strengths: vec![
                "Algebra and Functions",
                "Reading Comprehension",
                "Grammar and Usage",
            ],
            weaknesses: vec!["Geometry", "Data Analysis", "Vocabulary in Context"],
            focus_areas: vec![
                "Practice more geometry problems",
                "Review data analysis techniques",
                "Expand vocabulary with context clues",
                "Time management in reading section",
            ],
            next_steps: vec![
                "Take a full practice test this week",
                "Complete 20 math questions daily",
                "Read one academic article per day",
                "Review grammar rules weekly",
            ],
            target_total: 1500,
        }
    }

    /// Change of each history entry against the next older one. The oldest
    /// entry has nothing to compare with and reports 0.
    pub fn score_changes(&self) -> Vec<i64> {
        self.history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                self.history
                    .get(i + 1)
                    .map_or(0, |prev| entry.total as i64 - prev.total as i64)
            })
            .collect()
    }

    pub fn section(&self, section: Section) -> Option<&SectionProgress> {
        self.sections.iter().find(|s| s.section == section)
    }
}

/// "+30", "-20" or "-" for no change.
pub fn format_change(change: i64) -> String {
    match change {
        0 => "-".to_string(),
        c if c > 0 => format!("+{c}"),
        c => c.to_string(),
    }
}

/// Practice tests completed since the program started.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub tests_taken: usize,
    pub average_percent: f64,
    pub best_percent: u32,
    pub questions_answered: usize,
    pub questions_correct: usize,
}

impl SessionSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let total_percent: u32 = results.iter().map(|r| r.score.percent).sum();
        Self {
            tests_taken: results.len(),
            average_percent: total_percent as f64 / results.len() as f64,
            best_percent: results.iter().map(|r| r.score.percent).max().unwrap_or(0),
            questions_answered: results
                .iter()
                .map(|r| r.review.iter().filter(|item| item.chosen.is_some()).count())
                .sum(),
            questions_correct: results.iter().map(|r| r.score.correct).sum(),
        }
    }
}
