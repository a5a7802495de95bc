use crate::bank::question::{Difficulty, Question, Section};

/// Section/difficulty filter used by the question browser. `None` means "all".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub section: Option<Section>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionFilter {
    pub fn new(section: Option<Section>, difficulty: Option<Difficulty>) -> Self {
        Self {
            section,
            difficulty,
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        self.section.is_none_or(|s| question.section == s)
            && self.difficulty.is_none_or(|d| question.difficulty == d)
    }

    pub fn cycle_section_forward(&mut self) {
        self.section = cycle_forward(&Section::ALL, self.section);
    }

    pub fn cycle_section_backward(&mut self) {
        self.section = cycle_backward(&Section::ALL, self.section);
    }

    pub fn cycle_difficulty_forward(&mut self) {
        self.difficulty = cycle_forward(&Difficulty::ALL, self.difficulty);
    }

    pub fn cycle_difficulty_backward(&mut self) {
        self.difficulty = cycle_backward(&Difficulty::ALL, self.difficulty);
    }

    pub fn section_label(&self) -> &'static str {
        self.section.map_or("All Sections", Section::label)
    }

    pub fn difficulty_label(&self) -> &'static str {
        self.difficulty.map_or("All Difficulties", Difficulty::label)
    }
}

// None -> first -> ... -> last -> None
fn cycle_forward<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => {
            let idx = all.iter().position(|v| *v == value)?;
            all.get(idx + 1).copied()
        }
    }
}

fn cycle_backward<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.last().copied(),
        Some(value) => {
            let idx = all.iter().position(|v| *v == value)?;
            idx.checked_sub(1).map(|i| all[i])
        }
    }
}
