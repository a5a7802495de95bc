use std::sync::LazyLock;

use serde::Deserialize;

use crate::bank::Section;

const GUIDES_TOML: &str = include_str!("../assets/guides.toml");

static BUNDLED: LazyLock<StudyGuides> = LazyLock::new(|| {
    toml::from_str(GUIDES_TOML).unwrap_or_else(|err| {
        tracing::error!(%err, "bundled study guides are invalid");
        StudyGuides::default()
    })
});

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudyGuides {
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub strategies: Strategies,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Guide {
    pub section: Section,
    pub title: String,
    pub description: String,
    pub topics: Vec<Topic>,
    pub tips: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Topic {
    pub title: String,
    pub points: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Strategies {
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub during: Vec<String>,
    #[serde(default)]
    pub score_ranges: Vec<ScoreRange>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScoreRange {
    pub label: String,
    pub range: String,
}

impl StudyGuides {
    pub fn bundled() -> &'static StudyGuides {
        &BUNDLED
    }

    pub fn for_section(&self, section: Section) -> Option<&Guide> {
        self.guides.iter().find(|g| g.section == section)
    }
}

/// Selection plus at most one expanded guide.
#[derive(Clone, Debug, Default)]
pub struct GuideBrowser {
    pub selected: usize,
    pub expanded: Option<usize>,
}

impl GuideBrowser {
    pub fn next(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn prev(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            count - 1
        } else {
            self.selected - 1
        };
    }

    pub fn toggle(&mut self) {
        self.expanded = if self.expanded == Some(self.selected) {
            None
        } else {
            Some(self.selected)
        };
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_guides_cover_every_section() {
        let guides = StudyGuides::bundled();
        assert_eq!(guides.guides.len(), 3);
        for section in Section::ALL {
            let guide = guides.for_section(section).unwrap();
            assert_eq!(guide.topics.len(), 3);
            assert!(guide.topics.iter().all(|t| t.points.len() == 5));
            assert_eq!(guide.tips.len(), 4);
        }
        assert_eq!(guides.strategies.before.len(), 5);
        assert_eq!(guides.strategies.during.len(), 5);
        assert_eq!(guides.strategies.score_ranges.len(), 3);
    }

    #[test]
    fn toggle_expands_one_at_a_time() {
        let mut browser = GuideBrowser::default();
        browser.toggle();
        assert!(browser.is_expanded(0));
        browser.next(3);
        browser.toggle();
        assert!(browser.is_expanded(1));
        assert!(!browser.is_expanded(0));
        browser.toggle();
        assert_eq!(browser.expanded, None);
    }

    #[test]
    fn selection_wraps() {
        let mut browser = GuideBrowser::default();
        browser.prev(3);
        assert_eq!(browser.selected, 2);
        browser.next(3);
        assert_eq!(browser.selected, 0);
        browser.next(0);
        assert_eq!(browser.selected, 0);
    }
}
