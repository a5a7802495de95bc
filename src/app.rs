use std::sync::mpsc::Sender;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::{QuestionBank, Section};
use crate::config::{Config, MAX_TEST_LENGTH, MAX_TIME_LIMIT_SECS, MIN_TIME_LIMIT_SECS};
use crate::event::AppEvent;
use crate::guides::{GuideBrowser, StudyGuides};
use crate::progress::ProgressReport;
use crate::session::drill::DrillState;
use crate::session::practice_test::{SubmitReason, TestPhase, TestSession};
use crate::session::result::TestResult;
use crate::session::ticker::Ticker;
use crate::session::timer::TickOutcome;
use crate::ui::components::menu::Menu;
use crate::ui::components::progress_dashboard::PROGRESS_TABS;
use crate::ui::theme::Theme;

pub const SETTINGS_FIELDS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    PracticeTest,
    TestResult,
    QuestionBank,
    StudyGuides,
    Progress,
    Settings,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub bank: &'static QuestionBank,
    pub guides: &'static StudyGuides,
    pub test: Option<TestSession>,
    pub last_result: Option<TestResult>,
    pub results: Vec<TestResult>,
    pub review_scroll: usize,
    pub drill: DrillState,
    pub guide_browser: GuideBrowser,
    pub progress: ProgressReport,
    pub progress_tab: usize,
    pub settings_selected: usize,
    pub should_quit: bool,
    test_id: u64,
    ticker: Option<Ticker>,
    event_tx: Option<Sender<AppEvent>>,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self {
            screen: AppScreen::Home,
            menu: Menu::new(theme),
            theme,
            config,
            bank: QuestionBank::bundled(),
            guides: StudyGuides::bundled(),
            test: None,
            last_result: None,
            results: Vec::new(),
            review_scroll: 0,
            drill: DrillState::default(),
            guide_browser: GuideBrowser::default(),
            progress: ProgressReport::sample(),
            progress_tab: 0,
            settings_selected: 0,
            should_quit: false,
            test_id: 0,
            ticker: None,
            event_tx: None,
            rng,
        }
    }

    /// Practice test clocks post their ticks through this sender. Without it
    /// the clock only moves through `on_countdown`.
    pub fn with_event_sender(mut self, tx: Sender<AppEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn go_to_home(&mut self) {
        self.stop_clock();
        self.test = None;
        self.screen = AppScreen::Home;
    }

    /// Show the practice test intro. The sample is drawn when the user starts.
    pub fn open_practice_test(&mut self) {
        self.stop_clock();
        self.test_id += 1;
        self.test = Some(TestSession::new(self.config.test_plan()));
        self.screen = AppScreen::PracticeTest;
    }

    pub fn start_test(&mut self) {
        let Some(test) = self.test.as_mut() else {
            return;
        };
        if let Err(err) = test.begin(self.bank, &mut self.rng) {
            tracing::debug!(%err, "start ignored");
            return;
        }
        tracing::info!(
            test_id = self.test_id,
            questions = test.len(),
            time_limit_secs = test.plan().time_limit_secs,
            "practice test started"
        );
        if test.is_complete() {
            self.finish_test();
        } else {
            self.start_clock();
        }
    }

    fn start_clock(&mut self) {
        self.stop_clock();
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let id = self.test_id;
        self.ticker = Some(Ticker::spawn(Duration::from_secs(1), move || {
            tx.send(AppEvent::Countdown(id)).is_ok()
        }));
    }

    fn stop_clock(&mut self) {
        // Dropping the ticker joins its thread.
        self.ticker = None;
    }

    pub fn clock_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_active)
    }

    pub fn current_test_id(&self) -> u64 {
        self.test_id
    }

    pub fn on_countdown(&mut self, id: u64) {
        if id != self.test_id {
            tracing::debug!(id, current = self.test_id, "stale countdown tick ignored");
            return;
        }
        let Some(test) = self.test.as_mut() else {
            return;
        };
        if test.tick() == TickOutcome::Expired {
            tracing::info!(test_id = self.test_id, "time expired, submitting");
            self.finish_test();
        }
    }

    pub fn select_answer(&mut self, index: usize) {
        if let Some(test) = self.test.as_mut() {
            if let Err(err) = test.select_answer(index) {
                tracing::debug!(%err, "answer rejected");
            }
        }
    }

    pub fn next_question(&mut self) {
        if let Some(test) = self.test.as_mut() {
            test.advance();
        }
    }

    pub fn prev_question(&mut self) {
        if let Some(test) = self.test.as_mut() {
            test.retreat();
        }
    }

    pub fn submit_test(&mut self) {
        let Some(test) = self.test.as_mut() else {
            return;
        };
        match test.submit(SubmitReason::Manual) {
            Ok(true) => self.finish_test(),
            Ok(false) => {}
            Err(err) => tracing::debug!(%err, "submit ignored"),
        }
    }

    fn finish_test(&mut self) {
        self.stop_clock();
        let Some(test) = self.test.as_ref() else {
            return;
        };
        match TestResult::from_session(test) {
            Ok(result) => {
                tracing::info!(
                    test_id = self.test_id,
                    correct = result.score.correct,
                    total = result.score.total,
                    percent = result.score.percent,
                    timed_out = result.timed_out(),
                    "practice test completed"
                );
                self.results.push(result.clone());
                self.last_result = Some(result);
                self.review_scroll = 0;
                self.screen = AppScreen::TestResult;
            }
            Err(err) => tracing::warn!(%err, "could not build test result"),
        }
    }

    pub fn retake_test(&mut self) {
        self.open_practice_test();
        self.start_test();
    }

    pub fn test_phase(&self) -> Option<TestPhase> {
        self.test.as_ref().map(TestSession::phase)
    }

    pub fn scroll_review(&mut self, delta: isize) {
        let len = self.last_result.as_ref().map_or(0, |r| r.review.len());
        let max = len.saturating_sub(1);
        self.review_scroll = self.review_scroll.saturating_add_signed(delta).min(max);
    }

    pub fn go_to_question_bank(&mut self) {
        self.stop_clock();
        self.screen = AppScreen::QuestionBank;
    }

    pub fn drill_next(&mut self) {
        if !self.drill.next_question(self.bank, &mut self.rng) {
            tracing::debug!(filter = ?self.drill.filter, "no questions match filter");
        }
    }

    pub fn drill_select(&mut self, index: usize) {
        self.drill.select(index);
    }

    pub fn drill_reveal(&mut self) {
        self.drill.reveal();
    }

    /// Filter changes drop the shown question; it may no longer match.
    pub fn drill_cycle_section(&mut self, forward: bool) {
        if forward {
            self.drill.filter.cycle_section_forward();
        } else {
            self.drill.filter.cycle_section_backward();
        }
        self.drill.clear();
    }

    pub fn drill_cycle_difficulty(&mut self, forward: bool) {
        if forward {
            self.drill.filter.cycle_difficulty_forward();
        } else {
            self.drill.filter.cycle_difficulty_backward();
        }
        self.drill.clear();
    }

    pub fn go_to_guides(&mut self) {
        self.stop_clock();
        self.screen = AppScreen::StudyGuides;
    }

    pub fn go_to_progress(&mut self) {
        self.stop_clock();
        self.screen = AppScreen::Progress;
    }

    pub fn progress_next_tab(&mut self) {
        self.progress_tab = (self.progress_tab + 1) % PROGRESS_TABS.len();
    }

    pub fn progress_prev_tab(&mut self) {
        self.progress_tab = self
            .progress_tab
            .checked_sub(1)
            .unwrap_or(PROGRESS_TABS.len() - 1);
    }

    pub fn progress_set_tab(&mut self, tab: usize) {
        if tab < PROGRESS_TABS.len() {
            self.progress_tab = tab;
        }
    }

    pub fn go_to_settings(&mut self) {
        self.stop_clock();
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn settings_cycle_forward(&mut self) {
        match self.settings_selected {
            0 => self.cycle_theme(true),
            1 => {
                self.config.test_length = (self.config.test_length + 1).min(MAX_TEST_LENGTH);
            }
            2 => {
                // Never shorten a limit that is already above the cap.
                let limit = self.config.time_limit_secs;
                self.config.time_limit_secs = (limit + 5 * 60).min(MAX_TIME_LIMIT_SECS).max(limit);
            }
            3 => {
                self.config.low_time_warning_secs =
                    (self.config.low_time_warning_secs + 60).min(self.config.time_limit_secs);
            }
            4 => {
                self.config.default_section = match self.config.default_section {
                    None => Some(Section::Math),
                    Some(Section::Math) => Some(Section::Reading),
                    Some(Section::Reading) => Some(Section::Writing),
                    Some(Section::Writing) => None,
                };
            }
            _ => {}
        }
    }

    pub fn settings_cycle_backward(&mut self) {
        match self.settings_selected {
            0 => self.cycle_theme(false),
            1 => {
                self.config.test_length = self.config.test_length.saturating_sub(1).max(1);
            }
            2 => {
                self.config.time_limit_secs = self
                    .config
                    .time_limit_secs
                    .saturating_sub(5 * 60)
                    .max(MIN_TIME_LIMIT_SECS);
            }
            3 => {
                self.config.low_time_warning_secs =
                    self.config.low_time_warning_secs.saturating_sub(60);
            }
            4 => {
                self.config.default_section = match self.config.default_section {
                    None => Some(Section::Writing),
                    Some(Section::Writing) => Some(Section::Reading),
                    Some(Section::Reading) => Some(Section::Math),
                    Some(Section::Math) => None,
                };
            }
            _ => {}
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) if forward => (idx + 1) % themes.len(),
            Some(0) => themes.len() - 1,
            Some(idx) => idx - 1,
            None => 0,
        };
        let name = themes[next].clone();
        self.set_theme(&name);
    }

    /// Switch to a bundled or user theme. Unknown names leave the current
    /// theme in place.
    pub fn set_theme(&mut self, name: &str) -> bool {
        let Some(new_theme) = Theme::load(name) else {
            tracing::warn!(theme = name, "unknown theme");
            return false;
        };
        let theme: &'static Theme = Box::leak(Box::new(new_theme));
        self.theme = theme;
        self.menu.theme = theme;
        self.config.theme = name.to_string();
        true
    }

    pub fn save_settings(&mut self) {
        self.config.normalize();
        if let Err(err) = self.config.save() {
            tracing::warn!(%err, "failed to save config");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn app_with(config: Config) -> App {
        App::new(config, Some(7))
    }

    fn short_test_config(time_limit_secs: u32) -> Config {
        Config {
            test_length: 4,
            time_limit_secs,
            ..Config::default()
        }
    }

    #[test]
    fn practice_test_flow_reaches_results() {
        let mut app = app_with(short_test_config(600));
        app.open_practice_test();
        assert_eq!(app.test_phase(), Some(TestPhase::NotStarted));
        app.start_test();
        assert_eq!(app.test_phase(), Some(TestPhase::InProgress));

        app.select_answer(0);
        app.next_question();
        app.select_answer(9);
        app.submit_test();

        assert_eq!(app.screen, AppScreen::TestResult);
        let result = app.last_result.as_ref().unwrap();
        assert_eq!(result.score.total, 4);
        assert_eq!(result.review.iter().filter(|r| r.chosen.is_some()).count(), 1);
        assert_eq!(app.results.len(), 1);
    }

    #[test]
    fn expiry_through_countdown_submits_once() {
        let mut app = app_with(short_test_config(60));
        app.open_practice_test();
        app.start_test();
        let id = app.current_test_id();
        for _ in 0..59 {
            app.on_countdown(id);
        }
        assert_eq!(app.screen, AppScreen::PracticeTest);
        app.on_countdown(id);
        assert_eq!(app.screen, AppScreen::TestResult);
        assert!(app.last_result.as_ref().unwrap().timed_out());
        app.on_countdown(id);
        app.submit_test();
        assert_eq!(app.results.len(), 1);
    }

    #[test]
    fn stale_countdown_is_ignored() {
        let mut app = app_with(short_test_config(600));
        app.open_practice_test();
        app.start_test();
        let old_id = app.current_test_id();
        app.open_practice_test();
        app.start_test();
        app.on_countdown(old_id);
        assert_eq!(app.test.as_ref().unwrap().remaining_secs(), 600);
        app.on_countdown(app.current_test_id());
        assert_eq!(app.test.as_ref().unwrap().remaining_secs(), 599);
    }

    #[test]
    fn clock_ticker_is_cancelled_on_submit_and_leave() {
        let (tx, _rx) = mpsc::channel();
        let mut app = app_with(short_test_config(600)).with_event_sender(tx);
        app.open_practice_test();
        app.start_test();
        assert!(app.clock_running());
        app.submit_test();
        assert!(!app.clock_running());

        app.retake_test();
        assert!(app.clock_running());
        app.go_to_home();
        assert!(!app.clock_running());
        assert!(app.test.is_none());
    }

    #[test]
    fn answering_before_start_is_ignored() {
        let mut app = app_with(short_test_config(600));
        app.open_practice_test();
        app.select_answer(0);
        app.submit_test();
        assert_eq!(app.screen, AppScreen::PracticeTest);
        assert_eq!(app.test_phase(), Some(TestPhase::NotStarted));
    }

    #[test]
    fn review_scroll_is_clamped() {
        let mut app = app_with(short_test_config(600));
        app.retake_test();
        app.submit_test();
        app.scroll_review(10);
        assert_eq!(app.review_scroll, 3);
        app.scroll_review(-10);
        assert_eq!(app.review_scroll, 0);
    }

    #[test]
    fn drill_filter_change_clears_question() {
        let mut app = app_with(Config::default());
        app.go_to_question_bank();
        app.drill_next();
        assert!(app.drill.current().is_some());
        app.drill_cycle_section(true);
        assert!(app.drill.current().is_none());
        assert_eq!(app.drill.filter.section, Some(Section::Math));
    }

    #[test]
    fn settings_bounds() {
        let mut app = app_with(Config::default());
        app.settings_selected = 1;
        for _ in 0..100 {
            app.settings_cycle_forward();
        }
        assert_eq!(app.config.test_length, MAX_TEST_LENGTH);
        app.settings_selected = 2;
        for _ in 0..100 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.config.time_limit_secs, MIN_TIME_LIMIT_SECS);
        app.settings_selected = 4;
        app.settings_cycle_backward();
        assert_eq!(app.config.default_section, Some(Section::Writing));
    }

    #[test]
    fn progress_tabs_wrap() {
        let mut app = app_with(Config::default());
        app.progress_prev_tab();
        assert_eq!(app.progress_tab, PROGRESS_TABS.len() - 1);
        app.progress_next_tab();
        assert_eq!(app.progress_tab, 0);
        app.progress_set_tab(9);
        assert_eq!(app.progress_tab, 0);
    }

    #[test]
    fn unknown_theme_keeps_current() {
        let mut app = app_with(Config::default());
        assert!(!app.set_theme("no-such-theme"));
        assert_eq!(app.config.theme, "catppuccin-mocha");
        assert!(app.set_theme("gruvbox-dark"));
        assert_eq!(app.theme.name, "gruvbox-dark");
    }

    #[test]
    fn raising_time_limit_never_shortens_it() {
        let mut app = app_with(Config {
            time_limit_secs: 5 * 60 * 60,
            ..Config::default()
        });
        app.settings_selected = 2;
        app.settings_cycle_forward();
        assert_eq!(app.config.time_limit_secs, 5 * 60 * 60);

        app.config.time_limit_secs = MAX_TIME_LIMIT_SECS - 60;
        app.settings_cycle_forward();
        assert_eq!(app.config.time_limit_secs, MAX_TIME_LIMIT_SECS);
    }
}
