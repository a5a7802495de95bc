use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use tracing_subscriber::EnvFilter;

use satprep::app::{App, AppScreen, SETTINGS_FIELDS};
use satprep::bank::{Section, option_index};
use satprep::config::Config;
use satprep::event::{AppEvent, EventHandler};
use satprep::session::practice_test::TestPhase;
use satprep::session::timer::format_clock;
use satprep::ui::components::guide_list::GuideList;
use satprep::ui::components::menu::MenuAction;
use satprep::ui::components::progress_bar::ProgressBar;
use satprep::ui::components::progress_dashboard::{PROGRESS_TABS, ProgressDashboard};
use satprep::ui::components::question_card::QuestionCard;
use satprep::ui::components::result_dashboard::ResultDashboard;
use satprep::ui::components::test_sidebar::TestSidebar;
use satprep::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use satprep::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "satprep", version, about = "Terminal SAT study aid with timed practice tests")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Questions per practice test")]
    questions: Option<usize>,

    #[arg(short, long, help = "Practice test time limit in minutes")]
    minutes: Option<u32>,

    #[arg(short, long, value_parser = parse_section, help = "Limit practice tests to one section (math, reading, writing)")]
    section: Option<Section>,

    #[arg(long, help = "Seed for question sampling")]
    seed: Option<u64>,
}

fn parse_section(name: &str) -> Result<Section, String> {
    Section::from_name(name)
        .ok_or_else(|| format!("unknown section `{name}` (expected math, reading or writing)"))
}

/// Log to `<data dir>/satprep/satprep.log`; the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("satprep");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("satprep.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env("SATPREP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("{err}"))?;
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("satprep: logging disabled: {err:#}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "could not read config, using defaults");
        Config::default()
    });
    if let Some(questions) = cli.questions {
        config.test_length = questions;
    }
    if let Some(minutes) = cli.minutes {
        config.time_limit_secs = minutes.saturating_mul(60);
    }
    if cli.section.is_some() {
        config.default_section = cli.section;
    }
    config.normalize();

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, cli.seed).with_event_sender(events.sender());
    if let Some(theme_name) = cli.theme {
        app.set_theme(&theme_name);
    }
    tracing::info!(
        questions = app.bank.len(),
        theme = %app.config.theme,
        seed = ?cli.seed,
        "satprep started"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    // Joins the clock thread before the terminal is restored.
    app.go_to_home();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Countdown(id) => app.on_countdown(id),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Home => handle_home_key(app, key),
        AppScreen::PracticeTest => handle_test_key(app, key),
        AppScreen::TestResult => handle_result_key(app, key),
        AppScreen::QuestionBank => handle_bank_key(app, key),
        AppScreen::StudyGuides => handle_guides_key(app, key),
        AppScreen::Progress => handle_progress_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn open_screen(app: &mut App, action: MenuAction) {
    match action {
        MenuAction::PracticeTest => app.open_practice_test(),
        MenuAction::QuestionBank => app.go_to_question_bank(),
        MenuAction::StudyGuides => app.go_to_guides(),
        MenuAction::Progress => app.go_to_progress(),
        MenuAction::Settings => app.go_to_settings(),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => open_screen(app, app.menu.selected_action()),
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                open_screen(app, action);
            }
        }
        _ => {}
    }
}

fn handle_test_key(app: &mut App, key: KeyEvent) {
    match app.test_phase() {
        Some(TestPhase::NotStarted) => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.start_test(),
            KeyCode::Esc | KeyCode::Char('q') => app.go_to_home(),
            _ => {}
        },
        Some(TestPhase::InProgress) => match key.code {
            KeyCode::Esc => {
                tracing::info!(test_id = app.current_test_id(), "practice test abandoned");
                app.go_to_home();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => app.next_question(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => app.prev_question(),
            KeyCode::Enter => {
                if app.test.as_ref().is_some_and(|t| t.is_last()) {
                    app.submit_test();
                } else {
                    app.next_question();
                }
            }
            KeyCode::Char('s') => app.submit_test(),
            KeyCode::Char(ch) => {
                if let Some(index) = option_index(ch) {
                    app.select_answer(index);
                }
            }
            _ => {}
        },
        _ => app.go_to_home(),
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_review(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_review(-1),
        KeyCode::PageDown => app.scroll_review(5),
        KeyCode::PageUp => app.scroll_review(-5),
        KeyCode::Char('r') => app.retake_test(),
        KeyCode::Char('p') => app.go_to_progress(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_home(),
        _ => {}
    }
}

fn handle_bank_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_home(),
        KeyCode::Char('s') => app.drill_cycle_section(true),
        KeyCode::Char('S') => app.drill_cycle_section(false),
        KeyCode::Char('f') => app.drill_cycle_difficulty(true),
        KeyCode::Char('F') => app.drill_cycle_difficulty(false),
        KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Char('r') => app.drill_next(),
        KeyCode::Enter => app.drill_reveal(),
        KeyCode::Char(ch) => {
            if let Some(index) = option_index(ch) {
                app.drill_select(index);
            }
        }
        _ => {}
    }
}

fn handle_guides_key(app: &mut App, key: KeyEvent) {
    let count = app.guides.guides.len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_home(),
        KeyCode::Down | KeyCode::Char('j') => app.guide_browser.next(count),
        KeyCode::Up | KeyCode::Char('k') => app.guide_browser.prev(count),
        KeyCode::Enter | KeyCode::Char(' ') => app.guide_browser.toggle(),
        _ => {}
    }
}

fn handle_progress_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_home(),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.progress_next_tab(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.progress_prev_tab(),
        KeyCode::Char(ch @ '1'..='9') => {
            app.progress_set_tab(ch as usize - '1' as usize);
        }
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.save_settings();
            app.go_to_home();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected = (app.settings_selected + 1).min(SETTINGS_FIELDS - 1);
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Home => render_home(frame, app),
        AppScreen::PracticeTest => render_test(frame, app),
        AppScreen::TestResult => render_result(frame, app),
        AppScreen::QuestionBank => render_bank(frame, app),
        AppScreen::StudyGuides => render_guides(frame, app),
        AppScreen::Progress => render_progress(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn header_line<'a>(theme: &Theme, title: &'a str, info: String) -> Paragraph<'a> {
    let colors = &theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn footer_hints(frame: &mut ratatui::Frame, theme: &Theme, hints: &[&str], area: Rect) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|line| {
            Line::from(Span::styled(
                line,
                Style::default().fg(theme.colors.text_muted()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let counts: Vec<String> = Section::ALL
        .iter()
        .map(|&s| format!("{} {}", app.bank.section_count(s), s.label()))
        .collect();
    let info = format!(
        "| {} questions ({}) | {} finished this session",
        app.bank.len(),
        counts.join(", "),
        app.results.len()
    );
    frame.render_widget(header_line(app.theme, "satprep", info), layout[0]);

    let menu_area = centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    footer_hints(
        frame,
        app.theme,
        &["[1-4] Open", "[c] Settings", "[j/k] Move", "[Enter] Select", "[q] Quit"],
        layout[2],
    );
}

fn render_test(frame: &mut ratatui::Frame, app: &App) {
    let Some(test) = app.test.as_ref() else {
        return;
    };
    if test.phase() == TestPhase::NotStarted {
        render_test_intro(frame, app);
        return;
    }

    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let snapshot = test.snapshot();
    let low_on_time = test.is_low_on_time(app.config.low_time_warning_secs);

    let info = format!(
        "| Question {} of {} | {} left | {} answered",
        snapshot.cursor + 1,
        snapshot.len,
        format_clock(snapshot.remaining_secs),
        snapshot.answered
    );
    frame.render_widget(header_line(app.theme, "Practice Test", info), app_layout.header);

    let show_progress = app_layout.tier.show_progress_bar(area.height);
    let mut constraints = vec![Constraint::Min(8)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    match snapshot.current {
        Some(question) => {
            let card = QuestionCard::new(question, snapshot.current_answer, app.theme)
                .title(format!("Question {} of {}", snapshot.cursor + 1, snapshot.len));
            frame.render_widget(card, main_layout[0]);
        }
        None => {
            let msg = Paragraph::new(Span::styled(
                "  No questions matched this test. Press [s] to finish.",
                Style::default().fg(app.theme.colors.text_muted()),
            ))
            .block(Block::bordered());
            frame.render_widget(msg, main_layout[0]);
        }
    }

    if show_progress {
        let bar = ProgressBar::new("Progress", test.progress(), app.theme)
            .caption(format!("{}/{}", snapshot.cursor + 1, snapshot.len));
        frame.render_widget(bar, main_layout[1]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = TestSidebar::new(snapshot, test.answers(), low_on_time, app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    let submit_hint = if test.is_last() { "[Enter/s] Submit" } else { "[s] Submit" };
    footer_hints(
        frame,
        app.theme,
        &["[A-D/1-4] Answer", "[\u{2190}/\u{2192}] Previous/Next", submit_hint, "[ESC] Quit test"],
        app_layout.footer,
    );
}

fn render_test_intro(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let Some(test) = app.test.as_ref() else {
        return;
    };
    let plan = test.plan();
    let section = plan.section.map_or("All sections", Section::label);
    let area = centered_rect(60, 60, frame.area());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "SAT Practice Test",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Questions:  {}",
            app.bank.sample_size(plan.length, plan.section)
        )),
        Line::from(format!("Time limit: {}", format_clock(plan.time_limit_secs))),
        Line::from(format!("Section:    {section}")),
        Line::from(""),
        Line::from(Span::styled(
            "Questions are drawn at random. Unanswered questions count as incorrect.",
            Style::default().fg(colors.text_muted()),
        )),
        Line::from(Span::styled(
            "The test is submitted automatically when the clock runs out.",
            Style::default().fg(colors.text_muted()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Start   [ESC] Back",
            Style::default().fg(colors.accent()),
        )),
    ];
    let block = Block::bordered()
        .title(" Practice Test ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    if let Some(result) = app.last_result.as_ref() {
        let area = centered_rect(80, 90, frame.area());
        frame.render_widget(ResultDashboard::new(result, app.review_scroll, app.theme), area);
    }
}

fn render_bank(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let drill = &app.drill;
    let available = drill.available(app.bank);

    let info = format!(
        "| {} | {} | {available} matching",
        drill.filter.section_label(),
        drill.filter.difficulty_label()
    );
    frame.render_widget(header_line(app.theme, "Question Bank", info), app_layout.header);

    match drill.current() {
        Some(question) => {
            let card = QuestionCard::new(question, drill.selection(), app.theme)
                .revealed(drill.is_revealed())
                .title(question.id.as_str());
            frame.render_widget(card, app_layout.main);
        }
        None => {
            let text = if available == 0 {
                "No questions match these filters."
            } else {
                "Press [Space] for a random question."
            };
            let msg = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(text, Style::default().fg(colors.text_muted()))),
            ])
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
            frame.render_widget(msg, app_layout.main);
        }
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let verdict = match drill.is_correct() {
            Some(true) => Span::styled("Correct!", Style::default().fg(colors.success())),
            Some(false) => Span::styled("Incorrect", Style::default().fg(colors.error())),
            None => Span::raw(""),
        };
        let lines = vec![
            Line::from(format!("Section:    {}", drill.filter.section_label())),
            Line::from(format!("Difficulty: {}", drill.filter.difficulty_label())),
            Line::from(format!("Available:  {available}")),
            Line::from(""),
            Line::from(format!("Attempted:  {}", drill.attempted)),
            Line::from(format!("Correct:    {}", drill.correct)),
            Line::from(""),
            Line::from(verdict),
        ];
        let block = Block::bordered()
            .title(" Filters ")
            .border_style(Style::default().fg(colors.border()));
        frame.render_widget(
            Paragraph::new(lines)
                .style(Style::default().fg(colors.fg()))
                .block(block),
            sidebar_area,
        );
    }

    footer_hints(
        frame,
        app.theme,
        &[
            "[s/S] Section",
            "[f/F] Difficulty",
            "[Space] Random question",
            "[A-D] Choose",
            "[Enter] Check answer",
            "[ESC] Back",
        ],
        app_layout.footer,
    );
}

fn render_guides(frame: &mut ratatui::Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(
        header_line(app.theme, "Study Guides", "| Section guides and test strategies".to_string()),
        layout[0],
    );
    frame.render_widget(
        GuideList::new(app.guides, &app.guide_browser, app.theme),
        layout[1],
    );
    footer_hints(
        frame,
        app.theme,
        &["[j/k] Move", "[Enter] Expand/collapse", "[ESC] Back"],
        layout[2],
    );
}

fn render_progress(frame: &mut ratatui::Frame, app: &App) {
    let tab = app.progress_tab.min(PROGRESS_TABS.len() - 1);
    let dashboard = ProgressDashboard::new(&app.progress, &app.results, tab, app.theme);
    frame.render_widget(dashboard, frame.area());
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: [(&str, String); SETTINGS_FIELDS] = [
        ("Theme", app.config.theme.clone()),
        ("Questions per test", app.config.test_length.to_string()),
        ("Time limit", format_clock(app.config.time_limit_secs)),
        (
            "Low time warning",
            format_clock(app.config.low_time_warning_secs),
        ),
        (
            "Test section",
            app.config
                .default_section
                .map_or("All sections", Section::label)
                .to_string(),
        ),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.text_muted()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, ((label, value), row)) in fields.iter().zip(field_layout.iter()).enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = if is_selected {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        let value_style = Style::default().fg(if is_selected {
            colors.accent()
        } else {
            colors.text_muted()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(*row, frame.buffer_mut());
    }

    Paragraph::new(Line::from(Span::styled(
        format!("  [ESC] Save & back    Saved to {}", Config::config_path().display()),
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}
