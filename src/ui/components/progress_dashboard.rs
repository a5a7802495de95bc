use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::progress::{ProgressReport, ScoreTier, SessionSummary, format_change, score_tier};
use crate::session::result::TestResult;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub const PROGRESS_TABS: [&str; 4] = [
    "[1] Overview",
    "[2] History",
    "[3] Sections",
    "[4] This Session",
];

pub struct ProgressDashboard<'a> {
    pub report: &'a ProgressReport,
    pub results: &'a [TestResult],
    pub active_tab: usize,
    pub theme: &'a Theme,
}

impl<'a> ProgressDashboard<'a> {
    pub fn new(
        report: &'a ProgressReport,
        results: &'a [TestResult],
        active_tab: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            report,
            results,
            active_tab,
            theme,
        }
    }

    fn render_overview_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let overview = &self.report.overview;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(4)])
            .split(area);

        let stat = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<20}"), Style::default().fg(colors.fg())),
                Span::styled(
                    value,
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        };
        let stats = vec![
            stat("Tests completed", overview.tests_completed.to_string()),
            stat("Average score", overview.average_score.to_string()),
            stat("Improvement", format!("+{}%", overview.improvement_percent)),
            stat("Study hours", overview.study_hours.to_string()),
        ];
        Paragraph::new(stats)
            .block(Block::bordered().border_style(Style::default().fg(colors.border())))
            .render(layout[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        let list = |title: &'static str, items: &[&'static str], color: Color| {
            let lines: Vec<Line> = items
                .iter()
                .map(|item| {
                    Line::from(Span::styled(
                        format!(" \u{2022} {item}"),
                        Style::default().fg(color),
                    ))
                })
                .collect();
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::bordered()
                    .title(format!(" {title} "))
                    .border_style(Style::default().fg(colors.border())),
            )
        };

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        list("Strengths", &self.report.strengths, colors.success()).render(left[0], buf);
        list("Needs Work", &self.report.weaknesses, colors.error()).render(left[1], buf);
        list("Focus Areas", &self.report.focus_areas, colors.fg()).render(right[0], buf);
        list("Next Steps", &self.report.next_steps, colors.fg()).render(right[1], buf);
    }

    fn render_history_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let changes = self.report.score_changes();

        let header = Line::from(Span::styled(
            format!(
                "  {:<12} {:>6} {:>6} {:>14} {:>8}",
                "Date", "Total", "Math", "Reading/Writ.", "Change"
            ),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ));
        let mut lines = vec![header];

        for (entry, change) in self.report.history.iter().zip(changes) {
            let tier_color = match score_tier(entry.total) {
                ScoreTier::Excellent => colors.success(),
                ScoreTier::Good => colors.accent(),
                ScoreTier::Fair => colors.warning(),
                ScoreTier::NeedsWork => colors.error(),
            };
            let change_color = if change > 0 {
                colors.success()
            } else if change < 0 {
                colors.error()
            } else {
                colors.text_muted()
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<12} ", entry.date.format("%Y-%m-%d")),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(
                    format!("{:>6} ", entry.total),
                    Style::default().fg(tier_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:>6} {:>14} ", entry.math, entry.reading_writing),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(
                    format!("{:>8}", format_change(change)),
                    Style::default().fg(change_color),
                ),
            ]));
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Score History ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(area, buf);
    }

    fn render_sections_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut constraints: Vec<Constraint> = self
            .report
            .sections
            .iter()
            .map(|_| Constraint::Length(4))
            .collect();
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (section, row) in self.report.sections.iter().zip(rows.iter()) {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(1)])
                .split(*row);
            ProgressBar::new(section.section.label(), section.ratio(), self.theme)
                .caption(format!("{} / {}", section.current, section.target))
                .fill(colors.section(section.section))
                .render(parts[0], buf);
            let note = if section.points_to_go() == 0 {
                "  Target reached".to_string()
            } else {
                format!(
                    "  {} points to go, +{} since first test",
                    section.points_to_go(),
                    section.improvement
                )
            };
            Paragraph::new(Span::styled(note, Style::default().fg(colors.text_muted())))
                .render(parts[1], buf);
        }
    }

    fn render_session_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Practice Tests This Session ")
            .border_style(Style::default().fg(colors.border()));

        if self.results.is_empty() {
            Paragraph::new(Span::styled(
                "  No practice tests finished yet. Results are kept until you quit.",
                Style::default().fg(colors.text_muted()),
            ))
            .block(block)
            .render(area, buf);
            return;
        }

        let summary = SessionSummary::from_results(self.results);
        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "  {} tests, average {:.0}%, best {}%, {}/{} answered correctly",
                    summary.tests_taken,
                    summary.average_percent,
                    summary.best_percent,
                    summary.questions_correct,
                    summary.questions_answered
                ),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (i, result) in self.results.iter().enumerate().rev() {
            let note = if result.timed_out() { "  time expired" } else { "" };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  #{:<3} {} ", i + 1, result.timestamp.format("%H:%M:%S")),
                    Style::default().fg(colors.text_muted()),
                ),
                Span::styled(
                    format!(
                        "{:>3}%  ({}/{})",
                        result.score.percent, result.score.correct, result.score.total
                    ),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled(note, Style::default().fg(colors.warning())),
            ]));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

impl Widget for ProgressDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);

        let tab_spans: Vec<Span> = PROGRESS_TABS
            .iter()
            .enumerate()
            .flat_map(|(i, &label)| {
                let style = if i == self.active_tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.text_muted())
                };
                [Span::styled(format!(" {label} "), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        match self.active_tab {
            0 => self.render_overview_tab(layout[1], buf),
            1 => self.render_history_tab(layout[1], buf),
            2 => self.render_sections_tab(layout[1], buf),
            _ => self.render_session_tab(layout[1], buf),
        }

        Paragraph::new(Line::from(Span::styled(
            format!(
                "  [ESC] Back  [Tab] Next tab  [1-4] Switch tab    Target score: {}",
                self.report.target_total
            ),
            Style::default().fg(colors.accent()),
        )))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_tab(tab: usize) -> String {
        let theme = Theme::default();
        let report = ProgressReport::sample();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        ProgressDashboard::new(&report, &[], tab, &theme).render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn history_tab_lists_changes() {
        let text = render_tab(1);
        assert!(text.contains("2024-01-20"));
        assert!(text.contains("+30"));
        assert!(text.contains("+40"));
    }

    #[test]
    fn sections_tab_shows_targets() {
        let text = render_tab(2);
        assert!(text.contains("720 / 750"));
        assert!(text.contains("30 points to go"));
    }

    #[test]
    fn session_tab_without_results() {
        let text = render_tab(3);
        assert!(text.contains("No practice tests finished yet"));
    }
}
