use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::result::TestResult;
use crate::session::timer::format_clock;
use crate::ui::theme::{Theme, ThemeColors};

pub struct ResultDashboard<'a> {
    pub result: &'a TestResult,
    /// Index of the first review item shown.
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> ResultDashboard<'a> {
    pub fn new(result: &'a TestResult, scroll: usize, theme: &'a Theme) -> Self {
        Self {
            result,
            scroll,
            theme,
        }
    }
}

fn percent_color(colors: &ThemeColors, percent: u32) -> Color {
    if percent >= 80 {
        colors.success()
    } else if percent >= 60 {
        colors.warning()
    } else {
        colors.error()
    }
}

impl Widget for ResultDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let score = &self.result.score;

        let block = Block::bordered()
            .title(" Test Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let mut title_spans = vec![Span::styled(
            "Results",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )];
        if self.result.timed_out() {
            title_spans.push(Span::styled(
                "  (time expired, submitted automatically)",
                Style::default().fg(colors.warning()),
            ));
        }
        Paragraph::new(Line::from(title_spans))
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let score_line = Line::from(vec![
            Span::styled("  Score:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}%", score.percent),
                Style::default()
                    .fg(percent_color(colors, score.percent))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  You answered {} out of {} questions correctly",
                    score.correct, score.total
                ),
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format_clock(self.result.elapsed_secs),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("  ({} left)", format_clock(self.result.remaining_secs)),
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[2], buf);

        let mut review: Vec<Line> = Vec::new();
        for (i, item) in self.result.review.iter().enumerate().skip(self.scroll) {
            let (mark, mark_color) = if item.is_correct {
                ("\u{2713}", colors.success())
            } else {
                ("\u{2717}", colors.error())
            };
            review.push(Line::from(vec![
                Span::styled(
                    format!("  {mark} "),
                    Style::default().fg(mark_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}. {}", i + 1, item.question),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]));
            review.push(Line::from(vec![
                Span::styled("     Your answer:    ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    item.chosen_text(),
                    Style::default().fg(if item.is_correct {
                        colors.success()
                    } else {
                        colors.error()
                    }),
                ),
            ]));
            review.push(Line::from(vec![
                Span::styled("     Correct answer: ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    item.correct_option.as_str(),
                    Style::default().fg(colors.success()),
                ),
            ]));
            review.push(Line::from(Span::styled(
                format!("     {}", item.explanation),
                Style::default().fg(colors.fg()),
            )));
            review.push(Line::from(""));
        }
        let review_block = Block::bordered()
            .title(format!(
                " Review ({}/{}) ",
                (self.scroll + 1).min(self.result.review.len()),
                self.result.review.len()
            ))
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(review)
            .wrap(Wrap { trim: false })
            .block(review_block)
            .render(layout[3], buf);

        let help = Line::from(vec![
            Span::styled("  [j/k] Scroll  ", Style::default().fg(colors.accent())),
            Span::styled("[r] Retake  ", Style::default().fg(colors.accent())),
            Span::styled("[q/Esc] Menu", Style::default().fg(colors.accent())),
        ]);
        Paragraph::new(help).render(layout[4], buf);
    }
}
