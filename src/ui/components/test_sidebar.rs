use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::practice_test::TestSnapshot;
use crate::session::timer::format_clock;
use crate::ui::theme::Theme;

/// Clock, answer count and a slot grid for the running practice test.
pub struct TestSidebar<'a> {
    snapshot: TestSnapshot<'a>,
    answers: &'a [Option<usize>],
    low_on_time: bool,
    theme: &'a Theme,
}

impl<'a> TestSidebar<'a> {
    pub fn new(
        snapshot: TestSnapshot<'a>,
        answers: &'a [Option<usize>],
        low_on_time: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            snapshot,
            answers,
            low_on_time,
            theme,
        }
    }
}

impl Widget for TestSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(4)])
            .split(area);

        let remaining = self.snapshot.remaining_secs;
        let clock_color = if self.low_on_time {
            colors.error()
        } else {
            colors.accent()
        };
        let unanswered = self.snapshot.len - self.snapshot.answered;

        let lines = vec![
            Line::from(vec![
                Span::styled("Time left: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format_clock(remaining),
                    Style::default().fg(clock_color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Answered:  ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{}/{}", self.snapshot.answered, self.snapshot.len),
                    Style::default().fg(colors.success()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Skipped:   ", Style::default().fg(colors.fg())),
                Span::styled(
                    unanswered.to_string(),
                    Style::default().fg(if unanswered == 0 {
                        colors.text_muted()
                    } else {
                        colors.warning()
                    }),
                ),
            ]),
        ];
        let block = Block::bordered()
            .title(" Test ")
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        let mut slots: Vec<Span> = Vec::with_capacity(self.answers.len() * 2);
        for (i, answer) in self.answers.iter().enumerate() {
            let style = if i == self.snapshot.cursor {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else if answer.is_some() {
                Style::default().fg(colors.success())
            } else {
                Style::default().fg(colors.text_muted())
            };
            slots.push(Span::styled(format!("{:>2}", i + 1), style));
            slots.push(Span::raw(" "));
        }
        let block = Block::bordered()
            .title(" Questions ")
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(Line::from(slots))
            .wrap(Wrap { trim: false })
            .block(block)
            .render(sections[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Section;
    use crate::bank::tests::question;
    use crate::session::practice_test::{TestPlan, TestSession};

    #[test]
    fn shows_clock_and_answer_counts() {
        let mut session = TestSession::new(TestPlan {
            time_limit_secs: 125,
            ..TestPlan::default()
        });
        session
            .begin_with(vec![
                question("a", Section::Math, 0),
                question("b", Section::Math, 1),
                question("c", Section::Writing, 2),
            ])
            .unwrap();
        session.select_answer(1).unwrap();

        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 14);
        let mut buf = Buffer::empty(area);
        TestSidebar::new(session.snapshot(), session.answers(), false, &theme)
            .render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("02:05"));
        assert!(text.contains("1/3"));
        assert!(text.contains("Skipped:   2"));
    }
}
