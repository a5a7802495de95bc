use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::bank::{Question, option_letter};
use crate::ui::theme::Theme;

/// One multiple-choice question with its options. In reveal mode the correct
/// option and a wrong pick are marked and the explanation is shown.
pub struct QuestionCard<'a> {
    question: &'a Question,
    selected: Option<usize>,
    revealed: bool,
    title: String,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(question: &'a Question, selected: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            question,
            selected,
            revealed: false,
            title: String::new(),
            theme,
        }
    }

    pub fn revealed(mut self, revealed: bool) -> Self {
        self.revealed = revealed;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn option_line(&self, index: usize, text: &'a str) -> Line<'a> {
        let colors = &self.theme.colors;
        let is_selected = self.selected == Some(index);
        let is_correct = self.question.is_correct(index);

        let mut style = Style::default().fg(colors.fg());
        let mut marker = "";
        if self.revealed && is_correct {
            style = Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD);
            marker = "  \u{2713} correct";
        } else if self.revealed && is_selected {
            style = Style::default().fg(colors.error());
            marker = "  \u{2717} your answer";
        } else if is_selected {
            style = Style::default()
                .fg(colors.accent())
                .bg(colors.selected_bg())
                .add_modifier(Modifier::BOLD);
        }

        let indicator = if is_selected { ">" } else { " " };
        Line::from(vec![
            Span::styled(
                format!(" {indicator} {}. ", option_letter(index)),
                style,
            ),
            Span::styled(text, style),
            Span::styled(marker, style),
        ])
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let section_color = colors.section(self.question.section);

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let explanation_height = if self.revealed { 4 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(self.question.options.len() as u16 + 1),
                Constraint::Length(explanation_height),
            ])
            .split(inner);

        let badges = Line::from(vec![
            Span::styled(
                format!(" {} ", self.question.section.label()),
                Style::default()
                    .fg(colors.bg())
                    .bg(section_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!(" {} ", self.question.difficulty.label()),
                Style::default().fg(colors.fg()).bg(colors.accent_dim()),
            ),
            Span::styled(
                format!("  {}", self.question.topic),
                Style::default().fg(colors.text_muted()),
            ),
        ]);
        Paragraph::new(badges).render(layout[0], buf);

        Paragraph::new(Span::styled(
            self.question.question.as_str(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: false })
        .render(layout[1], buf);

        let options: Vec<Line> = self
            .question
            .options
            .iter()
            .enumerate()
            .map(|(i, text)| self.option_line(i, text))
            .collect();
        Paragraph::new(options)
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);

        if self.revealed {
            let lines = vec![
                Line::from(Span::styled(
                    "Explanation",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    self.question.explanation.as_str(),
                    Style::default().fg(colors.fg()),
                )),
            ];
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(layout[3], buf);
        }
    }
}
