use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::guides::{GuideBrowser, StudyGuides};
use crate::ui::theme::Theme;

/// Collapsible section guides beside the general test strategies.
pub struct GuideList<'a> {
    guides: &'a StudyGuides,
    browser: &'a GuideBrowser,
    theme: &'a Theme,
}

impl<'a> GuideList<'a> {
    pub fn new(guides: &'a StudyGuides, browser: &'a GuideBrowser, theme: &'a Theme) -> Self {
        Self {
            guides,
            browser,
            theme,
        }
    }

    fn guide_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();

        for (i, guide) in self.guides.guides.iter().enumerate() {
            let is_selected = i == self.browser.selected;
            let expanded = self.browser.is_expanded(i);
            let arrow = if expanded { "\u{25be}" } else { "\u{25b8}" };
            let title_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(colors.section(guide.section))
                    .add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(
                format!(" {arrow} {}", guide.title),
                title_style,
            )));
            lines.push(Line::from(Span::styled(
                format!("   {}", guide.description),
                Style::default().fg(colors.text_muted()),
            )));

            if expanded {
                for topic in &guide.topics {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        format!("   {}", topic.title),
                        Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                    )));
                    for point in &topic.points {
                        lines.push(Line::from(Span::styled(
                            format!("     \u{2022} {point}"),
                            Style::default().fg(colors.fg()),
                        )));
                    }
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "   Study tips",
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )));
                for tip in &guide.tips {
                    lines.push(Line::from(Span::styled(
                        format!("     \u{2022} {tip}"),
                        Style::default().fg(colors.fg()),
                    )));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }

    fn strategy_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let guides: &'a StudyGuides = self.guides;
        let strategies = &guides.strategies;
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ))
        };
        let bullet = |text: &str| {
            Line::from(Span::styled(
                format!(" \u{2022} {text}"),
                Style::default().fg(colors.fg()),
            ))
        };

        let mut lines = vec![heading("Before the test")];
        lines.extend(strategies.before.iter().map(|s| bullet(s)));
        lines.push(Line::from(""));
        lines.push(heading("During the test"));
        lines.extend(strategies.during.iter().map(|s| bullet(s)));
        lines.push(Line::from(""));
        lines.push(heading("Score breakdown"));
        for range in &strategies.score_ranges {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<16}", range.label),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(range.range.as_str(), Style::default().fg(colors.success())),
            ]));
        }
        lines
    }
}

impl Widget for GuideList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);

        // Keep the selected guide's header on screen when an expanded guide
        // above it pushes it down.
        let guide_lines = self.guide_lines();
        let selected_row = self
            .guides
            .guides
            .iter()
            .enumerate()
            .take(self.browser.selected)
            .map(|(i, g)| {
                let body = if self.browser.is_expanded(i) {
                    g.topics.iter().map(|t| t.points.len() + 2).sum::<usize>() + g.tips.len() + 2
                } else {
                    0
                };
                3 + body
            })
            .sum::<usize>();
        let visible = columns[0].height.saturating_sub(2) as usize;
        let scroll = (selected_row + 2).saturating_sub(visible) as u16;

        let guide_block = Block::bordered()
            .title(" Study Guides ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(guide_lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(guide_block)
            .render(columns[0], buf);

        let strategy_block = Block::bordered()
            .title(" General Strategies ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(self.strategy_lines())
            .wrap(Wrap { trim: false })
            .block(strategy_block)
            .render(columns[1], buf);
    }
}
