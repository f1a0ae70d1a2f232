use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::AnswerRecord;
use crate::session::result::QuizResult;
use crate::ui::theme::Theme;

/// Score plus a per-question review of a finished quiz.
pub struct QuizSummary<'a> {
    result: &'a QuizResult,
    answers: &'a [AnswerRecord],
    theme: &'a Theme,
}

impl<'a> QuizSummary<'a> {
    pub fn new(result: &'a QuizResult, answers: &'a [AnswerRecord], theme: &'a Theme) -> Self {
        Self {
            result,
            answers,
            theme,
        }
    }
}

impl Widget for QuizSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let score_color = if self.result.percent() >= 80.0 {
            colors.success()
        } else if self.result.percent() >= 50.0 {
            colors.warning()
        } else {
            colors.error()
        };
        Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Score: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!(
                        "{}/{} ({:.0}%)",
                        self.result.score,
                        self.result.total,
                        self.result.percent()
                    ),
                    Style::default().fg(score_color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("  {}", self.result.projection_label()),
                Style::default().fg(colors.text_pending()),
            )),
        ])
        .render(layout[0], buf);

        let review: Vec<Line> = self
            .answers
            .iter()
            .map(|answer| {
                let (mark, color) = if answer.is_correct() {
                    ("o", colors.success())
                } else {
                    ("x", colors.error())
                };
                let mut spans = vec![
                    Span::styled(format!("  {mark} "), Style::default().fg(color)),
                    Span::styled(
                        format!("{} ", answer.item.card.kanji),
                        Style::default().fg(colors.kanji()),
                    ),
                    Span::styled(answer.expected.clone(), Style::default().fg(colors.fg())),
                ];
                if !answer.is_correct() {
                    spans.push(Span::styled(
                        format!("  (you: {})", answer.submitted.trim()),
                        Style::default().fg(colors.text_pending()),
                    ));
                }
                Line::from(spans)
            })
            .collect();
        Paragraph::new(review)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);
    }
}
