use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::card::Card;
use crate::card::image::describe_data_uri;
use crate::engine::partition::ChapterId;
use crate::session::study::CardFace;
use crate::ui::theme::Theme;

/// The study card. The front shows the kanji; the back shows the reading,
/// the meaning and any attached picture.
pub struct FlipCard<'a> {
    card: Option<&'a Card>,
    face: CardFace,
    chapter: ChapterId,
    theme: &'a Theme,
}

impl<'a> FlipCard<'a> {
    pub fn new(card: Option<&'a Card>, face: CardFace, chapter: ChapterId, theme: &'a Theme) -> Self {
        Self {
            card,
            face,
            chapter,
            theme,
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(card) = self.card else {
            return vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No cards in chapter {}", self.chapter),
                    Style::default().fg(colors.text_pending()),
                )),
                Line::from(Span::styled(
                    "Press [i] to import a list",
                    Style::default().fg(colors.text_pending()),
                )),
            ];
        };

        let mut lines = vec![Line::from("")];
        match self.face {
            CardFace::Front => {
                if let Some(number) = card.number {
                    lines.push(Line::from(Span::styled(
                        format!("#{number}"),
                        Style::default().fg(colors.text_pending()),
                    )));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    card.kanji.as_str(),
                    Style::default()
                        .fg(colors.kanji())
                        .add_modifier(Modifier::BOLD),
                )));
            }
            CardFace::Back => {
                lines.push(Line::from(Span::styled(
                    card.hiragana.as_str(),
                    Style::default()
                        .fg(colors.reading())
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    card.meaning.as_str(),
                    Style::default().fg(colors.fg()),
                )));
                if let Some(image) = card.image.as_deref() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        image_caption(image),
                        Style::default().fg(colors.accent_dim()),
                    )));
                }
            }
        }
        lines
    }
}

fn image_caption(data_uri: &str) -> String {
    match describe_data_uri(data_uri) {
        Some((mime, bytes)) => format!("[picture: {mime}, {:.1} KB]", bytes as f64 / 1024.0),
        None => "[picture]".to_string(),
    }
}

impl Widget for FlipCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.face {
            CardFace::Front => " Front ",
            CardFace::Back => " Back ",
        };
        let border = match self.face {
            CardFace::Front => colors.border(),
            CardFace::Back => colors.border_focused(),
        };

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(self.lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
