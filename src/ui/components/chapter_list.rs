use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::partition::{ChapterId, ChapterMap};
use crate::ui::theme::Theme;

/// Chapter picker. Full mode is a sidebar with card counts; compact mode is a
/// single strip of chapter numbers.
pub struct ChapterList<'a> {
    chapters: &'a ChapterMap,
    current: ChapterId,
    compact: bool,
    theme: &'a Theme,
}

impl<'a> ChapterList<'a> {
    pub fn new(chapters: &'a ChapterMap, current: ChapterId, theme: &'a Theme) -> Self {
        Self {
            chapters,
            current,
            compact: false,
            theme,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    fn style_for(&self, id: ChapterId) -> Style {
        let colors = &self.theme.colors;
        if id == self.current {
            Style::default()
                .fg(colors.bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else if self.chapters.chapter_len(id) == 0 {
            Style::default().fg(colors.text_pending())
        } else {
            Style::default().fg(colors.fg())
        }
    }
}

impl Widget for ChapterList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Chapters ")
            .border_style(Style::default().fg(colors.border()));

        let lines: Vec<Line> = if self.compact {
            let spans: Vec<Span> = ChapterId::all()
                .flat_map(|id| {
                    [
                        Span::styled(format!("{:>2}", id.get()), self.style_for(id)),
                        Span::raw(" "),
                    ]
                })
                .collect();
            vec![Line::from(spans)]
        } else {
            ChapterId::all()
                .map(|id| {
                    let marker = if id == self.current { ">" } else { " " };
                    Line::from(Span::styled(
                        format!(
                            "{marker} Chapter {:>2}  {:>4}",
                            id.get(),
                            self.chapters.chapter_len(id)
                        ),
                        self.style_for(id),
                    ))
                })
                .collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
