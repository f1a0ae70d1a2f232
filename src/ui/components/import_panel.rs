use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::import::{ImportDraft, ImportFocus};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Paste area, file path field and a running "Parsed: N items" count.
pub struct ImportPanel<'a> {
    draft: &'a ImportDraft,
    path: &'a LineInput,
    focus: ImportFocus,
    theme: &'a Theme,
}

impl<'a> ImportPanel<'a> {
    pub fn new(
        draft: &'a ImportDraft,
        path: &'a LineInput,
        focus: ImportFocus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            draft,
            path,
            focus,
            theme,
        }
    }

    fn border_style(&self, section: ImportFocus) -> Style {
        let colors = &self.theme.colors;
        if self.focus == section {
            Style::default().fg(colors.border_focused())
        } else {
            Style::default().fg(colors.border())
        }
    }
}

impl Widget for ImportPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        // Keep the tail of long pastes in view.
        let text_block = Block::bordered()
            .title(" Paste list ")
            .border_style(self.border_style(ImportFocus::Text));
        let visible = text_block.inner(layout[0]).height as usize;
        let all_lines: Vec<&str> = self.draft.text().split('\n').collect();
        let skip = all_lines.len().saturating_sub(visible);
        let mut lines: Vec<Line> = all_lines[skip..]
            .iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(colors.fg()))))
            .collect();
        if self.focus == ImportFocus::Text
            && let Some(last) = lines.last_mut()
        {
            last.push_span(Span::styled(
                " ",
                Style::default().bg(colors.accent()),
            ));
        }
        Paragraph::new(lines).block(text_block).render(layout[0], buf);

        let cursor = (self.focus == ImportFocus::Path)
            .then(|| Style::default().fg(colors.bg()).bg(colors.accent()));
        let mut path_line = self.path.to_line(Style::default().fg(colors.fg()), cursor);
        if self.path.completion_error {
            path_line.push_span(Span::styled(
                "  (cannot read directory)",
                Style::default().fg(colors.error()),
            ));
        }
        Paragraph::new(path_line)
            .block(
                Block::bordered()
                    .title(" Or load file ")
                    .border_style(self.border_style(ImportFocus::Path)),
            )
            .render(layout[1], buf);

        let preview = self.draft.preview();
        let mut status = vec![Span::styled(
            format!(" Parsed: {} items", preview.parsed()),
            Style::default()
                .fg(if preview.is_empty() {
                    colors.text_pending()
                } else {
                    colors.success()
                })
                .add_modifier(Modifier::BOLD),
        )];
        if preview.rejected() > 0 {
            status.push(Span::styled(
                format!("  ({} lines skipped)", preview.rejected()),
                Style::default().fg(colors.warning()),
            ));
        }
        Paragraph::new(Line::from(status))
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);
    }
}
