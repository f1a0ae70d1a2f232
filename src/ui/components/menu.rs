use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Study,
    Import,
    Quiz,
    Settings,
}

pub struct MenuItem {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

const ITEMS: [MenuItem; 4] = [
    MenuItem {
        key: '1',
        label: "Study",
        description: "Flip through a chapter, with autoplay",
        action: MenuAction::Study,
    },
    MenuItem {
        key: '2',
        label: "Import",
        description: "Paste numbered kanji lines or load a text file",
        action: MenuAction::Import,
    },
    MenuItem {
        key: '3',
        label: "Quiz",
        description: "Typed answers drawn from the chapters you pick",
        action: MenuAction::Quiz,
    },
    MenuItem {
        key: 'c',
        label: "Settings",
        description: "Chapter size, autoplay speed, quiz defaults",
        action: MenuAction::Settings,
    },
];

pub struct Menu<'a> {
    pub selected: usize,
    pub theme: &'a Theme,
    /// Shown under the title, e.g. the deck size.
    pub subtitle: String,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            selected: 0,
            theme,
            subtitle: String::new(),
        }
    }

    pub fn items(&self) -> &'static [MenuItem] {
        &ITEMS
    }

    pub fn selected_action(&self) -> MenuAction {
        ITEMS[self.selected].action
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        ITEMS.iter().find(|item| item.key == key).map(|item| item.action)
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % ITEMS.len();
    }

    pub fn prev(&mut self) {
        self.selected = (self.selected + ITEMS.len() - 1) % ITEMS.len();
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "kotoba",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                &*self.subtitle,
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(ITEMS.iter().map(|_| Constraint::Length(3)))
            .split(layout[2]);

        for (i, (item, row)) in ITEMS.iter().zip(rows.iter()).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            Paragraph::new(vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", item.key, item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_pending()),
                )),
            ])
            .render(*row, buf);
        }
    }
}
