use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use kotoba::app::{App, AppScreen, QUIZ_COUNT_ROW, QUIZ_PROJECTION_ROW, SETTINGS_FIELDS};
use kotoba::config::Config;
use kotoba::engine::partition::ChapterId;
use kotoba::event::{AppEvent, EventHandler};
use kotoba::session::autoplay::clamp_period;
use kotoba::session::import::ImportFocus;
use kotoba::speech::speaker_from_command;
use kotoba::ui;
use kotoba::ui::components::chapter_list::ChapterList;
use kotoba::ui::components::flip_card::FlipCard;
use kotoba::ui::components::import_panel::ImportPanel;
use kotoba::ui::components::progress_bar::ProgressBar;
use kotoba::ui::components::quiz_summary::QuizSummary;
use kotoba::ui::layout::{AppLayout, pack_hint_lines};
use kotoba::ui::line_input::InputResult;

const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "kotoba", version, about = "Terminal kanji flashcards with chapters, autoplay and quizzes")]
struct Cli {
    #[arg(short, long, value_name = "FILE", help = "Import a word list, print a summary and exit")]
    import: Option<PathBuf>,

    #[arg(short, long, help = "Cards per chapter for the next import")]
    chapter_size: Option<usize>,

    #[arg(short, long, value_name = "MS", help = "Autoplay step in milliseconds (800-4000)")]
    period: Option<u64>,

    #[arg(short, long, value_name = "CMD", help = "Speech command, e.g. \"say -v Kyoko\"")]
    speech: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

/// Log to `<data>/kotoba/kotoba.log`; stderr belongs to the TUI.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("kotoba")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("kotoba.log"))
    else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut app = App::new();

    if let Some(size) = cli.chapter_size {
        app.config.chapter_size = size.max(1);
    }
    if let Some(period) = cli.period {
        app.config.autoplay_period_ms = clamp_period(period);
        app.autoplay.set_period(Instant::now(), period);
    }
    if let Some(command) = cli.speech {
        app.set_speaker(speaker_from_command(&command));
    }
    if let Some(theme) = cli.theme {
        app.set_theme(&theme);
    }

    if let Some(path) = cli.import {
        let summary = app.import_file(&path, Instant::now())?;
        println!("{summary}");
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, Instant::now()),
            AppEvent::Paste(text) => handle_paste(app, &text),
            AppEvent::Tick | AppEvent::Resize => {}
        }
        // Key bursts starve Tick, so autoplay is polled after every event.
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Study => handle_study_key(app, key, now),
        AppScreen::Import => handle_import_key(app, key, now),
        AppScreen::AttachImage => handle_attach_key(app, key),
        AppScreen::QuizSetup => handle_quiz_setup_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::QuizResult => handle_quiz_result_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key, now),
    }
}

fn handle_paste(app: &mut App, text: &str) {
    match app.screen {
        AppScreen::Import => match app.import_focus {
            ImportFocus::Text => app.import_draft.push_str(text),
            ImportFocus::Path => app.import_path.insert_str(text.trim()),
        },
        AppScreen::AttachImage => app.image_path.insert_str(text.trim()),
        AppScreen::Quiz => app.answer_input.insert_str(text),
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.selected_action();
            app.activate(action);
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.activate(action);
            }
        }
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent, now: Instant) {
    let chapter = app.study.cursor().chapter;
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char(' ') | KeyCode::Enter => app.flip_card(now),
        KeyCode::Right | KeyCode::Char('l') => app.next_card(now),
        KeyCode::Left | KeyCode::Char('h') => app.prev_card(now),
        KeyCode::Tab | KeyCode::Char(']') => app.select_chapter(chapter.next(), now),
        KeyCode::BackTab | KeyCode::Char('[') => app.select_chapter(chapter.prev(), now),
        KeyCode::Char('p') => app.toggle_autoplay(now),
        KeyCode::Char('+') | KeyCode::Char('=') => app.autoplay_faster(now),
        KeyCode::Char('-') | KeyCode::Char('_') => app.autoplay_slower(now),
        KeyCode::Char('s') => app.speak_current(),
        KeyCode::Char('i') => app.go_to_import(),
        KeyCode::Char('a') => app.go_to_attach_image(),
        KeyCode::Char('z') => app.go_to_quiz_setup(),
        KeyCode::Char(d @ '1'..='9') => {
            if let Some(id) = d.to_digit(10).and_then(|n| ChapterId::new(n as u8)) {
                app.select_chapter(id, now);
            }
        }
        _ => {}
    }
}

fn handle_import_key(app: &mut App, key: KeyEvent, now: Instant) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if app.import_focus == ImportFocus::Path {
        match app.import_path.handle(key) {
            InputResult::Submit => app.load_import_path(),
            InputResult::Cancel => app.import_focus = ImportFocus::Text,
            InputResult::Continue => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('s') | KeyCode::Char('d') if ctrl => app.commit_import(now),
        KeyCode::Char('o') if ctrl => app.import_focus = ImportFocus::Path,
        KeyCode::Char('u') if ctrl => app.import_draft.delete_line(),
        KeyCode::Char('x') if ctrl => app.import_draft.clear(),
        KeyCode::Tab => app.import_focus = ImportFocus::Path,
        KeyCode::Enter => app.import_draft.push_char('\n'),
        KeyCode::Backspace => app.import_draft.backspace(),
        KeyCode::Char(ch) if !ctrl => app.import_draft.push_char(ch),
        _ => {}
    }
}

fn handle_attach_key(app: &mut App, key: KeyEvent) {
    match app.image_path.handle(key) {
        InputResult::Submit => app.attach_image(),
        InputResult::Cancel => app.screen = AppScreen::Study,
        InputResult::Continue => {}
    }
}

fn handle_quiz_setup_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.quiz_cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.quiz_cursor_down(),
        KeyCode::Char(' ') => app.quiz_toggle_row(),
        KeyCode::Right | KeyCode::Char('l') => app.quiz_adjust_row(true),
        KeyCode::Left | KeyCode::Char('h') => app.quiz_adjust_row(false),
        KeyCode::Char('a') => app.quiz.setup.select_all(),
        KeyCode::Char('n') => app.quiz.setup.clear_chapters(),
        KeyCode::Enter | KeyCode::Char('s') => app.start_quiz(),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match app.answer_input.handle(key) {
        InputResult::Submit => app.submit_answer(),
        InputResult::Cancel => app.go_to_quiz_setup(),
        InputResult::Continue => {}
    }
}

fn handle_quiz_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_quiz(),
        KeyCode::Enter | KeyCode::Char('c') => app.go_to_quiz_setup(),
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(now),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected = (app.settings_selected + 1).min(SETTINGS_FIELDS - 1);
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Study => render_study(frame, app),
        AppScreen::Import => render_import(frame, app),
        AppScreen::AttachImage => {
            render_study(frame, app);
            render_attach_image(frame, app);
        }
        AppScreen::QuizSetup => render_quiz_setup(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::QuizResult => render_quiz_result(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, app: &App, title: &str, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Status message first, then as many hint lines as fit.
fn render_footer(frame: &mut ratatui::Frame, area: Rect, app: &App, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.warning()),
        )));
    }
    lines.extend(
        pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let last_quiz = app
        .quiz_history
        .last()
        .map(|r| format!("| last quiz {}/{} ", r.score, r.total))
        .unwrap_or_default();
    let info = format!("| {} cards {last_quiz}", app.study.total_cards());
    render_header(frame, layout[0], app, "kotoba", &info);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        layout[2],
        app,
        &["[1-3] Open", "[c] Settings", "[j/k] Move", "[q] Quit"],
    );
}

fn render_study(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    let cursor = app.study.cursor();
    let len = app.study.current_len();

    let autoplay = if app.autoplay.is_running() {
        format!("autoplay {:.1}s", app.autoplay.period_ms() as f64 / 1000.0)
    } else {
        "autoplay off".to_string()
    };
    let position = if len == 0 {
        "empty".to_string()
    } else {
        format!("card {}/{len}", cursor.index + 1)
    };
    let info = format!("| Chapter {} | {position} | {autoplay}", cursor.chapter);
    render_header(frame, app_layout.header, app, "Study", &info);

    let chapters = app.study.chapters();
    let main = if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(ChapterList::new(&chapters, cursor.chapter, app.theme), sidebar);
        app_layout.main
    } else {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(app_layout.main);
        frame.render_widget(
            ChapterList::new(&chapters, cursor.chapter, app.theme).compact(true),
            split[0],
        );
        split[1]
    };

    let card_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(main);
    frame.render_widget(
        FlipCard::new(app.study.current_card(), app.study.face(), cursor.chapter, app.theme),
        card_layout[0],
    );
    let done = if len == 0 { 0 } else { cursor.index + 1 };
    frame.render_widget(ProgressBar::new("Chapter", done, len, app.theme), card_layout[1]);

    render_footer(
        frame,
        app_layout.footer,
        app,
        &[
            "[Space] Flip",
            "[←/→] Card",
            "[Tab/1-9] Chapter",
            "[p] Autoplay",
            "[+/-] Speed",
            "[s] Speak",
            "[a] Picture",
            "[i] Import",
            "[z] Quiz",
            "[q] Back",
        ],
    );
}

fn render_import(frame: &mut ratatui::Frame, app: &App) {
    let app_layout = AppLayout::new(frame.area());
    render_header(
        frame,
        app_layout.header,
        app,
        "Import",
        "| one entry per line: 1. 魚（さかな）＝ Fish",
    );

    let panel = ImportPanel::new(
        &app.import_draft,
        &app.import_path,
        app.import_focus,
        app.theme,
    );
    let area = match app_layout.sidebar {
        Some(sidebar) => Rect {
            width: app_layout.main.width + sidebar.width,
            ..app_layout.main
        },
        None => app_layout.main,
    };
    frame.render_widget(panel, area);

    let hints: &[&str] = match app.import_focus {
        ImportFocus::Text => &[
            "[Ctrl+S] Import",
            "[Tab/Ctrl+O] File path",
            "[Ctrl+U] Delete line",
            "[Ctrl+X] Clear",
            "[Esc] Back",
        ],
        ImportFocus::Path => &["[Enter] Load file", "[Tab] Complete", "[Esc] Back to text"],
    };
    render_footer(frame, app_layout.footer, app, hints);
}

fn render_attach_image(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = ui::layout::centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let kanji = app
        .study
        .current_card()
        .map(|c| c.kanji.as_str())
        .unwrap_or_default();
    let block = Block::bordered()
        .title(format!(" Attach picture to {kanji} "))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let mut lines = vec![
        Line::from(Span::styled(
            "  Image file (png, jpg, gif, webp, bmp, svg):",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        {
            let mut line = app.image_path.to_line(
                Style::default().fg(colors.fg()),
                Some(Style::default().fg(colors.bg()).bg(colors.accent())),
            );
            line.spans.insert(0, Span::raw("  "));
            line
        },
        Line::from(""),
        Line::from(Span::styled(
            "  [Enter] Attach  [Tab] Complete  [Esc] Cancel",
            Style::default().fg(colors.text_pending()),
        )),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.error()),
        )));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(inner, frame.buffer_mut());
}

fn render_quiz_setup(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(frame.area());
    let chapters = app.study.chapters();
    let setup = &app.quiz.setup;

    let info = format!("| {} cards available", setup.available(&chapters));
    render_header(frame, app_layout.header, app, "Quiz Setup", &info);

    let row_style = |row: usize| {
        if row == app.quiz_cursor {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        }
    };
    let marker = |row: usize| if row == app.quiz_cursor { ">" } else { " " };

    let mut lines: Vec<Line> = ChapterId::all()
        .enumerate()
        .map(|(row, id)| {
            let check = if setup.is_selected(id) { "[x]" } else { "[ ]" };
            Line::from(Span::styled(
                format!(
                    " {} {check} Chapter {:>2}  ({} cards)",
                    marker(row),
                    id.get(),
                    chapters.chapter_len(id)
                ),
                row_style(row),
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            " {} Questions: < {} >",
            marker(QUIZ_COUNT_ROW),
            setup.question_count()
        ),
        row_style(QUIZ_COUNT_ROW),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            " {} Quiz type: < {} >",
            marker(QUIZ_PROJECTION_ROW),
            setup.projection.label()
        ),
        row_style(QUIZ_PROJECTION_ROW),
    )));

    let block = Block::bordered()
        .title(" Choose chapters ")
        .border_style(Style::default().fg(colors.border()));
    frame.render_widget(Paragraph::new(lines).block(block), app_layout.main);

    if let Some(sidebar) = app_layout.sidebar {
        let history: Vec<Line> = app
            .quiz_history
            .iter()
            .rev()
            .take(sidebar.height.saturating_sub(2) as usize)
            .map(|r| {
                Line::from(vec![
                    Span::styled(
                        format!("{} ", r.timestamp.format("%m-%d %H:%M")),
                        Style::default().fg(colors.text_pending()),
                    ),
                    Span::styled(
                        format!("{}/{} {}", r.score, r.total, r.projection_label()),
                        Style::default().fg(colors.fg()),
                    ),
                ])
            })
            .collect();
        let block = Block::bordered()
            .title(" Recent ")
            .border_style(Style::default().fg(colors.border()));
        frame.render_widget(Paragraph::new(history).block(block), sidebar);
    }

    render_footer(
        frame,
        app_layout.footer,
        app,
        &[
            "[Space] Toggle",
            "[a] All",
            "[n] None",
            "[←/→] Change",
            "[Enter] Start",
            "[q] Back",
        ],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(frame.area());
    let quiz = &app.quiz;

    let info = format!(
        "| {} | score {}",
        quiz.setup.projection.label(),
        quiz.score()
    );
    render_header(frame, app_layout.header, app, "Quiz", &info);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(app_layout.main);

    let question = quiz.current_question().unwrap_or_default();
    let question_block = Block::bordered()
        .title(format!(" Question {} ", quiz.current_index() + 1))
        .border_style(Style::default().fg(colors.border()));
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                question,
                Style::default()
                    .fg(colors.kanji())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .block(question_block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false }),
        layout[0],
    );

    let answer = app.answer_input.to_line(
        Style::default().fg(colors.fg()),
        Some(Style::default().fg(colors.bg()).bg(colors.accent())),
    );
    frame.render_widget(
        Paragraph::new(answer).block(
            Block::bordered()
                .title(" Your answer ")
                .border_style(Style::default().fg(colors.border_focused())),
        ),
        layout[1],
    );

    if let Some(previous) = quiz.answers().last() {
        let line = if previous.is_correct() {
            Line::from(Span::styled(
                "  Correct",
                Style::default().fg(colors.success()),
            ))
        } else {
            Line::from(vec![
                Span::styled("  Incorrect: ", Style::default().fg(colors.error())),
                Span::styled(previous.expected.clone(), Style::default().fg(colors.fg())),
            ])
        };
        frame.render_widget(Paragraph::new(line), layout[2]);
    }

    frame.render_widget(
        ProgressBar::new("Progress", quiz.current_index(), quiz.total(), app.theme),
        layout[3],
    );

    render_footer(
        frame,
        app_layout.footer,
        app,
        &["[Enter] Submit", "[Esc] Abandon"],
    );
}

fn render_quiz_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    if let Some(result) = &app.last_result {
        let centered = ui::layout::centered_rect(60, 80, layout[0]);
        frame.render_widget(
            QuizSummary::new(result, app.quiz.answers(), app.theme),
            centered,
        );
    }
    render_footer(
        frame,
        layout[1],
        app,
        &["[r] Retry", "[Enter] New quiz", "[q] Menu"],
    );
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: [(&str, String); SETTINGS_FIELDS] = [
        ("Chapter size", app.config.chapter_size.to_string()),
        (
            "Autoplay step",
            format!("{:.1}s", app.config.autoplay_period_ms as f64 / 1000.0),
        ),
        ("Quiz questions", app.config.question_count.to_string()),
        ("Quiz type", app.config.projection().label().to_string()),
        ("Theme", app.config.theme.clone()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate and change, ESC to save & exit",
        Style::default().fg(colors.text_pending()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)))
        .split(layout[1]);

    for (i, ((label, value), row)) in fields.iter().zip(field_layout.iter()).enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };
        let (label_style, value_style) = if is_selected {
            (
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
                Style::default().fg(colors.accent()),
            )
        } else {
            (
                Style::default().fg(colors.fg()),
                Style::default().fg(colors.text_pending()),
            )
        };

        Paragraph::new(vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ])
        .render(*row, frame.buffer_mut());
    }

    let speech = if app.config.speech_command.is_empty() {
        "off".to_string()
    } else {
        app.config.speech_command.clone()
    };
    Paragraph::new(vec![
        Line::from(Span::styled(
            format!("   Speech: {speech}"),
            Style::default().fg(colors.text_pending()),
        )),
        Line::from(Span::styled(
            format!("   Edit {} to change", Config::config_path().display()),
            Style::default().fg(colors.text_pending()),
        )),
    ])
    .wrap(Wrap { trim: false })
    .render(layout[2], frame.buffer_mut());

    Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [←/→] Change value",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[3], frame.buffer_mut());
}
