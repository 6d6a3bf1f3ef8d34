use crate::app::{App, AppEvent, Control, Flow};
use crate::geometry::{self, Point};
use crate::model::Category;
use crate::scene::{Fill, Scene, Shape, TextMetrics};
use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CANVAS_BG: Color = Color::Rgb(122, 155, 87);
const FRAME_BROWN: Color = Color::Rgb(107, 68, 35);
const INNER_CREAM: Color = Color::Rgb(245, 230, 163);
const PANEL_CREAM: Color = Color::Rgb(250, 241, 200);
const TASK_TEXT: Color = Color::Rgb(0, 0, 0);
const DONE_TEXT: Color = Color::Rgb(136, 136, 136);
const LABEL_TEXT: Color = Color::Rgb(255, 255, 255);
const SIDEBAR_BG: Color = Color::Rgb(245, 230, 163);
const SIDEBAR_EDGE: Color = Color::Rgb(139, 75, 155);
const ADD_BUTTON: Color = Color::Rgb(122, 155, 87);
const CLEAR_BUTTON: Color = Color::Rgb(232, 90, 90);

const SIDEBAR_WIDTH: u16 = 34;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(mut app: App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut screen = Screen::default();
    let result = event_loop(&mut app, &mut screen, &mut terminal);
    let result = finish(&mut app, result);
    teardown_terminal(&mut terminal)?;
    result
}

/// Saves the store when the loop bailed out before a `Quit` could do it.
fn finish(app: &mut App, result: Result<()>) -> Result<()> {
    if let Err(err) = &result {
        warn!(error = %format!("{err:#}"), "event loop failed, saving before exit");
        app.dispatch(AppEvent::Quit);
    }
    result
}

/// Where interactive things ended up on the last frame.
#[derive(Debug, Default)]
struct Screen {
    canvas: Rect,
    controls: Vec<(Rect, Control)>,
    reported_size: Option<(i32, i32)>,
}

impl Screen {
    fn control_at(&self, column: u16, row: u16) -> Option<Control> {
        self.controls
            .iter()
            .find(|(area, _)| contains(*area, column, row))
            .map(|(_, control)| *control)
    }
}

fn event_loop(
    app: &mut App,
    screen: &mut Screen,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    info!("matrix ui started");
    loop {
        terminal.draw(|f| draw(f, app, screen))?;

        let metrics = app.metrics();
        let size = canvas_size_px(screen.canvas, metrics);
        if screen.reported_size != Some(size) {
            screen.reported_size = Some(size);
            app.dispatch(AppEvent::Resize {
                width: size.0,
                height: size.1,
            });
        }

        let timeout = if app.has_pending_resize() {
            Duration::from_millis(5)
        } else {
            POLL_INTERVAL
        };
        if event::poll(timeout)? {
            let events = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    translate_key(key, app.form().focus).into_iter().collect()
                }
                Event::Mouse(mouse) => translate_mouse(mouse, screen, metrics),
                _ => Vec::new(),
            };
            for ev in events {
                if app.dispatch(ev) == Flow::Quit {
                    info!("matrix ui closed");
                    return Ok(());
                }
            }
        }
        app.dispatch(AppEvent::Tick(Instant::now()));
    }
}

fn translate_key(key: KeyEvent, focus: Control) -> Option<AppEvent> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let event = match key.code {
        KeyCode::Esc => AppEvent::Quit,
        KeyCode::Char('c') if control => AppEvent::Quit,
        KeyCode::Char('i') if alt => AppEvent::ToggleImportant,
        KeyCode::Char('u') if alt => AppEvent::ToggleUrgent,
        KeyCode::Char('l') if control => AppEvent::ClearMatrix,
        KeyCode::Tab => AppEvent::FocusNext,
        KeyCode::BackTab => AppEvent::FocusPrev,
        KeyCode::Enter => AppEvent::Activate,
        KeyCode::Char(' ') if focus != Control::Entry => AppEvent::Activate,
        // Editing keys only reach the entry while it has focus.
        _ if focus != Control::Entry => return None,
        KeyCode::Left => AppEvent::CursorLeft,
        KeyCode::Right => AppEvent::CursorRight,
        KeyCode::Backspace => AppEvent::Backspace,
        KeyCode::Char(c) if !control && !alt => AppEvent::Input(c),
        _ => return None,
    };
    Some(event)
}

fn translate_mouse(mouse: MouseEvent, screen: &Screen, metrics: TextMetrics) -> Vec<AppEvent> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return Vec::new();
    }
    if contains(screen.canvas, mouse.column, mouse.row) {
        let col = i32::from(mouse.column - screen.canvas.x);
        let row = i32::from(mouse.row - screen.canvas.y);
        let p = Point::new(
            col * metrics.char_width + metrics.char_width / 2,
            row * metrics.line_height + metrics.line_height / 2,
        );
        debug!(column = mouse.column, row = mouse.row, x = p.x, y = p.y, "canvas click");
        return vec![AppEvent::CanvasClick(p)];
    }
    match screen.control_at(mouse.column, mouse.row) {
        Some(Control::Entry) => vec![AppEvent::Focus(Control::Entry)],
        Some(control) => vec![AppEvent::Focus(control), AppEvent::Activate],
        None => Vec::new(),
    }
}

fn canvas_size_px(area: Rect, metrics: TextMetrics) -> (i32, i32) {
    (
        i32::from(area.width) * metrics.char_width,
        i32::from(area.height) * metrics.line_height,
    )
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

fn draw(f: &mut ratatui::Frame<'_>, app: &App, screen: &mut Screen) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(f.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[0]);

    screen.controls = draw_sidebar(f, app, columns[0]);
    screen.canvas = columns[1];
    f.render_widget(
        MatrixCanvas {
            scene: app.scene(),
            metrics: app.metrics(),
        },
        columns[1],
    );
    draw_footer(f, app, rows[1]);
}

fn draw_sidebar(f: &mut ratatui::Frame<'_>, app: &App, area: Rect) -> Vec<(Rect, Control)> {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(SIDEBAR_EDGE).bg(SIDEBAR_BG))
        .style(Style::default().bg(SIDEBAR_BG).fg(Color::Black));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .horizontal_margin(2)
        .split(inner);

    let form = app.form();
    let focused = |control: Control| form.focus == control;

    let title = Paragraph::new(Line::from(Span::styled(
        "Add Task",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, rows[0]);

    let entry_text = if focused(Control::Entry) {
        form.entry.with_caret()
    } else if form.entry.value().is_empty() {
        "Enter task here...".to_string()
    } else {
        form.entry.value().to_string()
    };
    let entry_style = if form.entry.value().is_empty() && !focused(Control::Entry) {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black)
    };
    let entry = Paragraph::new(Span::styled(entry_text, entry_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused(Control::Entry)))
            .title("Task"),
    );
    f.render_widget(entry, rows[1]);

    f.render_widget(
        checkbox("Important?", form.important, focused(Control::Important)),
        rows[3],
    );
    f.render_widget(
        checkbox("Urgent?", form.urgent, focused(Control::Urgent)),
        rows[4],
    );
    f.render_widget(
        button("Add Task", ADD_BUTTON, focused(Control::AddButton)),
        rows[6],
    );
    f.render_widget(
        button("Clear Matrix", CLEAR_BUTTON, focused(Control::ClearButton)),
        rows[8],
    );
    draw_summary(f, app, rows[9]);

    vec![
        (rows[1], Control::Entry),
        (rows[3], Control::Important),
        (rows[4], Control::Urgent),
        (rows[6], Control::AddButton),
        (rows[8], Control::ClearButton),
    ]
}

fn draw_summary(f: &mut ratatui::Frame<'_>, app: &App, area: Rect) {
    let store = app.store();
    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!("{} tasks, {} done", store.len(), store.completed_count()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for category in Category::ALL {
        let tasks = store.tasks(category);
        let done = tasks.iter().filter(|t| t.completed).count();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>2}/{:<2} ", done, tasks.len()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(category.label()),
        ]));
    }
    lines.push(Line::raw(""));
    let width = area.width as usize;
    let storage_line = match app.save_file() {
        Some(file) => truncate_text(&format!("file {}", file.path().display()), width),
        None => "not saved".to_string(),
    };
    lines.push(Line::from(Span::styled(
        storage_line,
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        format!("mapping {}", app.mapping().label()),
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_footer(f: &mut ratatui::Frame<'_>, app: &App, area: Rect) {
    let saved = match (app.save_file(), app.last_save()) {
        (None, _) => "unsaved session".to_string(),
        (Some(_), None) => "not saved yet".to_string(),
        (Some(_), Some(at)) => format!("saved {}", format_elapsed(at)),
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(app.status().to_string()),
            Span::raw("  •  "),
            Span::styled(saved, Style::default().fg(Color::Gray)),
        ]),
        help_line(),
    ];
    let footer = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

fn help_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::LightCyan)),
        Span::raw(" focus  "),
        Span::styled("Enter", Style::default().fg(Color::LightGreen)),
        Span::raw(" add/press  "),
        Span::styled("Alt-i", Style::default().fg(Color::LightYellow)),
        Span::raw(" important  "),
        Span::styled("Alt-u", Style::default().fg(Color::LightYellow)),
        Span::raw(" urgent  "),
        Span::styled("click", Style::default().fg(Color::LightMagenta)),
        Span::raw(" toggle done  "),
        Span::styled("Ctrl-l", Style::default().fg(Color::LightRed)),
        Span::raw(" clear  "),
        Span::styled("Esc", Style::default().fg(Color::LightRed)),
        Span::raw(" quit"),
    ])
}

fn checkbox(label: &str, checked: bool, focused: bool) -> Paragraph<'static> {
    let mark = if checked { "[x] " } else { "[ ] " };
    Paragraph::new(Line::from(vec![
        Span::styled(mark, Style::default().fg(ADD_BUTTON).add_modifier(Modifier::BOLD)),
        Span::styled(label.to_string(), focus_style(focused)),
    ]))
}

fn button(label: &str, color: Color, focused: bool) -> Paragraph<'static> {
    let mut style = Style::default()
        .fg(Color::White)
        .bg(color)
        .add_modifier(Modifier::BOLD);
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Paragraph::new(Span::styled(format!(" {} ", label), style)).alignment(Alignment::Center)
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(SIDEBAR_EDGE)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::Black)
    }
}

/// Paints a [`Scene`] into terminal cells, one cell per `metrics` pixel block.
struct MatrixCanvas<'a> {
    scene: &'a Scene,
    metrics: TextMetrics,
}

impl Widget for MatrixCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(CANVAS_BG));
        for item in self.scene.items() {
            match item {
                Shape::Rect { rect, fill } => self.fill_rect(area, buf, *rect, *fill),
                Shape::AxisLabel {
                    text,
                    bounds,
                    vertical,
                } => {
                    let style = Style::default()
                        .fg(LABEL_TEXT)
                        .add_modifier(Modifier::BOLD);
                    if *vertical {
                        for (offset, ch) in text.chars().enumerate() {
                            let y = bounds.y1 + offset as i32 * self.metrics.line_height;
                            self.put_text(area, buf, Point::new(bounds.x1, y), &ch.to_string(), style);
                        }
                    } else {
                        self.put_text(area, buf, Point::new(bounds.x1, bounds.y1), text, style);
                    }
                }
                Shape::Task {
                    text,
                    bounds,
                    completed,
                    ..
                } => {
                    let style = if *completed {
                        Style::default()
                            .fg(DONE_TEXT)
                            .add_modifier(Modifier::CROSSED_OUT)
                    } else {
                        Style::default().fg(TASK_TEXT)
                    };
                    self.put_text(area, buf, Point::new(bounds.x1, bounds.y1), text, style);
                }
            }
        }
    }
}

impl MatrixCanvas<'_> {
    fn cell(&self, area: Rect, p: Point) -> Option<(u16, u16)> {
        let col = p.x.div_euclid(self.metrics.char_width);
        let row = p.y.div_euclid(self.metrics.line_height);
        if col < 0 || row < 0 || col >= i32::from(area.width) || row >= i32::from(area.height) {
            return None;
        }
        Some((area.x + col as u16, area.y + row as u16))
    }

    fn fill_rect(&self, area: Rect, buf: &mut Buffer, rect: geometry::Rect, fill: Fill) {
        let m = self.metrics;
        let cols = rect.x1.div_euclid(m.char_width)..=rect.x2.div_euclid(m.char_width);
        let rows = rect.y1.div_euclid(m.line_height)..=rect.y2.div_euclid(m.line_height);
        let vertical = rect.height() > rect.width();
        for row in rows {
            for col in cols.clone() {
                let p = Point::new(col * m.char_width, row * m.line_height);
                let Some((x, y)) = self.cell(area, p) else {
                    continue;
                };
                let cell = buf.get_mut(x, y);
                match fill {
                    Fill::Frame => {
                        cell.set_bg(FRAME_BROWN);
                    }
                    Fill::Inner => {
                        cell.set_bg(INNER_CREAM);
                    }
                    Fill::Panel => {
                        cell.set_bg(PANEL_CREAM);
                    }
                    Fill::Grid => {
                        cell.set_symbol(if vertical { "│" } else { "─" })
                            .set_fg(FRAME_BROWN)
                            .set_bg(INNER_CREAM);
                    }
                }
            }
        }
    }

    fn put_text(&self, area: Rect, buf: &mut Buffer, at: Point, text: &str, style: Style) {
        let Some((x, y)) = self.cell(area, at) else {
            return;
        };
        let width = (area.right() - x) as usize;
        buf.set_stringn(x, y, text, width, style);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&"...".chars().take(max - keep).collect::<String>());
    out
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
