use crate::classify::QuadrantMapping;
use crate::geometry::{scatter_point, Margins, MatrixLayout, Point, FALLBACK_BOUNDS};
use crate::model::TaskStore;
use crate::scene::{Scene, TextMetrics};
use crate::storage::SaveFile;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything the front end can ask the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Input(char),
    Backspace,
    CursorLeft,
    CursorRight,
    FocusNext,
    FocusPrev,
    Focus(Control),
    /// Press the focused control.
    Activate,
    ToggleImportant,
    ToggleUrgent,
    AddTask,
    ClearMatrix,
    CanvasClick(Point),
    /// New canvas size in virtual pixels.
    Resize { width: i32, height: i32 },
    Tick(Instant),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Entry,
    Important,
    Urgent,
    AddButton,
    ClearButton,
}

impl Control {
    pub const ORDER: [Control; 5] = [
        Control::Entry,
        Control::Important,
        Control::Urgent,
        Control::AddButton,
        Control::ClearButton,
    ];

    fn next(self) -> Self {
        let idx = Control::ORDER.iter().position(|c| *c == self).unwrap_or(0);
        Control::ORDER[(idx + 1) % Control::ORDER.len()]
    }

    fn prev(self) -> Self {
        let idx = Control::ORDER.iter().position(|c| *c == self).unwrap_or(0);
        Control::ORDER[(idx + Control::ORDER.len() - 1) % Control::ORDER.len()]
    }
}

/// Single-line text input with a byte cursor kept on char boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryField {
    value: String,
    cursor: usize,
}

impl EntryField {
    pub fn value(&self) -> &str {
        &self.value
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert(self.cursor, '▌');
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub entry: EntryField,
    pub important: bool,
    pub urgent: bool,
    pub focus: Control,
}

impl Default for EntryForm {
    fn default() -> Self {
        EntryForm {
            entry: EntryField::default(),
            important: false,
            urgent: false,
            focus: Control::Entry,
        }
    }
}

impl EntryForm {
    fn reset(&mut self) {
        self.entry.clear();
        self.important = false;
        self.urgent = false;
    }
}

pub struct Settings {
    pub mapping: QuadrantMapping,
    pub metrics: TextMetrics,
    pub resize_debounce: Duration,
    pub save_file: Option<SaveFile>,
}

/// The whole application state. The front end feeds it [`AppEvent`]s and
/// draws whatever it exposes; nothing else mutates it.
pub struct App {
    store: TaskStore,
    mapping: QuadrantMapping,
    metrics: TextMetrics,
    form: EntryForm,
    layout: Option<MatrixLayout>,
    scene: Scene,
    save_file: Option<SaveFile>,
    rng: StdRng,
    resize_debounce: Duration,
    pending_resize: Option<(Instant, i32, i32)>,
    status: String,
    last_save: Option<Instant>,
}

impl App {
    pub fn new(store: TaskStore, settings: Settings) -> Self {
        Self::with_rng(store, settings, StdRng::from_entropy())
    }

    pub fn with_rng(store: TaskStore, settings: Settings, rng: StdRng) -> Self {
        let status = match &settings.save_file {
            Some(file) => format!("{} tasks from {}", store.len(), file.path().display()),
            None => "Tasks are not saved in this session".to_string(),
        };
        App {
            store,
            mapping: settings.mapping,
            metrics: settings.metrics,
            form: EntryForm::default(),
            layout: None,
            scene: Scene::empty(),
            save_file: settings.save_file,
            rng,
            resize_debounce: settings.resize_debounce,
            pending_resize: None,
            status,
            last_save: None,
        }
    }

    pub fn dispatch(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Input(ch) => self.form.entry.insert_char(ch),
            AppEvent::Backspace => self.form.entry.backspace(),
            AppEvent::CursorLeft => self.form.entry.move_left(),
            AppEvent::CursorRight => self.form.entry.move_right(),
            AppEvent::FocusNext => self.form.focus = self.form.focus.next(),
            AppEvent::FocusPrev => self.form.focus = self.form.focus.prev(),
            AppEvent::Focus(control) => self.form.focus = control,
            AppEvent::Activate => return self.activate(),
            AppEvent::ToggleImportant => self.form.important = !self.form.important,
            AppEvent::ToggleUrgent => self.form.urgent = !self.form.urgent,
            AppEvent::AddTask => self.add_task(),
            AppEvent::ClearMatrix => self.clear_matrix(),
            AppEvent::CanvasClick(p) => self.canvas_click(p),
            AppEvent::Resize { width, height } => self.resize(width, height, Instant::now()),
            AppEvent::Tick(now) => self.tick(now),
            AppEvent::Quit => {
                self.flush();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn activate(&mut self) -> Flow {
        match self.form.focus {
            Control::Entry | Control::AddButton => self.dispatch(AppEvent::AddTask),
            Control::Important => self.dispatch(AppEvent::ToggleImportant),
            Control::Urgent => self.dispatch(AppEvent::ToggleUrgent),
            Control::ClearButton => self.dispatch(AppEvent::ClearMatrix),
        }
    }

    fn add_task(&mut self) {
        let text = self.form.entry.value().trim().to_string();
        if text.is_empty() {
            return;
        }
        let category = self.mapping.classify(self.form.urgent, self.form.important);
        let bounds = self
            .layout
            .as_ref()
            .map(|layout| layout.quadrant_bounds(category))
            .unwrap_or(FALLBACK_BOUNDS);
        let at = scatter_point(&mut self.rng, bounds, Margins::TEXT_LABEL);
        if let Some(task) = self.store.add(category, &text, at) {
            info!(%category, index = task.index, x = at.x, y = at.y, "added task");
        }
        self.form.reset();
        self.rebuild_scene();
        self.persist(format!("Added \"{}\" to {}", text, category));
    }

    fn clear_matrix(&mut self) {
        self.store.clear();
        self.rebuild_scene();
        if let Some(file) = &self.save_file {
            if let Err(err) = file.remove() {
                warn!(error = %format!("{err:#}"), "could not remove save file");
            }
        }
        info!("cleared matrix");
        self.status = "Matrix cleared".into();
    }

    fn canvas_click(&mut self, p: Point) {
        let Some(task) = self.scene.task_at(p) else {
            debug!(x = p.x, y = p.y, "click hit no task");
            return;
        };
        match self.store.toggle(task) {
            Ok(completed) => {
                let text = self
                    .store
                    .get(task)
                    .map(|t| t.text.clone())
                    .unwrap_or_default();
                debug!(category = %task.category, index = task.index, completed, "toggled task");
                self.rebuild_scene();
                let verb = if completed { "Completed" } else { "Reopened" };
                self.persist(format!("{verb} \"{text}\""));
            }
            Err(err) => warn!(error = %err, "click routed to a stale task"),
        }
    }

    fn resize(&mut self, width: i32, height: i32, now: Instant) {
        if self.layout.is_none() {
            self.apply_layout(width, height);
            return;
        }
        self.pending_resize = Some((now + self.resize_debounce, width, height));
    }

    fn tick(&mut self, now: Instant) {
        if let Some((deadline, width, height)) = self.pending_resize {
            if now >= deadline {
                self.pending_resize = None;
                self.apply_layout(width, height);
            }
        }
    }

    fn apply_layout(&mut self, width: i32, height: i32) {
        if self
            .layout
            .as_ref()
            .is_some_and(|l| l.width == width && l.height == height)
        {
            return;
        }
        debug!(width, height, "laying out matrix");
        self.layout = Some(MatrixLayout::compute(width, height));
        self.rebuild_scene();
    }

    fn rebuild_scene(&mut self) {
        self.scene = match &self.layout {
            Some(layout) => Scene::build(layout, &self.store, self.mapping, self.metrics),
            None => Scene::tasks_only(&self.store, self.metrics),
        };
    }

    fn persist(&mut self, message: impl Into<String>) {
        self.status = message.into();
        if let Some(file) = &self.save_file {
            match file.save(&self.store) {
                Ok(()) => self.last_save = Some(Instant::now()),
                Err(err) => warn!(error = %format!("{err:#}"), "could not save tasks"),
            }
        }
    }

    fn flush(&mut self) {
        if let Some(file) = &self.save_file {
            if let Err(err) = file.save(&self.store) {
                warn!(error = %format!("{err:#}"), "could not save tasks on exit");
            }
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[cfg(test)]
    pub fn layout(&self) -> Option<&MatrixLayout> {
        self.layout.as_ref()
    }

    pub fn mapping(&self) -> QuadrantMapping {
        self.mapping
    }

    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    pub fn save_file(&self) -> Option<&SaveFile> {
        self.save_file.as_ref()
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }
}

fn prev_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}
