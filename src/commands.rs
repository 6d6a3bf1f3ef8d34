use crate::app::{App, Settings};
use crate::classify::QuadrantMapping;
use crate::config::{self, Config};
use crate::geometry::{scatter_point, Margins, MatrixLayout};
use crate::model::{Category, Task, TaskRef, TaskStore};
use crate::storage::SaveFile;
use crate::ui;
use anyhow::{Context, Result};
use rand::thread_rng;
use std::path::PathBuf;

/// Resolved settings shared by every command.
pub struct Session {
    pub config: Config,
    pub mapping: QuadrantMapping,
    pub save_file: Option<SaveFile>,
}

impl Session {
    pub fn new(
        config: Config,
        file: Option<PathBuf>,
        no_save: bool,
        mapping: Option<QuadrantMapping>,
    ) -> Self {
        let save_file = if no_save || !config.persist {
            None
        } else {
            Some(SaveFile::new(file.unwrap_or_else(|| config.save_file.clone())))
        };
        Session {
            mapping: mapping.unwrap_or(config.mapping),
            config,
            save_file,
        }
    }

    fn load(&self) -> TaskStore {
        self.save_file
            .as_ref()
            .map(SaveFile::load)
            .unwrap_or_default()
    }

    fn save(&self, store: &TaskStore) -> Result<()> {
        match &self.save_file {
            Some(file) => file.save(store),
            None => {
                println!("(not saved: persistence is off)");
                Ok(())
            }
        }
    }
}

pub fn tui(session: Session) -> Result<()> {
    let store = session.load();
    let settings = Settings {
        mapping: session.mapping,
        metrics: session.config.metrics(),
        resize_debounce: session.config.resize_debounce(),
        save_file: session.save_file,
    };
    ui::run(App::new(store, settings))
}

pub fn add(session: &Session, text: String, urgent: bool, important: bool) -> Result<()> {
    let mut store = session.load();
    let category = session.mapping.classify(urgent, important);
    let layout = MatrixLayout::compute(session.config.canvas_width, session.config.canvas_height);
    let at = scatter_point(
        &mut thread_rng(),
        layout.quadrant_bounds(category),
        Margins::TEXT_LABEL,
    );
    let Some(task) = store.add(category, &text, at) else {
        println!("Nothing to add: task text is empty");
        return Ok(());
    };
    session.save(&store)?;
    println!("Added to {} as #{}", category, task.index);
    Ok(())
}

pub fn list(session: &Session, category: Option<String>) -> Result<()> {
    let store = session.load();
    let filter = category
        .map(|raw| raw.parse::<Category>())
        .transpose()?;
    for category in Category::ALL {
        if filter.is_some_and(|f| f != category) {
            continue;
        }
        println!("{}", category);
        let tasks = store.tasks(category);
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for (idx, task) in tasks.iter().enumerate() {
            print_task(idx, task);
        }
        println!();
    }
    Ok(())
}

pub fn toggle(session: &Session, category: String, index: usize) -> Result<()> {
    let mut store = session.load();
    let category: Category = category.parse()?;
    let task = TaskRef::new(category, index);
    let completed = store
        .toggle(task)
        .with_context(|| format!("toggling task {} in {}", index, category))?;
    session.save(&store)?;
    let state = if completed { "completed" } else { "open" };
    println!("Task #{} in {} is now {}", index, category, state);
    Ok(())
}

pub fn clear(session: &Session) -> Result<()> {
    if let Some(file) = &session.save_file {
        file.remove()?;
        println!("Removed {}", file.path().display());
    } else {
        println!("Nothing to clear: persistence is off");
    }
    Ok(())
}

pub fn path(session: &Session) -> Result<()> {
    match &session.save_file {
        Some(file) => println!("save file: {}", file.path().display()),
        None => println!("save file: (persistence off)"),
    }
    match config::config_path() {
        Some(path) => println!("config:    {}", path.display()),
        None => println!("config:    (no config directory)"),
    }
    Ok(())
}

fn print_task(idx: usize, task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("  {:>2}. [{}] {}  ({}, {})", idx, mark, task.text, task.x, task.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        Session::new(
            Config::default(),
            Some(dir.path().join("tasks.json")),
            false,
            None,
        )
    }

    #[test]
    fn add_then_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        add(&session, "Finish report".into(), true, true).unwrap();
        let store = session.load();
        let tasks = store.tasks(Category::UrgentImportant);
        assert_eq!(tasks.len(), 1);
        let bounds = MatrixLayout::compute(760, 640).quadrant_bounds(Category::UrgentImportant);
        assert!(tasks[0].x >= bounds.x1 + 20 && tasks[0].x <= bounds.x2 - 80);

        toggle(&session, "urgent-important".into(), 0).unwrap();
        assert!(session.load().tasks(Category::UrgentImportant)[0].completed);
    }

    #[test]
    fn toggle_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        assert!(toggle(&session, "urgent-important".into(), 4).is_err());
        assert!(toggle(&session, "someday".into(), 0).is_err());
    }

    #[test]
    fn clear_removes_save_file() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        add(&session, "Temp".into(), false, false).unwrap();
        clear(&session).unwrap();
        assert!(!dir.path().join("tasks.json").exists());
        assert!(session.load().is_empty());
    }

    #[test]
    fn no_save_disables_persistence() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(
            Config::default(),
            Some(dir.path().join("tasks.json")),
            true,
            Some(QuadrantMapping::Transposed),
        );
        assert!(session.save_file.is_none());
        assert_eq!(session.mapping, QuadrantMapping::Transposed);
        add(&session, "Ephemeral".into(), true, false).unwrap();
        assert!(!dir.path().join("tasks.json").exists());
    }

    #[test]
    fn persist_off_in_config_disables_persistence() {
        let config = Config {
            persist: false,
            ..Config::default()
        };
        let session = Session::new(config, None, false, None);
        assert!(session.save_file.is_none());
    }
}
