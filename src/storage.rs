use crate::model::TaskStore;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_SAVE_FILE: &str = "eisenhower_matrix_save.json";

/// The JSON file the task store is mirrored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    pub path: PathBuf,
}

impl SaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SaveFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store back. A missing or unreadable file yields an empty store.
    pub fn load(&self) -> TaskStore {
        match self.try_load() {
            Ok(Some(store)) => {
                info!(path = %self.path.display(), tasks = store.len(), "loaded tasks");
                store
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no save file, starting empty");
                TaskStore::new()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %format!("{err:#}"), "ignoring unreadable save file");
                TaskStore::new()
            }
        }
    }

    fn try_load(&self) -> Result<Option<TaskStore>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("reading {:?}", self.path)),
        };
        let store = serde_json::from_str(&data).context("parsing save file")?;
        Ok(Some(store))
    }

    pub fn save(&self, store: &TaskStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let serialized = serde_json::to_string_pretty(store).context("serializing tasks")?;
        fs::write(&self.path, serialized).with_context(|| format!("writing {:?}", self.path))?;
        debug!(path = %self.path.display(), tasks = store.len(), "saved tasks");
        Ok(())
    }

    /// Deletes the backing file. Missing files are fine.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "removed save file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {:?}", self.path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{Category, TaskRef};
    use tempfile::TempDir;

    fn populated() -> TaskStore {
        let mut store = TaskStore::new();
        store.add(Category::UrgentImportant, "Finish report", Point::new(100, 120));
        store.add(Category::UrgentImportant, "Call bank", Point::new(180, 200));
        store.add(Category::NotUrgentImportant, "Gym", Point::new(90, 400));
        store.add(Category::NotUrgentNotImportant, "Sort photos", Point::new(500, 420));
        store
            .toggle(TaskRef::new(Category::UrgentImportant, 1))
            .unwrap();
        store
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let file = SaveFile::new(dir.path().join(DEFAULT_SAVE_FILE));
        let store = populated();
        file.save(&store).unwrap();
        assert_eq!(file.load(), store);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let file = SaveFile::new(dir.path().join("nested/deeper/tasks.json"));
        file.save(&populated()).unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let file = SaveFile::new(dir.path().join("absent.json"));
        assert!(file.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(SaveFile::new(&path).load().is_empty());

        fs::write(&path, r#"{"Someday": [["x", 1, 2, false]]}"#).unwrap();
        assert!(SaveFile::new(&path).load().is_empty());
    }

    #[test]
    fn remove_deletes_file_and_next_load_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = SaveFile::new(dir.path().join(DEFAULT_SAVE_FILE));
        file.save(&populated()).unwrap();
        file.remove().unwrap();
        assert!(!file.path().exists());
        assert!(file.load().is_empty());
        file.remove().unwrap();
    }

    #[test]
    fn file_shape_matches_label_keyed_tuples() {
        let dir = TempDir::new().unwrap();
        let file = SaveFile::new(dir.path().join(DEFAULT_SAVE_FILE));
        file.save(&populated()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(
            raw["Urgent & Important"][1],
            serde_json::json!(["Call bank", 180, 200, true])
        );
    }
}
