use crate::classify::QuadrantMapping;
use crate::scene::TextMetrics;
use crate::storage::DEFAULT_SAVE_FILE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yml";

/// User settings read from `config.yml` in the platform config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub save_file: PathBuf,
    pub persist: bool,
    pub mapping: QuadrantMapping,
    /// Virtual pixels per terminal column.
    pub cell_width: i32,
    /// Virtual pixels per terminal row.
    pub cell_height: i32,
    /// Canvas size assumed by one-shot commands that have no terminal to measure.
    pub canvas_width: i32,
    pub canvas_height: i32,
    pub resize_debounce_ms: u64,
    /// `off`, `stderr` or a file path. Unset picks a default per command.
    pub log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            save_file: PathBuf::from(DEFAULT_SAVE_FILE),
            persist: true,
            mapping: QuadrantMapping::default(),
            cell_width: 8,
            cell_height: 16,
            canvas_width: 760,
            canvas_height: 640,
            resize_debounce_ms: 10,
            log: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let config: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing config file {:?}", path))?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        anyhow::ensure!(
            self.cell_width > 0 && self.cell_height > 0,
            "cell_width and cell_height must be positive"
        );
        self.canvas_width = self.canvas_width.max(0);
        self.canvas_height = self.canvas_height.max(0);
        Ok(self)
    }

    pub fn metrics(&self) -> TextMetrics {
        TextMetrics {
            char_width: self.cell_width,
            line_height: self.cell_height,
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "eisenmatrix")
}

pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Default log file for the interactive UI, which owns the terminal.
pub fn default_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("eisenmatrix.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.yml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.persist);
        assert_eq!(config.save_file, PathBuf::from(DEFAULT_SAVE_FILE));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "mapping: transposed\npersist: false\ncell_width: 10\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mapping, QuadrantMapping::Transposed);
        assert!(!config.persist);
        assert_eq!(config.metrics().char_width, 10);
        assert_eq!(config.metrics().line_height, 16);
        assert_eq!(config.resize_debounce(), Duration::from_millis(10));
    }

    #[test]
    fn invalid_cell_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "cell_height: 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "mapping: [unclosed\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config file"));
    }
}
