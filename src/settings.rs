use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const MIN_DRAG_THRESHOLD: u16 = 1;
const MAX_DRAG_THRESHOLD: u16 = 8;
const DEFAULT_DRAG_THRESHOLD: u16 = 1;
const MIN_COLUMN_WIDTH: u16 = 16;
const MAX_COLUMN_WIDTH: u16 = 60;
const DEFAULT_COLUMN_WIDTH: u16 = 28;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides the location of the board store file.
    pub storage_path: Option<PathBuf>,
    /// Cells the pointer must travel with the button held before a press
    /// turns into a drag.
    pub drag_threshold: u16,
    pub column_width: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_path: None,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("dnd-kanban");
        path.push("settings.toml");
        Some(path)
    }

    /// Reads the settings file. On first launch the defaults are written
    /// there so the user has a file to edit.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_or_create(&path)
    }

    fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            return Self::load_from_path(path);
        }

        let settings = Self::default();
        match settings.save_to_path(path) {
            Ok(()) => info!("wrote default settings to '{}'", path.display()),
            Err(error) => warn!(
                "failed to write default settings '{}': {:#}",
                path.display(),
                error
            ),
        }
        settings
    }

    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    fn validate(&mut self) {
        self.drag_threshold = self
            .drag_threshold
            .clamp(MIN_DRAG_THRESHOLD, MAX_DRAG_THRESHOLD);
        self.column_width = self.column_width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);

        if self
            .storage_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            warn!("empty storage_path in settings config; using the default location");
            self.storage_path = None;
        }
    }
}
