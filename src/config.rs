use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Tracks CSV to load (used when the CLI gets no `--data`).
    pub data_path: Option<PathBuf>,
    /// View derivation settings.
    #[serde(flatten)]
    pub dashboard: DashboardConfig,
}

/// Knobs shared by every view deriver.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Length of the ranking and relationship views.
    pub top_n: usize,
    /// Hexagon circumradius in canvas pixels.
    pub hex_radius: f64,
    /// Durations past this many minutes are clamped to the right edge.
    pub max_duration_minutes: f64,
    /// Rows drawn in the profile view.
    pub profile_sample_size: usize,
    /// Seed for the profile sample; same seed, same lines.
    pub sample_seed: u64,
    pub canvas: Canvas,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            hex_radius: 8.0,
            max_duration_minutes: 7.0,
            profile_sample_size: 700,
            sample_seed: 42,
            canvas: Canvas::default(),
        }
    }
}

/// Plot area of the distribution view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 260.0,
            margin_top: 40.0,
            margin_right: 30.0,
            margin_bottom: 50.0,
            margin_left: 60.0,
        }
    }
}

impl Canvas {
    /// Horizontal pixel span, left to right.
    pub fn x_range(&self) -> (f64, f64) {
        (self.margin_left, self.width - self.margin_right)
    }

    /// Vertical pixel span, bottom to top (SVG y grows downwards).
    pub fn y_range(&self) -> (f64, f64) {
        (self.height - self.margin_bottom, self.margin_top)
    }
}

impl AppConfig {
    /// Load config from `~/.config/trackdash/config.toml`.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load a specific config file.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
