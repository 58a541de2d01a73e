//! Configuration file support for gaze-front.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/gaze-front/config.toml` (lowest priority)
//! - Project-local: `.gaze-front.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use gaze_front_core::ChannelOrder;
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Face detection settings.
    pub face: FaceConfig,
    /// Eye landmark settings.
    pub landmarks: LandmarksConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Face detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Known model name or path stem.
    pub model: Option<String>,
    /// Compute device.
    pub device: Option<String>,
    /// Confidence threshold (0.0-1.0).
    pub threshold: Option<f32>,
    /// Input channel order: "bgr" or "rgb".
    pub channel_order: Option<ChannelOrder>,
}

/// Eye landmark configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LandmarksConfig {
    /// Known model name or path stem.
    pub model: Option<String>,
    /// Compute device.
    pub device: Option<String>,
    /// Eye window half-size in pixels.
    pub eye_window: Option<i32>,
    /// Input channel order: "bgr" or "rgb".
    pub channel_order: Option<ChannelOrder>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/gaze-front/config.toml`
    /// 2. Project-local: `.gaze-front.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.face.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("face.threshold must be 0.0-1.0, got {t}"));
            }
        }
        if let Some(w) = self.landmarks.eye_window {
            if w <= 0 {
                return Err(format!("landmarks.eye_window must be positive, got {w}"));
            }
        }
        for (key, device) in [
            ("face.device", &self.face.device),
            ("landmarks.device", &self.landmarks.device),
        ] {
            if device.as_deref().is_some_and(|d| d.trim().is_empty()) {
                return Err(format!("{key} must not be empty"));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.face.model = other.face.model.or_else(|| self.face.model.take());
        self.face.device = other.face.device.or_else(|| self.face.device.take());
        self.face.threshold = other.face.threshold.or(self.face.threshold);
        self.face.channel_order = other.face.channel_order.or(self.face.channel_order);

        self.landmarks.model = other.landmarks.model.or_else(|| self.landmarks.model.take());
        self.landmarks.device = other
            .landmarks
            .device
            .or_else(|| self.landmarks.device.take());
        self.landmarks.eye_window = other.landmarks.eye_window.or(self.landmarks.eye_window);
        self.landmarks.channel_order = other
            .landmarks
            .channel_order
            .or(self.landmarks.channel_order);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gaze-front").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.gaze-front.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".gaze-front.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
