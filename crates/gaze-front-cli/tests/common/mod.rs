//! Shared setup for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use gaze_front_test_support::fixtures::{write_constant_detector, write_constant_landmarks};
use gaze_front_test_support::{face_row, SyntheticImageBuilder};
use tempfile::TempDir;

/// A temporary working directory with models, frames and an isolated
/// config home.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Creates a workspace whose models emit two faces (confidence 0.9 and
    /// 0.6) and eyes at `(0.25, 0.5)` / `(0.75, 0.5)` of each face.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::create_dir_all(dir.path().join("frames")).unwrap();
        std::fs::create_dir_all(dir.path().join("xdg")).unwrap();

        write_constant_detector(
            &models,
            "face-detection",
            (8, 8),
            &[
                face_row(0.9, [0.25, 0.25, 0.75, 0.75]),
                face_row(0.6, [0.0, 0.0, 0.25, 0.25]),
            ],
        )
        .unwrap();
        write_constant_landmarks(
            &models,
            "landmarks-regression",
            (4, 4),
            &[0.25, 0.5, 0.75, 0.5],
        )
        .unwrap();

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.path().join("models")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.path().join("frames")
    }

    /// Writes a 400x200 color frame and returns its path.
    pub fn add_frame(&self, name: &str) -> PathBuf {
        let path = self.frames_dir().join(name);
        SyntheticImageBuilder::rgb_uniform(400, 200, 90, 120, 150)
            .image
            .save(&path)
            .unwrap();
        path
    }

    pub fn write_project_config(&self, toml: &str) {
        std::fs::write(self.path().join(".gaze-front.toml"), toml).unwrap();
    }

    pub fn write_xdg_config(&self, toml: &str) {
        let dir = self.path().join("xdg").join("gaze-front");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), toml).unwrap();
    }

    /// The binary, run inside the workspace with an isolated config home.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("gaze-front").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// `detect` with the workspace models directory.
    pub fn detect(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("detect").arg("--models-dir").arg(self.models_dir());
        cmd
    }
}

/// Parses JSON Lines output.
pub fn parse_jsonl(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
