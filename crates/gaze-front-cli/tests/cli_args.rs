//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]

mod common;

use common::Workspace;
use predicates::prelude::*;

// === Usage Errors ===

#[test]
fn test_no_subcommand_shows_usage() {
    let ws = Workspace::new();
    ws.command()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_detect_requires_paths() {
    let ws = Workspace::new();
    ws.command()
        .arg("detect")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required").or(predicate::str::contains("PATHS")));
}

#[test]
fn test_help_lists_subcommands() {
    let ws = Workspace::new();
    ws.command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect").and(predicate::str::contains("models")));
}

// === Value Validation ===

#[test]
fn test_threshold_out_of_range() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--threshold")
        .arg("1.5")
        .arg(&frame)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not in 0.0..=1.0"));
}

#[test]
fn test_threshold_not_a_number() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--threshold")
        .arg("high")
        .arg(&frame)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_eye_window_must_be_positive() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--eye-window")
        .arg("0")
        .arg(&frame)
        .assert()
        .code(2);
}

#[test]
fn test_unknown_format() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--format")
        .arg("xml")
        .arg(&frame)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_channel_order() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--channel-order")
        .arg("grb")
        .arg(&frame)
        .assert()
        .code(2);
}

// === Model Loading ===

#[test]
fn test_missing_models_fail() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.command()
        .arg("detect")
        .arg("--models-dir")
        .arg(ws.path().join("empty"))
        .arg(&frame)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load model"));
}

#[test]
fn test_unknown_device_fails() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--device")
        .arg("HDDL")
        .arg(&frame)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("HDDL"));
}

#[test]
fn test_device_is_case_insensitive() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.detect()
        .arg("--device")
        .arg("cpu")
        .arg(&frame)
        .assert()
        .success();
}

#[test]
fn test_model_given_as_path_stem() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");
    ws.command()
        .arg("detect")
        .arg("--face-model")
        .arg(ws.models_dir().join("face-detection"))
        .arg("--landmark-model")
        .arg(ws.models_dir().join("landmarks-regression"))
        .arg(&frame)
        .assert()
        .success();
}

// === Paths ===

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let ws = Workspace::new();
    ws.detect()
        .arg("/nonexistent/path/to/frame.png")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory() {
    let ws = Workspace::new();
    ws.detect()
        .arg(ws.frames_dir())
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

// === Models Command ===

#[test]
fn test_models_path() {
    let ws = Workspace::new();
    ws.command()
        .arg("models")
        .arg("path")
        .arg("--models-dir")
        .arg(ws.models_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains(ws.models_dir().display().to_string()));
}

#[test]
fn test_models_path_default_uses_data_dir() {
    let ws = Workspace::new();
    ws.command()
        .arg("models")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("gaze-front"));
}

#[test]
fn test_models_list_installed() {
    let ws = Workspace::new();
    ws.command()
        .arg("models")
        .arg("--models-dir")
        .arg(ws.models_dir())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2/2 models installed"));
}

#[test]
fn test_models_list_empty_dir() {
    let ws = Workspace::new();
    ws.command()
        .arg("models")
        .arg("list")
        .arg("--models-dir")
        .arg(ws.path().join("empty"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0/2 models installed"));
}
