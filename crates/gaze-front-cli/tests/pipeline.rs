//! End-to-end detection runs through the candle backend.

#![allow(clippy::unwrap_used)]

mod common;

use common::{parse_jsonl, Workspace};
use gaze_front_test_support::SyntheticImageBuilder;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_faces_and_eyes_in_frame_coordinates() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");

    let output = ws.detect().arg(&frame).output().unwrap();
    assert!(output.status.success());

    let results = parse_jsonl(&output.stdout);
    let faces = results[0]["faces"].as_array().unwrap();
    assert_eq!(faces.len(), 2);

    // Model order is kept: the 0.9 face first.
    assert_eq!(faces[0]["bbox"], json!([100, 50, 300, 150]));
    assert!((faces[0]["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(faces[0]["left_eye"]["bbox"], json!([130, 170, 80, 120]));
    assert_eq!(faces[0]["right_eye"]["bbox"], json!([230, 270, 80, 120]));
    assert_eq!(faces[0]["left_eye"]["crop_size"], json!([40, 40]));
    assert!((faces[0]["left_eye"]["landmark"]["x"].as_f64().unwrap() - 0.25).abs() < 1e-6);

    // The second face is 100x50 at the frame corner.
    assert_eq!(faces[1]["bbox"], json!([0, 0, 100, 50]));
    assert_eq!(faces[1]["left_eye"]["bbox"], json!([5, 45, 5, 45]));
    assert_eq!(faces[1]["right_eye"]["bbox"], json!([55, 95, 5, 45]));
}

#[test]
fn test_grayscale_file_is_processed() {
    let ws = Workspace::new();
    let path = ws.frames_dir().join("gray.png");
    SyntheticImageBuilder::grayscale(400, 200, 100)
        .image
        .save(&path)
        .unwrap();

    let output = ws.detect().arg(&path).output().unwrap();

    assert!(output.status.success());
    let results = parse_jsonl(&output.stdout);
    assert_eq!(results[0]["faces"].as_array().unwrap().len(), 2);
}

#[test]
fn test_corrupt_file_is_skipped() {
    let ws = Workspace::new();
    std::fs::write(ws.frames_dir().join("broken.png"), b"not a png").unwrap();
    ws.add_frame("ok.png");

    let output = ws.detect().arg(ws.frames_dir()).output().unwrap();

    assert!(output.status.success());
    let results = parse_jsonl(&output.stdout);
    assert_eq!(results.len(), 1);
    assert!(results[0]["path"].as_str().unwrap().ends_with("ok.png"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken.png"));
}

#[test]
fn test_all_frames_skipped_warns() {
    let ws = Workspace::new();
    std::fs::write(ws.frames_dir().join("broken.png"), b"not a png").unwrap();

    ws.detect()
        .arg(ws.frames_dir())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No image could be processed (1 skipped)"));
}

#[test]
fn test_recursive_flag() {
    let ws = Workspace::new();
    ws.add_frame("top.png");
    let nested = ws.frames_dir().join("session1");
    std::fs::create_dir(&nested).unwrap();
    SyntheticImageBuilder::rgb_uniform(400, 200, 1, 2, 3)
        .image
        .save(nested.join("inner.png"))
        .unwrap();

    let flat = ws.detect().arg(ws.frames_dir()).output().unwrap();
    let deep = ws.detect().arg("-r").arg(ws.frames_dir()).output().unwrap();

    assert_eq!(parse_jsonl(&flat.stdout).len(), 1);
    assert_eq!(parse_jsonl(&deep.stdout).len(), 2);
}

#[test]
fn test_verbose_logs_model_loading() {
    let ws = Workspace::new();
    let frame = ws.add_frame("frame.png");

    ws.detect()
        .arg("-v")
        .arg(&frame)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded"))
        .stderr(predicate::str::contains(
            "Processed 1 image(s) (0 skipped), found 2 face(s)",
        ));
}
