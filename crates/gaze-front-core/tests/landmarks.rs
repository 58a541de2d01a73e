//! Eye landmark stage behavior with scripted regression outputs.

#![allow(clippy::unwrap_used)]

use gaze_front_core::{LandmarkConfig, LandmarkLocator, LandmarkPoint};
use gaze_front_test_support::{landmark_output, MockBackend, SyntheticImageBuilder};
use image::GenericImageView;

fn loaded_locator(values: &[f32], config: LandmarkConfig) -> LandmarkLocator<MockBackend> {
    let backend = MockBackend::new(&[1, 3, 48, 48], landmark_output(values));
    let mut locator = LandmarkLocator::new(backend, config).unwrap();
    locator.load().unwrap();
    locator
}

#[test]
fn test_centered_eyes() {
    let locator = loaded_locator(&[0.5, 0.5, 0.5, 0.5], LandmarkConfig::new("lm"));
    let face = SyntheticImageBuilder::rgb_uniform(200, 200, 50, 60, 70);

    let eyes = locator.predict(&face).unwrap();

    assert_eq!(eyes.axis_boxes(), [[80, 120, 80, 120], [80, 120, 80, 120]]);
    assert_eq!(eyes.left.dimensions(), (40, 40));
    assert_eq!(eyes.right.dimensions(), (40, 40));
}

#[test]
fn test_first_pair_is_left_eye() {
    let locator = loaded_locator(&[0.25, 0.5, 0.75, 0.5], LandmarkConfig::new("lm"));
    let face = SyntheticImageBuilder::rgb_uniform(200, 200, 50, 60, 70);

    let eyes = locator.predict(&face).unwrap();

    assert_eq!(eyes.landmarks[0], LandmarkPoint::new(0.25, 0.5));
    assert_eq!(eyes.landmarks[1], LandmarkPoint::new(0.75, 0.5));
    assert_eq!(eyes.axis_boxes()[0], [30, 70, 80, 120]);
    assert_eq!(eyes.axis_boxes()[1], [130, 170, 80, 120]);
}

#[test]
fn test_extra_outputs_are_ignored() {
    let mut values = vec![0.3, 0.4, 0.7, 0.4];
    values.extend(std::iter::repeat(0.9).take(66));
    let locator = loaded_locator(&values, LandmarkConfig::new("lm"));

    let eyes = locator
        .predict(&SyntheticImageBuilder::rgb_uniform(100, 100, 0, 0, 0))
        .unwrap();

    assert_eq!(eyes.landmarks[1], LandmarkPoint::new(0.7, 0.4));
}

#[test]
fn test_eye_window_size_is_configurable() {
    let locator = loaded_locator(
        &[0.5, 0.5, 0.5, 0.5],
        LandmarkConfig::new("lm").with_eye_half_window(10),
    );

    let eyes = locator
        .predict(&SyntheticImageBuilder::rgb_uniform(200, 200, 0, 0, 0))
        .unwrap();

    assert_eq!(eyes.axis_boxes()[0], [90, 110, 90, 110]);
    assert_eq!(eyes.left.dimensions(), (20, 20));
}

#[test]
fn test_window_near_edge_is_clamped() {
    let locator = loaded_locator(&[0.05, 0.5, 0.5, 0.5], LandmarkConfig::new("lm"));
    let face = SyntheticImageBuilder::coordinate_ramp(100, 100);

    let eyes = locator.predict(&face).unwrap();

    // The box keeps its unclamped extent; the crop does not.
    assert_eq!(eyes.axis_boxes()[0], [-15, 25, 30, 70]);
    assert_eq!(eyes.left.dimensions(), (25, 40));
    assert_eq!(eyes.left.to_rgb8().get_pixel(0, 0).0, [0, 30, 0]);
}

#[test]
fn test_window_outside_face_gives_empty_crop() {
    let locator = loaded_locator(&[1.5, 1.5, 0.5, 0.5], LandmarkConfig::new("lm"));

    let eyes = locator
        .predict(&SyntheticImageBuilder::rgb_uniform(100, 100, 0, 0, 0))
        .unwrap();

    assert_eq!(eyes.left.dimensions(), (0, 0));
    assert_eq!(eyes.right.dimensions(), (40, 40));
}

#[test]
fn test_huge_landmark_gives_empty_crop() {
    let locator = loaded_locator(&[1e10, 0.5, 0.5, 0.5], LandmarkConfig::new("lm"));

    let eyes = locator
        .predict(&SyntheticImageBuilder::rgb_uniform(100, 100, 0, 0, 0))
        .unwrap();

    assert_eq!(eyes.axis_boxes()[0], [i32::MAX - 20, i32::MAX, 30, 70]);
    assert_eq!(eyes.left.dimensions(), (0, 0));
    assert_eq!(eyes.right.dimensions(), (40, 40));
}

#[test]
fn test_crop_uses_x_for_columns() {
    let locator = loaded_locator(&[0.25, 0.75, 0.75, 0.25], LandmarkConfig::new("lm"));
    let face = SyntheticImageBuilder::coordinate_ramp(200, 100);

    let eyes = locator.predict(&face).unwrap();

    // Left eye at (50, 75): window starts at column 30, row 55.
    assert_eq!(eyes.left.to_rgb8().get_pixel(0, 0).0, [30, 55, 0]);
    // Right eye at (150, 25): window starts at column 130, row 5.
    assert_eq!(eyes.right.to_rgb8().get_pixel(0, 0).0, [130, 5, 0]);
}
