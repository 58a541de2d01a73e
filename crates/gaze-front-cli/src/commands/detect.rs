//! Detect command - find faces and eyes in images.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use gaze_front_adapters::{models_dir, resolve_model, FsImageSource};
use gaze_front_core::stages::{DEFAULT_DEVICE, DEFAULT_EYE_HALF_WINDOW, DEFAULT_FACE_THRESHOLD};
use gaze_front_core::{
    CandleBackend, ChannelOrder, FaceDetectorConfig, FrameResult, GazeFrontEnd, ImageInfo,
    ImageSource, LandmarkConfig, ResultOutput,
};
use image::DynamicImage;
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Known model used when no face model is configured.
const DEFAULT_FACE_MODEL: &str = "face-detection";
/// Known model used when no landmark model is configured.
const DEFAULT_LANDMARK_MODEL: &str = "landmarks";

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Channel order of the model inputs.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InputOrder {
    /// Blue, green, red
    Bgr,
    /// Red, green, blue
    Rgb,
}

impl From<InputOrder> for ChannelOrder {
    fn from(order: InputOrder) -> Self {
        match order {
            InputOrder::Bgr => Self::Bgr,
            InputOrder::Rgb => Self::Rgb,
        }
    }
}

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Arguments for face and eye detection.
#[derive(Args, Clone)]
pub struct DetectArgs {
    /// Files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Face model: a known model name or a path stem
    #[arg(long, value_name = "MODEL")]
    pub face_model: Option<String>,

    /// Landmark model: a known model name or a path stem
    #[arg(long, value_name = "MODEL")]
    pub landmark_model: Option<String>,

    /// Compute device for both models (CPU, GPU, CUDA:N, METAL, AUTO)
    #[arg(long)]
    pub device: Option<String>,

    /// Face confidence threshold (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f32>,

    /// Eye window half-size in pixels
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..))]
    pub eye_window: Option<i32>,

    /// Channel order of both model inputs
    #[arg(long, value_enum)]
    pub channel_order: Option<InputOrder>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl DetectArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.threshold = args.threshold.or(config.face.threshold);
        args.eye_window = args.eye_window.or(config.landmarks.eye_window);

        if args.face_model.is_none() {
            args.face_model.clone_from(&config.face.model);
        }
        if args.landmark_model.is_none() {
            args.landmark_model.clone_from(&config.landmarks.model);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }

        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        // Per-stage device and channel order live in the config only; the
        // CLI flags apply to both stages and are resolved in the accessors.
        args.config = Some(config.clone());

        args
    }

    fn config(&self) -> AppConfig {
        self.config.clone().unwrap_or_default()
    }

    fn models_dir(&self) -> PathBuf {
        self.models_dir.clone().unwrap_or_else(models_dir)
    }

    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Builds the face stage configuration.
    fn face_config(&self) -> FaceDetectorConfig {
        let config = self.config();
        let model = self.face_model.as_deref().unwrap_or(DEFAULT_FACE_MODEL);
        let device = self
            .device
            .clone()
            .or(config.face.device)
            .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
        let order = self
            .channel_order
            .map(ChannelOrder::from)
            .or(config.face.channel_order)
            .unwrap_or_default();

        FaceDetectorConfig::new(resolve_model(&self.models_dir(), model))
            .with_device(device)
            .with_threshold(self.threshold.unwrap_or(DEFAULT_FACE_THRESHOLD))
            .with_channel_order(order)
    }

    /// Builds the landmark stage configuration.
    fn landmark_config(&self) -> LandmarkConfig {
        let config = self.config();
        let model = self
            .landmark_model
            .as_deref()
            .unwrap_or(DEFAULT_LANDMARK_MODEL);
        let device = self
            .device
            .clone()
            .or(config.landmarks.device)
            .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
        let order = self
            .channel_order
            .map(ChannelOrder::from)
            .or(config.landmarks.channel_order)
            .unwrap_or_default();

        LandmarkConfig::new(resolve_model(&self.models_dir(), model))
            .with_device(device)
            .with_eye_half_window(self.eye_window.unwrap_or(DEFAULT_EYE_HALF_WINDOW))
            .with_channel_order(order)
    }
}

/// Result of running the detect command.
pub struct DetectResult {
    /// Number of images processed.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Number of faces found across all images.
    pub faces: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

impl DetectResult {
    /// One-line run summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "Processed {} image(s) ({} skipped), found {} face(s)",
            self.processed, self.skipped, self.faces
        )
    }
}

/// Run the detect command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &DetectArgs) -> Result<DetectResult> {
    info!("Running detect command on {} paths", args.paths.len());

    let face_config = args.face_config();
    let landmark_config = args.landmark_config();
    debug!(
        "Face model {} on {}, landmark model {} on {}",
        face_config.model.stem.display(),
        face_config.model.device,
        landmark_config.model.stem.display(),
        landmark_config.model.device
    );

    let mut front_end =
        GazeFrontEnd::from_configs(CandleBackend::new(), face_config, landmark_config)
            .context("Invalid detection settings")?;
    front_end.load()?;

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let output = JsonOutput::stdout();

    process_images(&source, &front_end, &output, args)
}

/// Runs every image through the front-end and writes the results.
fn process_images(
    source: &FsImageSource,
    front_end: &GazeFrontEnd<CandleBackend>,
    output: &JsonOutput,
    args: &DetectArgs,
) -> Result<DetectResult> {
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut face_count = 0usize;
    let mut all_results: Vec<FrameResult> = Vec::new();

    for image_result in source.images() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping image: {e:#}");
                skipped += 1;
                continue;
            }
        };

        let frame = color_frame(&image);
        let faces = match front_end.process(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Skipping {}: {e}", image.path);
                skipped += 1;
                continue;
            }
        };

        face_count += faces.len();
        let result = FrameResult::from_faces(&image, &faces);

        match args.format() {
            OutputFormat::Jsonl => output.write(&result)?,
            OutputFormat::Json => all_results.push(result),
        }

        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_results, args.pretty)?;
    }

    output.flush()?;

    Ok(DetectResult {
        processed,
        skipped,
        faces: face_count,
        exit_code: ExitCode::Success,
    })
}

/// The stages require color input; grayscale files are expanded to RGB.
fn color_frame(image: &ImageInfo) -> DynamicImage {
    if image.color().channel_count() < 3 {
        debug!("Expanding grayscale {} to RGB", image.path);
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image.image.clone()
    }
}
