//! Face-then-eyes composition.

use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::domain::{
    BoundingBox, EyeRecord, FaceDetection, FaceRecord, FrameResult, ImageDimensions, ImageInfo,
};
use crate::error::Result;
use crate::ports::InferenceBackend;
use crate::stages::{
    crop_clamped, EyeCrops, FaceDetector, FaceDetectorConfig, LandmarkConfig, LandmarkLocator,
};

/// Everything the front-end extracts for one face.
#[derive(Debug, Clone)]
pub struct FaceEyes {
    /// The face detection in frame pixels.
    pub face: FaceDetection,
    /// The face region, clamped to the frame.
    pub face_crop: DynamicImage,
    /// Frame position of the face crop's top-left pixel.
    pub crop_origin: (u32, u32),
    /// Eye crops and boxes, relative to `face_crop`.
    pub eyes: EyeCrops,
}

impl FaceEyes {
    /// Eye boxes `[left, right]` translated into frame pixels.
    #[must_use]
    pub fn eye_boxes_in_frame(&self) -> [BoundingBox; 2] {
        let dx = i32::try_from(self.crop_origin.0).unwrap_or(i32::MAX);
        let dy = i32::try_from(self.crop_origin.1).unwrap_or(i32::MAX);
        self.eyes.boxes.map(|bbox| bbox.translate(dx, dy))
    }
}

/// Face detector followed by eye landmark locator.
///
/// Feeds every detected face, cropped from the frame, to the landmark stage.
/// The eye crops are the input of a downstream gaze estimator.
pub struct GazeFrontEnd<B: InferenceBackend> {
    faces: FaceDetector<B>,
    landmarks: LandmarkLocator<B>,
}

impl<B: InferenceBackend> GazeFrontEnd<B> {
    /// Composes two configured stages.
    #[must_use]
    pub const fn new(faces: FaceDetector<B>, landmarks: LandmarkLocator<B>) -> Self {
        Self { faces, landmarks }
    }

    /// Configures both stages on copies of one backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if either configuration is invalid.
    pub fn from_configs(
        backend: B,
        face_config: FaceDetectorConfig,
        landmark_config: LandmarkConfig,
    ) -> Result<Self>
    where
        B: Clone,
    {
        let faces = FaceDetector::new(backend.clone(), face_config)?;
        let landmarks = LandmarkLocator::new(backend, landmark_config)?;
        Ok(Self::new(faces, landmarks))
    }

    /// Loads both models.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::Error::Load`] encountered.
    pub fn load(&mut self) -> Result<()> {
        self.faces.load()?;
        self.landmarks.load()
    }

    /// Returns the face stage.
    #[must_use]
    pub const fn face_detector(&self) -> &FaceDetector<B> {
        &self.faces
    }

    /// Returns the landmark stage.
    #[must_use]
    pub const fn landmark_locator(&self) -> &LandmarkLocator<B> {
        &self.landmarks
    }

    /// Detects faces in `frame` and locates the eyes of each.
    ///
    /// Faces whose box does not overlap the frame are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first stage error.
    pub fn process(&self, frame: &DynamicImage) -> Result<Vec<FaceEyes>> {
        let detections = self.faces.predict_detections(frame)?;
        let (width, height) = frame.dimensions();

        let mut results = Vec::with_capacity(detections.len());
        for face in detections {
            let Some((x, y, _, _)) = face.bbox.clamp_to(width, height) else {
                warn!(
                    "Skipping face {:?} outside {width}x{height} frame",
                    face.bbox.to_corner_array()
                );
                continue;
            };

            let face_crop = crop_clamped(frame, face.bbox);
            let eyes = self.landmarks.predict(&face_crop)?;
            debug!(
                "Face {:?} ({:.2}): eyes {:?}",
                face.bbox.to_corner_array(),
                face.confidence,
                eyes.axis_boxes()
            );

            results.push(FaceEyes {
                face,
                face_crop,
                crop_origin: (x, y),
                eyes,
            });
        }

        Ok(results)
    }
}

impl From<&FaceEyes> for FaceRecord {
    fn from(face: &FaceEyes) -> Self {
        let [left_box, right_box] = face.eye_boxes_in_frame();
        let eye = |bbox: BoundingBox, crop: &DynamicImage, landmark| EyeRecord {
            bbox: bbox.to_axis_array(),
            landmark,
            crop_size: [crop.width(), crop.height()],
        };

        Self {
            bbox: face.face.bbox.to_corner_array(),
            confidence: face.face.confidence,
            left_eye: eye(left_box, &face.eyes.left, face.eyes.landmarks[0]),
            right_eye: eye(right_box, &face.eyes.right, face.eyes.landmarks[1]),
        }
    }
}

impl FrameResult {
    /// Collects the serializable result for one processed frame.
    #[must_use]
    pub fn from_faces(info: &ImageInfo, faces: &[FaceEyes]) -> Self {
        Self {
            path: info.path.clone(),
            dimensions: ImageDimensions::new(info.width, info.height),
            faces: faces.iter().map(FaceRecord::from).collect(),
        }
    }
}
