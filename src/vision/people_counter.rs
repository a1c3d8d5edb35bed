// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Person counting over detector output

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::vision::detection::{Detection, DetectionError, ObjectDetector};
use crate::vision::image_utils::{decode_image_bytes, ImageError};

/// Class identifier of "person" in the COCO label set
pub const PERSON_CLASS_ID: usize = 0;

/// Count detections labelled as a person
///
/// Every detection counts regardless of its confidence; the detector has
/// already applied its own threshold and suppression.
pub fn count_people(detections: &[Detection]) -> usize {
    detections
        .iter()
        .filter(|d| d.class_id == PERSON_CLASS_ID)
        .count()
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Invalid image: {0}")]
    Decode(#[from] ImageError),

    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),
}

/// Outcome of analysing one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeopleCount {
    pub people: usize,
    /// All detections the model returned, of any class
    pub total_detections: usize,
}

/// Decode → detect → count pipeline around a shared detector
#[derive(Clone)]
pub struct PeopleCounter {
    detector: Arc<dyn ObjectDetector>,
}

impl std::fmt::Debug for PeopleCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeopleCounter")
            .field("detector", &self.detector.name())
            .finish()
    }
}

impl PeopleCounter {
    pub fn new(detector: Arc<dyn ObjectDetector>) -> Self {
        Self { detector }
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Analyse encoded image bytes
    ///
    /// Blocking: decoding and inference are CPU-bound.
    pub fn count(&self, bytes: &[u8]) -> Result<PeopleCount, AnalyzeError> {
        let (image, info) = decode_image_bytes(bytes)?;
        debug!(
            "Decoded image: {}x{} {:?}, {} bytes",
            info.width, info.height, info.format, info.size_bytes
        );

        let detections = self.detector.detect(&image)?;

        Ok(PeopleCount {
            people: count_people(&detections),
            total_detections: detections.len(),
        })
    }
}
