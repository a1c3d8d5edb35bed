// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection with YOLOv8 ONNX models
//!
//! Components:
//! - `preprocessing` - Letterbox resize into the model's square input tensor
//! - `postprocessing` - Decoding raw predictions and non-maximum suppression
//! - `model` - ONNX Runtime session wrapper implementing [`ObjectDetector`]

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;

pub use model::{YoloConfig, YoloDetectionModel};
pub use postprocessing::{decode_predictions, non_max_suppression};
pub use preprocessing::{letterbox, Letterbox, DEFAULT_INPUT_SIZE, MIN_INPUT_SIZE};

/// Errors raised by a detector while processing one image
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    InvalidOutput(String),
}

/// Axis-aligned box in original image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection over union; 0.0 when both boxes are degenerate
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// One located object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Index into the model's label set
    pub class_id: usize,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32, class_id: usize) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }
}

/// A pretrained detector that turns a pixel grid into detections
///
/// Implementations are shared read-only across requests, so they must be
/// `Send + Sync`. Any internal mutability (such as an inference session)
/// is the implementation's concern.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectionError>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}
