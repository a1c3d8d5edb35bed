// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for uploaded images
//!
//! This module provides:
//! - Image decoding from raw upload bytes
//! - Object detection via a YOLOv8 ONNX model
//! - Person counting over the detections

pub mod detection;
pub mod image_utils;
pub mod people_counter;

pub use detection::{
    BoundingBox, Detection, DetectionError, ObjectDetector, YoloConfig, YoloDetectionModel,
};
pub use image_utils::{decode_image_bytes, detect_format, format_to_extension, ImageError, ImageInfo};
pub use people_counter::{count_people, AnalyzeError, PeopleCount, PeopleCounter, PERSON_CLASS_ID};
