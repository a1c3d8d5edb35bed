// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding
//!
//! The detection head emits one column per anchor: `[cx, cy, w, h, score_0 .. score_n]`
//! in letterboxed input coordinates, giving a tensor of shape `[1, 4 + nc, anchors]`.
//! Some exporters transpose this to `[1, anchors, 4 + nc]`; both layouts are accepted
//! by assuming the feature axis is the shorter one. A square output is read as
//! `[1, 4 + nc, anchors]`.

use std::cmp::Ordering;

use ndarray::{s, ArrayViewD, Axis, Ix2};

use super::preprocessing::Letterbox;
use super::{BoundingBox, Detection, DetectionError};

/// Number of leading box values per anchor
const BOX_VALUES: usize = 4;

/// Decode raw predictions into detections in original image coordinates
///
/// Anchors whose best class score does not exceed `confidence_threshold` are dropped.
/// Boxes are clamped to the image bounds. No suppression is applied here.
pub fn decode_predictions(
    output: ArrayViewD<'_, f32>,
    geometry: &Letterbox,
    orig_width: u32,
    orig_height: u32,
    confidence_threshold: f32,
) -> Result<Vec<Detection>, DetectionError> {
    let preds = match output.ndim() {
        3 if output.shape()[0] == 1 => output.index_axis_move(Axis(0), 0),
        3 => {
            return Err(DetectionError::InvalidOutput(format!(
                "expected batch size 1, got shape {:?}",
                output.shape()
            )))
        }
        2 => output,
        _ => {
            return Err(DetectionError::InvalidOutput(format!(
                "expected 2 or 3 dimensions, got shape {:?}",
                output.shape()
            )))
        }
    };

    let preds = preds
        .into_dimensionality::<Ix2>()
        .map_err(|e| DetectionError::InvalidOutput(e.to_string()))?;

    let preds = if preds.nrows() <= preds.ncols() {
        preds
    } else {
        preds.reversed_axes()
    };

    if preds.nrows() <= BOX_VALUES {
        return Err(DetectionError::InvalidOutput(format!(
            "prediction has {} values per anchor, need more than {}",
            preds.nrows(),
            BOX_VALUES
        )));
    }

    let width = orig_width as f32;
    let height = orig_height as f32;
    let mut detections = Vec::new();

    for anchor in preds.axis_iter(Axis(1)) {
        let (class_id, confidence) = anchor
            .slice(s![BOX_VALUES..])
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (id, score)| {
                if score > best.1 {
                    (id, score)
                } else {
                    best
                }
            });

        if confidence <= confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (anchor[0], anchor[1], anchor[2], anchor[3]);
        let (x1, y1) = geometry.map_to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = geometry.map_to_original(cx + w / 2.0, cy + h / 2.0);

        detections.push(Detection::new(
            BoundingBox::new(
                x1.clamp(0.0, width),
                y1.clamp(0.0, height),
                x2.clamp(0.0, width),
                y2.clamp(0.0, height),
            ),
            confidence,
            class_id,
        ));
    }

    Ok(detections)
}

/// Class-aware greedy non-maximum suppression
///
/// Keeps the highest-confidence box of each overlapping same-class cluster.
/// Boxes of different classes never suppress each other. At most
/// `max_detections` boxes are returned, ordered by descending confidence.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in detections {
        if kept.len() >= max_detections {
            break;
        }

        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.bbox.iou(&candidate.bbox) > iou_threshold
        });

        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
