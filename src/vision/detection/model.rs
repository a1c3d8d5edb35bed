// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 ONNX detection model

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, GenericImageView};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::postprocessing::{decode_predictions, non_max_suppression};
use super::preprocessing::{letterbox, DEFAULT_INPUT_SIZE};
use super::{Detection, DetectionError, ObjectDetector};

/// Detector parameters
///
/// The defaults mirror the stock YOLOv8 predictor, so the detections returned
/// are the ones the pretrained model would report on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct YoloConfig {
    /// Square model input size in pixels
    pub input_size: u32,
    /// Minimum best-class score for an anchor to become a detection
    pub confidence_threshold: f32,
    /// Same-class overlap above which the weaker box is suppressed
    pub iou_threshold: f32,
    /// Upper bound on detections per image
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

/// Pretrained YOLOv8 detector
///
/// Runs on CPU. The session sits behind a mutex because running it needs
/// exclusive access, so concurrent requests are served one inference at a time.
#[derive(Clone)]
pub struct YoloDetectionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model output name
    output_name: String,
    config: YoloConfig,
}

impl std::fmt::Debug for YoloDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetectionModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YoloDetectionModel {
    /// Load the detection model from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P, config: YoloConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());

        debug!(
            "Detection model loaded - input: {}, output: {}",
            input_name, output_name
        );

        info!(
            input_size = config.input_size,
            confidence_threshold = config.confidence_threshold,
            iou_threshold = config.iou_threshold,
            "✅ Detection model loaded (CPU)"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            config,
        })
    }

    pub fn config(&self) -> &YoloConfig {
        &self.config
    }

    /// Run the session on a preprocessed `[1, 3, S, S]` tensor
    fn run_inference(&self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?
            .to_owned();

        Ok(output)
    }
}

impl ObjectDetector for YoloDetectionModel {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectionError> {
        let (orig_w, orig_h) = image.dimensions();
        let (input, geometry) = letterbox(image, self.config.input_size);

        let output = self
            .run_inference(input)
            .map_err(|e| DetectionError::Inference(format!("{:#}", e)))?;

        debug!("Detection output shape: {:?}", output.shape());

        let candidates = decode_predictions(
            output.view(),
            &geometry,
            orig_w,
            orig_h,
            self.config.confidence_threshold,
        )?;

        Ok(non_max_suppression(
            candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        ))
    }

    fn name(&self) -> &str {
        "yolov8"
    }
}
