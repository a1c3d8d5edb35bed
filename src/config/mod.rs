// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process configuration
//!
//! Every setting has a default, so the server starts without any flags.
//! Values can be overridden on the command line or through environment
//! variables (a `.env` file is loaded at startup when present).

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::vision::detection::{YoloConfig, DEFAULT_INPUT_SIZE, MIN_INPUT_SIZE};

/// People counter HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "people-counter")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Counts people in uploaded images with a YOLOv8 model", long_about = None)]
pub struct Args {
    /// IP address to bind the HTTP server to (IPv4 or IPv6)
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind the HTTP server to
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to the YOLOv8 ONNX model
    #[arg(long, env = "MODEL_PATH", default_value = "./models/yolov8m.onnx")]
    pub model_path: PathBuf,

    /// Square model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = DEFAULT_INPUT_SIZE)]
    pub input_size: u32,

    /// Minimum class score for a detection
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// IoU above which overlapping same-class boxes are merged
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Maximum detections kept per image
    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Reject request bodies larger than this many bytes (unlimited when unset)
    #[arg(long, env = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

impl Args {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: SocketAddr::new(self.host, self.port),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn yolo_config(&self) -> YoloConfig {
        YoloConfig {
            input_size: self.input_size.max(MIN_INPUT_SIZE),
            confidence_threshold: self.confidence_threshold.clamp(0.0, 1.0),
            iou_threshold: self.iou_threshold.clamp(0.0, 1.0),
            max_detections: self.max_detections,
            intra_threads: self.intra_threads.max(1),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_upload_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
            max_upload_bytes: None,
        }
    }
}
