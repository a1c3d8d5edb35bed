// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the people counter service

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-people-counter-2025-10-20";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-20";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "analyze-endpoint",
    "yolov8-onnx",
    "letterbox-preprocessing",
    "class-aware-nms",
    "permissive-cors",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("People Counter {} ({})", VERSION_NUMBER, BUILD_DATE)
}
