// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod version;
pub mod vision;

pub use api::{create_router, start_server, ApiError, AppState};
pub use config::{Args, ServerConfig};
pub use vision::{
    Detection, ObjectDetector, PeopleCount, PeopleCounter, YoloConfig, YoloDetectionModel,
};
