// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze API endpoint module
//!
//! Provides POST /analyze for counting people in an uploaded image.

pub mod handler;
pub mod response;

pub use handler::{analyze_handler, FILE_FIELD};
pub use response::AnalyzeResponse;
