// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod errors;
pub mod http_server;

pub use analyze::{analyze_handler, AnalyzeResponse, FILE_FIELD};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState};
