// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoint handler

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use bytes::Bytes;
use tracing::{error, info, warn};

use super::response::AnalyzeResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// Multipart field that carries the uploaded image
pub const FILE_FIELD: &str = "file";

/// POST /analyze - Count the people in an uploaded image
///
/// # Request
/// Multipart form body with a file part named `file`.
///
/// # Response
/// - `peopleCount`: number of person detections in the image
///
/// # Errors
/// - 400 Bad Request: no `file` part (`No file uploaded`), malformed
///   multipart body, or undecodable image
/// - 500 Internal Server Error: the detector failed
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    info!("📥 New analyze request received");

    let multipart = multipart.map_err(|rejection| {
        warn!("🚨 No file found in request: {}", rejection);
        ApiError::MissingInput
    })?;

    let bytes = match read_file_field(multipart).await? {
        Some(bytes) => bytes,
        None => {
            warn!("🚨 No file found in request");
            return Err(ApiError::MissingInput);
        }
    };

    let counter = state.counter.clone();
    let result = tokio::task::spawn_blocking(move || counter.count(&bytes))
        .await
        .map_err(|e| {
            error!("Analyze task failed: {}", e);
            ApiError::Internal(format!("analyze task failed: {}", e))
        })?
        .map_err(|e| {
            warn!("Analyze failed: {}", e);
            ApiError::from(e)
        })?;

    info!(
        detections = result.total_detections,
        "👥 Detected {} people", result.people
    );

    Ok(Json(AnalyzeResponse::new(result.people)))
}

/// Read the bytes of the first uploaded file named [`FILE_FIELD`]
///
/// Plain form values sharing the name are skipped; only file parts count
/// as uploads.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() == Some(FILE_FIELD) && field.file_name().is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(multipart_error)?;
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}

/// Body limit overruns surface from the multipart stream as 413
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("🚨 Upload exceeds body limit: {}", err);
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidMultipart(err.body_text())
    }
}
