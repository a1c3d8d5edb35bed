// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze response types

use serde::{Deserialize, Serialize};

/// Response for a successful analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Number of detected people
    pub people_count: usize,
}

impl AnalyzeResponse {
    pub fn new(people_count: usize) -> Self {
        Self { people_count }
    }
}
