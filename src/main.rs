// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use people_counter::{
    api::{start_server, AppState},
    config::Args,
    version,
    vision::{PeopleCounter, YoloDetectionModel},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ort=warn")),
        )
        .init();

    let args = Args::parse();

    println!("🚀 Starting people counter...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!("🧩 Features: {}", version::FEATURES.join(", "));
    println!();

    println!("🧠 Loading detection model from {}...", args.model_path.display());
    let model = YoloDetectionModel::new(&args.model_path, args.yolo_config())
        .await
        .with_context(|| {
            format!(
                "Failed to load detection model from {}",
                args.model_path.display()
            )
        })?;
    println!("✅ Detection model loaded");

    let counter = PeopleCounter::new(Arc::new(model));
    let state = AppState::new(counter);
    let server_config = args.server_config();

    println!("\n📡 Endpoint:");
    println!("  Analyze:      POST http://{}/analyze", server_config.listen_addr);
    println!();

    tracing::info!("{}", version::get_version_string());
    start_server(state, server_config).await
}
