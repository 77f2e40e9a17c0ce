//! HTTPサーバー
//!
//! - `POST /api/process-excel` シート抽出と統合
//! - `GET /health` 死活確認

pub mod error;
pub mod handlers;

use crate::config::Config;
use crate::error::{CombinerError, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sheet_combiner_common::Capabilities;
use std::net::SocketAddr;

pub use error::ApiError;

/// ハンドラ間で共有する状態
#[derive(Debug, Clone)]
pub struct AppState {
    pub default_pattern: String,
    pub capabilities: Capabilities,
    pub parse_jobs: usize,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_pattern: config.default_pattern.clone(),
            capabilities: config.capabilities(),
            parse_jobs: config.parse_jobs.max(1),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/process-excel", post(handlers::process_excel))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// 設定のアドレスで待ち受け、Ctrl+Cで停止する
pub async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| CombinerError::Config(format!("待ち受けアドレスが不正です: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(AppState::from_config(config));

    tracing::info!(
        %addr,
        combined_mode = config.combined_mode_enabled,
        max_upload_mb = config.max_upload_mb,
        "server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CombinerError::Server(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutdown signal received");
}
