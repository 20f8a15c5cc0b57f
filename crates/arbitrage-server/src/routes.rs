// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use arbitrage_core::{ArbitrageError, ResultView, analyze_upload, resolve_strategy};
use arbitrage_types::StrategyKind;

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] ArbitrageError),

    #[error("no file was uploaded")]
    MissingFile,

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("analysis failed: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(ArbitrageError::InputTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Pipeline(
                ArbitrageError::EmptyInput
                | ArbitrageError::MalformedInput { .. }
                | ArbitrageError::UnknownStrategy(_)
                | ArbitrageError::UnsupportedFileType(_),
            )
            | Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::Multipart(err) => err.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "Upload failed");
        } else {
            warn!(%status, error = %self, "Upload rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

struct UploadedFile {
    name: String,
    bytes: Bytes,
}

/// `POST /upload`: multipart `file` plus optional `strategy`
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResultView>, ApiError> {
    let mut file = None;
    let mut strategy = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                file = Some(UploadedFile {
                    name: file_name,
                    bytes,
                });
            }
            Some("strategy") => strategy = Some(field.text().await?),
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let pipeline = &state.config.pipeline;
    let kind = resolve_strategy(strategy.as_deref(), pipeline)?;
    let file = file
        .filter(|f| !f.name.trim().is_empty())
        .ok_or(ApiError::MissingFile)?;
    info!(file = %file.name, bytes = file.bytes.len(), strategy = %kind, "Upload received");

    let config = Arc::clone(&state.config);
    let view = tokio::task::spawn_blocking(move || {
        analyze_upload(&file.name, &file.bytes, Some(kind.id()), &config.pipeline)
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))??;

    info!(
        strategy = %kind,
        days = view.total_days,
        total_profit = view.total_profit,
        "Upload analyzed"
    );
    Ok(Json(view))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub default: bool,
}

/// `GET /strategies`: identifiers accepted by `/upload`
#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn strategies_handler(State(state): State<AppState>) -> Json<Vec<StrategyInfo>> {
    let default = state.config.pipeline.strategy.default_strategy;
    Json(
        StrategyKind::ALL
            .into_iter()
            .map(|kind| StrategyInfo {
                id: kind.id(),
                name: kind.display_name(),
                default: kind == default,
            })
            .collect(),
    )
}
