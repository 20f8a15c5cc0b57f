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

pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::routes::AppState;

/// Room for multipart boundaries and the text fields around the file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let body_limit = config
        .pipeline
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let static_dir = config.server.static_dir.clone();

    let mut app = Router::new()
        .route("/upload", post(routes::upload_handler))
        .route("/health", get(routes::health_handler))
        .route("/strategies", get(routes::strategies_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState { config });

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
