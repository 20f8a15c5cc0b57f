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

use tracing::info;
use tracing_subscriber::EnvFilter;

use arbitrage_server::build_router;
use arbitrage_server::config::{DEFAULT_CONFIG_PATH, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("arbitrage_server=info,arbitrage_core=info,tower_http=info")
            }),
        )
        .init();

    let config_path = std::env::args().nth(1);
    info!(
        path = config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH),
        "Loading configuration"
    );
    let config = Arc::new(ServerConfig::load(config_path.as_deref())?);
    if let Some(dir) = &config.server.static_dir {
        info!(dir = %dir.display(), "Serving static files");
    }

    let addr = config.listen_address();
    let app = build_router(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Arbitrage server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
