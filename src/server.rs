// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::{error, info};

use crate::api::{self, AppState};
use crate::catalog::{CatalogService, JsonFileCatalog};
use crate::config::Config;
use crate::media::MediaStore;

/// Prepare storage and build the application router for `config`
///
/// Creates the data and media directories and an empty catalog document
/// when they are missing.
pub async fn build(config: Config) -> Result<Router> {
    let storage = &config.storage;

    let media = MediaStore::open(&storage.uploads_dir, storage.max_file_bytes)
        .await
        .context("Failed to prepare media storage")?;

    let catalog = JsonFileCatalog::in_dir(&storage.data_dir);
    catalog
        .ensure_exists()
        .await
        .context("Failed to prepare catalog")?;
    info!("Catalog at {}", catalog.path().display());

    let service = CatalogService::new(Arc::new(catalog), media)
        .with_corrupt_policy(storage.on_corrupt);

    Ok(api::router(AppState::new(service, config)))
}

/// Resolves once SIGINT or SIGTERM is received
pub async fn shutdown_signal() {
    let name = wait_for_signal().await;
    info!("Received {}, shutting down", name);
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut terminate, mut interrupt) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(terminate), Ok(interrupt)) => (terminate, interrupt),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
                return ctrl_c().await;
            }
        };

    tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    "CTRL_C"
}
