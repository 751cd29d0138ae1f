// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tokio::net::TcpListener;

use crate::adapters::fs::LocalStagedFiles;
use crate::app::usecases::UseCases;

mod handlers;
pub mod mapping;

pub const PREDICTOR_FILE_FIELD: &str = "predictorsBatchFile";

/// Job bodies may carry up to 1000 inline sequences.
const JOB_BODY_LIMIT: usize = 32 * 1024 * 1024;
/// Room for multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

#[derive(Clone)]
pub struct HttpState {
    pub(crate) usecases: UseCases,
    pub(crate) uploads: Arc<UploadStaging>,
}

pub struct UploadStaging {
    pub files: LocalStagedFiles,
    pub max_bytes: usize,
}

impl HttpState {
    pub fn new(usecases: UseCases, files: LocalStagedFiles, max_bytes: usize) -> Self {
        Self {
            usecases,
            uploads: Arc::new(UploadStaging { files, max_bytes }),
        }
    }
}

pub fn router(state: HttpState) -> Router {
    let upload_limit = state.uploads.max_bytes.saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route(
            "/job/run",
            post(handlers::run_job).layer(DefaultBodyLimit::max(JOB_BODY_LIMIT)),
        )
        .route(
            "/job/predictors",
            post(handlers::upload_predictors).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: HttpState) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("failed to read listener address")?;
    tracing::info!(addr = %addr, "server listening");
    axum::serve(listener, router(state))
        .await
        .context("http server error")
}
