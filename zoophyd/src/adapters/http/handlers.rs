// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use axum::Json;
use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::adapters::http::mapping::{
    self, JOB_FAILED, JobResponse, MALFORMED_JOB, PREDICTORS_FAILED, PredictorResponse,
};
use crate::adapters::http::{HttpState, PREDICTOR_FILE_FIELD};
use crate::app::errors::{AppError, AppResult};
use crate::app::ports::StagedFilePort;
use crate::app::types::StagedUpload;
use crate::app::usecases::INVALID_PREDICTOR_FILE;

#[tracing::instrument(name = "http", skip_all, fields(route = "/job/run"))]
pub async fn run_job(
    State(state): State<HttpState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> JobResponse {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("rejected job request body: {rejection}");
            return JobResponse::error(StatusCode::BAD_REQUEST, MALFORMED_JOB);
        }
    };

    let usecases = state.usecases.clone();
    match tokio::spawn(async move { usecases.submit_job(&body).await }).await {
        Ok(outcome) => mapping::submit_outcome_to_response(outcome),
        Err(err) => {
            tracing::error!("{JOB_FAILED}: {err}");
            JobResponse::error(StatusCode::INTERNAL_SERVER_ERROR, JOB_FAILED)
        }
    }
}

#[tracing::instrument(name = "http", skip_all, fields(route = "/job/predictors"))]
pub async fn upload_predictors(
    State(state): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> PredictorResponse {
    let upload = match multipart {
        Ok(multipart) => match stage_predictor_file(&state, multipart).await {
            Ok(upload) => upload,
            Err(err) => return mapping::predictors_result_to_response(Err(err)),
        },
        Err(rejection) => {
            tracing::info!("predictor upload is not multipart: {rejection}");
            None
        }
    };

    let staged_path = upload.as_ref().map(|upload| upload.path.clone());
    let usecases = state.usecases.clone();
    match tokio::spawn(async move { usecases.upload_predictors(upload).await }).await {
        Ok(result) => mapping::predictors_result_to_response(result),
        Err(err) => {
            tracing::error!("{PREDICTORS_FAILED}: {err}");
            if let Some(path) = staged_path {
                if let Err(err) = state.uploads.files.remove(&path).await {
                    tracing::warn!("failed to delete staged predictor file: {err}");
                }
            }
            PredictorResponse::error(StatusCode::INTERNAL_SERVER_ERROR, PREDICTORS_FAILED)
        }
    }
}

/// Stages the first `predictorsBatchFile` part. Other parts are skipped.
async fn stage_predictor_file(
    state: &HttpState,
    mut multipart: Multipart,
) -> AppResult<Option<StagedUpload>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::info!("unreadable multipart body: {err}");
                return Err(AppError::invalid(INVALID_PREDICTOR_FILE));
            }
        };
        if field.name() != Some(PREDICTOR_FILE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let media_type = field.content_type().map(str::to_string);
        let contents = read_limited(field, state.uploads.max_bytes).await?;
        let path = state.uploads.files.stage(&contents).await?;
        tracing::info!(
            name = %original_name,
            bytes = contents.len(),
            path = %path.display(),
            "staged predictor file"
        );
        return Ok(Some(StagedUpload {
            path,
            original_name,
            media_type,
        }));
    }
}

async fn read_limited(mut field: Field<'_>, max_bytes: usize) -> AppResult<Vec<u8>> {
    let mut contents = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if contents.len() + chunk.len() > max_bytes {
                    tracing::info!(max_bytes, "predictor file exceeds upload limit");
                    return Err(AppError::invalid(INVALID_PREDICTOR_FILE));
                }
                contents.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(contents),
            Err(err) => {
                tracing::info!("failed to read predictor file: {err}");
                return Err(AppError::invalid(INVALID_PREDICTOR_FILE));
            }
        }
    }
}
