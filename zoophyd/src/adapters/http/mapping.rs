// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! Uniform `{status, message|error, ...}` response bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::app::errors::{AppErrorKind, AppResult};
use crate::app::types::{DispatchOutcome, PredictorMap};
use crate::app::usecases::SubmitOutcome;

pub const JOB_FAILED: &str = "Failed to start ZooPhy Job";
pub const PREDICTORS_FAILED: &str = "Failed to set Predictors";
pub const MALFORMED_JOB: &str = "Malformed Job Request";
pub const VALIDATION_UNREACHABLE: &str = "Failed to reach ZooPhy API during Validation";
pub const START_FAILED: &str = "Unknown ZooPhy API Error during Start";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_removed: Option<Vec<Value>>,
}

impl JobResponse {
    pub fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: None,
            error: Some(error.into()),
            job_size: None,
            records_removed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictors: Option<PredictorMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictorResponse {
    pub fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            predictors: None,
            error: Some(error.into()),
        }
    }
}

fn with_status<T: Serialize>(status: u16, body: T) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

impl IntoResponse for JobResponse {
    fn into_response(self) -> Response {
        with_status(self.status, self)
    }
}

impl IntoResponse for PredictorResponse {
    fn into_response(self) -> Response {
        with_status(self.status, self)
    }
}

pub fn submit_outcome_to_response(outcome: SubmitOutcome) -> JobResponse {
    match outcome {
        SubmitOutcome::Invalid(report) => JobResponse::error(StatusCode::BAD_REQUEST, report.render()),
        SubmitOutcome::Dispatched(DispatchOutcome::RemoteRejected { message }) => {
            JobResponse::error(StatusCode::OK, message)
        }
        SubmitOutcome::Dispatched(DispatchOutcome::TransportError) => {
            JobResponse::error(StatusCode::INTERNAL_SERVER_ERROR, VALIDATION_UNREACHABLE)
        }
        SubmitOutcome::Dispatched(DispatchOutcome::StartFailed) => {
            JobResponse::error(StatusCode::INTERNAL_SERVER_ERROR, START_FAILED)
        }
        SubmitOutcome::Dispatched(DispatchOutcome::Started {
            message,
            job_size,
            records_removed,
        }) => JobResponse {
            status: StatusCode::ACCEPTED.as_u16(),
            message: Some(message),
            error: None,
            job_size: Some(job_size),
            records_removed: Some(records_removed),
        },
    }
}

pub fn predictors_result_to_response(result: AppResult<PredictorMap>) -> PredictorResponse {
    match result {
        Ok(predictors) => PredictorResponse {
            status: StatusCode::OK.as_u16(),
            predictors: Some(predictors),
            error: None,
        },
        Err(err) if err.kind() == AppErrorKind::InvalidArgument => {
            PredictorResponse::error(StatusCode::BAD_REQUEST, err.message())
        }
        Err(err) => {
            tracing::error!("failed to set predictors: {err}");
            PredictorResponse::error(StatusCode::INTERNAL_SERVER_ERROR, PREDICTORS_FAILED)
        }
    }
}
