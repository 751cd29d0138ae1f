// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::sync::Arc;

use serde_json::Value;

use crate::app::errors::{AppError, AppResult};
use crate::app::ports::{ComputeServicePort, StagedFilePort, TelemetryEvent, TelemetryPort};
use crate::app::services::report::ValidationReport;
use crate::app::services::{composer, dispatch, predictors};
use crate::app::types::{DispatchOutcome, PredictorMap, StagedUpload};

pub const MISSING_PREDICTOR_FILE: &str = "Missing Predictor File";
pub const INVALID_PREDICTOR_FILE: &str = "Invalid Predictor File";

#[derive(Clone)]
pub struct UseCases {
    pub(crate) compute: Arc<dyn ComputeServicePort>,
    pub(crate) staged_files: Arc<dyn StagedFilePort>,
    pub(crate) telemetry: Arc<dyn TelemetryPort>,
}

/// What happened to a job submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Rejected by local checks; nothing was sent to the compute service.
    Invalid(ValidationReport),
    Dispatched(DispatchOutcome),
}

impl UseCases {
    pub fn new(
        compute: Arc<dyn ComputeServicePort>,
        staged_files: Arc<dyn StagedFilePort>,
        telemetry: Arc<dyn TelemetryPort>,
    ) -> Self {
        Self {
            compute,
            staged_files,
            telemetry,
        }
    }

    pub async fn submit_job(&self, body: &Value) -> SubmitOutcome {
        let job = match composer::compose_job(body) {
            Ok(job) => job,
            Err(report) => {
                for issue in report.issues() {
                    tracing::info!(
                        field = issue.field(),
                        code = issue.code(),
                        "job parameter rejected: {issue}"
                    );
                }
                self.telemetry.event(
                    "job.rejected",
                    TelemetryEvent {
                        job_name: body
                            .get("jobName")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        reason: Some(report.render()),
                        ..TelemetryEvent::default()
                    },
                );
                return SubmitOutcome::Invalid(report);
            }
        };
        tracing::info!(
            records = job.records.len(),
            use_glm = job.use_glm,
            "submitting job to compute service"
        );

        let outcome = dispatch::dispatch(self.compute.as_ref(), &job).await;
        let mut fields = TelemetryEvent {
            job_name: job.job_name.clone(),
            records: Some(job.records.len()),
            states: job.predictors.as_ref().map(|predictors| predictors.len()),
            ..TelemetryEvent::default()
        };
        let name = match &outcome {
            DispatchOutcome::Started {
                job_size,
                records_removed,
                ..
            } => {
                fields.records = Some(*job_size);
                fields.records_removed = Some(records_removed.len());
                "job.started"
            }
            DispatchOutcome::RemoteRejected { message } => {
                fields.reason = Some(message.clone());
                "job.remote_rejected"
            }
            DispatchOutcome::StartFailed => "job.start_failed",
            DispatchOutcome::TransportError => "job.unreachable",
        };
        self.telemetry.event(name, fields);
        SubmitOutcome::Dispatched(outcome)
    }

    /// Parses a staged predictor matrix. The staged file is removed on every
    /// path; a failed removal is logged and does not change the result.
    pub async fn upload_predictors(&self, upload: Option<StagedUpload>) -> AppResult<PredictorMap> {
        let Some(upload) = upload else {
            tracing::info!("predictor upload without a file");
            return Err(AppError::invalid(MISSING_PREDICTOR_FILE));
        };
        let result = self.parse_staged(&upload).await;
        if let Err(err) = self.staged_files.remove(&upload.path).await {
            tracing::warn!("failed to delete staged predictor file: {err}");
        }

        match &result {
            Ok(parsed) => self.telemetry.event(
                "predictors.parsed",
                TelemetryEvent {
                    states: Some(parsed.len()),
                    ..TelemetryEvent::default()
                },
            ),
            Err(err) => self.telemetry.event(
                "predictors.rejected",
                TelemetryEvent {
                    reason: Some(err.message().to_string()),
                    ..TelemetryEvent::default()
                },
            ),
        }
        result
    }

    async fn parse_staged(&self, upload: &StagedUpload) -> AppResult<PredictorMap> {
        if !predictors::is_predictor_file(upload.media_type.as_deref(), &upload.original_name) {
            tracing::info!(
                name = %upload.original_name,
                media_type = upload.media_type.as_deref(),
                "rejected predictor file"
            );
            return Err(AppError::invalid(INVALID_PREDICTOR_FILE));
        }
        let bytes = self.staged_files.read(&upload.path).await?;
        let text = String::from_utf8_lossy(&bytes);
        predictors::parse_predictor_matrix(&text).map_err(|err| {
            tracing::info!(name = %upload.original_name, "predictor file rejected: {err}");
            AppError::invalid(err.to_string())
        })
    }
}
