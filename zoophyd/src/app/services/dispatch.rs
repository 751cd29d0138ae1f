// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! Two-phase submission against the remote compute service: validate, then run.

use crate::app::ports::ComputeServicePort;
use crate::app::types::{
    DispatchOutcome, JobRequest, RemoteValidation, RemoteVerdict, ValidateReply,
};

pub const VALIDATION_UNKNOWN_ERROR: &str = "Unknown ZooPhy API Error during Validation";

const VALIDATE_OK: u16 = 200;
const RUN_ACCEPTED: u16 = 202;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchStage {
    ValidatingRemote,
    Running,
}

impl DispatchStage {
    fn as_str(self) -> &'static str {
        match self {
            DispatchStage::ValidatingRemote => "validating_remote",
            DispatchStage::Running => "running",
        }
    }
}

/// Result of the validate phase that allows the run phase to proceed.
#[derive(Debug)]
struct Accepted {
    job_size: usize,
    records_removed: Vec<serde_json::Value>,
}

/// Sends `job` through validate and run. Never retries and never compensates
/// a run failure after a successful validation.
pub async fn dispatch(compute: &dyn ComputeServicePort, job: &JobRequest) -> DispatchOutcome {
    enter(DispatchStage::ValidatingRemote);
    let reply = match compute.validate(job).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!("failed to reach compute service during validation: {err}");
            return DispatchOutcome::TransportError;
        }
    };
    let accepted = match accept(reply) {
        Ok(accepted) => accepted,
        Err(message) => {
            tracing::info!("compute service rejected job: {message}");
            return DispatchOutcome::RemoteRejected { message };
        }
    };
    if !accepted.records_removed.is_empty() {
        tracing::warn!(
            removed = accepted.records_removed.len(),
            "compute service removed records: {}",
            serde_json::Value::Array(accepted.records_removed.clone())
        );
    }

    enter(DispatchStage::Running);
    match compute.run(job).await {
        Ok(reply) if reply.status == RUN_ACCEPTED => DispatchOutcome::Started {
            message: reply.body,
            job_size: accepted.job_size,
            records_removed: accepted.records_removed,
        },
        Ok(reply) => {
            tracing::error!(
                status = reply.status,
                "compute service did not start job: {}",
                reply.body
            );
            DispatchOutcome::StartFailed
        }
        Err(err) => {
            tracing::error!("failed to reach compute service during start: {err}");
            DispatchOutcome::StartFailed
        }
    }
}

fn enter(stage: DispatchStage) {
    tracing::debug!(stage = stage.as_str(), "dispatch stage");
}

fn accept(reply: ValidateReply) -> Result<Accepted, String> {
    let Some(validation) = reply.validation else {
        tracing::warn!(
            status = reply.status,
            "compute service returned an unreadable validation reply"
        );
        return Err(VALIDATION_UNKNOWN_ERROR.to_string());
    };
    match validation.verdict() {
        RemoteVerdict::Rejected(message) if message.is_empty() => {
            Err(VALIDATION_UNKNOWN_ERROR.to_string())
        }
        RemoteVerdict::Rejected(message) => Err(message),
        RemoteVerdict::Unspecified => {
            tracing::warn!(
                status = reply.status,
                "compute service validation reply has no error field"
            );
            Err(VALIDATION_UNKNOWN_ERROR.to_string())
        }
        RemoteVerdict::Passed if reply.status != VALIDATE_OK => {
            tracing::warn!(
                status = reply.status,
                "compute service validation failed without an error message"
            );
            Err(VALIDATION_UNKNOWN_ERROR.to_string())
        }
        RemoteVerdict::Passed => {
            let RemoteValidation {
                accessions_used,
                accessions_removed,
                ..
            } = validation;
            Ok(Accepted {
                job_size: accessions_used.len(),
                records_removed: accessions_removed,
            })
        }
    }
}
