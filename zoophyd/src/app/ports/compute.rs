// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use async_trait::async_trait;

use crate::app::errors::AppResult;
use crate::app::types::{JobRequest, RunReply, ValidateReply};

#[async_trait]
/// Remote compute service boundary.
/// Errors mean no response was received; any HTTP reply is returned as data.
pub trait ComputeServicePort: Send + Sync {
    async fn validate(&self, job: &JobRequest) -> AppResult<ValidateReply>;
    async fn run(&self, job: &JobRequest) -> AppResult<RunReply>;
}
