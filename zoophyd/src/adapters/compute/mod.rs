// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! Outbound client for the ZooPhy compute API.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::app::errors::AppResult;
use crate::app::ports::ComputeServicePort;
use crate::app::types::{JobRequest, RemoteValidation, RunReply, ValidateReply};

mod error;

pub use error::ComputeClientError;

const VALIDATE: &str = "validate";
const RUN: &str = "run";

#[derive(Clone, Debug)]
pub struct HttpComputeService {
    client: Client,
    base_url: String,
}

impl HttpComputeService {
    pub fn new(api_uri: &Url) -> Result<Self, ComputeClientError> {
        let client = Client::builder()
            .user_agent(concat!("zoophyd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ComputeClientError::Client)?;
        Ok(Self {
            client,
            base_url: api_uri.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, capability: &str) -> String {
        format!("{}/{capability}", self.base_url)
    }

    /// Posts the job and returns the status with the raw body text.
    async fn post_job(
        &self,
        capability: &'static str,
        job: &JobRequest,
    ) -> Result<(u16, String), ComputeClientError> {
        let response = self
            .client
            .post(self.endpoint(capability))
            .json(job)
            .send()
            .await
            .map_err(|source| ComputeClientError::Transport { capability, source })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| ComputeClientError::Body { capability, source })?;
        tracing::debug!(capability, status, "compute service replied");
        Ok((status, body))
    }
}

#[async_trait]
impl ComputeServicePort for HttpComputeService {
    #[tracing::instrument(name = "compute", level = "debug", skip(self, job), fields(op = "validate", records = job.records.len()))]
    async fn validate(&self, job: &JobRequest) -> AppResult<ValidateReply> {
        let (status, body) = self.post_job(VALIDATE, job).await?;
        let validation = match serde_json::from_str::<RemoteValidation>(&body) {
            Ok(validation) => Some(validation),
            Err(err) => {
                tracing::warn!(status, "unreadable validation reply: {err}");
                None
            }
        };
        Ok(ValidateReply { status, validation })
    }

    #[tracing::instrument(name = "compute", level = "debug", skip(self, job), fields(op = "run", records = job.records.len()))]
    async fn run(&self, job: &JobRequest) -> AppResult<RunReply> {
        let (status, body) = self.post_job(RUN, job).await?;
        Ok(RunReply { status, body })
    }
}
