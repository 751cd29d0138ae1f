// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use thiserror::Error as ThisError;

use crate::app::errors::{AppError, AppErrorKind, codes};

#[derive(Debug, ThisError)]
pub enum ComputeClientError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{capability} request failed: {source}")]
    Transport {
        capability: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {capability} response body: {source}")]
    Body {
        capability: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl From<ComputeClientError> for AppError {
    fn from(err: ComputeClientError) -> Self {
        AppError::with_message(
            AppErrorKind::Unavailable,
            codes::NETWORK_ERROR,
            err.to_string(),
        )
    }
}
