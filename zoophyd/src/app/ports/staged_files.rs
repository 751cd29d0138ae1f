// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::Path;

use async_trait::async_trait;

use crate::app::errors::AppResult;

#[async_trait]
/// Temporary storage holding uploaded files until they are processed.
pub trait StagedFilePort: Send + Sync {
    async fn read(&self, path: &Path) -> AppResult<Vec<u8>>;
    async fn remove(&self, path: &Path) -> AppResult<()>;
}
