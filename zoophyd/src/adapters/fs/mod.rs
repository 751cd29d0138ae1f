// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::app::errors::{AppError, AppErrorKind, AppResult, codes};
use crate::app::ports::StagedFilePort;

/// Staged uploads kept as plain files under one directory.
#[derive(Clone, Debug)]
pub struct LocalStagedFiles {
    dir: PathBuf,
}

impl LocalStagedFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Fresh, collision-free path for a new upload.
    fn allocate(&self) -> PathBuf {
        self.dir.join(uuid::Uuid::new_v4().to_string())
    }

    #[tracing::instrument(name = "fs", level = "debug", skip(self, contents), fields(op = "stage", bytes = contents.len()))]
    pub async fn stage(&self, contents: &[u8]) -> AppResult<PathBuf> {
        let path = self.allocate();
        tokio::fs::write(&path, contents)
            .await
            .map_err(|err| local_error("write", &path, err))?;
        Ok(path)
    }
}

fn local_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::with_message(
        AppErrorKind::Internal,
        codes::LOCAL_ERROR,
        format!("failed to {action} staged file: {err}"),
    )
    .with_context(path.display().to_string())
}

#[async_trait]
impl StagedFilePort for LocalStagedFiles {
    #[tracing::instrument(name = "fs", level = "debug", skip(self, path), fields(op = "read", path = %path.display()))]
    async fn read(&self, path: &Path) -> AppResult<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|err| local_error("read", path, err))
    }

    #[tracing::instrument(name = "fs", level = "debug", skip(self, path), fields(op = "remove", path = %path.display()))]
    async fn remove(&self, path: &Path) -> AppResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|err| local_error("delete", path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_and_removes_staged_file() {
        let dir = TempDir::new().unwrap();
        let staged = LocalStagedFiles::new(dir.path());
        let path = staged.allocate();
        assert_eq!(path.parent(), Some(dir.path()));
        tokio::fs::write(&path, "State\tPop\n").await.unwrap();

        assert_eq!(staged.read(&path).await.unwrap(), b"State\tPop\n");
        staged.remove(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn staged_contents_land_in_the_staging_dir() {
        let dir = TempDir::new().unwrap();
        let staged = LocalStagedFiles::new(dir.path());
        let path = staged.stage(b"State\tPop\nAfar\t3\n").await.unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(
            staged.read(&path).await.unwrap(),
            b"State\tPop\nAfar\t3\n"
        );
    }

    #[tokio::test]
    async fn staging_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let staged = LocalStagedFiles::new(dir.path().join("absent"));
        let err = staged.stage(b"x").await.unwrap_err();
        assert_eq!(err.code(), codes::LOCAL_ERROR);
        assert!(err.message().starts_with("failed to write staged file"));
    }

    #[test]
    fn allocated_paths_are_unique() {
        let staged = LocalStagedFiles::new("/tmp/zoophy");
        assert_ne!(staged.allocate(), staged.allocate());
    }

    #[tokio::test]
    async fn missing_file_maps_to_local_error_with_path() {
        let dir = TempDir::new().unwrap();
        let staged = LocalStagedFiles::new(dir.path());
        let path = dir.path().join("gone");

        let err = staged.remove(&path).await.unwrap_err();
        assert_eq!(err.kind(), AppErrorKind::Internal);
        assert_eq!(err.code(), codes::LOCAL_ERROR);
        assert_eq!(err.context(), Some(path.display().to_string().as_str()));

        let err = staged.read(&path).await.unwrap_err();
        assert!(err.message().starts_with("failed to read staged file"));
    }
}
