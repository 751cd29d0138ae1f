// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;

mod adapters;
mod app;
mod config;
mod logging;

fn log_config_report(report: &config::ConfigReport) {
    match (&report.config_path, report.config_path_source) {
        (Some(path), Some(source)) => {
            tracing::info!(
                "config path: {} (source={}, present={})",
                path.display(),
                source.as_str(),
                report.config_file_present
            );
        }
        (Some(path), None) => {
            tracing::info!(
                "config path: {} (present={})",
                path.display(),
                report.config_file_present
            );
        }
        (None, _) => {
            tracing::info!("config path: (none)");
        }
    }
    tracing::info!(
        "config api_uri: {} (source={})",
        report.api_uri.value,
        report.api_uri.source.as_str()
    );
    tracing::info!(
        "config port: {} (source={})",
        report.port.value,
        report.port.source.as_str()
    );
    tracing::info!(
        "config upload_dir: {} (source={})",
        report.upload_dir.value.display(),
        report.upload_dir.source.as_str()
    );
    tracing::info!(
        "config max_upload_bytes: {} (source={})",
        report.max_upload_bytes.value,
        report.max_upload_bytes.source.as_str()
    );
    tracing::info!(
        "config verbose: {} (source={})",
        report.verbose.value,
        report.verbose.source.as_str()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = adapters::cli::parse_opts();
    let opts = parsed.opts;
    let config::LoadResult { config, report } = config::load_with_report(
        opts.config,
        config::Overrides {
            api_uri: opts.api_uri,
            port: opts.port,
            upload_dir: opts.upload_dir,
            max_upload_bytes: opts.max_upload_bytes,
            verbose: parsed.verbose_override,
        },
    )?;
    logging::init(config.verbose);
    log_config_report(&report);
    config::ensure_upload_dir(&config.upload_dir)?;
    let max_upload_bytes =
        usize::try_from(config.max_upload_bytes).context("max_upload_bytes is too large")?;

    let compute = Arc::new(
        adapters::compute::HttpComputeService::new(&config.api_uri)
            .context("failed to create compute service client")?,
    );
    let staged_files = adapters::fs::LocalStagedFiles::new(&config.upload_dir);
    let telemetry = Arc::new(adapters::telemetry::TracingTelemetry::new());
    let usecases =
        app::usecases::UseCases::new(compute, Arc::new(staged_files.clone()), telemetry);

    let server_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.port));
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("failed to bind {server_addr}"))?;
    let state = adapters::http::HttpState::new(usecases, staged_files, max_upload_bytes);
    adapters::http::serve(listener, state).await
}
