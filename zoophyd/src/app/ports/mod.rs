// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod compute;
pub mod staged_files;
pub mod telemetry;

pub use compute::ComputeServicePort;
pub use staged_files::StagedFilePort;
#[allow(unused_imports)]
pub use telemetry::{NoopTelemetry, TelemetryEvent, TelemetryPort};
