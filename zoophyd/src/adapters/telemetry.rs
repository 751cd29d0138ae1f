// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use crate::app::ports::{TelemetryEvent, TelemetryPort};

#[derive(Clone, Default)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for TracingTelemetry {
    fn event(&self, name: &'static str, fields: TelemetryEvent) {
        let TelemetryEvent {
            job_name,
            records,
            records_removed,
            states,
            reason,
        } = fields;

        tracing::info!(
            target: "zoophyd::telemetry",
            event = name,
            job_name = job_name.as_deref(),
            records = records,
            records_removed = records_removed,
            states = states,
            reason = reason.as_deref(),
        );
    }
}
