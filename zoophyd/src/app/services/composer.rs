// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use serde_json::Value;

use crate::app::services::predictors;
use crate::app::services::records;
use crate::app::services::report::{ValidationIssue, ValidationReport};
use crate::app::services::validators;
use crate::app::types::{JobRequest, PredictorMap, XmlOptions};

/// Builds a [`JobRequest`] from a raw submission body.
///
/// Top-level fields are checked independently and every failure is collected;
/// the `xmlOptions` object stops at its first bad field.
pub fn compose_job(body: &Value) -> Result<JobRequest, ValidationReport> {
    let mut report = ValidationReport::default();

    let records = records::normalize_records(body.get("records"), &mut report);
    let reply_email = reply_email(body.get("replyEmail"), &mut report);
    let job_name = job_name(body.get("jobName"), &mut report);
    let use_glm = body.get("useGLM") == Some(&Value::Bool(true));
    let predictors = if use_glm {
        inline_predictors(body.get("predictors"), &mut report)
    } else {
        None
    };
    let xml_options = match xml_options(body.get("xmlOptions")) {
        Ok(options) => Some(options),
        Err(issue) => {
            report.push(issue);
            None
        }
    };

    match (reply_email, xml_options) {
        (Some(reply_email), Some(xml_options)) if report.is_empty() => Ok(JobRequest {
            records,
            reply_email,
            job_name,
            use_glm,
            predictors,
            xml_options,
        }),
        _ => Err(report),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

fn reply_email(value: Option<&Value>, report: &mut ValidationReport) -> Option<String> {
    if is_blank(value) {
        report.push(ValidationIssue::MissingReplyEmail);
        return None;
    }
    let email = validators::text(value, &validators::EMAIL).map(str::to_string);
    if email.is_none() {
        report.push(ValidationIssue::InvalidEmail(validators::describe(value)));
    }
    email
}

/// Optional: only checked when a non-empty value is present.
fn job_name(value: Option<&Value>, report: &mut ValidationReport) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    let name = validators::text(value, &validators::JOB_NAME).map(str::to_string);
    if name.is_none() {
        report.push(ValidationIssue::InvalidJobName(validators::describe(value)));
    }
    name
}

fn inline_predictors(value: Option<&Value>, report: &mut ValidationReport) -> Option<PredictorMap> {
    let raw = value.filter(|raw| !raw.is_null())?;
    tracing::info!("job is using custom predictors");
    match predictors::validate_inline_predictors(raw) {
        Ok(predictors) => Some(predictors),
        Err(err) => {
            tracing::info!("rejected custom predictors: {err}");
            report.push(ValidationIssue::InvalidPredictors);
            None
        }
    }
}

fn xml_options(value: Option<&Value>) -> Result<XmlOptions, ValidationIssue> {
    let Some(options) = value.filter(|options| options.is_object()) else {
        return Err(ValidationIssue::MissingXmlOptions);
    };
    let substitution_model = validators::text(
        options.get("substitutionModel"),
        &validators::SUBSTITUTION_MODEL,
    )
    .and_then(|text| text.parse().ok())
    .ok_or(ValidationIssue::InvalidXmlOption("substitutionModel"))?;
    let gamma = validators::boolean(options.get("gamma"))
        .ok_or(ValidationIssue::InvalidXmlOption("gamma"))?;
    let invariant_sites = validators::boolean(options.get("invariantSites"))
        .ok_or(ValidationIssue::InvalidXmlOption("invariantSites"))?;
    let clock_model = validators::text(options.get("clockModel"), &validators::CLOCK_MODEL)
        .and_then(|text| text.parse().ok())
        .ok_or(ValidationIssue::InvalidXmlOption("clockModel"))?;
    let tree_prior = validators::text(options.get("treePrior"), &validators::TREE_PRIOR)
        .and_then(|text| text.parse().ok())
        .ok_or(ValidationIssue::InvalidXmlOption("treePrior"))?;
    let chain_length = validators::number(options.get("chainLength"))
        .cloned()
        .ok_or(ValidationIssue::InvalidXmlOption("chainLength"))?;
    let sub_sample_rate = validators::number(options.get("subSampleRate"))
        .cloned()
        .ok_or(ValidationIssue::InvalidXmlOption("subSampleRate"))?;

    Ok(XmlOptions {
        substitution_model,
        gamma,
        invariant_sites,
        clock_model,
        tree_prior,
        chain_length,
        sub_sample_rate,
    })
}
