// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fmt;

pub const REPORT_PREFIX: &str = "INVALID JOB PARAMETER(S): ";

/// A single local validation failure, in the order it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingRecords,
    RecordCount(usize),
    InvalidRecord(String),
    MissingReplyEmail,
    InvalidEmail(String),
    InvalidJobName(String),
    InvalidPredictors,
    MissingXmlOptions,
    InvalidXmlOption(&'static str),
}

impl ValidationIssue {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationIssue::MissingRecords
            | ValidationIssue::RecordCount(_)
            | ValidationIssue::InvalidRecord(_) => "records",
            ValidationIssue::MissingReplyEmail | ValidationIssue::InvalidEmail(_) => "replyEmail",
            ValidationIssue::InvalidJobName(_) => "jobName",
            ValidationIssue::InvalidPredictors => "predictors",
            ValidationIssue::MissingXmlOptions => "xmlOptions",
            ValidationIssue::InvalidXmlOption(field) => field,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::MissingRecords
            | ValidationIssue::MissingReplyEmail
            | ValidationIssue::MissingXmlOptions => "missing",
            ValidationIssue::RecordCount(_) => "out_of_range",
            _ => "invalid",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingRecords => write!(f, "Missing Records"),
            ValidationIssue::RecordCount(count) => write!(f, "Invalid number of Records: {count}"),
            ValidationIssue::InvalidRecord(id) => write!(f, "Invalid Records: {id}"),
            ValidationIssue::MissingReplyEmail => write!(f, "Missing Reply Email"),
            ValidationIssue::InvalidEmail(email) => write!(f, "Invalid Email: {email}"),
            ValidationIssue::InvalidJobName(name) => write!(f, "Invalid Job Name: {name}"),
            ValidationIssue::InvalidPredictors => write!(f, "Invalid Custom Job Predictors"),
            ValidationIssue::MissingXmlOptions => write!(f, "Missing XML Parameters"),
            ValidationIssue::InvalidXmlOption(field) => {
                write!(f, "Invalid XML Parameters: {field}")
            }
        }
    }
}

/// Ordered list of issues; empty means the submission passed local checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Display form used in responses. All invalid record ids are listed in a
    /// single `Invalid Records:` segment placed where the first one occurred.
    pub fn render(&self) -> String {
        let mut segments: Vec<String> = Vec::with_capacity(self.issues.len());
        let mut records_segment: Option<usize> = None;
        for issue in &self.issues {
            match (issue, records_segment) {
                (ValidationIssue::InvalidRecord(id), Some(index)) => {
                    segments[index].push_str(", ");
                    segments[index].push_str(id);
                }
                (ValidationIssue::InvalidRecord(_), None) => {
                    records_segment = Some(segments.len());
                    segments.push(issue.to_string());
                }
                _ => segments.push(issue.to_string()),
            }
        }
        format!("{REPORT_PREFIX}{}", segments.join(", "))
    }
}
