// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

/// Where a record's sequence comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSource {
    /// Referenced by accession id; the remote service fetches the sequence.
    Genbank,
    /// Sequence and metadata are supplied inline.
    Fasta,
}

impl ResourceSource {
    /// Wire code understood by the compute service.
    pub fn code(self) -> &'static str {
        match self {
            ResourceSource::Genbank => "1",
            ResourceSource::Fasta => "2",
        }
    }

    /// Accepts the numeric code either as a JSON number or a numeric string.
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = match value {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if code == 1.0 {
            Some(ResourceSource::Genbank)
        } else if code == 2.0 {
            Some(ResourceSource::Fasta)
        } else {
            None
        }
    }
}

impl Serialize for ResourceSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Canonical record shape sent to the compute service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub collection_date: Option<String>,
    #[serde(rename = "geonameID")]
    pub geoname_id: Option<String>,
    pub raw_sequence: Option<String>,
    pub resource_source: ResourceSource,
}

impl Record {
    pub fn genbank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection_date: None,
            geoname_id: None,
            raw_sequence: None,
            resource_source: ResourceSource::Genbank,
        }
    }

    pub fn fasta(
        id: impl Into<String>,
        collection_date: impl Into<String>,
        geoname_id: impl Into<String>,
        raw_sequence: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            collection_date: Some(collection_date.into()),
            geoname_id: Some(geoname_id.into()),
            raw_sequence: Some(raw_sequence.into()),
            resource_source: ResourceSource::Fasta,
        }
    }
}

/// One predictor measurement for one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorEntry {
    pub state: String,
    pub name: String,
    pub value: f64,
    /// Reserved; always null in the current protocol.
    pub year: Option<i32>,
}

impl PredictorEntry {
    pub fn new(state: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            state: state.into(),
            name: name.into(),
            value,
            year: None,
        }
    }
}

/// State name -> predictors measured for that state, in the order the states
/// were first seen.
pub type PredictorMap = IndexMap<String, Vec<PredictorEntry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubstitutionModel {
    #[serde(rename = "HKY")]
    Hky,
    #[serde(rename = "GTR")]
    Gtr,
}

impl FromStr for SubstitutionModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HKY" => Ok(SubstitutionModel::Hky),
            "GTR" => Ok(SubstitutionModel::Gtr),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClockModel {
    Strict,
    Relaxed,
}

impl FromStr for ClockModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Strict" => Ok(ClockModel::Strict),
            "Relaxed" => Ok(ClockModel::Relaxed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TreePrior {
    Constant,
    Skyline,
    Skygrid,
}

impl FromStr for TreePrior {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Constant" => Ok(TreePrior::Constant),
            "Skyline" => Ok(TreePrior::Skyline),
            "Skygrid" => Ok(TreePrior::Skygrid),
            _ => Err(()),
        }
    }
}

/// BEAST model options; every field is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlOptions {
    pub substitution_model: SubstitutionModel,
    pub gamma: bool,
    pub invariant_sites: bool,
    pub clock_model: ClockModel,
    pub tree_prior: TreePrior,
    pub chain_length: Number,
    pub sub_sample_rate: Number,
}

/// Fully validated job, serialized verbatim for both remote calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub records: Vec<Record>,
    pub reply_email: String,
    pub job_name: Option<String>,
    #[serde(rename = "useGLM")]
    pub use_glm: bool,
    pub predictors: Option<PredictorMap>,
    pub xml_options: XmlOptions,
}

/// Body of the compute service's validate reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteValidation {
    /// `None` when the key is absent; `Some(Value::Null)` for an explicit null.
    #[serde(default, deserialize_with = "present")]
    pub error: Option<Value>,
    #[serde(default)]
    pub accessions_used: Vec<Value>,
    #[serde(default)]
    pub accessions_removed: Vec<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// How the compute service answered the `error` slot of a validate reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVerdict {
    /// `"error": null`.
    Passed,
    Rejected(String),
    /// No `error` key at all.
    Unspecified,
}

impl RemoteValidation {
    pub fn verdict(&self) -> RemoteVerdict {
        match &self.error {
            None => RemoteVerdict::Unspecified,
            Some(Value::Null) => RemoteVerdict::Passed,
            Some(Value::String(message)) => RemoteVerdict::Rejected(message.clone()),
            Some(other) => RemoteVerdict::Rejected(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidateReply {
    pub status: u16,
    /// `None` when the body was not a validation document.
    pub validation: Option<RemoteValidation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReply {
    pub status: u16,
    pub body: String,
}

/// Terminal state of a dispatch attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Started {
        message: String,
        job_size: usize,
        records_removed: Vec<Value>,
    },
    RemoteRejected {
        message: String,
    },
    StartFailed,
    TransportError,
}

/// Predictor file already staged by the upload transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub original_name: String,
    pub media_type: Option<String>,
}
