// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! GLM predictor handling: tab-separated matrix uploads and predictor sets
//! supplied inline with a job.

use serde_json::Value;
use thiserror::Error;

use crate::app::services::validators;
use crate::app::types::{PredictorEntry, PredictorMap};

pub const TSV_MEDIA_TYPE: &str = "text/tab-separated-values";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictorFileError {
    #[error("Invalid Predictor name: \"{0}\"")]
    InvalidName(String),
    /// Also raised for a state cell that is not a valid state name.
    #[error("Invalid Predictor value: \"{0}\"")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InlinePredictorError {
    #[error("predictors must be an object keyed by state")]
    NotAMapping,
    #[error("invalid predictors for state \"{0}\"")]
    InvalidState(String),
}

/// Only files declared as TSV and named `*.tsv` are parsed.
pub fn is_predictor_file(media_type: Option<&str>, file_name: &str) -> bool {
    media_type == Some(TSV_MEDIA_TYPE) && validators::PREDICTOR_FILE_NAME.is_match(file_name)
}

/// Parses a predictor matrix: a header of predictor names followed by one
/// row per state. Column 0 of every line is the state column; its header
/// label is validated like any other name but never paired with a value.
pub fn parse_predictor_matrix(text: &str) -> Result<PredictorMap, PredictorFileError> {
    let mut lines = text.trim().lines();
    let header = lines.next().unwrap_or_default();
    let names: Vec<&str> = header.trim().split('\t').collect();
    if let Some(invalid) = names
        .iter()
        .find(|name| !validators::PREDICTOR_NAME.is_match(name))
    {
        return Err(PredictorFileError::InvalidName((*invalid).to_string()));
    }

    let mut predictors = PredictorMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cells = line.split('\t');
        let state = cells.next().unwrap_or_default().trim();
        if !validators::STATE.is_match(state) {
            return Err(PredictorFileError::InvalidValue(state.to_string()));
        }

        let mut entries = Vec::with_capacity(names.len().saturating_sub(1));
        for (index, cell) in cells.enumerate() {
            let invalid = || PredictorFileError::InvalidValue(cell.to_string());
            let value = validators::numeric_cell(cell).ok_or_else(invalid)?;
            let name = names.get(index + 1).ok_or_else(invalid)?;
            entries.push(PredictorEntry::new(state, *name, value));
        }
        predictors.insert(state.to_string(), entries);
    }
    Ok(predictors)
}

/// Checks a predictor set submitted inline with a job. One bad entry rejects
/// the whole set.
pub fn validate_inline_predictors(raw: &Value) -> Result<PredictorMap, InlinePredictorError> {
    let states = raw.as_object().ok_or(InlinePredictorError::NotAMapping)?;
    let mut predictors = PredictorMap::new();
    for (state, list) in states {
        let entries = inline_state_entries(state, list)
            .ok_or_else(|| InlinePredictorError::InvalidState(state.clone()))?;
        predictors.insert(state.clone(), entries);
    }
    Ok(predictors)
}

fn inline_state_entries(state: &str, list: &Value) -> Option<Vec<PredictorEntry>> {
    if !validators::STATE.is_match(state) {
        return None;
    }
    list.as_array()?
        .iter()
        .map(|entry| {
            let fields = entry.as_object().filter(|fields| fields.len() == 4)?;
            if fields.get("state").and_then(Value::as_str) != Some(state)
                || fields.get("year") != Some(&Value::Null)
            {
                return None;
            }
            let name = validators::text(fields.get("name"), &validators::PREDICTOR_NAME)?;
            let value = validators::number(fields.get("value"))?.as_f64()?;
            Some(PredictorEntry::new(state, name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_header_and_rows() {
        let parsed = parse_predictor_matrix("State\tPredA\tPredB\nOromia\t1.5\t2.0\n").unwrap();
        let mut expected = PredictorMap::new();
        expected.insert(
            "Oromia".to_string(),
            vec![
                PredictorEntry::new("Oromia", "PredA", 1.5),
                PredictorEntry::new("Oromia", "PredB", 2.0),
            ],
        );
        assert_eq!(parsed, expected);
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({
                "Oromia": [
                    {"state": "Oromia", "name": "PredA", "value": 1.5, "year": null},
                    {"state": "Oromia", "name": "PredB", "value": 2.0, "year": null},
                ]
            })
        );
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let text = "State\tPop\r\nAmhara\t10\r\n\r\nTigray\t-2.5e1\r\n";
        let parsed = parse_predictor_matrix(text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["Tigray"], vec![PredictorEntry::new("Tigray", "Pop", -25.0)]);
    }

    #[test]
    fn reports_first_invalid_name() {
        let err = parse_predictor_matrix("State\tPop;Density\tBad!\nOromia\t1\t2").unwrap_err();
        assert_eq!(err, PredictorFileError::InvalidName("Pop;Density".to_string()));
        assert_eq!(err.to_string(), "Invalid Predictor name: \"Pop;Density\"");
    }

    #[test]
    fn empty_file_reports_empty_name() {
        let err = parse_predictor_matrix("  \n ").unwrap_err();
        assert_eq!(err, PredictorFileError::InvalidName(String::new()));
    }

    #[test]
    fn reports_first_non_numeric_value() {
        let err = parse_predictor_matrix("State\tPredA\tPredB\nOromia\tabc\t2.0").unwrap_err();
        assert_eq!(err, PredictorFileError::InvalidValue("abc".to_string()));
        assert_eq!(err.to_string(), "Invalid Predictor value: \"abc\"");
    }

    #[test]
    fn invalid_state_stops_parsing() {
        let err =
            parse_predictor_matrix("State\tPredA\nOromia\t1\nBad;State\t2\nAfar\tzzz").unwrap_err();
        assert_eq!(err, PredictorFileError::InvalidValue("Bad;State".to_string()));
    }

    #[test]
    fn value_without_header_name_is_rejected() {
        let err = parse_predictor_matrix("State\tPredA\nOromia\t1\t7").unwrap_err();
        assert_eq!(err, PredictorFileError::InvalidValue("7".to_string()));
    }

    #[test]
    fn short_rows_keep_the_values_present() {
        let parsed = parse_predictor_matrix("State\tPredA\tPredB\nOromia\t1").unwrap();
        assert_eq!(parsed["Oromia"], vec![PredictorEntry::new("Oromia", "PredA", 1.0)]);
    }

    #[test]
    fn states_keep_file_order() {
        let parsed =
            parse_predictor_matrix("State\tPop\nTigray\t1\nAfar\t2\nOromia\t3\nAfar\t4").unwrap();
        let states: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(states, vec!["Tigray", "Afar", "Oromia"]);
        assert_eq!(parsed["Afar"], vec![PredictorEntry::new("Afar", "Pop", 4.0)]);

        let body = serde_json::to_string(&parsed).unwrap();
        let tigray = body.find("\"Tigray\"").unwrap();
        let afar = body.find("\"Afar\"").unwrap();
        assert!(tigray < afar, "{body}");
    }

    #[test]
    fn repeated_state_keeps_last_row() {
        let parsed = parse_predictor_matrix("State\tPredA\nOromia\t1\nOromia\t3").unwrap();
        assert_eq!(parsed["Oromia"], vec![PredictorEntry::new("Oromia", "PredA", 3.0)]);
    }

    #[test]
    fn file_gate_requires_media_type_and_name() {
        assert!(is_predictor_file(Some(TSV_MEDIA_TYPE), "predictors.tsv"));
        assert!(!is_predictor_file(Some("text/plain"), "predictors.tsv"));
        assert!(!is_predictor_file(None, "predictors.tsv"));
        assert!(!is_predictor_file(Some(TSV_MEDIA_TYPE), "predictors.csv"));
    }

    #[test]
    fn inline_predictors_are_accepted_when_every_entry_is_valid() {
        let raw = json!({
            "Oromia": [
                {"state": "Oromia", "name": "PredA", "value": 1.5, "year": null},
                {"state": "Oromia", "name": "PredB", "value": 2, "year": null},
            ],
            "Afar": [],
        });
        let parsed = validate_inline_predictors(&raw).unwrap();
        assert_eq!(parsed["Oromia"].len(), 2);
        assert_eq!(parsed["Oromia"][1], PredictorEntry::new("Oromia", "PredB", 2.0));
        assert!(parsed["Afar"].is_empty());
    }

    #[test]
    fn inline_predictors_keep_submission_order() {
        let raw: Value = serde_json::from_str(
            r#"{"Tigray": [], "Afar": [], "Oromia": []}"#,
        )
        .unwrap();
        let parsed = validate_inline_predictors(&raw).unwrap();
        let states: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(states, vec!["Tigray", "Afar", "Oromia"]);
    }

    #[test]
    fn one_bad_entry_rejects_the_whole_set() {
        let cases = [
            json!({"Oromia": [{"state": "Afar", "name": "PredA", "value": 1, "year": null}]}),
            json!({"Oromia": [{"state": "Oromia", "name": "PredA", "value": "1", "year": null}]}),
            json!({"Oromia": [{"state": "Oromia", "name": "PredA", "value": 1, "year": 2010}]}),
            json!({"Oromia": [{"state": "Oromia", "name": "PredA", "value": 1}]}),
            json!({"Oromia": [{"state": "Oromia", "name": "PredA", "value": 1, "year": null, "x": 1}]}),
            json!({"Oromia": [{"state": "Oromia", "name": "Pred;A", "value": 1, "year": null}]}),
            json!({"Oromia": {"state": "Oromia"}}),
            json!({"Bad;State": []}),
        ];
        for raw in cases {
            assert!(
                matches!(
                    validate_inline_predictors(&raw),
                    Err(InlinePredictorError::InvalidState(_))
                ),
                "{raw}"
            );
        }
        assert_eq!(
            validate_inline_predictors(&json!([1, 2])),
            Err(InlinePredictorError::NotAMapping)
        );
    }
}
