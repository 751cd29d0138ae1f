// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! Field-level predicates shared by every stage of submission checking.
//!
//! Patterns are matched against the whole value and use ASCII word classes,
//! so `\w` never admits non-Latin letters.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

/// Maximum nucleotide sequence length accepted inline.
pub const MAX_SEQUENCE_LEN: usize = 20_000;

/// A fully-anchored pattern with an optional length cap checked before matching.
#[derive(Debug)]
pub struct FieldPattern {
    regex: Regex,
    max_chars: Option<usize>,
}

impl FieldPattern {
    fn new(pattern: &str) -> Self {
        let anchored = format!("^(?:{pattern})$");
        Self {
            regex: Regex::new(&anchored).expect("field pattern is valid"),
            max_chars: None,
        }
    }

    fn bounded(pattern: &str, max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
            ..Self::new(pattern)
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        if self
            .max_chars
            .is_some_and(|max| text.chars().count() > max)
        {
            return false;
        }
        self.regex.is_match(text)
    }
}

pub static ACCESSION: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[A-Z0-9_.]{5,10}"));
pub static EMAIL: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[^@\s]+@[^@\s]+\.[^@\s]+"));
pub static JOB_NAME: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9A-Za-z_ #&-]{3,255}"));
pub static PREDICTOR_FILE_NAME: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r".{1,250}\.tsv"));
pub static STATE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9A-Za-z_., ’'-]{1,255}"));
pub static PREDICTOR_NAME: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9A-Za-z_. -]{1,255}"));
pub static SUBSTITUTION_MODEL: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new("HKY|GTR"));
pub static CLOCK_MODEL: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new("Strict|Relaxed"));
pub static TREE_PRIOR: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new("Constant|Skyline|Skygrid"));

pub static FASTA_ID: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9A-Za-z_]{1,20}"));
pub static FASTA_HUMAN_DATE: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::new(
        r"((0[1-9]|[12][0-9]|3[01])-)?((Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-)?[0-9]{4}",
    )
});
pub static FASTA_DECIMAL_DATE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9]{4}(\.[0-9]{1,4})?"));
pub static FASTA_GEONAME_ID: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r"[0-9]{4,10}"));
pub static FASTA_LOCATION_NAME: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(r##"[0-9A-Za-z_ !"#$%&']{1,30}"##));
pub static FASTA_SEQUENCE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::bounded(r"[ACGTacgt-]+", MAX_SEQUENCE_LEN));

/// Expected shape of a scalar field.
#[derive(Debug, Clone, Copy)]
pub enum Expect<'p> {
    Text(&'p FieldPattern),
    Boolean,
    Number,
}

/// True when `value` is present, has the expected JSON type and, for text,
/// fully matches the pattern.
pub fn validate(value: Option<&Value>, expect: Expect<'_>) -> bool {
    match expect {
        Expect::Text(pattern) => text(value, pattern).is_some(),
        Expect::Boolean => boolean(value).is_some(),
        Expect::Number => number(value).is_some(),
    }
}

pub fn text<'v>(value: Option<&'v Value>, pattern: &FieldPattern) -> Option<&'v str> {
    value
        .and_then(Value::as_str)
        .filter(|text| pattern.is_match(text))
}

pub fn boolean(value: Option<&Value>) -> Option<bool> {
    value.and_then(Value::as_bool)
}

pub fn number(value: Option<&Value>) -> Option<&Number> {
    match value {
        Some(Value::Number(number)) => Some(number),
        _ => None,
    }
}

/// Parses a numeric cell of a predictor matrix; only finite values count.
pub fn numeric_cell(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Renders a raw value the way it is echoed back in error messages.
pub fn describe(value: Option<&Value>) -> String {
    match value {
        None => "<missing>".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matches(pattern: &FieldPattern, value: &str) -> bool {
        validate(Some(&json!(value)), Expect::Text(pattern))
    }

    #[test]
    fn rejects_missing_null_and_mismatched_types() {
        assert!(!validate(None, Expect::Text(&ACCESSION)));
        assert!(!validate(Some(&Value::Null), Expect::Text(&ACCESSION)));
        assert!(!validate(Some(&json!(12345)), Expect::Text(&ACCESSION)));
        assert!(!validate(Some(&json!("true")), Expect::Boolean));
        assert!(!validate(Some(&json!("100")), Expect::Number));
        assert!(!validate(None, Expect::Number));
    }

    #[test]
    fn boolean_and_number_only_check_type() {
        assert!(validate(Some(&json!(false)), Expect::Boolean));
        assert!(validate(Some(&json!(0)), Expect::Number));
        assert!(validate(Some(&json!(-2.5)), Expect::Number));
    }

    #[test]
    fn patterns_must_match_the_whole_value() {
        assert!(matches(&SUBSTITUTION_MODEL, "HKY"));
        assert!(!matches(&SUBSTITUTION_MODEL, "HKYX"));
        assert!(!matches(&SUBSTITUTION_MODEL, "xGTR"));
        assert!(matches(&CLOCK_MODEL, "Relaxed"));
        assert!(!matches(&CLOCK_MODEL, "relaxed"));
        assert!(matches(&TREE_PRIOR, "Skygrid"));
        assert!(!matches(&TREE_PRIOR, "Skygrid "));
    }

    #[test]
    fn accession_ids() {
        assert!(matches(&ACCESSION, "KX369547"));
        assert!(matches(&ACCESSION, "NC_045512."));
        assert!(!matches(&ACCESSION, "AB12"));
        assert!(!matches(&ACCESSION, "ABCDEFGHIJK"));
        assert!(!matches(&ACCESSION, "kx369547"));
    }

    #[test]
    fn emails_and_job_names() {
        assert!(matches(&EMAIL, "someone@example.org"));
        assert!(!matches(&EMAIL, "someone@example"));
        assert!(!matches(&EMAIL, "some one@example.org"));
        assert!(matches(&JOB_NAME, "H5N1 run #2 & more-data"));
        assert!(!matches(&JOB_NAME, "ab"));
        assert!(!matches(&JOB_NAME, "bad/name"));
    }

    #[test]
    fn state_and_predictor_names() {
        assert!(matches(&STATE, "Cote d'Ivoire"));
        assert!(matches(&STATE, "Cote d’Ivoire, Abidjan"));
        assert!(!matches(&STATE, ""));
        assert!(!matches(&STATE, "Oromia;"));
        assert!(matches(&PREDICTOR_NAME, "Pop density 2010"));
        assert!(!matches(&PREDICTOR_NAME, "Pop,density"));
        assert!(!matches(&PREDICTOR_NAME, "Ünicode"));
    }

    #[test]
    fn predictor_file_names() {
        assert!(matches(&PREDICTOR_FILE_NAME, "predictors.tsv"));
        assert!(!matches(&PREDICTOR_FILE_NAME, ".tsv"));
        assert!(!matches(&PREDICTOR_FILE_NAME, "predictors.tsv.bak"));
        assert!(!matches(&PREDICTOR_FILE_NAME, &format!("{}.tsv", "a".repeat(251))));
    }

    #[test]
    fn fasta_dates() {
        for date in ["2016", "Mar-2016", "05-Mar-2016", "05-2016"] {
            assert!(matches(&FASTA_HUMAN_DATE, date), "{date}");
        }
        assert!(!matches(&FASTA_HUMAN_DATE, "32-Mar-2016"));
        assert!(!matches(&FASTA_HUMAN_DATE, "2016-03-05"));
        assert!(matches(&FASTA_DECIMAL_DATE, "2016.5"));
        assert!(matches(&FASTA_DECIMAL_DATE, "2016.1234"));
        assert!(!matches(&FASTA_DECIMAL_DATE, "2016.12345"));
    }

    #[test]
    fn fasta_geography() {
        assert!(matches(&FASTA_GEONAME_ID, "6252001"));
        assert!(!matches(&FASTA_GEONAME_ID, "123"));
        assert!(matches(&FASTA_LOCATION_NAME, "Addis Ababa"));
        assert!(!matches(&FASTA_LOCATION_NAME, ""));
        assert!(!matches(&FASTA_LOCATION_NAME, &"x".repeat(31)));
    }

    #[test]
    fn fasta_sequences() {
        assert!(matches(&FASTA_SEQUENCE, "ACGT-acgt"));
        assert!(!matches(&FASTA_SEQUENCE, "ACGTN"));
        assert!(!matches(&FASTA_SEQUENCE, ""));
        assert!(matches(&FASTA_SEQUENCE, &"A".repeat(MAX_SEQUENCE_LEN)));
        assert!(!matches(&FASTA_SEQUENCE, &"A".repeat(MAX_SEQUENCE_LEN + 1)));
    }

    #[test]
    fn numeric_cells() {
        assert_eq!(numeric_cell("1.5"), Some(1.5));
        assert_eq!(numeric_cell(" -3 "), Some(-3.0));
        assert_eq!(numeric_cell("2e3"), Some(2000.0));
        assert_eq!(numeric_cell("abc"), None);
        assert_eq!(numeric_cell("NaN"), None);
        assert_eq!(numeric_cell("inf"), None);
        assert_eq!(numeric_cell(""), None);
    }

    #[test]
    fn validation_is_repeatable() {
        let value = json!("Oromia");
        let first = validate(Some(&value), Expect::Text(&STATE));
        let second = validate(Some(&value), Expect::Text(&STATE));
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn describe_echoes_strings_verbatim() {
        assert_eq!(describe(Some(&json!("bad id"))), "bad id");
        assert_eq!(describe(Some(&json!(42))), "42");
        assert_eq!(describe(None), "<missing>");
    }
}
