// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use serde_json::Value;

use crate::app::services::report::{ValidationIssue, ValidationReport};
use crate::app::services::validators::{self, Expect};
use crate::app::types::{Record, ResourceSource};

pub const MIN_RECORDS: usize = 5;
pub const MAX_RECORDS: usize = 1000;

/// What happens to the rest of the batch after a record is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Record the rejection and keep scanning.
    Aggregate,
    /// Record the rejection and stop scanning the batch.
    Halt,
}

/// FASTA uploads aggregate; GenBank accession lists halt at the first bad id.
pub fn batch_policy(source: Option<ResourceSource>) -> BatchPolicy {
    match source {
        Some(ResourceSource::Genbank) => BatchPolicy::Halt,
        Some(ResourceSource::Fasta) | None => BatchPolicy::Aggregate,
    }
}

/// Converts raw submitted records into canonical records, pushing every
/// rejection into `report`.
pub fn normalize_records(raw: Option<&Value>, report: &mut ValidationReport) -> Vec<Record> {
    let Some(items) = raw.and_then(Value::as_array) else {
        report.push(ValidationIssue::MissingRecords);
        return Vec::new();
    };
    if !(MIN_RECORDS..=MAX_RECORDS).contains(&items.len()) {
        report.push(ValidationIssue::RecordCount(items.len()));
        return Vec::new();
    }
    tracing::info!(count = items.len(), "normalizing submitted records");

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let source = item.get("resourceSource").and_then(ResourceSource::from_value);
        let normalized = match source {
            Some(ResourceSource::Fasta) => normalize_fasta(item),
            Some(ResourceSource::Genbank) => normalize_genbank(item),
            None => {
                tracing::info!(
                    id = %validators::describe(item.get("id")),
                    source = %validators::describe(item.get("resourceSource")),
                    "rejected record with unknown source"
                );
                None
            }
        };
        match normalized {
            Some(record) => records.push(record),
            None => {
                report.push(ValidationIssue::InvalidRecord(validators::describe(
                    item.get("id"),
                )));
                if batch_policy(source) == BatchPolicy::Halt {
                    break;
                }
            }
        }
    }
    records
}

fn normalize_fasta(item: &Value) -> Option<Record> {
    let id = validators::text(item.get("id"), &validators::FASTA_ID);
    let geoname = item.get("geonameID");
    let geo = validators::text(geoname, &validators::FASTA_GEONAME_ID)
        .or_else(|| validators::text(geoname, &validators::FASTA_LOCATION_NAME));
    let collected = item.get("collectionDate");
    let date = validators::text(collected, &validators::FASTA_HUMAN_DATE)
        .or_else(|| validators::text(collected, &validators::FASTA_DECIMAL_DATE));
    let sequence = validators::text(item.get("rawSequence"), &validators::FASTA_SEQUENCE);

    match (id, geo, date, sequence) {
        (Some(id), Some(geo), Some(date), Some(sequence)) => {
            Some(Record::fasta(id, date, geo, sequence))
        }
        _ => {
            tracing::info!(
                id = %validators::describe(item.get("id")),
                id_valid = id.is_some(),
                geo_valid = geo.is_some(),
                date_valid = date.is_some(),
                sequence_valid = sequence.is_some(),
                "rejected FASTA record"
            );
            None
        }
    }
}

fn normalize_genbank(item: &Value) -> Option<Record> {
    let id = item.get("id");
    if validators::validate(id, Expect::Text(&validators::ACCESSION)) {
        id.and_then(Value::as_str).map(Record::genbank)
    } else {
        tracing::info!(
            id = %validators::describe(id),
            "rejected GenBank accession; skipping rest of batch"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fasta(id: &str) -> Value {
        json!({
            "id": id,
            "resourceSource": 2,
            "collectionDate": "12-Mar-2015",
            "geonameID": "Oromia",
            "rawSequence": "ACGTACGT--acgt",
        })
    }

    fn genbank(id: &str) -> Value {
        json!({"id": id, "resourceSource": 1})
    }

    fn normalize(items: Vec<Value>) -> (Vec<Record>, ValidationReport) {
        let mut report = ValidationReport::default();
        let raw = Value::Array(items);
        let records = normalize_records(Some(&raw), &mut report);
        (records, report)
    }

    #[test]
    fn missing_records_are_reported() {
        let mut report = ValidationReport::default();
        let records = normalize_records(None, &mut report);
        assert!(records.is_empty());
        assert_eq!(report.issues(), &[ValidationIssue::MissingRecords]);

        let mut report = ValidationReport::default();
        normalize_records(Some(&json!({"id": "x"})), &mut report);
        assert_eq!(report.issues(), &[ValidationIssue::MissingRecords]);
    }

    #[test]
    fn batch_size_outside_bounds_embeds_actual_count() {
        for count in [0usize, 4, 1001] {
            let (records, report) =
                normalize((0..count).map(|i| fasta(&format!("s{i}"))).collect());
            assert!(records.is_empty());
            assert_eq!(report.issues(), &[ValidationIssue::RecordCount(count)]);
            assert!(report.render().contains(&count.to_string()));
        }
    }

    #[test]
    fn batch_size_bounds_are_inclusive() {
        let (records, report) =
            normalize((0..5).map(|i| genbank(&format!("KX00000{i}"))).collect());
        assert!(report.is_empty());
        assert_eq!(records.len(), 5);

        let (records, report) =
            normalize((0..1000).map(|i| genbank(&format!("KX{i:06}"))).collect());
        assert!(report.is_empty());
        assert_eq!(records.len(), 1000);
    }

    #[test]
    fn fasta_records_are_normalized() {
        let (records, report) = normalize(vec![
            fasta("s1"),
            json!({
                "id": "s2",
                "resourceSource": "2",
                "collectionDate": "2015.25",
                "geonameID": "344979",
                "rawSequence": "ACGT",
            }),
            fasta("s3"),
            fasta("s4"),
            fasta("s5"),
        ]);
        assert!(report.is_empty());
        assert_eq!(records.len(), 5);
        assert_eq!(
            records[1],
            Record::fasta("s2", "2015.25", "344979", "ACGT")
        );
        assert_eq!(records[0].geoname_id.as_deref(), Some("Oromia"));
        assert_eq!(records[0].collection_date.as_deref(), Some("12-Mar-2015"));
    }

    #[test]
    fn invalid_fasta_record_does_not_stop_the_batch() {
        let mut bad_sequence = fasta("bad1");
        bad_sequence["rawSequence"] = json!("ACGTNNNN");
        let mut bad_date = fasta("bad2");
        bad_date["collectionDate"] = json!("2015-03-12");
        let mut missing_geo = fasta("bad3");
        missing_geo.as_object_mut().unwrap().remove("geonameID");

        let (records, report) = normalize(vec![
            fasta("s1"),
            bad_sequence,
            fasta("s2"),
            bad_date,
            missing_geo,
            fasta("s3"),
        ]);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(
            report.issues(),
            &[
                ValidationIssue::InvalidRecord("bad1".to_string()),
                ValidationIssue::InvalidRecord("bad2".to_string()),
                ValidationIssue::InvalidRecord("bad3".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_genbank_id_halts_the_batch() {
        let (records, report) = normalize(vec![
            genbank("KX000001"),
            genbank("KX000002"),
            genbank("not-an-id"),
            genbank("also bad"),
            fasta("bad fasta id with spaces"),
            genbank("KX000003"),
        ]);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["KX000001", "KX000002"]);
        assert_eq!(
            report.issues(),
            &[ValidationIssue::InvalidRecord("not-an-id".to_string())]
        );
    }

    #[test]
    fn genbank_records_only_carry_the_id() {
        let mut item = genbank("KX000001");
        item["rawSequence"] = json!("ACGT");
        item["collectionDate"] = json!("2015");
        let (records, _) = normalize(vec![
            item,
            genbank("KX000002"),
            genbank("KX000003"),
            genbank("KX000004"),
            genbank("KX000005"),
        ]);
        assert_eq!(records[0], Record::genbank("KX000001"));
    }

    #[test]
    fn unknown_source_is_rejected_without_halting() {
        let (records, report) = normalize(vec![
            json!({"id": "mystery", "resourceSource": 9}),
            genbank("KX000001"),
            genbank("KX000002"),
            genbank("KX000003"),
            genbank("KX000004"),
        ]);
        assert_eq!(records.len(), 4);
        assert_eq!(
            report.issues(),
            &[ValidationIssue::InvalidRecord("mystery".to_string())]
        );
    }

    #[test]
    fn policies_are_named_per_source() {
        assert_eq!(batch_policy(Some(ResourceSource::Genbank)), BatchPolicy::Halt);
        assert_eq!(batch_policy(Some(ResourceSource::Fasta)), BatchPolicy::Aggregate);
        assert_eq!(batch_policy(None), BatchPolicy::Aggregate);
    }
}
