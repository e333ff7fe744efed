//! End-to-end pipeline tests over raw FHIR document batches

use serde_json::{json, Value};
use veneer::core::flatten::Flattener;
use veneer::core::process::{
    activity_index, aggregate_daily, default_reducers, filter_by_range, ActivityWeights,
    ValueRange,
};
use veneer::domain::{ResourceKind, UserId};

fn observation(id: &str, user: &str, time: &str, code: &str, value: f64, unit: &str) -> Value {
    json!({
        "resourceType": "Observation",
        "id": id,
        "status": "final",
        "subject": { "reference": format!("Patient/{user}") },
        "effectiveDateTime": time,
        "code": {
            "coding": [
                { "system": "http://loinc.org", "code": code, "display": "metric" }
            ]
        },
        "valueQuantity": { "value": value, "unit": unit }
    })
}

#[test]
fn test_flatten_filter_aggregate_activity() {
    let documents = vec![
        observation("s1", "u1", "2024-01-01T08:00:00Z", "55423-8", 100.0, "steps"),
        observation("s2", "u1", "2024-01-01T12:00:00Z", "55423-8", 250.0, "steps"),
        observation("s3", "u1", "2024-01-01T18:00:00Z", "55423-8", 50.0, "steps"),
        observation("h1", "u1", "2024-01-01T08:05:00Z", "8867-4", 60.0, "beats/minute"),
        observation("h2", "u1", "2024-01-01T20:00:00Z", "8867-4", 80.0, "beats/minute"),
        // implausible heart rate, dropped by the range filter
        observation("h3", "u1", "2024-01-01T21:00:00Z", "8867-4", 900.0, "beats/minute"),
    ];

    let flattener = Flattener::new(ResourceKind::Observation);
    let (table, report) = flattener.flatten(&documents);
    assert!(report.is_clean());
    assert_eq!(table.len(), 6);

    let filtered = filter_by_range(&table, &ValueRange::at_most(500.0));
    assert_eq!(filtered.len(), 5);

    let (daily, daily_report) = aggregate_daily(&filtered, &default_reducers());
    assert!(daily_report.is_clean());

    let user = UserId::new("u1").unwrap();
    let date = "2024-01-01".parse().unwrap();
    // step counts sum, heart rates average
    assert_eq!(daily.value_for(&user, date, "55423-8"), Some(400.0));
    assert_eq!(daily.value_for(&user, date, "8867-4"), Some(70.0));

    let (activity, activity_report) = activity_index(&daily, &ActivityWeights::default());
    assert!(activity_report.is_clean());
    let index = activity.value_for(&user, date, "activity-index").unwrap();
    let expected = 0.7 * (400.0 / 10_000.0) + 0.3 * (70.0 / 100.0);
    assert!((index - expected).abs() < 1e-9);
}

#[test]
fn test_duplicates_and_malformed_reported_not_fatal() {
    let documents = vec![
        observation("s1", "u1", "2024-01-01T08:00:00Z", "55423-8", 100.0, "steps"),
        // same document id again, later value wins
        observation("s1", "u1", "2024-01-01T08:00:00Z", "55423-8", 175.0, "steps"),
        // missing subject
        json!({
            "resourceType": "Observation",
            "id": "bad-1",
            "effectiveDateTime": "2024-01-01T09:00:00Z",
            "code": { "coding": [{ "system": "http://loinc.org", "code": "55423-8" }] },
            "valueQuantity": { "value": 10.0, "unit": "steps" }
        }),
    ];

    let flattener = Flattener::new(ResourceKind::Observation);
    let (table, report) = flattener.flatten(&documents);

    assert_eq!(table.len(), 1);
    assert_eq!(report.duplicates_replaced, 1);
    assert_eq!(report.malformed_count(), 1);
    assert_eq!(report.malformed[0].resource_id.as_deref(), Some("bad-1"));

    match &table.rows()[0].value {
        veneer::domain::CellValue::Number(n) => assert_eq!(*n, 175.0),
        other => panic!("expected numeric value, got {other:?}"),
    }
}

#[test]
fn test_blood_pressure_components_expand() {
    let documents = vec![json!({
        "resourceType": "Observation",
        "id": "bp-1",
        "status": "final",
        "subject": { "reference": "Patient/u1" },
        "effectiveDateTime": "2024-01-02T09:30:00Z",
        "code": {
            "coding": [
                { "system": "http://loinc.org", "code": "85354-9", "display": "Blood pressure panel" }
            ]
        },
        "component": [
            {
                "code": { "coding": [{ "system": "http://loinc.org", "code": "8480-6", "display": "Systolic" }] },
                "valueQuantity": { "value": 120.0, "unit": "mmHg" }
            },
            {
                "code": { "coding": [{ "system": "http://loinc.org", "code": "8462-4", "display": "Diastolic" }] },
                "valueQuantity": { "value": 80.0, "unit": "mmHg" }
            }
        ]
    })];

    let flattener = Flattener::new(ResourceKind::Observation);
    let (table, report) = flattener.flatten(&documents);

    assert!(report.is_clean());
    assert_eq!(table.len(), 2);
    // both rows share the source document id, distinguished by code
    assert_eq!(table.rows()[0].resource_id.as_str(), "bp-1");
    assert_eq!(table.rows()[1].resource_id.as_str(), "bp-1");
    let codes: Vec<&str> = table.rows().iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["8480-6", "8462-4"]);
}

#[test]
fn test_flatten_is_deterministic() {
    let documents = vec![
        observation("s1", "u2", "2024-01-03T08:00:00Z", "55423-8", 10.0, "steps"),
        observation("s2", "u1", "2024-01-01T08:00:00Z", "8867-4", 64.0, "beats/minute"),
    ];

    let flattener = Flattener::new(ResourceKind::Observation);
    let (first, _) = flattener.flatten(&documents);
    let (second, _) = flattener.flatten(&documents);
    assert_eq!(first, second);
}

#[test]
fn test_empty_batch_yields_empty_table() {
    let flattener = Flattener::new(ResourceKind::Observation);
    let (table, report) = flattener.flatten(&[]);

    assert!(table.is_empty());
    assert_eq!(table.columns(), ResourceKind::Observation.base_columns());
    assert_eq!(report.total_documents, 0);
    assert!(report.is_clean());
}

#[test]
fn test_code_filter_skips_other_metrics() {
    let documents = vec![
        observation("s1", "u1", "2024-01-01T08:00:00Z", "55423-8", 100.0, "steps"),
        observation("w1", "u1", "2024-01-01T08:00:00Z", "29463-7", 81.5, "kg"),
    ];

    let flattener = Flattener::new(ResourceKind::Observation)
        .with_code_filter(["55423-8".to_string()]);
    let (table, report) = flattener.flatten(&documents);

    assert_eq!(table.len(), 1);
    assert_eq!(report.filtered_out, 1);
    assert_eq!(table.rows()[0].code, "55423-8");
}
