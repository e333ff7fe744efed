//! End-to-end questionnaire flattening and scoring tests

use serde_json::{json, Value};
use std::collections::HashMap;
use veneer::core::flatten::Flattener;
use veneer::core::process::{score_questionnaire, Rubric, RubricRegistry};
use veneer::domain::{ResourceKind, VeneerError};

const PHQ9_URL: &str = "http://example.org/fhir/Questionnaire/phq-9";

fn phq9_response(id: &str, user: &str, answers: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = answers
        .iter()
        .map(|(link_id, text)| {
            json!({
                "linkId": link_id,
                "answer": [ { "valueCoding": { "display": text } } ]
            })
        })
        .collect();

    json!({
        "resourceType": "QuestionnaireResponse",
        "id": id,
        "questionnaire": PHQ9_URL,
        "status": "completed",
        "subject": { "reference": format!("Patient/{user}") },
        "authored": "2024-03-01T09:00:00Z",
        "item": items
    })
}

fn titles() -> HashMap<String, String> {
    HashMap::from([(PHQ9_URL.to_string(), "PHQ-9".to_string())])
}

#[test]
fn test_flatten_and_score_phq9() {
    let all_items: Vec<(String, &str)> = (1..=9)
        .map(|i| (format!("item{i}"), "Several days"))
        .collect();
    let answers: Vec<(&str, &str)> = all_items
        .iter()
        .map(|(id, text)| (id.as_str(), *text))
        .collect();
    let documents = vec![phq9_response("qr-1", "u1", &answers)];

    let flattener = Flattener::new(ResourceKind::QuestionnaireResponse)
        .with_questionnaire_titles(titles());
    let (table, report) = flattener.flatten(&documents);
    assert!(report.is_clean());
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].display, "PHQ-9");
    // one column per answered item beyond the base schema
    assert_eq!(
        table.columns().len(),
        ResourceKind::QuestionnaireResponse.base_columns().len() + 9
    );

    let registry = RubricRegistry::with_builtin();
    let (scores, score_report) = score_questionnaire(&table, &registry).unwrap();
    assert!(score_report.is_clean());
    assert_eq!(scores.len(), 1);
    assert_eq!(scores.rows()[0].score, 9.0);
    assert_eq!(scores.rows()[0].interpretation, "Mild");
}

#[test]
fn test_phq9_score_extremes() {
    let min_items: Vec<(String, &str)> = (1..=9).map(|i| (format!("item{i}"), "Not at all")).collect();
    let max_items: Vec<(String, &str)> =
        (1..=9).map(|i| (format!("item{i}"), "Nearly every day")).collect();
    let min_answers: Vec<(&str, &str)> =
        min_items.iter().map(|(id, t)| (id.as_str(), *t)).collect();
    let max_answers: Vec<(&str, &str)> =
        max_items.iter().map(|(id, t)| (id.as_str(), *t)).collect();

    let documents = vec![
        phq9_response("qr-min", "u1", &min_answers),
        phq9_response("qr-max", "u2", &max_answers),
    ];

    let flattener = Flattener::new(ResourceKind::QuestionnaireResponse)
        .with_questionnaire_titles(titles());
    let (table, _) = flattener.flatten(&documents);

    let registry = RubricRegistry::with_builtin();
    let (scores, _) = score_questionnaire(&table, &registry).unwrap();

    let min_row = scores
        .rows()
        .iter()
        .find(|r| r.resource_id.as_str() == "qr-min")
        .unwrap();
    assert_eq!(min_row.score, 0.0);
    assert_eq!(min_row.interpretation, "Minimal");

    let max_row = scores
        .rows()
        .iter()
        .find(|r| r.resource_id.as_str() == "qr-max")
        .unwrap();
    assert_eq!(max_row.score, 27.0);
    assert_eq!(max_row.interpretation, "Severe");
}

#[test]
fn test_unregistered_questionnaire_is_fatal() {
    let documents = vec![json!({
        "resourceType": "QuestionnaireResponse",
        "id": "qr-1",
        "questionnaire": "http://example.org/fhir/Questionnaire/eq-5d",
        "subject": { "reference": "Patient/u1" },
        "authored": "2024-03-01T09:00:00Z",
        "item": [ { "linkId": "q1", "answer": [ { "valueInteger": 2 } ] } ]
    })];

    let flattener = Flattener::new(ResourceKind::QuestionnaireResponse);
    let (table, _) = flattener.flatten(&documents);
    // without a title mapping the display falls back to the URL slug
    assert_eq!(table.rows()[0].display, "eq-5d");

    let registry = RubricRegistry::with_builtin();
    let result = score_questionnaire(&table, &registry);
    assert!(matches!(
        result,
        Err(VeneerError::UnknownQuestionnaire(title)) if title == "eq-5d"
    ));
}

#[test]
fn test_synthetic_rubric_registration() {
    let documents = vec![json!({
        "resourceType": "QuestionnaireResponse",
        "id": "qr-1",
        "questionnaire": "http://example.org/Questionnaire/mood",
        "subject": { "reference": "Patient/u1" },
        "authored": "2024-03-01T09:00:00Z",
        "item": [
            { "linkId": "q1", "answer": [ { "valueCoding": { "display": "Often" } } ] },
            { "linkId": "q2", "answer": [ { "valueCoding": { "display": "Never" } } ] }
        ]
    })];

    let flattener = Flattener::new(ResourceKind::QuestionnaireResponse);
    let (table, _) = flattener.flatten(&documents);

    let mut registry = RubricRegistry::new();
    registry.register(Rubric {
        title: "mood".to_string(),
        answer_scale: HashMap::from([("Never".to_string(), 0.0), ("Often".to_string(), 2.0)]),
        cutoffs: vec![(0.0, "Low".to_string()), (2.0, "High".to_string())],
    });

    let (scores, report) = score_questionnaire(&table, &registry).unwrap();
    assert!(report.is_clean());
    assert_eq!(scores.rows()[0].score, 2.0);
    assert_eq!(scores.rows()[0].interpretation, "High");
}

#[test]
fn test_nested_group_items_flattened() {
    let documents = vec![json!({
        "resourceType": "QuestionnaireResponse",
        "id": "qr-1",
        "questionnaire": PHQ9_URL,
        "subject": { "reference": "Patient/u1" },
        "authored": "2024-03-01T09:00:00Z",
        "item": [
            {
                "linkId": "group-1",
                "item": [
                    { "linkId": "item1", "answer": [ { "valueCoding": { "display": "Not at all" } } ] },
                    { "linkId": "item2", "answer": [ { "valueCoding": { "display": "Several days" } } ] }
                ]
            }
        ]
    })];

    let flattener = Flattener::new(ResourceKind::QuestionnaireResponse)
        .with_questionnaire_titles(titles());
    let (table, _) = flattener.flatten(&documents);

    assert_eq!(table.len(), 1);
    let extra = &table.rows()[0].extra;
    assert_eq!(extra.len(), 2);
    assert!(extra.contains_key("item1"));
    assert!(extra.contains_key("item2"));
}
