//! QuestionnaireResponse adapter
//!
//! Extracts one flat record per response document. Each answered item is
//! expanded into a named extra column keyed by its link id (or by its
//! question text when a label mapping is supplied), so adapters for
//! different survey instruments produce different schemas. The record's
//! base `value` column holds the number of answered items.

use super::{
    extract_resource_id, extract_user_id, parse_fhir_datetime, AdapterOptions, Extraction,
};
use crate::domain::{CellValue, FlatRecord, MalformedResourceError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Adapts one QuestionnaireResponse document
///
/// # Errors
///
/// Returns [`MalformedResourceError`] if the subject, resource id,
/// authored time, or questionnaire identifier is missing.
pub fn adapt_questionnaire_response(
    document: &Value,
    options: &AdapterOptions<'_>,
) -> Result<Extraction, MalformedResourceError> {
    if !document.is_object() {
        return Err(MalformedResourceError::NotAnObject);
    }

    let user_id = extract_user_id(document)?;
    let resource_id = extract_resource_id(document)?;

    let authored = document
        .get("authored")
        .and_then(Value::as_str)
        .ok_or(MalformedResourceError::MissingEffectiveTime)?;
    let effective_datetime = parse_fhir_datetime(authored)?;

    let canonical = document
        .get("questionnaire")
        .and_then(Value::as_str)
        .ok_or(MalformedResourceError::MissingCode)?;

    if !options.accepts_code(canonical) {
        return Ok(Extraction::FilteredOut);
    }

    let display = questionnaire_title(canonical, options);

    let mut extra = BTreeMap::new();
    if let Some(items) = document.get("item").and_then(Value::as_array) {
        collect_answers(items, options, &mut extra);
    }

    let record = FlatRecord {
        user_id,
        resource_id,
        effective_datetime,
        code: canonical.to_string(),
        display,
        value: CellValue::Number(extra.len() as f64),
        unit: String::new(),
        extra,
    };

    Ok(Extraction::Records(vec![record]))
}

/// Resolves the display title for a questionnaire canonical url
///
/// Uses the configured title mapping when present, otherwise the last path
/// segment of the canonical url.
fn questionnaire_title(canonical: &str, options: &AdapterOptions<'_>) -> String {
    if let Some(titles) = options.questionnaire_titles {
        if let Some(title) = titles.get(canonical) {
            return title.clone();
        }
    }
    canonical
        .rsplit('/')
        .next()
        .unwrap_or(canonical)
        .to_string()
}

/// Walks the item tree, collecting one column per answered item
///
/// Group items nest their children; only items carrying an answer produce
/// a column. The first answer of an item wins (repeat answers are not
/// expected from the survey instruments this pipeline serves).
fn collect_answers(
    items: &[Value],
    options: &AdapterOptions<'_>,
    extra: &mut BTreeMap<String, CellValue>,
) {
    for item in items {
        if let Some(children) = item.get("item").and_then(Value::as_array) {
            collect_answers(children, options, extra);
        }

        let Some(link_id) = item.get("linkId").and_then(Value::as_str) else {
            continue;
        };
        let Some(answer) = item
            .get("answer")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
        else {
            continue;
        };
        let Some(value) = answer_value(answer) else {
            continue;
        };

        let column = options
            .question_labels
            .and_then(|labels| labels.get(link_id).cloned())
            .unwrap_or_else(|| link_id.to_string());
        extra.insert(column, value);
    }
}

/// Extracts the typed value from one answer element
fn answer_value(answer: &Value) -> Option<CellValue> {
    if let Some(n) = answer.get("valueDecimal").and_then(Value::as_f64) {
        return Some(CellValue::Number(n));
    }
    if let Some(n) = answer.get("valueInteger").and_then(Value::as_f64) {
        return Some(CellValue::Number(n));
    }
    if let Some(s) = answer.get("valueString").and_then(Value::as_str) {
        return Some(CellValue::Text(s.to_string()));
    }
    if let Some(b) = answer.get("valueBoolean").and_then(Value::as_bool) {
        return Some(CellValue::Bool(b));
    }
    if let Some(coding) = answer.get("valueCoding") {
        let label = coding
            .get("display")
            .or_else(|| coding.get("code"))
            .and_then(Value::as_str)?;
        return Some(CellValue::Text(label.to_string()));
    }
    if let Some(s) = answer.get("valueDate").and_then(Value::as_str) {
        return Some(CellValue::Text(s.to_string()));
    }
    None
}
