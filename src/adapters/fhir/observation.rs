//! Observation adapter
//!
//! Extracts flat records from a FHIR Observation document. An observation
//! carries its value in one of several polymorphic locations:
//!
//! - `valueQuantity` - a numeric quantity with a unit
//! - `valueString` / `valueBoolean` / `valueInteger` - a categorical or
//!   scalar value with no unit
//! - `component[]` - a multi-part measurement (e.g. blood pressure), one
//!   record per component, each with its own coding and quantity, sharing
//!   the parent's identifying fields

use super::{
    extract_resource_id, extract_user_id, parse_fhir_datetime, pick_coding, AdapterOptions,
    Extraction,
};
use crate::domain::{CellValue, FlatRecord, MalformedResourceError};
use serde_json::Value;

/// Adapts one Observation document
///
/// # Errors
///
/// Returns [`MalformedResourceError`] if the subject, resource id,
/// effective time, code, or value element is missing.
pub fn adapt_observation(
    document: &Value,
    options: &AdapterOptions<'_>,
) -> Result<Extraction, MalformedResourceError> {
    if !document.is_object() {
        return Err(MalformedResourceError::NotAnObject);
    }

    let user_id = extract_user_id(document)?;
    let resource_id = extract_resource_id(document)?;
    let effective_datetime = extract_effective_time(document)?;

    let codings = document
        .get("code")
        .and_then(|c| c.get("coding"))
        .and_then(Value::as_array)
        .ok_or(MalformedResourceError::MissingCode)?;
    let (code, display) =
        pick_coding(codings, options.preferred_system()).ok_or(MalformedResourceError::MissingCode)?;

    if !options.accepts_code(&code) {
        return Ok(Extraction::FilteredOut);
    }

    // Components first: a componentized observation (blood pressure) carries
    // its values there, one record per component.
    if let Some(components) = document.get("component").and_then(Value::as_array) {
        let mut records = Vec::new();
        for component in components {
            if let Some(record) = adapt_component(
                component,
                &user_id,
                &resource_id,
                effective_datetime,
                options,
            ) {
                records.push(record);
            }
        }
        if records.is_empty() {
            return Err(MalformedResourceError::MissingValue);
        }
        return Ok(Extraction::Records(records));
    }

    let (value, unit) = extract_value(document).ok_or(MalformedResourceError::MissingValue)?;

    let record = FlatRecord {
        user_id,
        resource_id,
        effective_datetime,
        code,
        display,
        value,
        unit,
        extra: Default::default(),
    };

    Ok(Extraction::Records(vec![record]))
}

/// Extracts the effective time from `effectiveDateTime` or `effectivePeriod.start`
fn extract_effective_time(
    document: &Value,
) -> Result<chrono::DateTime<chrono::Utc>, MalformedResourceError> {
    let raw = document
        .get("effectiveDateTime")
        .and_then(Value::as_str)
        .or_else(|| {
            document
                .get("effectivePeriod")
                .and_then(|p| p.get("start"))
                .and_then(Value::as_str)
        })
        .ok_or(MalformedResourceError::MissingEffectiveTime)?;

    parse_fhir_datetime(raw)
}

/// Extracts (value, unit) from the observation's value element
fn extract_value(document: &Value) -> Option<(CellValue, String)> {
    if let Some(quantity) = document.get("valueQuantity") {
        let value = quantity.get("value").and_then(Value::as_f64)?;
        let unit = quantity
            .get("unit")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Some((CellValue::Number(value), unit));
    }
    if let Some(s) = document.get("valueString").and_then(Value::as_str) {
        return Some((CellValue::Text(s.to_string()), String::new()));
    }
    if let Some(b) = document.get("valueBoolean").and_then(Value::as_bool) {
        return Some((CellValue::Bool(b), String::new()));
    }
    if let Some(n) = document.get("valueInteger").and_then(Value::as_f64) {
        return Some((CellValue::Number(n), String::new()));
    }
    None
}

/// Adapts one component of a multi-part observation
///
/// Components without a usable coding or quantity are skipped individually.
fn adapt_component(
    component: &Value,
    user_id: &crate::domain::UserId,
    resource_id: &crate::domain::ResourceId,
    effective_datetime: chrono::DateTime<chrono::Utc>,
    options: &AdapterOptions<'_>,
) -> Option<FlatRecord> {
    let codings = component
        .get("code")
        .and_then(|c| c.get("coding"))
        .and_then(Value::as_array)?;
    let (code, display) = pick_coding(codings, options.preferred_system())?;
    let (value, unit) = extract_value(component)?;

    Some(FlatRecord {
        user_id: user_id.clone(),
        resource_id: resource_id.clone(),
        effective_datetime,
        code,
        display,
        value,
        unit,
        extra: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn step_count_doc() -> Value {
        json!({
            "resourceType": "Observation",
            "id": "obs-1",
            "subject": {"reference": "Patient/user-1"},
            "effectiveDateTime": "2024-01-01T08:00:00Z",
            "code": {"coding": [
                {"system": "http://loinc.org", "code": "55423-8", "display": "Number of steps"}
            ]},
            "valueQuantity": {"value": 870.0, "unit": "steps"}
        })
    }

    fn blood_pressure_doc() -> Value {
        json!({
            "resourceType": "Observation",
            "id": "obs-bp",
            "subject": {"reference": "Patient/user-1"},
            "effectiveDateTime": "2024-01-01T08:00:00Z",
            "code": {"coding": [
                {"system": "http://loinc.org", "code": "85354-9", "display": "Blood pressure panel"}
            ]},
            "component": [
                {
                    "code": {"coding": [{"system": "http://loinc.org", "code": "8480-6", "display": "Systolic"}]},
                    "valueQuantity": {"value": 120.0, "unit": "mmHg"}
                },
                {
                    "code": {"coding": [{"system": "http://loinc.org", "code": "8462-4", "display": "Diastolic"}]},
                    "valueQuantity": {"value": 80.0, "unit": "mmHg"}
                }
            ]
        })
    }

    #[test]
    fn test_quantity_observation() {
        let extraction = adapt_observation(&step_count_doc(), &AdapterOptions::default()).unwrap();
        let Extraction::Records(records) = extraction else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.user_id.as_str(), "user-1");
        assert_eq!(record.code, "55423-8");
        assert_eq!(record.display, "Number of steps");
        assert_eq!(record.value, CellValue::Number(870.0));
        assert_eq!(record.unit, "steps");
    }

    #[test]
    fn test_component_observation_one_record_per_component() {
        let extraction =
            adapt_observation(&blood_pressure_doc(), &AdapterOptions::default()).unwrap();
        let Extraction::Records(records) = extraction else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "8480-6");
        assert_eq!(records[0].value, CellValue::Number(120.0));
        assert_eq!(records[1].code, "8462-4");
        assert_eq!(records[1].value, CellValue::Number(80.0));
        // Components share the parent's identifying fields
        assert_eq!(records[0].resource_id, records[1].resource_id);
        assert_eq!(records[0].user_id.as_str(), "user-1");
    }

    #[test]
    fn test_code_filter_miss_is_skip_not_error() {
        let filter: HashSet<String> = ["8867-4".to_string()].into_iter().collect();
        let options = AdapterOptions {
            code_filter: Some(&filter),
            ..Default::default()
        };
        let extraction = adapt_observation(&step_count_doc(), &options).unwrap();
        assert_eq!(extraction, Extraction::FilteredOut);
    }

    #[test]
    fn test_string_value_is_categorical() {
        let mut doc = step_count_doc();
        doc.as_object_mut().unwrap().remove("valueQuantity");
        doc["valueString"] = json!("irregular");

        let Extraction::Records(records) =
            adapt_observation(&doc, &AdapterOptions::default()).unwrap()
        else {
            panic!("expected records");
        };
        assert_eq!(records[0].value, CellValue::Text("irregular".to_string()));
        assert!(records[0].unit.is_empty());
    }

    #[test]
    fn test_effective_period_start_fallback() {
        let mut doc = step_count_doc();
        doc.as_object_mut().unwrap().remove("effectiveDateTime");
        doc["effectivePeriod"] = json!({"start": "2024-02-01T00:00:00Z", "end": "2024-02-01T01:00:00Z"});

        let Extraction::Records(records) =
            adapt_observation(&doc, &AdapterOptions::default()).unwrap()
        else {
            panic!("expected records");
        };
        assert_eq!(
            records[0].effective_datetime.to_rfc3339(),
            "2024-02-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_missing_effective_time_is_malformed() {
        let mut doc = step_count_doc();
        doc.as_object_mut().unwrap().remove("effectiveDateTime");

        assert!(matches!(
            adapt_observation(&doc, &AdapterOptions::default()),
            Err(MalformedResourceError::MissingEffectiveTime)
        ));
    }

    #[test]
    fn test_missing_code_is_malformed() {
        let mut doc = step_count_doc();
        doc.as_object_mut().unwrap().remove("code");

        assert!(matches!(
            adapt_observation(&doc, &AdapterOptions::default()),
            Err(MalformedResourceError::MissingCode)
        ));
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let mut doc = step_count_doc();
        doc.as_object_mut().unwrap().remove("valueQuantity");

        assert!(matches!(
            adapt_observation(&doc, &AdapterOptions::default()),
            Err(MalformedResourceError::MissingValue)
        ));
    }
}
