//! Resource kind tag
//!
//! Closed enumeration of the FHIR resource kinds the pipeline understands.
//! A flat table is tagged with exactly one kind for its lifetime; kind-specific
//! processing stages dispatch on this tag and reject tables of the wrong kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The FHIR resource kinds supported by the pipeline
///
/// Adding a new kind means adding one adapter and one column schema, not
/// editing a central conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A clinical measurement (step count, heart rate, blood pressure, ...)
    Observation,
    /// A survey instrument response (PHQ-9, GAD-7, ...)
    QuestionnaireResponse,
}

impl ResourceKind {
    /// The FHIR `resourceType` string for this kind
    pub fn resource_type(&self) -> &'static str {
        match self {
            ResourceKind::Observation => "Observation",
            ResourceKind::QuestionnaireResponse => "QuestionnaireResponse",
        }
    }

    /// The fixed base columns of a flat table of this kind
    ///
    /// Questionnaire tables gain additional per-question columns at
    /// flattening time; those are appended after the base columns.
    pub fn base_columns(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Observation => &[
                "user_id",
                "resource_id",
                "effective_datetime",
                "code",
                "display",
                "value",
                "unit",
            ],
            ResourceKind::QuestionnaireResponse => &[
                "user_id",
                "resource_id",
                "effective_datetime",
                "code",
                "display",
                "value",
            ],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_type())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Observation" | "observation" => Ok(ResourceKind::Observation),
            "QuestionnaireResponse" | "questionnaire_response" => {
                Ok(ResourceKind::QuestionnaireResponse)
            }
            other => Err(format!(
                "Unknown resource kind '{other}'. Must be one of: Observation, QuestionnaireResponse"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_strings() {
        assert_eq!(ResourceKind::Observation.resource_type(), "Observation");
        assert_eq!(
            ResourceKind::QuestionnaireResponse.resource_type(),
            "QuestionnaireResponse"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "Observation".parse::<ResourceKind>().unwrap(),
            ResourceKind::Observation
        );
        assert_eq!(
            "questionnaire_response".parse::<ResourceKind>().unwrap(),
            ResourceKind::QuestionnaireResponse
        );
        assert!("Patient".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_base_columns_start_with_required_fields() {
        for kind in [ResourceKind::Observation, ResourceKind::QuestionnaireResponse] {
            let columns = kind.base_columns();
            assert_eq!(
                &columns[..4],
                &["user_id", "resource_id", "effective_datetime", "code"]
            );
        }
    }
}
