//! Questionnaire risk scoring
//!
//! Scores flattened questionnaire responses against a registry of rubrics.
//! A rubric maps answer text to points and turns the summed total into a
//! severity label via inclusive lower-bound cutoffs. Rubrics are plain
//! data, so instruments can be added from configuration without touching
//! the scoring code.

use super::report::ProcessReport;
use crate::domain::{
    CellValue, FlatTable, ResourceKind, Result, RiskScoreRow, RiskScoreTable, VeneerError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scoring rules for one questionnaire instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    /// Questionnaire title the rubric applies to
    pub title: String,

    /// Points per answer text
    pub answer_scale: HashMap<String, f64>,

    /// Severity cutoffs as `(inclusive lower bound, label)` pairs,
    /// ascending by bound
    pub cutoffs: Vec<(f64, String)>,
}

impl Rubric {
    /// Points for one answer cell
    ///
    /// Numeric answers are taken at face value; text answers go through
    /// the answer scale. Returns `None` for answers the rubric cannot
    /// map.
    pub fn points_for(&self, answer: &CellValue) -> Option<f64> {
        match answer {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(text) => self.answer_scale.get(text).copied(),
            CellValue::Bool(_) => None,
        }
    }

    /// The severity label for a total score
    pub fn interpret(&self, score: f64) -> String {
        let mut label = String::new();
        for (bound, name) in &self.cutoffs {
            if score >= *bound {
                label = name.clone();
            }
        }
        label
    }
}

/// Registry of rubrics keyed by questionnaire title
#[derive(Debug, Clone, Default)]
pub struct RubricRegistry {
    rubrics: HashMap<String, Rubric>,
}

impl RubricRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the PHQ-9 and GAD-7 rubrics
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(phq9_rubric());
        registry.register(gad7_rubric());
        registry
    }

    /// Adds a rubric, replacing any existing one with the same title
    pub fn register(&mut self, rubric: Rubric) {
        self.rubrics.insert(rubric.title.clone(), rubric);
    }

    /// Looks up a rubric by questionnaire title
    pub fn get(&self, title: &str) -> Option<&Rubric> {
        self.rubrics.get(title)
    }
}

fn standard_answer_scale() -> HashMap<String, f64> {
    [
        ("Not at all", 0.0),
        ("Several days", 1.0),
        ("More than half the days", 2.0),
        ("Nearly every day", 3.0),
    ]
    .into_iter()
    .map(|(text, points)| (text.to_string(), points))
    .collect()
}

fn phq9_rubric() -> Rubric {
    Rubric {
        title: "PHQ-9".to_string(),
        answer_scale: standard_answer_scale(),
        cutoffs: vec![
            (0.0, "Minimal".to_string()),
            (5.0, "Mild".to_string()),
            (10.0, "Moderate".to_string()),
            (15.0, "Moderately severe".to_string()),
            (20.0, "Severe".to_string()),
        ],
    }
}

fn gad7_rubric() -> Rubric {
    Rubric {
        title: "GAD-7".to_string(),
        answer_scale: standard_answer_scale(),
        cutoffs: vec![
            (0.0, "Minimal".to_string()),
            (5.0, "Mild".to_string()),
            (10.0, "Moderate".to_string()),
            (15.0, "Severe".to_string()),
        ],
    }
}

/// Scores every questionnaire response in a flat table
///
/// Each row produces one score row: the rubric is looked up by the row's
/// display (the questionnaire title), every answered item is mapped to
/// points and summed, and the total is annotated with the severity label.
///
/// Rows whose answers the rubric cannot map are omitted and recorded in
/// the report. A missing rubric is a fatal error, since it means the
/// pipeline is configured for an instrument it does not know.
///
/// # Errors
///
/// Returns [`VeneerError::SchemaMismatch`] when the table does not hold
/// questionnaire responses, and [`VeneerError::UnknownQuestionnaire`]
/// when a response references an unregistered instrument.
pub fn score_questionnaire(
    table: &FlatTable,
    registry: &RubricRegistry,
) -> Result<(RiskScoreTable, ProcessReport)> {
    table.require_kind(ResourceKind::QuestionnaireResponse)?;

    let mut report = ProcessReport::new();
    report.input_rows = table.len();

    let mut rows = Vec::new();
    for record in table.rows() {
        let rubric = registry
            .get(&record.display)
            .ok_or_else(|| VeneerError::UnknownQuestionnaire(record.display.clone()))?;

        let mut score = 0.0;
        let mut unmappable = None;
        for (link_id, answer) in &record.extra {
            match rubric.points_for(answer) {
                Some(points) => score += points,
                None => {
                    unmappable = Some(link_id.clone());
                    break;
                }
            }
        }

        if let Some(link_id) = unmappable {
            report.add_omitted(
                record.user_id.clone(),
                None,
                format!("unmappable answer for item {link_id}"),
            );
            continue;
        }

        rows.push(RiskScoreRow {
            user_id: record.user_id.clone(),
            resource_id: record.resource_id.clone(),
            effective_datetime: record.effective_datetime,
            questionnaire: record.display.clone(),
            score,
            interpretation: rubric.interpret(score),
        });
    }

    report.output_rows = rows.len();
    Ok((RiskScoreTable::from_rows(rows), report))
}
