//! CSV writers for the pipeline's table shapes

use crate::domain::{
    CellValue, DailyAggregate, FlatRecord, FlatTable, Result, RiskScoreTable, UserId, VeneerError,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

fn csv_error(err: csv::Error) -> VeneerError {
    VeneerError::Export(err.to_string())
}

/// Renders one flat record cell for a named column
fn cell_for(record: &FlatRecord, column: &str) -> String {
    match column {
        "user_id" => record.user_id.to_string(),
        "resource_id" => record.resource_id.to_string(),
        "effective_datetime" => record.effective_datetime.to_rfc3339(),
        "code" => record.code.clone(),
        "display" => record.display.clone(),
        "value" => record.value.to_string(),
        "unit" => record.unit.clone(),
        name => record
            .extra
            .get(name)
            .map(CellValue::to_string)
            .unwrap_or_default(),
    }
}

/// Writes a flat table as CSV, header row first
///
/// The header is exactly the table's column list, so questionnaire
/// link-id columns appear alongside the base columns.
///
/// # Errors
///
/// Returns [`VeneerError::EmptySelection`] for a table with no rows.
pub fn write_flat_table<W: Write>(table: &FlatTable, out: W) -> Result<()> {
    if table.is_empty() {
        return Err(VeneerError::EmptySelection(format!(
            "refusing to export an empty {} table",
            table.kind()
        )));
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.columns()).map_err(csv_error)?;
    for record in table.rows() {
        let row: Vec<String> = table
            .columns()
            .iter()
            .map(|column| cell_for(record, column))
            .collect();
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| VeneerError::Io(e.to_string()))
}

/// Writes a daily aggregate as CSV, pivoted wide
///
/// The header is `user_id,date` followed by the aggregate's codes in
/// sorted order; each row holds one `(user_id, date)` group. Cells for
/// absent groups stay empty, never zero-filled.
///
/// # Errors
///
/// Returns [`VeneerError::EmptySelection`] for an aggregate with no rows.
pub fn write_daily_aggregate<W: Write>(aggregate: &DailyAggregate, out: W) -> Result<()> {
    if aggregate.is_empty() {
        return Err(VeneerError::EmptySelection(
            "refusing to export an empty daily aggregate".to_string(),
        ));
    }

    let codes = aggregate.codes();
    let mut groups: BTreeMap<(UserId, NaiveDate), BTreeMap<String, f64>> = BTreeMap::new();
    for row in aggregate.rows() {
        groups
            .entry((row.user_id.clone(), row.date))
            .or_default()
            .insert(row.code.clone(), row.value);
    }

    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["user_id".to_string(), "date".to_string()];
    header.extend(codes.iter().cloned());
    writer.write_record(&header).map_err(csv_error)?;

    for ((user_id, date), values) in groups {
        let mut row = vec![user_id.to_string(), date.to_string()];
        for code in &codes {
            row.push(values.get(code).map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| VeneerError::Io(e.to_string()))
}

/// Writes a risk-score table as CSV
///
/// # Errors
///
/// Returns [`VeneerError::EmptySelection`] for a table with no rows.
pub fn write_risk_scores<W: Write>(scores: &RiskScoreTable, out: W) -> Result<()> {
    if scores.is_empty() {
        return Err(VeneerError::EmptySelection(
            "refusing to export an empty risk-score table".to_string(),
        ));
    }

    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "user_id",
            "resource_id",
            "effective_datetime",
            "questionnaire",
            "score",
            "interpretation",
        ])
        .map_err(csv_error)?;
    for row in scores.rows() {
        writer
            .write_record([
                row.user_id.as_str(),
                row.resource_id.as_str(),
                &row.effective_datetime.to_rfc3339(),
                &row.questionnaire,
                &row.score.to_string(),
                &row.interpretation,
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| VeneerError::Io(e.to_string()))
}

/// File-based exporter writing into one output directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// Creates an exporter rooted at `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    // Serialize fully before touching the filesystem, so a refused
    // export never leaves a partial file behind
    fn persist(&self, file_name: &str, contents: Vec<u8>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| VeneerError::Io(e.to_string()))?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, contents).map_err(|e| VeneerError::Io(e.to_string()))?;
        Ok(path)
    }

    /// Writes a flat table to `<output_dir>/<file_name>`
    pub fn export_flat_table(&self, table: &FlatTable, file_name: &str) -> Result<PathBuf> {
        let mut buffer = Vec::new();
        write_flat_table(table, &mut buffer)?;
        let path = self.persist(file_name, buffer)?;
        tracing::info!(path = %path.display(), rows = table.len(), "Flat table exported");
        Ok(path)
    }

    /// Writes a daily aggregate to `<output_dir>/<file_name>`
    pub fn export_daily_aggregate(
        &self,
        aggregate: &DailyAggregate,
        file_name: &str,
    ) -> Result<PathBuf> {
        let mut buffer = Vec::new();
        write_daily_aggregate(aggregate, &mut buffer)?;
        let path = self.persist(file_name, buffer)?;
        tracing::info!(path = %path.display(), rows = aggregate.len(), "Daily aggregate exported");
        Ok(path)
    }

    /// Writes a risk-score table to `<output_dir>/<file_name>`
    pub fn export_risk_scores(&self, scores: &RiskScoreTable, file_name: &str) -> Result<PathBuf> {
        let mut buffer = Vec::new();
        write_risk_scores(scores, &mut buffer)?;
        let path = self.persist(file_name, buffer)?;
        tracing::info!(path = %path.display(), rows = scores.len(), "Risk scores exported");
        Ok(path)
    }

    /// The directory this exporter writes into
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyRow, ResourceId, ResourceKind, RiskScoreRow};
    use chrono::{TimeZone, Utc};

    fn observation(user: &str, id: &str, value: f64) -> FlatRecord {
        FlatRecord::builder()
            .user_id(UserId::new(user).unwrap())
            .resource_id(ResourceId::new(id).unwrap())
            .effective_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
            .code("55423-8")
            .display("Number of steps")
            .value(CellValue::Number(value))
            .unit("steps")
            .build()
            .unwrap()
    }

    #[test]
    fn test_flat_table_header_matches_columns() {
        let table = FlatTable::from_rows(
            ResourceKind::Observation,
            vec![observation("u1", "r1", 100.0)],
        );

        let mut buffer = Vec::new();
        write_flat_table(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, table.columns().join(","));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_flat_table_extra_columns_rendered() {
        let record = FlatRecord::builder()
            .user_id(UserId::new("u1").unwrap())
            .resource_id(ResourceId::new("qr1").unwrap())
            .effective_datetime(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
            .code("http://example.org/fhir/Questionnaire/phq-9")
            .display("PHQ-9")
            .value(CellValue::Number(1.0))
            .extra_column("item1", CellValue::Text("Several days".to_string()))
            .build()
            .unwrap();
        let table = FlatTable::from_rows(ResourceKind::QuestionnaireResponse, vec![record]);

        let mut buffer = Vec::new();
        write_flat_table(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.lines().next().unwrap().ends_with("item1"));
        assert!(text.contains("Several days"));
    }

    #[test]
    fn test_empty_table_refused() {
        let table = FlatTable::empty(ResourceKind::Observation);
        let mut buffer = Vec::new();
        assert!(matches!(
            write_flat_table(&table, &mut buffer),
            Err(VeneerError::EmptySelection(_))
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_daily_aggregate_pivots_wide() {
        let aggregate = DailyAggregate::from_rows(vec![
            DailyRow {
                user_id: UserId::new("u1").unwrap(),
                date: "2024-01-01".parse().unwrap(),
                code: "55423-8".to_string(),
                display: String::new(),
                value: 400.0,
                unit: "steps".to_string(),
                sample_count: 3,
            },
            DailyRow {
                user_id: UserId::new("u1").unwrap(),
                date: "2024-01-01".parse().unwrap(),
                code: "8867-4".to_string(),
                display: String::new(),
                value: 70.0,
                unit: "beats/minute".to_string(),
                sample_count: 2,
            },
            DailyRow {
                user_id: UserId::new("u1").unwrap(),
                date: "2024-01-02".parse().unwrap(),
                code: "8867-4".to_string(),
                display: String::new(),
                value: 64.0,
                unit: "beats/minute".to_string(),
                sample_count: 1,
            },
        ]);

        let mut buffer = Vec::new();
        write_daily_aggregate(&aggregate, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "user_id,date,55423-8,8867-4");
        assert_eq!(lines.next().unwrap(), "u1,2024-01-01,400,70");
        // absent step count on day two stays empty
        assert_eq!(lines.next().unwrap(), "u1,2024-01-02,,64");
    }

    #[test]
    fn test_risk_scores_written() {
        let scores = RiskScoreTable::from_rows(vec![RiskScoreRow {
            user_id: UserId::new("u1").unwrap(),
            resource_id: ResourceId::new("qr1").unwrap(),
            effective_datetime: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            questionnaire: "PHQ-9".to_string(),
            score: 7.0,
            interpretation: "Mild".to_string(),
        }]);

        let mut buffer = Vec::new();
        write_risk_scores(&scores, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("user_id,resource_id,"));
        assert!(text.contains("PHQ-9,7,Mild"));
    }

    #[test]
    fn test_exporter_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let table = FlatTable::from_rows(
            ResourceKind::Observation,
            vec![observation("u1", "r1", 100.0)],
        );

        let path = exporter.export_flat_table(&table, "observations.csv").unwrap();
        assert!(path.exists());
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
