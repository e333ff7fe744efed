//! Flatten command implementation
//!
//! The end-to-end run: fetch the raw document batch, flatten it into a
//! table, run the processing stages for the configured resource kind,
//! and write the results as CSV.

use crate::adapters::firestore::{DocumentSource, FirestoreClient, LocalFileSource};
use crate::config::{load_config, VeneerConfig};
use crate::core::explore::record_counts;
use crate::core::export::CsvExporter;
use crate::core::flatten::Flattener;
use crate::core::process::{
    activity_index, aggregate_daily, filter_by_range, score_questionnaire, RubricRegistry,
};
use crate::domain::{FlatTable, ResourceKind, Result};
use clap::Args;
use std::str::FromStr;
use std::time::Instant;

/// Arguments for the flatten command
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Read raw resources from a local JSON file instead of Firestore
    #[arg(long)]
    pub input: Option<String>,

    /// Override the resource kind (observation or questionnaire_response)
    #[arg(long)]
    pub kind: Option<String>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Dry run mode - fetch and flatten but don't write any files
    #[arg(long)]
    pub dry_run: bool,
}

impl FlattenArgs {
    /// Execute the flatten command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting flatten command");

        let mut config = load_config(config_path)?;

        // Apply CLI overrides
        if let Some(kind) = &self.kind {
            match ResourceKind::from_str(kind) {
                Ok(parsed) => {
                    tracing::info!(kind = %parsed, "Overriding resource kind from CLI");
                    config.flatten.kind = parsed;
                }
                Err(e) => {
                    eprintln!("Invalid resource kind: {e}");
                    return Ok(2);
                }
            }
        }
        if let Some(output_dir) = &self.output_dir {
            config.export.output_dir = output_dir.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let start = Instant::now();

        // Fetch the raw batch
        let source: Box<dyn DocumentSource> = match &self.input {
            Some(path) => Box::new(LocalFileSource::new(path)),
            None => Box::new(FirestoreClient::new(config.firestore.clone())?),
        };
        crate::log_pipeline_start!(config.flatten.kind, source.describe());
        let documents = source.fetch_documents().await?;

        // Flatten
        let flattener = build_flattener(&config);
        let (table, report) = flattener.flatten(&documents);
        report.log_summary();

        println!("Flattened {} of {} documents", report.flattened, report.total_documents);
        if report.malformed_count() > 0 {
            println!("  {} malformed documents skipped", report.malformed_count());
        }
        if report.duplicates_replaced > 0 {
            println!("  {} duplicates replaced", report.duplicates_replaced);
        }

        if table.is_empty() {
            println!("No rows to process, nothing to export");
            crate::log_pipeline_complete!(0usize, start.elapsed());
            return Ok(0);
        }

        for (code, user_id, count) in record_counts(&table) {
            tracing::debug!(code = %code, user_id = %user_id, count, "Record count");
        }

        if config.application.dry_run {
            println!("DRY RUN - no files written ({} rows flattened)", table.len());
            crate::log_pipeline_complete!(table.len(), start.elapsed());
            return Ok(0);
        }

        let exporter = CsvExporter::new(&config.export.output_dir);
        match table.kind() {
            ResourceKind::Observation => {
                export_observations(&config, &exporter, &table)?;
            }
            ResourceKind::QuestionnaireResponse => {
                export_questionnaire_responses(&exporter, &table)?;
            }
        }

        crate::log_pipeline_complete!(table.len(), start.elapsed());
        Ok(0)
    }
}

fn build_flattener(config: &VeneerConfig) -> Flattener {
    let mut flattener = Flattener::new(config.flatten.kind)
        .with_preferred_system(config.flatten.preferred_coding_system.clone());
    if !config.flatten.code_filter.is_empty() {
        flattener = flattener.with_code_filter(config.flatten.code_filter.iter().cloned());
    }
    if !config.flatten.question_labels.is_empty() {
        flattener = flattener.with_question_labels(config.flatten.question_labels.clone());
    }
    if !config.flatten.questionnaire_titles.is_empty() {
        flattener = flattener.with_questionnaire_titles(config.flatten.questionnaire_titles.clone());
    }
    flattener
}

fn export_observations(
    config: &VeneerConfig,
    exporter: &CsvExporter,
    table: &FlatTable,
) -> Result<()> {
    let filtered = match &config.processing.value_range {
        Some(range) => filter_by_range(table, range),
        None => table.clone(),
    };
    if filtered.is_empty() {
        println!("All rows fell outside the configured value range, nothing to export");
        return Ok(());
    }

    let path = exporter.export_flat_table(&filtered, "observations.csv")?;
    println!("Wrote {}", path.display());

    let (daily, daily_report) = aggregate_daily(&filtered, &config.processing.reducers);
    daily_report.log_summary("aggregate_daily");
    if !daily.is_empty() {
        let path = exporter.export_daily_aggregate(&daily, "daily.csv")?;
        println!("Wrote {}", path.display());

        let (activity, activity_report) = activity_index(&daily, &config.processing.activity);
        activity_report.log_summary("activity_index");
        if !activity.is_empty() {
            let path = exporter.export_daily_aggregate(&activity, "activity.csv")?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn export_questionnaire_responses(exporter: &CsvExporter, table: &FlatTable) -> Result<()> {
    let path = exporter.export_flat_table(table, "questionnaire_responses.csv")?;
    println!("Wrote {}", path.display());

    let registry = RubricRegistry::with_builtin();
    let (scores, score_report) = score_questionnaire(table, &registry)?;
    score_report.log_summary("score_questionnaire");
    if !scores.is_empty() {
        let path = exporter.export_risk_scores(&scores, "risk_scores.csv")?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlattenConfig;

    #[test]
    fn test_build_flattener_from_config() {
        let config = VeneerConfig {
            application: Default::default(),
            environment: Default::default(),
            firestore: Default::default(),
            flatten: FlattenConfig {
                code_filter: vec!["55423-8".to_string()],
                ..Default::default()
            },
            processing: Default::default(),
            export: Default::default(),
            logging: Default::default(),
        };

        // Exercises the builder path; behavior is covered by flattener tests
        let _ = build_flattener(&config);
    }
}
