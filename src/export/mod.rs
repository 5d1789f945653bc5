// src/export/mod.rs - CSV and JSON export of commune reports
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::finance::fetch::CommuneReport;
use crate::finance::topics::{Topic, TopicTable};
use crate::utils::logging::{ResolutionLogger, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// `Focus_Financier_<commune>_<topic>.csv`, with path separators replaced.
pub fn csv_file_name(commune: &str, topic: Topic) -> String {
    format!("Focus_Financier_{}_{}.csv", file_safe(commune), topic.slug())
}

pub fn json_file_name(commune: &str) -> String {
    format!("Focus_Financier_{}.json", file_safe(commune))
}

fn file_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

/// Writes one table as CSV: `Année, Commune, Département`, then one column per indicator.
/// Unavailable values are empty cells.
pub fn write_table_csv<W: Write>(table: &TopicTable, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);

    let mut header = vec!["Année", "Commune", "Département"];
    header.extend(table.columns.iter().copied());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut line = vec![row.year.to_string(), row.commune.clone(), row.department.clone()];
        line.extend(
            row.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the report into `dir` and returns the files created.
/// CSV produces one file per non-empty table; JSON a single file.
pub fn export_report(report: &CommuneReport, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    let logger = ResolutionLogger::new(Stage::Export);
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let mut written = Vec::new();
    match format {
        ExportFormat::Csv => {
            for table in report.tables.iter().filter(|t| !t.is_empty()) {
                let path = dir.join(csv_file_name(&report.commune, table.topic));
                let file = fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_table_csv(table, file)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                logger.log_written(&path.display().to_string());
                written.push(path);
            }
        }
        ExportFormat::Json => {
            let path = dir.join(json_file_name(&report.commune));
            let body = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            logger.log_written(&path.display().to_string());
            written.push(path);
        }
    }
    Ok(written)
}
