//! JSONL report writer - appends one analysis envelope per line

use crate::analysis::types::StrategicRecommendationOutput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub execution_ref: String,
    pub generated_at: DateTime<Utc>,
    pub output: StrategicRecommendationOutput,
}

pub struct ReportWriter {
    path: PathBuf,
    writer: BufWriter<std::fs::File>,
    last_flush: Instant,
}

impl ReportWriter {
    /// Open (or create) the report file in append mode
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing analysis reports to: {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            last_flush: Instant::now(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_report(&mut self, report: &AnalysisReport) -> Result<(), ReportError> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", json)?;

        if self.last_flush.elapsed() > FLUSH_INTERVAL {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        self.last_flush = Instant::now();
        Ok(())
    }
}

impl Drop for ReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{AnalysisMetadata, TimeWindow};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_report(execution_ref: &str) -> AnalysisReport {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        AnalysisReport {
            execution_ref: execution_ref.to_string(),
            generated_at: t,
            output: StrategicRecommendationOutput {
                recommendations: vec![],
                total_signals_analyzed: 0,
                trends_identified: 0,
                correlations_found: 0,
                overall_confidence: 0.0,
                analysis_metadata: AnalysisMetadata {
                    time_window: TimeWindow::new(t, t),
                    layers_analyzed: vec![],
                    processing_duration: Duration::from_millis(3),
                },
            },
        }
    }

    fn read_reports(path: &Path) -> Vec<AnalysisReport> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("runs.jsonl");

        let mut writer = ReportWriter::new(&path).unwrap();
        writer.write_report(&create_test_report("a")).unwrap();
        writer.write_report(&create_test_report("b")).unwrap();
        writer.flush().unwrap();

        let reports = read_reports(&path);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].execution_ref, "a");
        assert_eq!(reports[1], create_test_report("b"));
    }

    #[test]
    fn test_appends_across_writers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs.jsonl");

        {
            let mut writer = ReportWriter::new(&path).unwrap();
            writer.write_report(&create_test_report("first")).unwrap();
        }
        {
            let mut writer = ReportWriter::new(&path).unwrap();
            writer.write_report(&create_test_report("second")).unwrap();
        }

        let refs: Vec<String> = read_reports(&path)
            .into_iter()
            .map(|r| r.execution_ref)
            .collect();
        assert_eq!(refs, vec!["first", "second"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_flush_surfaces_write_failure() {
        let mut writer = ReportWriter::new("/dev/full").unwrap();
        assert_eq!(writer.path(), Path::new("/dev/full"));

        // Buffered, so the write itself succeeds
        writer.write_report(&create_test_report("lost")).unwrap();

        assert!(matches!(writer.flush(), Err(ReportError::Io(_))));
    }

    #[test]
    fn test_report_field_names() {
        let json = serde_json::to_value(create_test_report("a")).unwrap();

        assert!(json.get("executionRef").is_some());
        assert!(json.get("generatedAt").is_some());
        assert_eq!(
            json["output"]["analysisMetadata"]["processingDurationMs"],
            serde_json::json!(3)
        );
    }
}
