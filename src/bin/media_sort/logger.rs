use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use media_sort::organize::{ApplySummary, Outcome, Plan, SortConfig};

/// Apply log with buffered writes, one file per run.
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new log file at `~/logs/media-sort/media_sort_<timestamp>.log`.
    pub(crate) fn new() -> Result<Self> {
        let log_dir = media_sort::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;
        Self::in_directory(log_dir)
    }

    pub(crate) fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let path = log_dir.join(format!("media_sort_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log the run settings and plan size.
    pub(crate) fn log_init(&mut self, root: &Path, config: &SortConfig, plan: &Plan) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), root.display());
        let _ = writeln!(self.writer, "  layout: {}", config.layout);
        if let Some(destination) = &config.destination {
            let _ = writeln!(self.writer, "  destination: {}", destination.display());
        }
        let _ = writeln!(self.writer, "  auto: {}", config.auto);
        let _ = writeln!(self.writer, "  auto_unlock: {}", config.auto_unlock);
        let _ = writeln!(self.writer, "  report: {}", config.report.display());
        let _ = writeln!(self.writer, "  planned changes: {}", plan.change_count());
        let _ = writeln!(self.writer, "  unparseable: {}", plan.unparseable.len());
        let _ = self.writer.flush();
    }

    /// Log every action outcome followed by the totals.
    pub(crate) fn log_summary(&mut self, summary: &ApplySummary) {
        for report in &summary.reports {
            let label = match report.outcome {
                Outcome::Applied => "APPLIED",
                Outcome::Unchanged => "NOOP   ",
                Outcome::Skipped(_) => "SKIPPED",
                Outcome::Failed(_) => "ERROR  ",
                Outcome::NotAttempted => "ABORTED",
            };
            let _ = writeln!(
                self.writer,
                "[{}] {label} {} \"{}\" -> \"{}\" | {}",
                Self::timestamp(),
                report.action.kind,
                report.action.source.display(),
                report.action.destination.display(),
                report.outcome
            );
        }

        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Applied:       {}", summary.applied);
        let _ = writeln!(self.writer, "  Unchanged:     {}", summary.unchanged);
        let _ = writeln!(self.writer, "  Skipped:       {}", summary.skipped);
        let _ = writeln!(self.writer, "  Failed:        {}", summary.failed);
        if summary.aborted {
            let _ = writeln!(self.writer, "  Not attempted: {}", summary.not_attempted);
        }
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}
