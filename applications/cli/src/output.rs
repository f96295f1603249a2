/// JSON views of library reports
use serde::Serialize;
use std::path::{Path, PathBuf};
use tagsync_convert::{BatchStats, ConversionStatus};
use tagsync_core::Field;
use tagsync_metadata::ExtractReport;
use tagsync_update::{FileOutcome, PlannedFile, UpdatePlan, UpdateReport};

#[derive(Debug, Serialize)]
pub struct IssueView<'a> {
    pub path: &'a Path,
    pub reason: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExtractView<'a> {
    pub output: &'a Path,
    pub scanned: usize,
    pub filename_fallbacks: usize,
    pub issues: Vec<IssueView<'a>>,
}

impl<'a> ExtractView<'a> {
    pub fn new(report: &'a ExtractReport, output: &'a Path) -> Self {
        Self {
            output,
            scanned: report.scanned(),
            filename_fallbacks: report.filename_fallbacks,
            issues: report
                .issues
                .iter()
                .map(|issue| IssueView {
                    path: &issue.path,
                    reason: &issue.reason,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlannedFileView<'a> {
    pub path: &'a Path,
    pub new_path: Option<&'a Path>,
    pub write: Vec<Field>,
    pub collision: Option<String>,
}

impl<'a> From<&'a PlannedFile> for PlannedFileView<'a> {
    fn from(file: &'a PlannedFile) -> Self {
        Self {
            path: &file.path,
            new_path: file.new_path.as_deref().filter(|_| file.will_rename),
            write: file.write_set.present_fields(),
            collision: file.collision.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanView<'a> {
    pub files: Vec<PlannedFileView<'a>>,
    pub collisions: usize,
}

impl<'a> From<&'a UpdatePlan> for PlanView<'a> {
    fn from(plan: &'a UpdatePlan) -> Self {
        Self {
            files: plan.files.iter().map(PlannedFileView::from).collect(),
            collisions: plan.collisions().count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutcomeView<'a> {
    pub path: &'a Path,
    pub written: &'a [Field],
    pub renamed_to: Option<&'a Path>,
    pub error: Option<String>,
    pub simulated: bool,
}

impl<'a> From<&'a FileOutcome> for OutcomeView<'a> {
    fn from(outcome: &'a FileOutcome) -> Self {
        Self {
            path: &outcome.path,
            written: &outcome.written,
            renamed_to: outcome.renamed_to.as_deref(),
            error: outcome.reason(),
            simulated: outcome.simulated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateView<'a> {
    pub dry_run: bool,
    pub total: usize,
    pub tags_written: usize,
    pub renamed: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub outcomes: Vec<OutcomeView<'a>>,
}

impl<'a> From<&'a UpdateReport> for UpdateView<'a> {
    fn from(report: &'a UpdateReport) -> Self {
        Self {
            dry_run: report.dry_run,
            total: report.total(),
            tags_written: report.tags_written(),
            renamed: report.renamed(),
            failed: report.failed(),
            unchanged: report.unchanged(),
            outcomes: report.outcomes.iter().map(OutcomeView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConvertView<'a> {
    Converted { output: PathBuf },
    Skipped { output: PathBuf },
    Batch(&'a BatchStats),
}

impl From<ConversionStatus> for ConvertView<'_> {
    fn from(status: ConversionStatus) -> Self {
        match status {
            ConversionStatus::Converted(output) => ConvertView::Converted { output },
            ConversionStatus::Skipped(output) => ConvertView::Skipped { output },
        }
    }
}
