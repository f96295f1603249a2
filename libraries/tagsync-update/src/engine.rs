//! Applies an update plan to disk

use crate::error::UpdateError;
use crate::naming;
use crate::report::{FileOutcome, PlannedFile, UpdatePlan, UpdateReport};
use std::fs;
use tagsync_core::TagCodec;
use tagsync_metadata::LoftyTagCodec;
use tracing::{debug, info, warn};

/// Update engine
///
/// Each file is handled to completion (tag write, then rename) before the
/// next one starts. One file's failure never stops the batch.
#[derive(Debug, Clone, Default)]
pub struct UpdateEngine<C: TagCodec = LoftyTagCodec> {
    codec: C,
}

impl UpdateEngine<LoftyTagCodec> {
    /// Create an engine using the lofty codec
    pub fn new() -> Self {
        Self::with_codec(LoftyTagCodec::new())
    }
}

impl<C: TagCodec> UpdateEngine<C> {
    /// Create an engine with a specific codec
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Apply the whole plan
    pub fn apply(&self, plan: &UpdatePlan, dry_run: bool) -> UpdateReport {
        let report = UpdateReport {
            outcomes: self.outcomes(plan, dry_run).collect(),
            dry_run,
        };
        info!("{}", report.summary_text());
        report
    }

    /// Apply the plan lazily, one file per item
    ///
    /// Dropping the iterator stops the batch between files.
    pub fn outcomes<'a>(
        &'a self,
        plan: &'a UpdatePlan,
        dry_run: bool,
    ) -> impl Iterator<Item = FileOutcome> + 'a {
        let overwrite = plan.options.overwrite;
        plan.files
            .iter()
            .map(move |file| self.apply_file(file, overwrite, dry_run))
    }

    fn apply_file(&self, file: &PlannedFile, overwrite: bool, dry_run: bool) -> FileOutcome {
        let mut outcome = FileOutcome {
            path: file.path.clone(),
            written: Vec::new(),
            renamed_to: None,
            error: None,
            simulated: dry_run,
        };

        if let Some(collision) = &file.collision {
            outcome.error = Some(collision.to_error());
            warn!("{}", outcome);
            return outcome;
        }

        if !file.write_set.is_empty() {
            if let Err(e) = self.codec.write(&file.path, &file.write_set, dry_run) {
                outcome.error = Some(UpdateError::TagWrite(e));
                warn!("{}", outcome);
                return outcome;
            }
            outcome.written = file.write_set.present_fields();
        }

        if let Some(target) = file.new_path.as_ref().filter(|_| file.will_rename) {
            // The destination may have appeared since planning
            if !overwrite && target.exists() && !naming::is_same_file(&file.path, target) {
                outcome.error = Some(UpdateError::collision(target, "already exists"));
                warn!("{}", outcome);
                return outcome;
            }

            if !dry_run {
                if let Err(e) = fs::rename(&file.path, target) {
                    outcome.error = Some(UpdateError::Rename {
                        target: target.clone(),
                        source: e,
                    });
                    warn!("{}", outcome);
                    return outcome;
                }
            }
            outcome.renamed_to = Some(target.clone());
        }

        debug!("{}", outcome);
        outcome
    }
}
