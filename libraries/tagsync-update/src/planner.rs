//! Update planning
//!
//! Planning reads the filesystem but never changes it, so a dry run and a
//! real run share the same plan.

use crate::naming;
use crate::report::{Collision, PlannedFile, UpdateOptions, UpdatePlan};
use std::collections::HashMap;
use std::path::PathBuf;
use tagsync_core::RecordStore;
use tracing::debug;

/// Compute the changes for every record in store order
pub fn plan(store: &RecordStore, options: UpdateOptions) -> UpdatePlan {
    let mut files: Vec<PlannedFile> = store
        .iter()
        .map(|record| {
            let new_path = if options.rename {
                naming::target_path(record).filter(|target| target != record.path())
            } else {
                None
            };

            PlannedFile {
                path: record.path().to_path_buf(),
                will_rename: new_path.is_some(),
                new_path,
                write_set: record.tags.clone(),
                collision: None,
            }
        })
        .collect();

    if options.rename {
        mark_collisions(store, &mut files, options.overwrite);
    }

    debug!(
        "Planned {} file(s), {} rename(s), {} collision(s)",
        files.len(),
        files.iter().filter(|f| f.will_rename).count(),
        files.iter().filter(|f| f.collision.is_some()).count()
    );

    UpdatePlan { files, options }
}

fn mark_collisions(store: &RecordStore, files: &mut [PlannedFile], overwrite: bool) {
    let mut by_target: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    for (index, file) in files.iter().enumerate() {
        if let Some(target) = &file.new_path {
            by_target.entry(target.clone()).or_default().push(index);
        }
    }

    // Shared targets fail for everyone involved, regardless of overwrite
    for (target, indices) in &by_target {
        if indices.len() > 1 {
            for index in indices {
                files[*index].collision = Some(Collision::Shared {
                    target: target.clone(),
                    with: indices.len() - 1,
                });
            }
        }
    }

    for file in files.iter_mut().filter(|f| f.collision.is_none()) {
        let Some(target) = &file.new_path else {
            continue;
        };

        if store.contains(target) {
            file.collision = Some(Collision::Occupied(target.clone()));
        } else if !overwrite && target.exists() && !naming::is_same_file(&file.path, target) {
            file.collision = Some(Collision::Exists(target.clone()));
        }
    }
}
