//! Tagsync Update Engine
//!
//! Applies a record store back onto disk.
//!
//! # Features
//!
//! - Planning before mutation (`plan`), shared by dry runs and real runs
//! - Read-modify-write tag updates limited to present fields
//! - Optional renaming to `[CD<d>-]<tt> - <title><ext>`
//! - Collision detection against the disk and within the batch
//! - Per-file outcomes with a one-line reason for each failure
//! - Post-update store refresh (re-keying renamed records)
//!
//! # Architecture
//!
//! - `naming`: Rename target computation and filename sanitizing
//! - `planner`: `UpdatePlan` construction and collision marking
//! - `engine`: Tag write then rename, per file
//! - `report`: Plan, outcome and summary types
//!
//! # Example
//!
//! ```rust,no_run
//! use tagsync_core::RecordStore;
//! use tagsync_update::{plan, UpdateEngine, UpdateOptions};
//!
//! # fn example(mut store: RecordStore) -> tagsync_core::Result<()> {
//! let options = UpdateOptions { rename: true, ..Default::default() };
//! let plan = plan(&store, options);
//!
//! let report = UpdateEngine::new().apply(&plan, options.dry_run);
//! for failure in report.failures() {
//!     eprintln!("{}", failure);
//! }
//! report.refresh_store(&mut store)?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
pub mod naming;
mod planner;
mod report;

pub use engine::UpdateEngine;
pub use error::UpdateError;
pub use planner::plan;
pub use report::{
    Collision, FileOutcome, PlannedFile, UpdateOptions, UpdatePlan, UpdateReport,
};

/// Result type for update operations
pub type Result<T> = std::result::Result<T, UpdateError>;
