//! Diff engine - Comparison logic and plan generation

mod compare;
mod engine;
mod plan;

pub use compare::{compare_files, contents_equal, files_equal, FileComparison};
pub use engine::{PlanStats, SyncPlan};
pub use plan::plan_sync;
