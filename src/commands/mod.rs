//! Engine entry point and the scheduler around it

pub mod schedule;
pub mod sync;

pub use schedule::{shutdown_signal, Scheduler, SchedulerStats, SingleFlight, TickOutcome};
pub use sync::{format_completion, log_event, run_sync};
