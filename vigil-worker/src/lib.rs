//! Runtime pieces of the `vigil-worker` binary: wiring the notifier to
//! Postgres and the configured mail backend, and the job entry points the
//! CLI dispatches to.

pub mod context;
pub mod jobs;

pub use context::{WorkerContext, WorkerNotifier};
pub use jobs::{
    BackfillError, BackfillSummary, FailedDay, InactivityJobPayload, JobName,
    backfill_inactivity, run_inactivity_job,
};
