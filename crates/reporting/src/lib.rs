//! `planforge-reporting` — immutable progress-report snapshots.
//!
//! Aggregates schedule, assignment, and forecast outputs into period
//! snapshots and diffs them against the previous one. Snapshots are facts:
//! written once through the append-only history port, never updated.

pub mod history;
pub mod snapshot;

pub use history::{HistoryError, HistoryLog, InMemoryHistory};
pub use snapshot::{
    generate_report, ForecastSummary, LoadSummary, PeriodGranularity, ProgressSummary,
    ReportInputs, ReportSnapshot, ScheduleSummary, SnapshotDelta,
};
