//! Engine error model.
//!
//! Keep this focused on deterministic, caller-fixable failures. Every variant
//! carries enough context (offending entity ids) for the caller to log and
//! surface the problem; the engine itself never logs or persists on error
//! paths.

use thiserror::Error;

use crate::id::{MemberId, TaskId};

/// Result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input failed validation (e.g. unknown template or strategy name).
    /// Caller-fixable; never retried by the engine.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The task dependency relation contains a cycle. Fatal for scheduling;
    /// the caller must fix the underlying data before retrying.
    #[error("cyclic dependency among tasks: {task_ids:?}")]
    CyclicDependency { task_ids: Vec<TaskId> },

    /// A forced-capacity violation surfaced as an error (strict mode only;
    /// outside strict mode this is a reportable condition, not an error).
    #[error("capacity exceeded: task {task_id} cannot fit on member {member_id}")]
    CapacityExceeded { task_id: TaskId, member_id: MemberId },

    /// Not enough historical periods to compute a trend. Forecasting handles
    /// this internally via the low-confidence fallback; it only escapes when
    /// a caller asks for a trend that cannot exist at all.
    #[error("insufficient history: {0}")]
    InsufficientHistory(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn cyclic(task_ids: Vec<TaskId>) -> Self {
        Self::CyclicDependency { task_ids }
    }

    pub fn capacity(task_id: TaskId, member_id: MemberId) -> Self {
        Self::CapacityExceeded { task_id, member_id }
    }

    pub fn insufficient_history(msg: impl Into<String>) -> Self {
        Self::InsufficientHistory(msg.into())
    }
}
