//! `planforge-assignment` — task-to-member assignment strategies.
//!
//! Maps the tasks of an immutable graph snapshot onto a roster under a
//! selectable strategy. Capacity violations are reportable conditions, not
//! errors, unless the caller opts into strict mode.

pub mod assign;
pub mod strategy;

pub use assign::{
    assign_tasks, AssignmentOptions, AssignmentResult, UnassignedReason, UnassignedTask,
};
pub use strategy::AssignmentStrategy;
