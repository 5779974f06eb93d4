//! `planforge-engine` — pipeline facade over the engine crates.
//!
//! Exposes the five function contracts the surrounding ERP calls
//! (structure → assignment → schedule → forecast → report), the
//! collaborator ports it consumes, and parallel what-if evaluation of
//! assignment strategies. Name-typed inputs (template, strategy, forecast
//! kind, granularity) are parsed here at the boundary.

pub mod pipeline;
pub mod ports;
pub mod whatif;

pub use pipeline::{
    assign_tasks, forecast, generate_report, generate_structure, optimize_schedule,
    ForecastRequest, ReportRequest,
};
pub use ports::{CalendarProvider, RosterProvider, StaticCalendar, StaticRoster};
pub use whatif::{evaluate_strategies, StrategyComparison};
