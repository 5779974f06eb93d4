//! `planforge-structure` — project structure generation from templates.
//!
//! Derives the initial task graph for a project from one of the supported
//! methodology templates. Pure construction: no side effects, no I/O.

pub mod template;

pub use template::{generate_structure, ProjectMeta, TemplateKind};
