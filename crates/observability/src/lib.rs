//! Tracing/logging setup for processes embedding the engine.
//!
//! The engine crates emit `tracing` events but never install a subscriber;
//! hosts call [`init`] once at startup.

/// Tracing configuration (filters, output format).
pub mod tracing;

/// Initialize process-wide observability.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
