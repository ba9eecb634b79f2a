//! Logging and tracing utilities for gltfkit
//!
//! Library code only emits `tracing` events. Applications and tests that
//! want to see them install a subscriber through this module.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the default subscriber, see [`init_with_config`]
pub fn init_default() -> bool {
    init_with_config(TracingConfig::default())
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `config.default_level` when the variable is unset
///
/// Returns whether this call installed it. Only the first call tries; a
/// subscriber installed elsewhere is left in place.
pub fn init_with_config(config: TracingConfig) -> bool {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));
    let layer = fmt::layer()
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    match tracing_subscriber::registry().with(layer).with(filter).try_init() {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "Keeping the existing global subscriber");
            false
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default log level filter (e.g., "info", "debug", "warn")
    pub default_level: String,
    /// Show the target (module path) in log output
    pub show_target: bool,
    /// Show thread IDs in log output
    pub show_thread_ids: bool,
    /// Show source file in log output
    pub show_file: bool,
    /// Show line number in log output
    pub show_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: "warn,gltfkit=info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

/// Run one restructuring or packing pass inside an `info` span and
/// report its duration
pub fn instrument_pass<T, F>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = tracing::info_span!("pass", pass = %name);
    let _guard = span.enter();

    let start = std::time::Instant::now();
    let result = f();
    let duration = start.elapsed();

    tracing::debug!(duration_us = %duration.as_micros(), "Pass complete");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert!(config.default_level.contains("info"));
        assert!(config.show_target);
        assert!(!config.show_thread_ids);
    }

    #[test]
    fn test_instrument_pass() {
        let result = instrument_pass("test", || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_default();
        assert!(!init_default());
        assert!(!init_with_config(TracingConfig::default()));
        assert!(TRACING_INITIALIZED.load(Ordering::SeqCst));
    }
}
