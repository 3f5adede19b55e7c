// Tracing initialization for the CLI. Logs go to stderr so stdout stays
// parseable with --format json. The level is reloadable because tracing has
// to be up before the configuration that names the level is loaded.
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    // Prefer RUST_LOG from env, otherwise use provided level string.
    let base_filter = rust_log_filter().unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Apply the configured logging level. RUST_LOG still wins when set.
pub fn apply_logging_level(level: &str) {
    if rust_log_filter().is_some() {
        return;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
    }
}

fn rust_log_filter() -> Option<EnvFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_applied_after_init() {
        init_tracing_with_level("warn");
        assert!(LOG_RELOAD_HANDLE.get().is_some());

        if rust_log_filter().is_some() {
            return;
        }
        assert!(!tracing::enabled!(tracing::Level::DEBUG));

        apply_logging_level("debug");
        assert!(tracing::enabled!(tracing::Level::DEBUG));
    }
}
