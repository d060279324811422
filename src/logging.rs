//! Logging setup for embedfmt.
//!
//! Logs go to stderr so they never mix with formatted output on stdout.
//!
//! ## Environment Variables
//!
//! 1. **`EMBEDFMT_LOG`** (highest priority) - embedfmt-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally

use std::env;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging.
///
/// Respects the priority described in the module docs:
/// `EMBEDFMT_LOG` > `RUST_LOG` > default settings.
///
/// Safe to call multiple times; a second call leaves the first subscriber in place.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt()
        .with_env_filter(create_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

/// Initialize logging for tests.
///
/// Will not crash if called multiple times or if logging is already
/// initialized by another test.
#[allow(clippy::let_unit_value)]
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var("EMBEDFMT_LOG") {
        return expand_embedfmt_log(&level);
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new("warn")
}

/// Expand `EMBEDFMT_LOG` values into full tracing filter strings.
///
/// - `EMBEDFMT_LOG=debug` becomes `warn,embedfmt=debug`
/// - `EMBEDFMT_LOG=embedfmt::embed=trace` is used as-is
fn expand_embedfmt_log(value: &str) -> EnvFilter {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return EnvFilter::new(value);
    }
    EnvFilter::new(format!("warn,embedfmt={value}"))
}
