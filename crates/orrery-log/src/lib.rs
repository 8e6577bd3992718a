//! Structured logging for the orrery binaries.
//!
//! Console output goes through a `tracing-subscriber` registry with uptime
//! timestamps and module targets. Debug builds can additionally write JSON
//! lines to `orrery.log` for post-mortem analysis. `RUST_LOG` always wins over
//! the configured level.

use std::path::Path;

use orrery_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Filter directive derived from the config's `debug.log_level`.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (used only when `debug_build`)
/// * `debug_build` - enables the JSON file layer
/// * `config` - source of the log level override
///
/// A failure to create the log file is not fatal; console logging still runs.
///
/// ```no_run
/// use orrery_config::Config;
///
/// let config = Config::default();
/// orrery_log::init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}
