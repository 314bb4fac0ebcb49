use crate::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber from [`LogConfig`].
///
/// Returns the appender guard when file logging is enabled; the caller must
/// keep it alive for the lifetime of the process. Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    match &config.log_dir {
        Some(log_dir) => {
            let file_appender = match config.rotation.as_str() {
                "hourly" => tracing_appender::rolling::hourly(log_dir, &config.log_file),
                "daily" => tracing_appender::rolling::daily(log_dir, &config.log_file),
                _ => tracing_appender::rolling::never(log_dir, &config.log_file),
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            if config.use_json {
                let file_layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(non_blocking)
                    .with_ansi(false);
                let _ = registry.with(file_layer).try_init();
            } else {
                let file_layer = fmt::layer()
                    .with_target(false)
                    .with_writer(non_blocking)
                    .with_ansi(false);
                let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
                let _ = registry.with(file_layer).with(stdout_layer).try_init();
            }
            Some(guard)
        }
        None => {
            let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
            let _ = registry.with(stdout_layer).try_init();
            None
        }
    }
}
