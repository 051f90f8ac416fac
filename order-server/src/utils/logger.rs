//! Logging Infrastructure
//!
//! Structured logging setup. `RUST_LOG` overrides the configured level;
//! with `LOG_DIR` set, output additionally rolls daily into that directory.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `level` is the default filter when `RUST_LOG` is unset; `log_dir`
/// switches output to a daily-rolling file if the directory exists.
pub fn init_logger(level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(dir, "order-server");
            subscriber.with_writer(file_appender).with_ansi(false).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
