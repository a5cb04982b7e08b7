//! File-based tracing setup.
//!
//! A TUI owns the terminal, so nothing is logged to stdout or stderr. Logging is
//! enabled by pointing `TEARS_FETCH_LOG` at a file path; the filter comes from
//! `RUST_LOG` and defaults to `info`.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "TEARS_FETCH_LOG";

/// Installs the global subscriber if `TEARS_FETCH_LOG` is set.
///
/// Returns `true` when a subscriber was installed. Failing to create the log
/// file, or a subscriber already being installed, leaves logging disabled.
pub fn init_tracing() -> bool {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return false;
    };
    init_tracing_to(Path::new(&path))
}

/// Installs the global subscriber writing to `path`.
pub fn init_tracing_to(path: &Path) -> bool {
    let Ok(file) = std::fs::File::create(path) else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_path_disables_logging() {
        let path = std::env::temp_dir().join("tears-fetch-missing-dir").join("nested").join("log");
        assert!(!init_tracing_to(&path));
    }
}
